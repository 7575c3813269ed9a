//! Recovery planning policies and the planner entry point.
//!
//! Three interchangeable policies produce recovery requests from the
//! topology; a single resolution and validation pipeline turns them into
//! the final plan.
//!
//! # Architecture
//!
//! ```text
//!   Topology ──▶ RecoveryMode (in-place / spread / rows)
//!                     │ RecoveryRequest list
//!                     ▼
//!                resolve() ──▶ RecoveryTriplet (validated)
//!                     │
//!                     ▼
//!                RecoveryPlan { triplets, warnings, skipped, patch }
//! ```

use std::collections::BTreeMap;

use egret_common::config::{PlannerConfig, ProbeConfig};
use egret_common::error::{EgretResult, RecoveryError};

use crate::ports::PortAssigner;
use crate::resolve::{resolve, FailoverTarget, RecoveryRequest, SkippedSegment, TopologyPatch};
use crate::rows::{rows_to_requests, validate_rows, RecoveryRow};
use crate::topology::{Segment, Topology};
use crate::triplet::RecoveryTriplet;

/// Host reachability probe, implemented by an external collaborator
/// (ssh/ping). One call covers the whole batch: partial reachability must
/// not leak into a half-formed plan, so the planner never probes hosts one
/// at a time.
pub trait HostProbe {
    /// Probe every host as one batch; returns the subset that is
    /// unreachable. Timeout and retry policy belong to the implementation,
    /// parameterized by `config`.
    fn probe(&self, hosts: &[String], config: &ProbeConfig) -> Vec<String>;
}

/// Probe that reports every host reachable. For callers whose mode never
/// probes (in-place, row-driven) and for tests.
pub struct AssumeReachable;

impl HostProbe for AssumeReachable {
    fn probe(&self, _hosts: &[String], _config: &ProbeConfig) -> Vec<String> {
        Vec::new()
    }
}

/// Which planning policy to apply.
#[derive(Debug, Clone)]
pub enum RecoveryMode {
    /// Recover every down segment incrementally on its existing host.
    InPlace,
    /// Relocate all down segments from their failing hosts onto the given
    /// replacement hosts, in order.
    SpreadToNewHosts { new_hosts: Vec<String> },
    /// Recover exactly the segments named by a pre-parsed recovery file.
    FromRows { rows: Vec<RecoveryRow> },
}

/// The ordered output of one planner invocation. Handed to the execution
/// collaborator and discarded; never persisted.
#[derive(Debug)]
pub struct RecoveryPlan {
    pub triplets: Vec<RecoveryTriplet>,
    /// Advisory findings that did not block the plan, e.g. surplus
    /// recovery hosts.
    pub warnings: Vec<String>,
    /// Segments excluded from the plan without failing it.
    pub skipped: Vec<SkippedSegment>,
    /// Record replacements to apply for an "as-if-recovered" topology view.
    pub patch: TopologyPatch,
}

impl RecoveryPlan {
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triplets.len()
    }

    pub fn full_recovery_count(&self) -> usize {
        self.triplets.iter().filter(|t| t.is_full_recovery()).count()
    }

    pub fn incremental_count(&self) -> usize {
        self.triplets.iter().filter(|t| !t.is_full_recovery()).count()
    }
}

/// Computes a `RecoveryPlan` from a topology snapshot and a recovery mode.
pub struct RecoveryPlanner {
    config: PlannerConfig,
}

impl RecoveryPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Plan one recovery pass.
    ///
    /// `ports` is the caller-owned ledger for this single invocation,
    /// seeded from the same snapshot; only spread mode consults it.
    /// Everything here is synchronous and touches no state outside the
    /// arguments.
    pub fn plan(
        &self,
        topology: &Topology,
        mode: RecoveryMode,
        ports: &mut PortAssigner,
        probe: &dyn HostProbe,
    ) -> EgretResult<RecoveryPlan> {
        let mut warnings = Vec::new();
        let requests = match mode {
            RecoveryMode::InPlace => in_place_requests(topology),
            RecoveryMode::SpreadToNewHosts { new_hosts } => spread_requests(
                topology,
                &new_hosts,
                ports,
                probe,
                &self.config.probe,
                &mut warnings,
            )?,
            RecoveryMode::FromRows { rows } => {
                validate_rows(&rows)?;
                rows_to_requests(topology, &rows)?
            }
        };

        let resolution = resolve(topology, requests)?;
        tracing::info!(
            triplets = resolution.triplets.len(),
            skipped = resolution.skipped.len(),
            warnings = warnings.len(),
            "recovery plan computed"
        );
        Ok(RecoveryPlan {
            triplets: resolution.triplets,
            warnings,
            skipped: resolution.skipped,
            patch: resolution.patch,
        })
    }
}

/// One bare request per down segment: incremental recovery where it stands.
fn in_place_requests(topology: &Topology) -> Vec<RecoveryRequest> {
    topology
        .down_segments()
        .into_iter()
        .map(|seg| RecoveryRequest {
            failed: seg.clone(),
            failover: None,
            is_new_host: false,
        })
        .collect()
}

/// Pair each down host (lexicographic order) with one replacement host
/// (input order); every down segment moves to its host's replacement at
/// the same data directory and a freshly reserved port.
fn spread_requests(
    topology: &Topology,
    new_hosts: &[String],
    ports: &mut PortAssigner,
    probe: &dyn HostProbe,
    probe_config: &ProbeConfig,
    warnings: &mut Vec<String>,
) -> EgretResult<Vec<RecoveryRequest>> {
    let mut down_by_host: BTreeMap<&str, Vec<&Segment>> = BTreeMap::new();
    for seg in topology.down_segments() {
        down_by_host.entry(seg.host.as_str()).or_default().push(seg);
    }

    let needed = down_by_host.len();
    if new_hosts.len() < needed {
        return Err(RecoveryError::InsufficientHosts {
            needed,
            supplied: new_hosts.len(),
        }
        .into());
    }
    if new_hosts.len() > needed {
        let unused = new_hosts[needed..].join(", ");
        tracing::warn!(unused = %unused, "surplus recovery hosts supplied");
        warnings.push(format!("recovery hosts not needed: {unused}"));
    }

    let targets = &new_hosts[..needed];
    if !targets.is_empty() {
        let unreachable = probe.probe(targets, probe_config);
        if !unreachable.is_empty() {
            return Err(RecoveryError::UnreachableTargets(unreachable).into());
        }
    }

    let mut requests = Vec::new();
    for ((_, segments), new_host) in down_by_host.iter().zip(targets) {
        for seg in segments {
            let port = ports.reserve(new_host, new_host)?;
            requests.push(RecoveryRequest {
                failed: (*seg).clone(),
                failover: Some(FailoverTarget {
                    host: new_host.clone(),
                    address: new_host.clone(),
                    port,
                    data_directory: seg.data_directory.clone(),
                }),
                is_new_host: true,
            });
        }
    }
    Ok(requests)
}

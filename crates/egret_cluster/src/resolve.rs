//! Recovery request resolution: turns each request into a validated
//! (failed, live, failover) triplet and an optional topology patch entry.
//!
//! Relocation never mutates the input snapshot. The post-recovery
//! descriptor is returned as a fresh `Segment` value together with a
//! `TopologyPatch`; a caller that wants the "as-if-applied" view applies
//! the patch to its own snapshot explicitly.

use serde::{Deserialize, Serialize};

use egret_common::error::EgretResult;
use egret_common::types::ContentId;

use crate::topology::{Segment, Topology};
use crate::triplet::RecoveryTriplet;

/// Destination override for one request. All-or-nothing by construction:
/// a request either carries a complete target or none at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailoverTarget {
    pub host: String,
    pub address: String,
    pub port: u16,
    pub data_directory: String,
}

/// One "thing that should be recovered", before resolution.
#[derive(Debug, Clone)]
pub struct RecoveryRequest {
    /// The segment believed to need recovery, as registered in the topology.
    pub failed: Segment,
    /// Full recovery to a new/changed location when set; incremental
    /// recovery in place when absent.
    pub failover: Option<FailoverTarget>,
    /// True only when the destination host was not a cluster member before
    /// this planning run.
    pub is_new_host: bool,
}

/// One segment-record replacement: the registered descriptor and its
/// post-recovery successor under the same content id and dbid.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentPatch {
    pub content: ContentId,
    pub old: Segment,
    pub new: Segment,
}

/// The record replacements a plan implies, in plan order. Applying the
/// patch advances a snapshot to its post-recovery state, e.g. before
/// writing a fresh sample recovery file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TopologyPatch {
    entries: Vec<SegmentPatch>,
}

impl TopologyPatch {
    pub fn entries(&self) -> &[SegmentPatch] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn apply(&self, topology: &mut Topology) {
        for entry in &self.entries {
            topology.replace_segment(entry.old.dbid, entry.new.clone());
        }
    }
}

/// A request excluded from the plan without failing it.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSegment {
    pub segment: Segment,
    pub reason: String,
}

/// Output of one resolution batch.
#[derive(Debug)]
pub struct Resolution {
    pub triplets: Vec<RecoveryTriplet>,
    pub patch: TopologyPatch,
    pub skipped: Vec<SkippedSegment>,
}

/// Resolve a batch of requests against the topology.
///
/// Unreachable segments that are not being moved to a new host are
/// skipped, not failed: recovering what is recoverable should not be
/// blocked by one bad segment, and a skip strictly reduces scope. Every
/// other failure aborts the whole batch with no partial result.
pub fn resolve(topology: &Topology, requests: Vec<RecoveryRequest>) -> EgretResult<Resolution> {
    let mut triplets = Vec::with_capacity(requests.len());
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for request in requests {
        let RecoveryRequest {
            failed,
            failover,
            is_new_host,
        } = request;

        if failed.unreachable && !is_new_host {
            tracing::warn!(
                dbid = failed.dbid.0,
                host = %failed.host,
                "skipping unreachable segment: cannot recover in place"
            );
            skipped.push(SkippedSegment {
                reason: format!("host {} is unreachable", failed.host),
                segment: failed,
            });
            continue;
        }

        let failover = failover.map(|target| {
            let mut dest = failed.clone();
            dest.host = target.host;
            dest.address = target.address;
            dest.port = target.port;
            dest.data_directory = target.data_directory;
            // A brand-new host was just probed, so it is known reachable;
            // an existing destination keeps its recorded flag.
            if is_new_host {
                dest.unreachable = false;
            }
            dest
        });

        let live = topology.peer_of(failed.dbid).cloned();
        let triplet = RecoveryTriplet::new(Some(failed.clone()), live, failover.clone())?;

        if let Some(dest) = failover {
            entries.push(SegmentPatch {
                content: failed.content,
                old: failed,
                new: dest,
            });
        }
        triplets.push(triplet);
    }

    Ok(Resolution {
        triplets,
        patch: TopologyPatch { entries },
        skipped,
    })
}

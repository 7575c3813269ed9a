//! The validated unit of recovery work: one (failed, live, failover)
//! triple. Cross-entity invariants are checked at construction; a triplet
//! that exists is a triplet that passed.

use serde::Serialize;

use egret_common::error::RecoveryError;
use egret_common::types::SegmentRole;

use crate::topology::Segment;

/// One recovery action: resynchronize `failed` from `live`, either in
/// place (`failover` absent, incremental recovery) or rebuilt at the
/// `failover` location (full recovery).
///
/// Immutable after construction. `failed` carries the identity as
/// registered before the plan; `failover` carries the post-recovery
/// descriptor under the same dbid.
#[derive(Debug, Clone, Serialize)]
pub struct RecoveryTriplet {
    failed: Option<Segment>,
    live: Segment,
    failover: Option<Segment>,
}

impl RecoveryTriplet {
    /// Build and validate a triplet. Any invariant violation is a
    /// `Validation` error, fatal to the planning call: a plan that is
    /// partially applied across a cluster is unsafe, so one bad triple
    /// aborts the batch.
    pub fn new(
        failed: Option<Segment>,
        live: Option<Segment>,
        failover: Option<Segment>,
    ) -> Result<Self, RecoveryError> {
        let live = match live {
            Some(live) => live,
            None => {
                let msg = match &failed {
                    Some(f) => format!("no peer found for {} ({})", f.dbid, f.content),
                    None => "no failed segment given and no live segment found".to_string(),
                };
                return Err(RecoveryError::Validation(msg));
            }
        };
        if !live.is_segment_qe() {
            return Err(RecoveryError::Validation(format!(
                "live segment {} is the coordinator, not a shard member",
                live.dbid
            )));
        }
        if live.role != SegmentRole::Primary {
            return Err(RecoveryError::Validation(format!(
                "live segment {} has role {}, expected primary",
                live.dbid, live.role
            )));
        }
        if !live.is_up() {
            return Err(RecoveryError::Validation(format!(
                "live segment {} is down",
                live.dbid
            )));
        }
        if live.unreachable {
            return Err(RecoveryError::Validation(format!(
                "live segment {} on host {} is unreachable",
                live.dbid, live.host
            )));
        }
        if let Some(f) = &failed {
            if f.content != live.content {
                return Err(RecoveryError::Validation(format!(
                    "failed segment {} has {}, live segment {} has {}",
                    f.dbid, f.content, live.dbid, live.content
                )));
            }
            if f.dbid == live.dbid {
                return Err(RecoveryError::Validation(format!(
                    "failed and live segments are the same instance ({})",
                    f.dbid
                )));
            }
        }
        if let Some(fo) = &failover {
            if fo.content != live.content {
                return Err(RecoveryError::Validation(format!(
                    "failover segment {} has {}, live segment {} has {}",
                    fo.dbid, fo.content, live.dbid, live.content
                )));
            }
            if fo.dbid == live.dbid {
                return Err(RecoveryError::Validation(format!(
                    "failover and live segments are the same instance ({})",
                    fo.dbid
                )));
            }
            if fo.unreachable {
                return Err(RecoveryError::Validation(format!(
                    "failover segment {} on host {} is unreachable",
                    fo.dbid, fo.host
                )));
            }
        }
        if let (Some(f), Some(fo)) = (&failed, &failover) {
            // A failover is the same logical segment relocated, never a
            // different identity.
            if f.dbid != fo.dbid {
                return Err(RecoveryError::Validation(format!(
                    "failover {} does not match failed {}",
                    fo.dbid, f.dbid
                )));
            }
        }
        if failed.is_none() && failover.is_none() {
            return Err(RecoveryError::Validation(
                "neither a failed nor a failover segment was given".to_string(),
            ));
        }
        Ok(Self {
            failed,
            live,
            failover,
        })
    }

    pub fn failed(&self) -> Option<&Segment> {
        self.failed.as_ref()
    }

    pub fn live(&self) -> &Segment {
        &self.live
    }

    pub fn failover(&self) -> Option<&Segment> {
        self.failover.as_ref()
    }

    /// True for full recovery to a (possibly new) location; false for
    /// incremental recovery in place.
    pub fn is_full_recovery(&self) -> bool {
        self.failover.is_some()
    }
}

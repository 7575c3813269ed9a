//! Segment recovery planning for the Egret cluster manager.
//!
//! Given a topology snapshot and a recovery intent (in place, spread to
//! replacement hosts, or a pre-parsed recovery file), the planner decides
//! exactly which (failed, live, failover) triples restore redundancy and
//! which ports relocated segments bind to. Executing the plan (basebackup,
//! process start/stop, catalog updates) belongs to other subsystems; this
//! crate produces the plan or an error and has no other side effects.

pub mod ports;
pub mod resolve;
pub mod rows;
pub mod strategy;
pub mod topology;
pub mod triplet;

#[cfg(test)]
mod testutil;

pub use ports::PortAssigner;
pub use resolve::{
    resolve, FailoverTarget, RecoveryRequest, Resolution, SegmentPatch, SkippedSegment,
    TopologyPatch,
};
pub use rows::{rows_to_requests, validate_rows, RecoveryRow, RowLocation};
pub use strategy::{AssumeReachable, HostProbe, RecoveryMode, RecoveryPlan, RecoveryPlanner};
pub use topology::{Segment, Topology};
pub use triplet::RecoveryTriplet;

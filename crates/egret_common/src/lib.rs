//! Shared building blocks for the Egret cluster manager: segment identity
//! types, the error taxonomy, and planner configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{PlannerConfig, ProbeConfig};
pub use error::{EgretError, EgretResult, ErrorKind, RecoveryError, TopologyError};
pub use types::{ContentId, Dbid, SegmentRole, SegmentStatus, COORDINATOR_CONTENT};

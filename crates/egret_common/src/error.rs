use thiserror::Error;

use crate::types::{ContentId, Dbid};

/// Convenience alias for `Result<T, EgretError>`.
pub type EgretResult<T> = Result<T, EgretError>;

/// Error classification for escalation decisions.
///
/// - `UserError`   — bad request or recovery input; fix the input and re-plan
/// - `Environment` — hosts unreachable, ports exhausted; fix the cluster and re-plan
/// - `InternalBug` — catalog/topology inconsistency; should never happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UserError,
    Environment,
    InternalBug,
}

/// Top-level error type that all crate-specific errors convert into.
#[derive(Error, Debug)]
pub enum EgretError {
    #[error("Topology error: {0}")]
    Topology(#[from] TopologyError),

    #[error("Recovery error: {0}")]
    Recovery(#[from] RecoveryError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Topology snapshot errors. The snapshot is assembled by the cluster-state
/// collector; any of these surfacing means the catalog it read is corrupt.
#[derive(Error, Debug)]
pub enum TopologyError {
    #[error("duplicate dbid {0} in topology")]
    DuplicateDbid(Dbid),

    #[error("{content} has {primaries} primaries and {mirrors} mirrors (expected exactly one of each)")]
    PairViolation {
        content: ContentId,
        primaries: usize,
        mirrors: usize,
    },

    #[error("coordinator {content} has {count} segments (expected one, or two with a standby)")]
    CoordinatorViolation { content: ContentId, count: usize },
}

/// Recovery planning errors. All are fatal to the planning call that raised
/// them; no partial plan is returned.
#[derive(Error, Debug)]
pub enum RecoveryError {
    #[error("cannot seed port assignment: topology has no non-coordinator segments")]
    Configuration,

    #[error("no free port on host {host} (address {address}) below {ceiling}")]
    PortExhaustion {
        host: String,
        address: String,
        ceiling: u16,
    },

    #[error("{needed} recovery hosts needed but only {supplied} supplied")]
    InsufficientHosts { needed: usize, supplied: usize },

    #[error("recovery target hosts unreachable: {}", .0.join(", "))]
    UnreachableTargets(Vec<String>),

    #[error("segment not found in topology: {address}|{port}|{data_directory}")]
    SegmentNotFound {
        address: String,
        port: u16,
        data_directory: String,
    },

    #[error("invalid recovery triplet: {0}")]
    Validation(String),
}

impl EgretError {
    /// Classify this error for escalation decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EgretError::Topology(_) => ErrorKind::InternalBug,
            EgretError::Recovery(r) => match r {
                RecoveryError::Configuration => ErrorKind::UserError,
                RecoveryError::PortExhaustion { .. } => ErrorKind::Environment,
                RecoveryError::InsufficientHosts { .. } => ErrorKind::UserError,
                RecoveryError::UnreachableTargets(_) => ErrorKind::Environment,
                RecoveryError::SegmentNotFound { .. } => ErrorKind::UserError,
                RecoveryError::Validation(_) => ErrorKind::UserError,
            },
            EgretError::Internal(_) => ErrorKind::InternalBug,
        }
    }

    /// Returns true if this is a user/input error.
    pub fn is_user_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::UserError)
    }

    /// Returns true if this is a cluster-environment error.
    pub fn is_environment(&self) -> bool {
        matches!(self.kind(), ErrorKind::Environment)
    }

    /// Returns true if this is an internal bug that should never occur.
    pub fn is_internal_bug(&self) -> bool {
        matches!(self.kind(), ErrorKind::InternalBug)
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical shard identifier. The primary and mirror of one shard share a
/// content id; the coordinator pair uses the reserved [`COORDINATOR_CONTENT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentId(pub i32);

/// Globally unique identifier of one physical segment instance. Survives
/// role changes; a segment relocated to another host keeps its dbid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Dbid(pub i32);

/// Content id reserved for the coordinator / standby-coordinator pair.
/// Segments with this content id are never recovery targets.
pub const COORDINATOR_CONTENT: ContentId = ContentId(-1);

/// Role of a segment within its pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentRole {
    Primary,
    Mirror,
}

/// Up/down status of a segment as recorded in the cluster catalog.
/// Orthogonal to host reachability, which is probed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStatus {
    Up,
    Down,
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "content:{}", self.0)
    }
}

impl fmt::Display for Dbid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dbid:{}", self.0)
    }
}

impl fmt::Display for SegmentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentRole::Primary => write!(f, "primary"),
            SegmentRole::Mirror => write!(f, "mirror"),
        }
    }
}

impl fmt::Display for SegmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentStatus::Up => write!(f, "up"),
            SegmentStatus::Down => write!(f, "down"),
        }
    }
}

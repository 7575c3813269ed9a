//! Port assignment for relocated segments: a per-host used-port ledger
//! seeded from the topology, grown as the planner reserves fresh ports.
//!
//! The ledger is caller-owned and scoped to one planning run. Two plans
//! computed concurrently against the same cluster must each seed their own
//! assigner from an independently captured snapshot; the planner provides
//! no cross-invocation locking.

use std::collections::{BTreeSet, HashMap};

use egret_common::error::RecoveryError;

use crate::topology::Topology;

/// Allocates collision-free listen ports for segments placed on a host.
///
/// Scans upward from the cluster-wide minimum observed port, not a per-host
/// minimum: brand-new hosts have no prior segments to anchor on, and one
/// uniform range keeps old and new segments in the same port band.
pub struct PortAssigner {
    used: HashMap<String, BTreeSet<u16>>,
    floor: u16,
    ceiling: u16,
}

impl PortAssigner {
    /// Seed the ledger from every non-coordinator segment's `(host, port)`.
    /// `ceiling` is the exclusive upper bound of the scan range.
    pub fn new(topology: &Topology, ceiling: u16) -> Result<Self, RecoveryError> {
        let mut used: HashMap<String, BTreeSet<u16>> = HashMap::new();
        let mut floor: Option<u16> = None;
        for seg in topology.all_segments() {
            if !seg.is_segment_qe() {
                continue;
            }
            used.entry(seg.host.clone()).or_default().insert(seg.port);
            floor = Some(match floor {
                Some(f) => f.min(seg.port),
                None => seg.port,
            });
        }
        let floor = floor.ok_or(RecoveryError::Configuration)?;
        Ok(Self {
            used,
            floor,
            ceiling,
        })
    }

    /// Reserve the lowest port in `[floor, ceiling)` not already used on
    /// `host`, and mark it used. Repeated calls for the same host never
    /// return the same port twice within one run.
    pub fn reserve(&mut self, host: &str, address: &str) -> Result<u16, RecoveryError> {
        let used = self.used.entry(host.to_string()).or_default();
        for port in self.floor..self.ceiling {
            if used.insert(port) {
                return Ok(port);
            }
        }
        Err(RecoveryError::PortExhaustion {
            host: host.to_string(),
            address: address.to_string(),
            ceiling: self.ceiling,
        })
    }

    /// Lowest port observed across the cluster at seeding time.
    pub fn floor(&self) -> u16 {
        self.floor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{coordinator, pair, seg};
    use egret_common::types::{ContentId, Dbid, SegmentRole, SegmentStatus};

    #[test]
    fn test_seeds_floor_from_non_coordinator_segments() {
        // Coordinator listens on 5432 but must not anchor the scan.
        let mut segs = vec![coordinator(Dbid(1), "cdw")];
        segs.extend(pair(0, 2, 3));
        let topo = Topology::new(segs).unwrap();
        let assigner = PortAssigner::new(&topo, 65535).unwrap();
        assert_eq!(assigner.floor(), 6000);
    }

    #[test]
    fn test_reserve_skips_ports_in_use() {
        let topo = Topology::new(pair(0, 1, 2)).unwrap();
        let mut assigner = PortAssigner::new(&topo, 65535).unwrap();
        // h1 already listens on 6000, so the first free port there is 6001.
        assert_eq!(assigner.reserve("h1", "h1-1").unwrap(), 6001);
        // h2 listens on 7000 only; the scan starts at the cluster floor.
        assert_eq!(assigner.reserve("h2", "h2-1").unwrap(), 6000);
    }

    #[test]
    fn test_repeated_reserves_are_distinct_and_above_floor() {
        let topo = Topology::new(pair(0, 1, 2)).unwrap();
        let mut assigner = PortAssigner::new(&topo, 65535).unwrap();
        let floor = assigner.floor();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..8 {
            let port = assigner.reserve("h3", "h3-1").unwrap();
            assert!(port >= floor);
            assert!(seen.insert(port), "port {port} returned twice");
        }
    }

    #[test]
    fn test_new_host_starts_at_cluster_floor() {
        let topo = Topology::new(pair(0, 1, 2)).unwrap();
        let mut assigner = PortAssigner::new(&topo, 65535).unwrap();
        assert_eq!(assigner.reserve("h9", "h9-1").unwrap(), 6000);
    }

    #[test]
    fn test_exhaustion_names_the_address() {
        let mut segs = pair(0, 1, 2);
        segs[0].port = 6000;
        segs[1].port = 6000;
        let topo = Topology::new(segs).unwrap();
        // Ceiling of 6001 leaves no free port on a host already using 6000.
        let mut assigner = PortAssigner::new(&topo, 6001).unwrap();
        match assigner.reserve("h1", "h1-1") {
            Err(RecoveryError::PortExhaustion { host, address, ceiling }) => {
                assert_eq!(host, "h1");
                assert_eq!(address, "h1-1");
                assert_eq!(ceiling, 6001);
            }
            other => panic!("expected PortExhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_topology_is_configuration_error() {
        let topo = Topology::new(vec![coordinator(Dbid(1), "cdw")]).unwrap();
        match PortAssigner::new(&topo, 65535) {
            Err(RecoveryError::Configuration) => {}
            other => panic!("expected Configuration, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_ledger_never_touches_topology() {
        let segs = vec![seg(
            ContentId(0),
            Dbid(1),
            SegmentRole::Primary,
            "h1",
            6000,
            SegmentStatus::Up,
        ), seg(
            ContentId(0),
            Dbid(2),
            SegmentRole::Mirror,
            "h2",
            6000,
            SegmentStatus::Up,
        )];
        let topo = Topology::new(segs).unwrap();
        let mut assigner = PortAssigner::new(&topo, 65535).unwrap();
        assigner.reserve("h1", "h1-1").unwrap();
        assert_eq!(topo.all_segments()[0].port, 6000);
    }
}

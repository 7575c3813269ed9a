//! Cluster topology snapshot: segment descriptors, primary/mirror pairing,
//! and the lookup accessors the recovery planner reads. Assembled by the
//! cluster-state collector before planning begins; read-only during a plan.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use egret_common::error::TopologyError;
use egret_common::types::{ContentId, Dbid, SegmentRole, SegmentStatus, COORDINATOR_CONTENT};

/// One database segment instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub content: ContentId,
    pub dbid: Dbid,
    /// Current role; may differ from `preferred_role` after a failover.
    pub role: SegmentRole,
    /// Role this dbid should hold absent failover.
    pub preferred_role: SegmentRole,
    pub host: String,
    /// Interface address; may differ from `host` on multi-NIC machines.
    pub address: String,
    /// TCP listen port, unique per host among all segments on that host.
    pub port: u16,
    /// Filesystem path, unique per host.
    pub data_directory: String,
    pub status: SegmentStatus,
    /// Set by the external reachability probe; orthogonal to `status`.
    pub unreachable: bool,
}

impl Segment {
    /// True for the coordinator or standby coordinator.
    pub fn is_coordinator(&self) -> bool {
        self.content == COORDINATOR_CONTENT
    }

    /// True for ordinary shard members (query executors).
    pub fn is_segment_qe(&self) -> bool {
        !self.is_coordinator()
    }

    pub fn is_down(&self) -> bool {
        self.status == SegmentStatus::Down
    }

    pub fn is_up(&self) -> bool {
        self.status == SegmentStatus::Up
    }
}

/// Point-in-time snapshot of the cluster topology.
///
/// Construction verifies segment identity and pairing (one primary plus one
/// mirror per content id); accessors are read-only. The only mutation path
/// is applying a recovery plan's topology patch, which swaps a segment
/// record for its post-recovery descriptor under the same dbid.
pub struct Topology {
    segments: Vec<Segment>,
    by_dbid: HashMap<Dbid, usize>,
    peers: HashMap<Dbid, Dbid>,
}

impl Topology {
    pub fn new(segments: Vec<Segment>) -> Result<Self, TopologyError> {
        let mut by_dbid = HashMap::with_capacity(segments.len());
        for (idx, seg) in segments.iter().enumerate() {
            if by_dbid.insert(seg.dbid, idx).is_some() {
                return Err(TopologyError::DuplicateDbid(seg.dbid));
            }
        }

        let mut by_content: BTreeMap<ContentId, Vec<&Segment>> = BTreeMap::new();
        for seg in &segments {
            by_content.entry(seg.content).or_default().push(seg);
        }

        let mut peers = HashMap::new();
        for (&content, members) in &by_content {
            if content == COORDINATOR_CONTENT {
                // Coordinator alone, or coordinator plus standby.
                if members.is_empty() || members.len() > 2 {
                    return Err(TopologyError::CoordinatorViolation {
                        content,
                        count: members.len(),
                    });
                }
                continue;
            }
            let primaries = members
                .iter()
                .filter(|s| s.role == SegmentRole::Primary)
                .count();
            let mirrors = members
                .iter()
                .filter(|s| s.role == SegmentRole::Mirror)
                .count();
            if primaries != 1 || mirrors != 1 {
                return Err(TopologyError::PairViolation {
                    content,
                    primaries,
                    mirrors,
                });
            }
            peers.insert(members[0].dbid, members[1].dbid);
            peers.insert(members[1].dbid, members[0].dbid);
        }

        Ok(Self {
            segments,
            by_dbid,
            peers,
        })
    }

    pub fn all_segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, dbid: Dbid) -> Option<&Segment> {
        self.by_dbid.get(&dbid).map(|&idx| &self.segments[idx])
    }

    /// The other member of this segment's pair. `None` for the coordinator
    /// pair and for dbids absent from the snapshot.
    pub fn peer_of(&self, dbid: Dbid) -> Option<&Segment> {
        self.peers.get(&dbid).and_then(|&peer| self.get(peer))
    }

    /// Down segments, coordinator pair excluded: the coordinator is never a
    /// recovery target of this planner.
    pub fn down_segments(&self) -> Vec<&Segment> {
        self.segments
            .iter()
            .filter(|s| s.is_segment_qe() && s.is_down())
            .collect()
    }

    /// All segments grouped by host, hosts in lexicographic order.
    pub fn segments_by_host(&self) -> BTreeMap<&str, Vec<&Segment>> {
        let mut by_host: BTreeMap<&str, Vec<&Segment>> = BTreeMap::new();
        for seg in &self.segments {
            by_host.entry(seg.host.as_str()).or_default().push(seg);
        }
        by_host
    }

    pub fn hosts(&self) -> BTreeSet<&str> {
        self.segments.iter().map(|s| s.host.as_str()).collect()
    }

    /// Swap the record registered under `dbid` for its post-recovery
    /// descriptor. Content and dbid are unchanged by recovery, so the pair
    /// index stays valid.
    pub(crate) fn replace_segment(&mut self, dbid: Dbid, replacement: Segment) {
        if let Some(&idx) = self.by_dbid.get(&dbid) {
            self.segments[idx] = replacement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{coordinator, pair, seg};

    #[test]
    fn test_accessors() {
        let topo = Topology::new(vec![
            coordinator(Dbid(1), "cdw"),
            seg(ContentId(0), Dbid(2), SegmentRole::Primary, "h1", 6000, SegmentStatus::Up),
            seg(ContentId(0), Dbid(3), SegmentRole::Mirror, "h2", 7000, SegmentStatus::Down),
        ])
        .unwrap();

        assert_eq!(topo.all_segments().len(), 3);
        assert_eq!(topo.get(Dbid(2)).unwrap().port, 6000);
        assert!(topo.get(Dbid(99)).is_none());
        assert_eq!(topo.hosts().len(), 3);
    }

    #[test]
    fn test_peer_of_is_symmetric() {
        let topo = Topology::new(pair(0, 1, 2)).unwrap();
        assert_eq!(topo.peer_of(Dbid(1)).unwrap().dbid, Dbid(2));
        assert_eq!(topo.peer_of(Dbid(2)).unwrap().dbid, Dbid(1));
    }

    #[test]
    fn test_coordinator_has_no_peer() {
        let topo = Topology::new(vec![coordinator(Dbid(1), "cdw")]).unwrap();
        assert!(topo.peer_of(Dbid(1)).is_none());
    }

    #[test]
    fn test_down_segments_excludes_coordinator() {
        let mut cdw = coordinator(Dbid(1), "cdw");
        cdw.status = SegmentStatus::Down;
        let topo = Topology::new(vec![
            cdw,
            seg(ContentId(0), Dbid(2), SegmentRole::Primary, "h1", 6000, SegmentStatus::Up),
            seg(ContentId(0), Dbid(3), SegmentRole::Mirror, "h2", 7000, SegmentStatus::Down),
        ])
        .unwrap();

        let down = topo.down_segments();
        assert_eq!(down.len(), 1);
        assert_eq!(down[0].dbid, Dbid(3));
    }

    #[test]
    fn test_segments_by_host_sorted() {
        let topo = Topology::new(vec![
            seg(ContentId(0), Dbid(1), SegmentRole::Primary, "zulu", 6000, SegmentStatus::Up),
            seg(ContentId(0), Dbid(2), SegmentRole::Mirror, "alpha", 7000, SegmentStatus::Up),
        ])
        .unwrap();
        let hosts: Vec<&str> = topo.segments_by_host().keys().copied().collect();
        assert_eq!(hosts, vec!["alpha", "zulu"]);
    }

    #[test]
    fn test_duplicate_dbid_rejected() {
        let mut segs = pair(0, 1, 2);
        segs[1].dbid = Dbid(1);
        match Topology::new(segs) {
            Err(TopologyError::DuplicateDbid(d)) => assert_eq!(d, Dbid(1)),
            other => panic!("expected DuplicateDbid, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_pair_violation_rejected() {
        let mut segs = pair(0, 1, 2);
        segs[1].role = SegmentRole::Primary;
        match Topology::new(segs) {
            Err(TopologyError::PairViolation {
                content,
                primaries,
                mirrors,
            }) => {
                assert_eq!(content, ContentId(0));
                assert_eq!(primaries, 2);
                assert_eq!(mirrors, 0);
            }
            other => panic!("expected PairViolation, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_three_coordinators_rejected() {
        let segs = vec![
            coordinator(Dbid(1), "cdw"),
            coordinator(Dbid(2), "scdw"),
            coordinator(Dbid(3), "scdw2"),
        ];
        match Topology::new(segs) {
            Err(TopologyError::CoordinatorViolation { count, .. }) => assert_eq!(count, 3),
            other => panic!("expected CoordinatorViolation, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_coordinator_standby_allowed() {
        let cdw = coordinator(Dbid(1), "cdw");
        let mut standby = coordinator(Dbid(2), "scdw");
        standby.role = SegmentRole::Mirror;
        standby.preferred_role = SegmentRole::Mirror;
        standby.port = 5433;
        assert!(Topology::new(vec![cdw, standby]).is_ok());
    }
}

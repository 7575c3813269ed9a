//! Segment fixtures shared by the planner unit tests.

use egret_common::types::{ContentId, Dbid, SegmentRole, SegmentStatus, COORDINATOR_CONTENT};

use crate::topology::Segment;

pub(crate) fn seg(
    content: ContentId,
    dbid: Dbid,
    role: SegmentRole,
    host: &str,
    port: u16,
    status: SegmentStatus,
) -> Segment {
    Segment {
        content,
        dbid,
        role,
        preferred_role: role,
        host: host.to_string(),
        address: format!("{host}-1"),
        port,
        data_directory: format!("/data/{role}{}", content.0),
        status,
        unreachable: false,
    }
}

pub(crate) fn coordinator(dbid: Dbid, host: &str) -> Segment {
    Segment {
        content: COORDINATOR_CONTENT,
        dbid,
        role: SegmentRole::Primary,
        preferred_role: SegmentRole::Primary,
        host: host.to_string(),
        address: format!("{host}-1"),
        port: 5432,
        data_directory: "/data/coordinator".to_string(),
        status: SegmentStatus::Up,
        unreachable: false,
    }
}

/// An up primary on `h1` paired with an up mirror on `h2`.
pub(crate) fn pair(content: i32, primary_dbid: i32, mirror_dbid: i32) -> Vec<Segment> {
    vec![
        seg(
            ContentId(content),
            Dbid(primary_dbid),
            SegmentRole::Primary,
            "h1",
            6000 + content as u16,
            SegmentStatus::Up,
        ),
        seg(
            ContentId(content),
            Dbid(mirror_dbid),
            SegmentRole::Mirror,
            "h2",
            7000 + content as u16,
            SegmentStatus::Up,
        ),
    ]
}

//! Pre-parsed recovery rows: the shape of one line of a recovery file,
//! batch validation of a row set, and matching rows back to topology
//! segments. Line reading and comment stripping happen upstream; rendering
//! a row back to its `address|port|data_directory` text lives here so a
//! post-plan snapshot can be written out as a fresh sample file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use egret_common::error::RecoveryError;

use crate::resolve::{FailoverTarget, RecoveryRequest};
use crate::topology::{Segment, Topology};

/// One `address|port|data_directory` group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowLocation {
    pub address: String,
    pub port: u16,
    pub data_directory: String,
}

impl RowLocation {
    /// The location of a registered segment, as it would appear in a row.
    pub fn describing(segment: &Segment) -> Self {
        Self {
            address: segment.address.clone(),
            port: segment.port,
            data_directory: segment.data_directory.clone(),
        }
    }

    pub fn group(&self) -> String {
        format!("{}|{}|{}", self.address, self.port, self.data_directory)
    }
}

/// One recovery-file line: a failed segment, and for full recovery a
/// destination group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRow {
    /// 1-based line number in the source file, kept for error reporting.
    pub line: u32,
    pub failed: RowLocation,
    pub destination: Option<RowLocation>,
}

impl RecoveryRow {
    pub fn to_line(&self) -> String {
        match &self.destination {
            Some(dest) => format!("{} {}", self.failed.group(), dest.group()),
            None => self.failed.group(),
        }
    }
}

/// Batch-validate a row set before any row is resolved.
///
/// Partial application is disallowed, so the whole set is checked up
/// front. The duplicate-failed scan covers all rows before the other two
/// checks run; within each check the first conflict in file order wins.
pub fn validate_rows(rows: &[RecoveryRow]) -> Result<(), RecoveryError> {
    let mut failed_at: HashMap<(&str, &str), u32> = HashMap::new();
    for row in rows {
        let key = (row.failed.address.as_str(), row.failed.data_directory.as_str());
        if let Some(&prev) = failed_at.get(&key) {
            return Err(RecoveryError::Validation(format!(
                "lines {} and {} both name failed segment {}",
                prev,
                row.line,
                row.failed.group()
            )));
        }
        failed_at.insert(key, row.line);
    }

    let mut dest_at: HashMap<(&str, &str), u32> = HashMap::new();
    for row in rows {
        let Some(dest) = &row.destination else {
            continue;
        };
        let key = (dest.address.as_str(), dest.data_directory.as_str());
        if let Some(&prev) = dest_at.get(&key) {
            return Err(RecoveryError::Validation(format!(
                "lines {} and {} both name destination {}",
                prev,
                row.line,
                dest.group()
            )));
        }
        dest_at.insert(key, row.line);
    }

    for row in rows {
        if row.destination.is_some() {
            continue;
        }
        let key = (row.failed.address.as_str(), row.failed.data_directory.as_str());
        if let Some(&dest_line) = dest_at.get(&key) {
            return Err(RecoveryError::Validation(format!(
                "line {}: segment {} is recovered in place but line {} uses it as a destination",
                row.line,
                row.failed.group(),
                dest_line
            )));
        }
    }

    Ok(())
}

/// Resolve each row's failed reference against the topology by exact match
/// on address, port, and data directory, and build recovery requests.
///
/// Destinations on hosts the topology already knows keep `is_new_host`
/// false; a caller introducing hosts alongside a row set flips the flag on
/// the returned requests itself.
pub fn rows_to_requests(
    topology: &Topology,
    rows: &[RecoveryRow],
) -> Result<Vec<RecoveryRequest>, RecoveryError> {
    let mut requests = Vec::with_capacity(rows.len());
    for row in rows {
        let failed = topology
            .all_segments()
            .iter()
            .find(|s| {
                s.address == row.failed.address
                    && s.port == row.failed.port
                    && s.data_directory == row.failed.data_directory
            })
            .ok_or_else(|| RecoveryError::SegmentNotFound {
                address: row.failed.address.clone(),
                port: row.failed.port,
                data_directory: row.failed.data_directory.clone(),
            })?;

        let failover = row.destination.as_ref().map(|dest| FailoverTarget {
            host: host_for_address(topology, &dest.address),
            address: dest.address.clone(),
            port: dest.port,
            data_directory: dest.data_directory.clone(),
        });

        requests.push(RecoveryRequest {
            failed: failed.clone(),
            failover,
            is_new_host: false,
        });
    }
    Ok(requests)
}

/// Hostname behind an address, when the cluster already has a segment
/// bound to it; otherwise the address doubles as the hostname.
fn host_for_address(topology: &Topology, address: &str) -> String {
    topology
        .all_segments()
        .iter()
        .find(|s| s.address == address)
        .map(|s| s.host.clone())
        .unwrap_or_else(|| address.to_string())
}

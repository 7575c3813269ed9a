use serde::{Deserialize, Serialize};

/// Recovery-planner configuration section in egret.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Exclusive upper bound of the port scan when assigning ports to
    /// relocated segments (default: 65535).
    #[serde(default = "default_port_scan_ceiling")]
    pub port_scan_ceiling: u16,
    /// Host reachability probe settings, forwarded to the prober.
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            port_scan_ceiling: default_port_scan_ceiling(),
            probe: ProbeConfig::default(),
        }
    }
}

fn default_port_scan_ceiling() -> u16 {
    65535
}

/// Host reachability probe configuration. The planner issues one batch
/// probe per spread-mode plan; these knobs belong to the external prober
/// and are carried here so one config section covers the whole flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Per-batch probe timeout in milliseconds (default: 5000).
    pub timeout_ms: u64,
    /// Maximum hosts probed concurrently within the batch (default: 16).
    pub parallelism: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            parallelism: 16,
        }
    }
}

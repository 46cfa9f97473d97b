//! Health reporting for the service boundary.
//!
//! The boundary layer exposes this as its health endpoint. A process that
//! lost its accelerator keeps serving on CPU and reports itself degraded.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::engine::{Device, DeviceState};

/// Overall health status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    /// Serving, but on the CPU after an accelerator failure.
    Degraded,
}

/// Health report returned to probes.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub ok: bool,
    pub state: HealthState,
    pub device: Device,
    pub accelerator_failed: bool,
    pub labels: usize,
    pub uptime_secs: u64,
}

/// Aggregates health information from the pipeline components.
pub struct HealthChecker {
    start_time: Instant,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Liveness: the process is responsive.
    pub fn is_alive(&self) -> bool {
        true
    }

    pub fn report(&self, device_state: &DeviceState, labels: usize) -> HealthReport {
        let accelerator_failed = device_state.accelerator_failed();
        let state = if accelerator_failed {
            HealthState::Degraded
        } else {
            HealthState::Healthy
        };

        HealthReport {
            ok: self.is_alive(),
            state,
            device: device_state.current(),
            accelerator_failed,
            labels,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new()
    }
}

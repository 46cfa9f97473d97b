//! Bounded retry with device degradation.
//!
//! An operation runs on the currently preferred device. If it fails on the
//! accelerator with an accelerator failure, the shared state is flipped and
//! the whole operation runs exactly once more on the CPU.

use tracing::debug;

use super::device::{Device, DeviceState};
use super::error::InferenceError;

/// Run `attempt` on the preferred device, falling back to CPU at most once.
///
/// `attempt` receives the device to use and must redo all of its work for
/// that device. Errors other than accelerator failures, and any error from
/// the CPU attempt, are returned unmodified.
pub fn run_with_fallback<T, F>(
    state: &DeviceState,
    operation: &str,
    mut attempt: F,
) -> Result<T, InferenceError>
where
    F: FnMut(Device) -> Result<T, InferenceError>,
{
    let device = state.current();
    match attempt(device) {
        Err(err) if device == Device::Accelerator && err.is_accelerator_failure() => {
            state.mark_accelerator_failed(operation, &err);
            debug!(operation, "retrying on cpu");
            attempt(Device::Cpu)
        }
        result => result,
    }
}

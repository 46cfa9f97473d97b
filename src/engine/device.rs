// Copyright 2024-2026 mailsift Contributors
// Licensed under the Apache License, Version 2.0

//! Execution device selection and one-way accelerator fallback.
//!
//! A single [`DeviceState`] is created at startup and shared (via `Arc`) by
//! the classifier and the summarizer. It starts as accelerator-preferred only
//! when an accelerator was detected, and can only ever degrade to CPU.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::error::InferenceError;
use crate::telemetry;

/// Compute target for an inference call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    /// GPU (CUDA or Metal) preferred while usable.
    Accelerator,
    /// General-purpose fallback.
    Cpu,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Device::Accelerator => write!(f, "accelerator"),
            Device::Cpu => write!(f, "cpu"),
        }
    }
}

/// Process-wide device preference.
///
/// `accelerator-preferred -> cpu-only` is the only transition. Flipping is
/// idempotent, so concurrent requests may race on it freely.
#[derive(Debug)]
pub struct DeviceState {
    accelerator_usable: AtomicBool,
    accelerator_detected: bool,
}

impl DeviceState {
    /// Create the state from the startup probe result.
    pub fn new(accelerator_detected: bool) -> Self {
        if accelerator_detected {
            info!(device = %Device::Accelerator, "accelerator detected, preferring it for inference");
        } else {
            info!(device = %Device::Cpu, "no accelerator detected, running cpu-only");
        }
        Self {
            accelerator_usable: AtomicBool::new(accelerator_detected),
            accelerator_detected,
        }
    }

    /// Permanently CPU-bound state.
    pub fn cpu_only() -> Self {
        Self::new(false)
    }

    /// Probe the host for an accelerator and build the state from it.
    pub fn detect() -> Self {
        Self::new(detect_accelerator())
    }

    /// Device the next inference call should run on.
    pub fn current(&self) -> Device {
        if self.accelerator_usable.load(Ordering::SeqCst) {
            Device::Accelerator
        } else {
            Device::Cpu
        }
    }

    pub fn is_cpu_only(&self) -> bool {
        self.current() == Device::Cpu
    }

    /// True if an accelerator was present at startup but has since failed.
    pub fn accelerator_failed(&self) -> bool {
        self.accelerator_detected && self.is_cpu_only()
    }

    /// Fail with an accelerator failure if `device` is the accelerator and it
    /// has been disabled since the attempt started.
    ///
    /// Checked before every model bind and inference call, so an attempt
    /// already under way stops using the accelerator as soon as any request
    /// flips the state.
    pub fn ensure_usable(&self, device: Device) -> Result<(), InferenceError> {
        if device == Device::Accelerator && self.is_cpu_only() {
            return Err(InferenceError::AcceleratorFailure(
                "accelerator disabled by an earlier failure".to_string(),
            ));
        }
        Ok(())
    }

    /// Mark the accelerator unusable for the rest of the process lifetime.
    ///
    /// Returns true only for the call that performed the transition.
    pub fn mark_accelerator_failed(&self, operation: &str, reason: &dyn fmt::Display) -> bool {
        let was_usable = self.accelerator_usable.swap(false, Ordering::SeqCst);
        if was_usable {
            warn!(
                from = %Device::Accelerator,
                to = %Device::Cpu,
                operation,
                reason = %reason,
                "accelerator marked unusable, falling back to cpu for the rest of the process"
            );
            telemetry::record_device_fallback(operation);
        }
        was_usable
    }
}

/// Probe for a usable accelerator.
///
/// Without the `cuda` or `metal` features this always reports none.
pub fn detect_accelerator() -> bool {
    #[cfg(feature = "cuda")]
    {
        if cuda_device_count() > 0 {
            return true;
        }
    }

    #[cfg(all(feature = "metal", target_os = "macos"))]
    {
        if metal::Device::system_default().is_some() {
            return true;
        }
    }

    false
}

#[cfg(feature = "cuda")]
fn cuda_device_count() -> usize {
    match cudarc::driver::CudaDevice::count() {
        Ok(count) => count.max(0) as usize,
        Err(e) => {
            debug!(error = %e, "CUDA driver unavailable");
            0
        }
    }
}

/// Device-scoped inference handles, built once per device and reused.
///
/// Loading holds the lock, so concurrent first calls bind the model once.
pub struct HandleCache<H: ?Sized> {
    slots: Mutex<HashMap<Device, Arc<H>>>,
}

impl<H: ?Sized> HandleCache<H> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the handle for `device`, binding it with `load` on first use.
    pub fn get_or_load<F>(&self, device: Device, load: F) -> Result<Arc<H>, InferenceError>
    where
        F: FnOnce(Device) -> Result<Arc<H>, InferenceError>,
    {
        let mut slots = self.slots.lock();
        if let Some(handle) = slots.get(&device) {
            return Ok(Arc::clone(handle));
        }
        debug!(%device, "binding inference handle");
        let handle = load(device)?;
        slots.insert(device, Arc::clone(&handle));
        Ok(handle)
    }

    /// Drop the handle bound to `device`, if any.
    pub fn evict(&self, device: Device) -> bool {
        self.slots.lock().remove(&device).is_some()
    }

    pub fn is_loaded(&self, device: Device) -> bool {
        self.slots.lock().contains_key(&device)
    }
}

impl<H: ?Sized> Default for HandleCache<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;

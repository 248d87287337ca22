//! Capture metrics recorded against the `metrics` facade
//!
//! Handles are noop-backed unless a recorder is installed by the embedding
//! process; the engine itself exposes no metrics endpoint.

use ::metrics::{Counter, Histogram};
use std::time::Duration;

pub struct CaptureMetrics {
    pub captures_completed: Counter,
    pub captures_failed: Counter,
    pub devices_skipped: Counter,
    pub capture_duration: Histogram,
}

impl CaptureMetrics {
    pub fn new() -> Self {
        Self {
            captures_completed: Counter::noop(),
            captures_failed: Counter::noop(),
            devices_skipped: Counter::noop(),
            capture_duration: Histogram::noop(),
        }
    }

    pub fn record_capture(&self, duration: Duration, success: bool) {
        if success {
            self.captures_completed.increment(1);
        } else {
            self.captures_failed.increment(1);
        }
        self.capture_duration.record(duration.as_secs_f64());
    }

    pub fn record_device_skipped(&self) {
        self.devices_skipped.increment(1);
    }
}

impl Default for CaptureMetrics {
    fn default() -> Self {
        Self::new()
    }
}

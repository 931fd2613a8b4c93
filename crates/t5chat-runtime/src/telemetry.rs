//! Telemetry hooks for generation performance measurement.
//!
//! Provides:
//! - [`GenerationMetrics`]: token counts, wall-clock time and throughput of one reply
//! - [`TelemetryHook`]: callback interface for reporting metrics
//! - [`GenerationTimer`]: records the start time and computes metrics
//! - [`TracingTelemetry`] / [`RecordingTelemetry`]: built-in hook implementations

use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::device::Device;

/// Aggregate metrics from a generation run.
#[derive(Debug, Clone)]
pub struct GenerationMetrics {
    /// Device the model was placed on.
    pub device: Device,
    /// Number of encoder input tokens (EOS included).
    pub prompt_tokens: usize,
    /// Number of decoder tokens generated (start token excluded).
    pub generated_tokens: usize,
    /// Total wall-clock time in milliseconds.
    pub total_time_ms: f64,
    /// Generated tokens per second.
    pub tokens_per_sec: f64,
}

/// Callback trait for generation telemetry.
pub trait TelemetryHook: Send + Sync {
    /// Called when a generation finishes successfully.
    fn on_generation_complete(&self, _metrics: &GenerationMetrics) {}
}

/// Reports each generation as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetryHook for TracingTelemetry {
    fn on_generation_complete(&self, metrics: &GenerationMetrics) {
        tracing::info!(
            device = %metrics.device,
            prompt_tokens = metrics.prompt_tokens,
            generated_tokens = metrics.generated_tokens,
            total_time_ms = format_args!("{:.1}", metrics.total_time_ms),
            tokens_per_sec = format_args!("{:.1}", metrics.tokens_per_sec),
            "generation complete"
        );
    }
}

/// Collects metrics into a retrievable report.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    reports: Arc<Mutex<Vec<GenerationMetrics>>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metrics of every completed generation, oldest first.
    pub fn reports(&self) -> Vec<GenerationMetrics> {
        self.reports
            .lock()
            .map(|reports| reports.clone())
            .unwrap_or_default()
    }
}

impl TelemetryHook for RecordingTelemetry {
    fn on_generation_complete(&self, metrics: &GenerationMetrics) {
        if let Ok(mut reports) = self.reports.lock() {
            reports.push(metrics.clone());
        }
    }
}

/// Times one generation run.
pub struct GenerationTimer {
    device: Device,
    prompt_tokens: usize,
    start: Instant,
}

impl GenerationTimer {
    /// Start timing a generation over `prompt_tokens` input tokens.
    pub fn start(device: Device, prompt_tokens: usize) -> Self {
        Self {
            device,
            prompt_tokens,
            start: Instant::now(),
        }
    }

    /// Compute metrics and report them to `hook`.
    pub fn finish(self, generated_tokens: usize, hook: &dyn TelemetryHook) -> GenerationMetrics {
        let total_time_ms = self.start.elapsed().as_secs_f64() * 1000.0;
        let tokens_per_sec = if total_time_ms > 0.0 && generated_tokens > 0 {
            generated_tokens as f64 / (total_time_ms / 1000.0)
        } else {
            0.0
        };

        let metrics = GenerationMetrics {
            device: self.device,
            prompt_tokens: self.prompt_tokens,
            generated_tokens,
            total_time_ms,
            tokens_per_sec,
        };

        hook.on_generation_complete(&metrics);
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_telemetry_captures_metrics() {
        let hook = RecordingTelemetry::new();
        assert!(hook.reports().is_empty());

        hook.on_generation_complete(&GenerationMetrics {
            device: Device::Cpu,
            prompt_tokens: 4,
            generated_tokens: 8,
            total_time_ms: 112.5,
            tokens_per_sec: 71.1,
        });

        let reports = hook.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].generated_tokens, 8);
    }

    #[test]
    fn timer_reports_to_hook() {
        let hook = RecordingTelemetry::new();
        let timer = GenerationTimer::start(Device::Cpu, 3);
        let metrics = timer.finish(5, &hook);

        assert_eq!(metrics.device, Device::Cpu);
        assert_eq!(metrics.prompt_tokens, 3);
        assert_eq!(metrics.generated_tokens, 5);
        assert!(metrics.total_time_ms >= 0.0);
        assert_eq!(hook.reports().len(), 1);
    }

    #[test]
    fn timer_without_tokens_has_zero_throughput() {
        let metrics = GenerationTimer::start(Device::Cpu, 1).finish(0, &TracingTelemetry);
        assert_eq!(metrics.tokens_per_sec, 0.0);
    }

    #[test]
    fn recording_clones_share_reports() {
        let hook = RecordingTelemetry::new();
        let clone = hook.clone();
        GenerationTimer::start(Device::Cpu, 2).finish(2, &clone);
        assert_eq!(hook.reports().len(), 1);
    }
}

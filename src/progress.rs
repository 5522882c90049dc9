//! Progress-callback trait for per-file job events.
//!
//! Pass a [`JobProgressCallback`] to
//! [`crate::session::ToolSession::submit_with_progress`] to receive events
//! as a batch job works through its inputs. Callbacks are the
//! least-invasive integration point: the host can forward events to its
//! event bus, a status bar, or a log without this crate knowing how the
//! host communicates.
//!
//! All methods have default no-op implementations, so callers override
//! only what they care about.

/// Called by the session as a job works through its input files.
///
/// Implementations must be `Send + Sync`. Within one job the calls arrive
/// in order — execution is single-flight and sequential — but two jobs
/// from different sessions may interleave.
pub trait JobProgressCallback: Send + Sync {
    /// Called once before the first converter invocation.
    ///
    /// `total_units` is the number of converter invocations the job will
    /// make: one per input file for batch-capable kinds, one overall for
    /// single-invocation kinds.
    fn on_job_start(&self, total_units: usize) {
        let _ = total_units;
    }

    /// Called just before the converter is invoked for a unit.
    fn on_unit_start(&self, unit: usize, total_units: usize) {
        let _ = (unit, total_units);
    }

    /// Called when a unit finishes successfully.
    ///
    /// `output_count` is the number of files that unit produced.
    fn on_unit_complete(&self, unit: usize, total_units: usize, output_count: usize) {
        let _ = (unit, total_units, output_count);
    }

    /// Called when a unit fails.
    fn on_unit_error(&self, unit: usize, total_units: usize, error: String) {
        let _ = (unit, total_units, error);
    }

    /// Called once after every unit has been attempted.
    fn on_job_complete(&self, total_units: usize, succeeded: usize) {
        let _ = (total_units, succeeded);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopJobProgress;

impl JobProgressCallback for NoopJobProgress {}

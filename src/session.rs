//! Per-tool orchestration: queue, probes, single-flight execution.
//!
//! A [`ToolSession`] is what a tool page in the application holds: the file
//! queue for that tool, plus the machinery to turn queue-and-options into a
//! finished report. It owns the two rules that keep the event-driven world
//! sane:
//!
//! * **Single-flight.** At most one conversion runs per session. A submit
//!   while one is in flight is rejected with
//!   [`ValidationError::JobInFlight`] before anything external happens —
//!   two converter processes must never write into the same output folder
//!   at once. The guard is RAII, so a panicked or cancelled job releases it.
//!
//! * **Probe identity.** Metadata probes complete out of order relative to
//!   user edits. Completions are routed by [`ProbeToken`], never by index,
//!   so a probe for a file the user already removed is discarded.
//!
//! Batch-capable kinds (image export, SVG export, archive extraction)
//! invoke the converter once per input file and fold the outcomes through
//! [`crate::report::aggregate`]; the remaining kinds are a single
//! invocation normalized through [`crate::report::normalize`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{info, warn};

use crate::backend::{Converter, PdfInfo};
use crate::config::AppConfig;
use crate::error::{ConversionError, ProbeError, ValidationError};
use crate::job::{JobBuilder, JobDescriptor, JobOptions, ToolOptions};
use crate::progress::{JobProgressCallback, NoopJobProgress};
use crate::queue::{DroppedFile, FileQueue, ProbeDisposition, ProbeToken, ToolKind};
use crate::report::{self, ConvertResult, FileOutcome};

type UnitFuture<'a> = Pin<Box<dyn Future<Output = Result<ConvertResult, ConversionError>> + Send + 'a>>;

/// One tool's working state: its queue and its in-flight flag.
pub struct ToolSession {
    queue: FileQueue,
    in_flight: AtomicBool,
}

impl ToolSession {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            queue: FileQueue::new(kind),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn queue(&self) -> &FileQueue {
        &self.queue
    }

    /// Accept dropped files into the queue; returns probe tokens for the
    /// accepted items (see [`Self::probe_file`]).
    pub fn add_files(
        &mut self,
        files: impl IntoIterator<Item = DroppedFile>,
    ) -> Vec<ProbeToken> {
        self.queue.add(files)
    }

    /// Remove by position; out-of-range is a no-op.
    pub fn remove_file(&mut self, index: usize) -> bool {
        self.queue.remove_at(index)
    }

    pub fn clear_files(&mut self) {
        self.queue.clear();
    }

    /// Switch this session to another tool, clearing the queue.
    pub fn switch_tool(&mut self, kind: ToolKind) {
        self.queue.switch_kind(kind);
    }

    /// Route an asynchronous probe completion to the queue by token.
    ///
    /// Stale completions (item removed, queue cleared) are discarded; a
    /// probe failure keeps the fallback page count.
    pub fn complete_probe(
        &mut self,
        token: ProbeToken,
        result: Result<PdfInfo, ProbeError>,
    ) -> ProbeDisposition {
        self.queue
            .complete_probe(token, result.map(|info| info.page_count))
    }

    /// Convenience: probe one queued file and apply the result in place.
    ///
    /// The interesting races live in [`Self::complete_probe`]; this helper
    /// is for embedders that probe sequentially right after a drop.
    pub async fn probe_file(
        &mut self,
        converter: &dyn Converter,
        token: ProbeToken,
    ) -> ProbeDisposition {
        let Some(path) = self.queue.path_for(token).map(Path::to_path_buf) else {
            return ProbeDisposition::Discarded;
        };
        let result = converter.get_pdf_info(&path).await;
        self.complete_probe(token, result)
    }

    /// Build and run a job from the current queue. See
    /// [`Self::submit_with_progress`].
    pub async fn submit(
        &self,
        options: ToolOptions,
        config: &AppConfig,
        converter: &dyn Converter,
    ) -> Result<ConvertResult, ValidationError> {
        self.submit_with_progress(options, config, converter, &NoopJobProgress)
            .await
    }

    /// Build and run a job from the current queue, with per-file progress
    /// events.
    ///
    /// Returns `Err` only for caller-fixable conditions found before the
    /// converter is touched ([`ValidationError`], including
    /// [`ValidationError::JobInFlight`]). Converter failures come back as
    /// an `Ok` report with `success == false` and the backend's message
    /// verbatim.
    pub async fn submit_with_progress(
        &self,
        options: ToolOptions,
        config: &AppConfig,
        converter: &dyn Converter,
        progress: &dyn JobProgressCallback,
    ) -> Result<ConvertResult, ValidationError> {
        let _guard = self.acquire_flight()?;
        let descriptor = JobBuilder::build(&self.queue, options, config)?;
        Ok(dispatch(&descriptor, converter, progress).await)
    }

    /// Run an already-built descriptor under this session's single-flight
    /// guard.
    pub async fn run(
        &self,
        descriptor: &JobDescriptor,
        converter: &dyn Converter,
        progress: &dyn JobProgressCallback,
    ) -> Result<ConvertResult, ValidationError> {
        if descriptor.inputs.is_empty() {
            return Err(ValidationError::NoInput);
        }
        let _guard = self.acquire_flight()?;
        Ok(dispatch(descriptor, converter, progress).await)
    }

    /// Whether a job is currently running in this session.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Reveal a finished job's folder in the OS file manager. Best-effort:
    /// a failure is logged and swallowed.
    pub async fn reveal_output(&self, converter: &dyn Converter, folder: &Path) {
        if let Err(err) = converter.open_folder(folder).await {
            warn!(%err, folder = %folder.display(), "could not open output folder");
        }
    }

    fn acquire_flight(&self) -> Result<FlightGuard<'_>, ValidationError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| FlightGuard {
                flag: &self.in_flight,
            })
            .map_err(|_| ValidationError::JobInFlight)
    }
}

/// RAII release of the in-flight flag.
struct FlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Invoke the converter for a descriptor and fold the outcome(s) into one
/// report. Infallible by design: backend trouble becomes a failure report,
/// not an error.
async fn dispatch<'a>(
    descriptor: &'a JobDescriptor,
    converter: &'a dyn Converter,
    progress: &dyn JobProgressCallback,
) -> ConvertResult {
    let folder = descriptor.output_folder.as_path();
    info!(
        kind = ?descriptor.kind(),
        inputs = descriptor.inputs.len(),
        folder = %folder.display(),
        "dispatching job"
    );

    match &descriptor.options {
        JobOptions::PdfToImage(opts) => {
            fold_batch(descriptor, progress, move |path| {
                Box::pin(converter.convert_pdf_to_images(std::slice::from_ref(path), opts, folder))
            })
            .await
        }
        JobOptions::PdfToSvg { pages } => {
            fold_batch(descriptor, progress, move |path| {
                Box::pin(converter.convert_pdf_to_svg(
                    std::slice::from_ref(path),
                    pages.as_ref(),
                    folder,
                ))
            })
            .await
        }
        JobOptions::ArchiveExtract { password } => {
            fold_batch(descriptor, progress, move |path| {
                Box::pin(converter.extract_archive(path, password.as_deref(), folder))
            })
            .await
        }
        JobOptions::PdfMerge { output_name } => {
            run_single(
                folder,
                progress,
                converter.merge_pdfs(&descriptor.inputs, output_name, folder),
            )
            .await
        }
        JobOptions::PdfSplit { split_points } => match descriptor.inputs.first() {
            Some(input) => {
                run_single(
                    folder,
                    progress,
                    converter.split_pdf(input, split_points, folder),
                )
                .await
            }
            None => ConvertResult::failure(folder, "no input file"),
        },
        JobOptions::PdfExtract { pages, output_name } => match descriptor.inputs.first() {
            Some(input) => {
                run_single(
                    folder,
                    progress,
                    converter.extract_pdf_pages(input, pages, output_name, folder),
                )
                .await
            }
            None => ConvertResult::failure(folder, "no input file"),
        },
        JobOptions::ArchiveCompress(opts) => {
            run_single(
                folder,
                progress,
                converter.create_archive(&descriptor.inputs, opts, folder),
            )
            .await
        }
        JobOptions::VideoToGif(opts) => match descriptor.inputs.first() {
            Some(input) => {
                run_single(
                    folder,
                    progress,
                    converter.convert_video_to_gif(input, opts, folder),
                )
                .await
            }
            None => ConvertResult::failure(folder, "no input file"),
        },
    }
}

/// One converter invocation per input file, folded into one report.
async fn fold_batch<'a, F>(
    descriptor: &'a JobDescriptor,
    progress: &dyn JobProgressCallback,
    invoke: F,
) -> ConvertResult
where
    F: Fn(&'a PathBuf) -> UnitFuture<'a>,
{
    let total = descriptor.inputs.len();
    progress.on_job_start(total);

    let mut outcomes: Vec<FileOutcome> = Vec::with_capacity(total);
    for (i, path) in descriptor.inputs.iter().enumerate() {
        let unit = i + 1;
        progress.on_unit_start(unit, total);
        let outcome = invoke(path).await;
        match &outcome {
            Ok(r) if r.success && !r.output_files.is_empty() => {
                progress.on_unit_complete(unit, total, r.output_files.len());
            }
            Ok(r) => progress.on_unit_error(unit, total, r.message.clone()),
            Err(e) => progress.on_unit_error(unit, total, e.to_string()),
        }
        outcomes.push(FileOutcome {
            input: path.clone(),
            outcome,
        });
    }

    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(&o.outcome, Ok(r) if r.success && !r.output_files.is_empty()))
        .count();
    let report = report::aggregate(&descriptor.output_folder, &outcomes);
    progress.on_job_complete(total, succeeded);
    report
}

/// A single converter invocation, normalized into a report.
async fn run_single(
    folder: &Path,
    progress: &dyn JobProgressCallback,
    invocation: impl Future<Output = Result<ConvertResult, ConversionError>>,
) -> ConvertResult {
    progress.on_job_start(1);
    progress.on_unit_start(1, 1);
    let result = match invocation.await {
        Ok(r) => report::normalize(r),
        Err(e) => ConvertResult::failure(folder, e.to_string()),
    };
    if result.success {
        progress.on_unit_complete(1, 1, result.output_files.len());
        progress.on_job_complete(1, 1);
    } else {
        progress.on_unit_error(1, 1, result.message.clone());
        progress.on_job_complete(1, 0);
    }
    result
}

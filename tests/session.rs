//! End-to-end tests for the job layer: queue → builder → session →
//! converter → report, against a recording mock converter.
//!
//! Everything here runs offline; the mock stands in for the native
//! backend, records every invocation, and can be told to fail specific
//! inputs or to block until released (for the single-flight tests).

use async_trait::async_trait;
use mediaforge::{
    AppConfig, ArchiveOptions, ConversionError, Converter, ConvertResult, DroppedFile,
    GifOptions, ImageExportOptions, ImageFormat, JobBuilder, PageMode, PageSelection, PdfInfo,
    ProbeDisposition, ProbeError, ToolKind, ToolOptions, ToolSession, ValidationError,
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn plain_config() -> AppConfig {
    AppConfig {
        export_folder: "/exports".into(),
        auto_create_date_folders: false,
        ..AppConfig::default()
    }
}

fn pdf_session(names: &[&str]) -> ToolSession {
    let mut session = ToolSession::new(ToolKind::PdfConvert);
    session.add_files(
        names
            .iter()
            .map(|n| DroppedFile::new(format!("/in/{n}"), 1024)),
    );
    session
}

fn image_options() -> ToolOptions {
    ToolOptions::PdfToImage {
        format: ImageFormat::Png,
        dpi: 150,
        pages: PageMode::All,
    }
}

/// Recording mock backend. Produces one output per input, named after the
/// input; fails any input whose path was registered with [`Self::fail`].
#[derive(Default)]
struct MockConverter {
    calls: Mutex<Vec<String>>,
    failing: HashSet<PathBuf>,
}

impl MockConverter {
    fn new() -> Self {
        Self::default()
    }

    fn fail(mut self, path: &str) -> Self {
        self.failing.insert(PathBuf::from(path));
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, path: &Path) {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{op} {}", path.display()));
    }

    fn result_for(&self, op: &str, path: &Path, folder: &Path) -> Result<ConvertResult, ConversionError> {
        self.record(op, path);
        if self.failing.contains(path) {
            return Err(ConversionError::Backend {
                message: format!("backend could not process {}", path.display()),
            });
        }
        let stem = path.file_stem().unwrap().to_string_lossy();
        Ok(ConvertResult {
            success: true,
            output_files: vec![folder.join(format!("{stem}_out"))],
            output_folder: folder.to_path_buf(),
            message: "done".into(),
        })
    }
}

#[async_trait]
impl Converter for MockConverter {
    async fn get_pdf_info(&self, path: &Path) -> Result<PdfInfo, ProbeError> {
        self.record("probe", path);
        if self.failing.contains(path) {
            return Err(ProbeError::Unreadable {
                path: path.to_path_buf(),
                detail: "mock probe failure".into(),
            });
        }
        Ok(PdfInfo {
            path: path.to_path_buf(),
            page_count: 12,
            file_size: 4096,
        })
    }

    async fn convert_pdf_to_images(
        &self,
        paths: &[PathBuf],
        _options: &ImageExportOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.result_for("to_images", &paths[0], output_folder)
    }

    async fn convert_pdf_to_svg(
        &self,
        paths: &[PathBuf],
        _pages: Option<&PageSelection>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.result_for("to_svg", &paths[0], output_folder)
    }

    async fn merge_pdfs(
        &self,
        paths: &[PathBuf],
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        for path in paths {
            self.record("merge", path);
        }
        Ok(ConvertResult {
            success: true,
            output_files: vec![output_folder.join(format!("{output_name}.pdf"))],
            output_folder: output_folder.to_path_buf(),
            message: format!("merged {} files", paths.len()),
        })
    }

    async fn split_pdf(
        &self,
        path: &Path,
        split_points: &PageSelection,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.record("split", path);
        let parts = split_points.len() + 1;
        Ok(ConvertResult {
            success: true,
            output_files: (1..=parts)
                .map(|i| output_folder.join(format!("part{i}.pdf")))
                .collect(),
            output_folder: output_folder.to_path_buf(),
            message: format!("split into {parts} parts"),
        })
    }

    async fn extract_pdf_pages(
        &self,
        path: &Path,
        _pages: &PageSelection,
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.record("extract_pages", path);
        Ok(ConvertResult {
            success: true,
            output_files: vec![output_folder.join(format!("{output_name}.pdf"))],
            output_folder: output_folder.to_path_buf(),
            message: "extracted".into(),
        })
    }

    async fn create_archive(
        &self,
        paths: &[PathBuf],
        options: &ArchiveOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        for path in paths {
            self.record("compress", path);
        }
        Ok(ConvertResult {
            success: true,
            output_files: vec![output_folder.join(format!(
                "{}.{}",
                options.output_name, options.format
            ))],
            output_folder: output_folder.to_path_buf(),
            message: "archived".into(),
        })
    }

    async fn extract_archive(
        &self,
        path: &Path,
        _password: Option<&str>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.result_for("extract_archive", path, output_folder)
    }

    async fn convert_video_to_gif(
        &self,
        path: &Path,
        options: &GifOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.record("to_gif", path);
        Ok(ConvertResult {
            success: true,
            output_files: vec![output_folder.join(format!("{}.gif", options.output_name))],
            output_folder: output_folder.to_path_buf(),
            message: "exported".into(),
        })
    }

    async fn open_folder(&self, path: &Path) -> Result<(), ConversionError> {
        self.record("open_folder", path);
        Err(ConversionError::Unavailable {
            detail: "no file manager in tests".into(),
        })
    }
}

// ── Validation happens before any backend call ──────────────────────────────

#[tokio::test]
async fn empty_queue_fails_without_touching_the_converter() {
    let session = ToolSession::new(ToolKind::PdfConvert);
    let converter = MockConverter::new();

    let err = session
        .submit(image_options(), &plain_config(), &converter)
        .await
        .unwrap_err();

    assert_eq!(err, ValidationError::NoInput);
    assert!(converter.calls().is_empty(), "converter must not be called");
}

#[tokio::test]
async fn dead_page_selector_fails_without_touching_the_converter() {
    let session = pdf_session(&["a.pdf"]);
    let converter = MockConverter::new();

    let err = session
        .submit(
            ToolOptions::PdfToImage {
                format: ImageFormat::Jpg,
                dpi: 300,
                pages: PageMode::Select("totally bogus".into()),
            },
            &plain_config(),
            &converter,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ValidationError::EmptyPageSelection { .. }));
    assert!(converter.calls().is_empty());
}

// ── Batch dispatch and aggregation ──────────────────────────────────────────

#[tokio::test]
async fn batch_image_export_invokes_per_file_in_queue_order() {
    let session = pdf_session(&["a.pdf", "b.pdf", "c.pdf"]);
    let converter = MockConverter::new();

    let report = session
        .submit(image_options(), &plain_config(), &converter)
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(
        converter.calls(),
        vec![
            "to_images /in/a.pdf",
            "to_images /in/b.pdf",
            "to_images /in/c.pdf"
        ]
    );
    let outputs: Vec<String> = report
        .output_files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(outputs, ["a_out", "b_out", "c_out"]);
    assert_eq!(report.output_folder, PathBuf::from("/exports/MediaForge/PDF_Images"));
}

#[tokio::test]
async fn partial_batch_failure_is_reported_not_swallowed() {
    let session = pdf_session(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
    let converter = MockConverter::new().fail("/in/c.pdf");

    let report = session
        .submit(image_options(), &plain_config(), &converter)
        .await
        .unwrap();

    assert!(report.success, "three files still converted");
    assert_eq!(report.output_files.len(), 3);
    assert!(report.message.contains("1 failed"), "got: {}", report.message);
    assert!(
        report.message.contains("/in/c.pdf"),
        "first error should be carried verbatim, got: {}",
        report.message
    );
}

#[tokio::test]
async fn total_batch_failure_surfaces_the_backend_message() {
    let session = pdf_session(&["a.pdf"]);
    let converter = MockConverter::new().fail("/in/a.pdf");

    let report = session
        .submit(image_options(), &plain_config(), &converter)
        .await
        .unwrap();

    assert!(!report.success);
    assert!(report.output_files.is_empty());
    assert!(report.message.contains("backend could not process /in/a.pdf"));
}

// ── Single-invocation kinds ─────────────────────────────────────────────────

#[tokio::test]
async fn merge_dispatches_once_with_every_input() {
    let mut session = ToolSession::new(ToolKind::PdfOperations);
    session.add_files([
        DroppedFile::new("/in/a.pdf", 10),
        DroppedFile::new("/in/b.pdf", 20),
    ]);
    let converter = MockConverter::new();

    let report = session
        .submit(
            ToolOptions::PdfMerge {
                output_name: "bundle".into(),
            },
            &plain_config(),
            &converter,
        )
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(converter.calls(), vec!["merge /in/a.pdf", "merge /in/b.pdf"]);
    assert_eq!(
        report.output_files,
        vec![PathBuf::from("/exports/MediaForge/PDF_Operations/bundle.pdf")]
    );
}

#[tokio::test]
async fn gif_export_uses_only_the_first_queued_video() {
    let mut session = ToolSession::new(ToolKind::VideoToGif);
    session.add_files([
        DroppedFile::new("/in/clip.mp4", 10),
        DroppedFile::new("/in/other.mov", 20),
    ]);
    let converter = MockConverter::new();

    let report = session
        .submit(
            ToolOptions::VideoToGif(GifOptions {
                start_time: 0.0,
                end_time: 10.0,
                width: 480,
                height: 270,
                fps: 15,
                quality: 3,
                output_name: "clip".into(),
            }),
            &plain_config(),
            &converter,
        )
        .await
        .unwrap();

    assert!(report.success);
    assert_eq!(converter.calls(), vec!["to_gif /in/clip.mp4"]);
    assert_eq!(report.output_folder, PathBuf::from("/exports/MediaForge/GIF"));
}

// ── Probe races ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn probe_backfills_page_counts() {
    let mut session = ToolSession::new(ToolKind::PdfConvert);
    let tokens = session.add_files([DroppedFile::new("/in/a.pdf", 10)]);
    let converter = MockConverter::new();

    let disposition = session.probe_file(&converter, tokens[0]).await;
    assert_eq!(disposition, ProbeDisposition::Applied);
    assert_eq!(session.queue().list()[0].page_count, 12);
    assert_eq!(session.queue().total_pages(), 12);
}

#[tokio::test]
async fn probe_for_a_removed_file_is_discarded() {
    let mut session = ToolSession::new(ToolKind::PdfConvert);
    let tokens = session.add_files([
        DroppedFile::new("/in/a.pdf", 10),
        DroppedFile::new("/in/b.pdf", 20),
    ]);
    session.remove_file(0);

    let stale = session.complete_probe(
        tokens[0],
        Ok(PdfInfo {
            path: "/in/a.pdf".into(),
            page_count: 99,
            file_size: 1,
        }),
    );
    assert_eq!(stale, ProbeDisposition::Discarded);
    // The surviving item is untouched by the stale completion.
    assert_eq!(session.queue().list()[0].name, "b.pdf");
    assert_eq!(session.queue().list()[0].page_count, 1);
}

#[tokio::test]
async fn failed_probe_keeps_the_fallback_and_the_session_usable() {
    let mut session = ToolSession::new(ToolKind::PdfConvert);
    let tokens = session.add_files([DroppedFile::new("/in/bad.pdf", 10)]);
    let converter = MockConverter::new().fail("/in/bad.pdf");

    let disposition = session.probe_file(&converter, tokens[0]).await;
    assert_eq!(disposition, ProbeDisposition::Applied);
    assert_eq!(session.queue().list()[0].page_count, 1);

    // The failed probe must not block conversion.
    let report = session
        .submit(image_options(), &plain_config(), &converter)
        .await
        .unwrap();
    assert!(!report.success, "this mock also fails conversion for bad.pdf");
}

// ── Single-flight ───────────────────────────────────────────────────────────

/// A converter that blocks inside its first conversion until released.
struct GatedConverter {
    inner: MockConverter,
    entered: AtomicBool,
    release: Notify,
}

impl GatedConverter {
    fn new() -> Self {
        Self {
            inner: MockConverter::new(),
            entered: AtomicBool::new(false),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl Converter for GatedConverter {
    async fn get_pdf_info(&self, path: &Path) -> Result<PdfInfo, ProbeError> {
        self.inner.get_pdf_info(path).await
    }

    async fn convert_pdf_to_images(
        &self,
        paths: &[PathBuf],
        options: &ImageExportOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.entered.store(true, Ordering::SeqCst);
        self.release.notified().await;
        self.inner
            .convert_pdf_to_images(paths, options, output_folder)
            .await
    }

    async fn convert_pdf_to_svg(
        &self,
        paths: &[PathBuf],
        pages: Option<&PageSelection>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner.convert_pdf_to_svg(paths, pages, output_folder).await
    }

    async fn merge_pdfs(
        &self,
        paths: &[PathBuf],
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner.merge_pdfs(paths, output_name, output_folder).await
    }

    async fn split_pdf(
        &self,
        path: &Path,
        split_points: &PageSelection,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner.split_pdf(path, split_points, output_folder).await
    }

    async fn extract_pdf_pages(
        &self,
        path: &Path,
        pages: &PageSelection,
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner
            .extract_pdf_pages(path, pages, output_name, output_folder)
            .await
    }

    async fn create_archive(
        &self,
        paths: &[PathBuf],
        options: &ArchiveOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner.create_archive(paths, options, output_folder).await
    }

    async fn extract_archive(
        &self,
        path: &Path,
        password: Option<&str>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner.extract_archive(path, password, output_folder).await
    }

    async fn convert_video_to_gif(
        &self,
        path: &Path,
        options: &GifOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError> {
        self.inner
            .convert_video_to_gif(path, options, output_folder)
            .await
    }

    async fn open_folder(&self, path: &Path) -> Result<(), ConversionError> {
        self.inner.open_folder(path).await
    }
}

#[tokio::test]
async fn second_submit_while_in_flight_is_rejected() {
    let session = Arc::new(pdf_session(&["a.pdf"]));
    let converter = Arc::new(GatedConverter::new());
    let config = plain_config();

    let first = {
        let session = Arc::clone(&session);
        let converter = Arc::clone(&converter);
        let config = config.clone();
        tokio::spawn(async move {
            session
                .submit(image_options(), &config, converter.as_ref())
                .await
        })
    };

    // Wait until the first job is actually inside the converter.
    while !converter.entered.load(Ordering::SeqCst) {
        tokio::task::yield_now().await;
    }
    assert!(session.is_busy());

    let second = session
        .submit(image_options(), &config, converter.as_ref())
        .await;
    assert_eq!(second.unwrap_err(), ValidationError::JobInFlight);

    // Release the gate; the first job completes and the flag clears.
    converter.release.notify_one();
    let report = first.await.unwrap().unwrap();
    assert!(report.success);
    assert!(!session.is_busy());

    // A fresh submit is accepted again.
    converter.release.notify_one();
    let again = session
        .submit(image_options(), &config, converter.as_ref())
        .await
        .unwrap();
    assert!(again.success);
}

// ── Descriptor round-trip through the session ───────────────────────────────

#[tokio::test]
async fn prebuilt_descriptor_runs_under_the_same_guard() {
    let session = pdf_session(&["a.pdf"]);
    let converter = MockConverter::new();

    let descriptor = JobBuilder::build(session.queue(), image_options(), &plain_config()).unwrap();
    // Descriptors survive a serialization boundary unchanged.
    let wire = serde_json::to_string(&descriptor).unwrap();
    let descriptor: mediaforge::JobDescriptor = serde_json::from_str(&wire).unwrap();

    let report = session
        .run(&descriptor, &converter, &mediaforge::NoopJobProgress)
        .await
        .unwrap();
    assert!(report.success);
}

//! # mediaforge
//!
//! The job-specification core of the MediaForge desktop file-conversion
//! app: PDF rasterization, PDF page operations, archive packing and
//! unpacking, and video-to-GIF export.
//!
//! ## Why this crate?
//!
//! The actual media work happens in an opaque native converter; the UI is
//! a thin shell. Everything with real invariants lives in between: turning
//! half-typed page selectors, dropped files, sliders, and persisted
//! settings into a job the converter can execute without asking questions
//! — and turning whatever the converter reports back into one honest
//! result. That middle layer is this crate, and it depends on neither the
//! converter nor the UI.
//!
//! ## Flow Overview
//!
//! ```text
//! dropped files ─▶ FileQueue ──┐
//! page selector ─▶ parse ──────┤
//! sliders/toggles ─────────────┼─▶ JobBuilder ─▶ JobDescriptor
//! ConfigStore (defaults) ──────┘                     │
//!                                                    ▼
//!                               ToolSession ─▶ Converter (external)
//!                                                    │
//!                               ConvertResult ◀─ aggregate/normalize
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use mediaforge::{
//!     AppConfig, DroppedFile, ImageFormat, JobBuilder, PageMode, ToolKind,
//!     ToolOptions,
//! };
//! use mediaforge::queue::FileQueue;
//!
//! let mut queue = FileQueue::new(ToolKind::PdfConvert);
//! queue.add([
//!     DroppedFile::new("report.pdf", 48_213),
//!     DroppedFile::new("notes.txt", 901), // silently rejected: not a PDF
//! ]);
//!
//! let job = JobBuilder::build(
//!     &queue,
//!     ToolOptions::PdfToImage {
//!         format: ImageFormat::Png,
//!         dpi: 300,
//!         pages: PageMode::Select("1-3, 5".into()),
//!     },
//!     &AppConfig::default(),
//! )
//! .expect("valid job");
//!
//! assert_eq!(job.inputs.len(), 1);
//! println!("{}", serde_json::to_string_pretty(&job).unwrap());
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mediaforge` preview binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when embedding only the library:
//! ```toml
//! mediaforge = { version = "0.4", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod estimate;
pub mod job;
pub mod pages;
pub mod progress;
pub mod queue;
pub mod report;
pub mod session;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{Converter, PdfInfo};
pub use config::{AppConfig, Theme, CATEGORY_FOLDERS, RECOGNIZED_DPI};
pub use error::{ConversionError, PersistError, ProbeError, ValidationError};
pub use estimate::{estimate, GifEstimate, BYTES_PER_PIXEL_FRAME};
pub use job::{
    ArchiveFormat, ArchiveOptions, GifOptions, ImageExportOptions, ImageFormat, JobBuilder,
    JobDescriptor, JobKind, JobOptions, PageMode, ToolOptions,
};
pub use pages::{parse as parse_pages, MalformedSegmentPolicy, PageSelection};
pub use progress::{JobProgressCallback, NoopJobProgress};
pub use queue::{DroppedFile, FileItem, FileQueue, ProbeDisposition, ProbeToken, ToolKind};
pub use report::{aggregate, normalize, ConvertResult, FileOutcome};
pub use session::ToolSession;
pub use store::{ConfigPersistence, ConfigStore, JsonConfigFile, SaveFailurePolicy};

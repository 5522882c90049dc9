//! Job descriptors and the builder that produces them.
//!
//! [`JobBuilder::build`] is the funnel every conversion goes through: it
//! takes the current [`FileQueue`], the per-tool options as the UI holds
//! them ([`ToolOptions`]), and the loaded [`AppConfig`], and produces a
//! [`JobDescriptor`] — or a [`ValidationError`] before anything external
//! is touched.
//!
//! A descriptor is deliberately boring: every default has been resolved,
//! every numeric option is in range, the output folder is a concrete path.
//! Executing one requires no further lookups, so it can be handed across a
//! thread or process boundary as a plain value (it serializes).
//!
//! # Clamping, not rejecting
//! Sliders and pickers cannot produce out-of-range numbers, so a value
//! outside its range means a non-UI caller — scripts, tests, a future
//! remote API. Those are clamped to the nearest recognized value rather
//! than rejected; the clamp is logged at debug level.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AppConfig, RECOGNIZED_DPI};
use crate::error::ValidationError;
use crate::pages::{self, PageSelection};
use crate::queue::FileQueue;

/// Quality slider range for GIF export.
pub const QUALITY_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

/// Frame-rate slider range for GIF export.
pub const FPS_RANGE: std::ops::RangeInclusive<u32> = 5..=30;

/// Raster output formats for PDF page export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpg,
    Png,
    Webp,
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
            ImageFormat::Webp => "webp",
        })
    }
}

/// Archive container formats for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArchiveFormat {
    #[serde(rename = "zip")]
    Zip,
    #[serde(rename = "7z")]
    SevenZ,
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::SevenZ => "7z",
        })
    }
}

/// Resolved options for PDF → image export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageExportOptions {
    pub format: ImageFormat,
    pub dpi: u32,
    /// `None` means every page of every input.
    pub pages: Option<PageSelection>,
}

/// Resolved options for archive creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveOptions {
    pub format: ArchiveFormat,
    pub password: Option<String>,
    pub output_name: String,
}

/// Resolved options for video → GIF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GifOptions {
    pub start_time: f64,
    pub end_time: f64,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub quality: u32,
    pub output_name: String,
}

/// The page-selection field as the UI holds it.
///
/// Distinguishes "the user never asked for specific pages" from "the user
/// typed a selector": the first is all pages, the second must match at
/// least one page or the job is invalid. A selector left blank counts as
/// not asking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageMode {
    /// Convert every page.
    All,
    /// Convert only the pages the typed selector matches.
    Select(String),
}

/// Per-tool options as collected from the UI, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOptions {
    PdfToImage {
        format: ImageFormat,
        dpi: u32,
        pages: PageMode,
    },
    PdfToSvg {
        pages: PageMode,
    },
    PdfMerge {
        output_name: String,
    },
    PdfSplit {
        /// Selector string naming the pages to split after.
        split_points: String,
    },
    PdfExtract {
        /// Selector string naming the pages to pull out.
        pages: String,
        output_name: String,
    },
    ArchiveCompress {
        format: ArchiveFormat,
        password: Option<String>,
        output_name: String,
    },
    ArchiveExtract {
        password: Option<String>,
    },
    VideoToGif(GifOptions),
}

/// Validated, kind-specific job payload. The serialized form is tagged by
/// `kind` so the record is self-describing on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobOptions {
    PdfToImage(ImageExportOptions),
    PdfToSvg { pages: Option<PageSelection> },
    PdfMerge { output_name: String },
    PdfSplit { split_points: PageSelection },
    PdfExtract {
        pages: PageSelection,
        output_name: String,
    },
    ArchiveCompress(ArchiveOptions),
    ArchiveExtract { password: Option<String> },
    VideoToGif(GifOptions),
}

/// Discriminant of [`JobOptions`], used for dispatch and folder layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    PdfToImage,
    PdfToSvg,
    PdfMerge,
    PdfSplit,
    PdfExtract,
    ArchiveCompress,
    ArchiveExtract,
    VideoToGif,
}

impl JobKind {
    /// Category subfolder this kind's outputs land in.
    pub fn category_folder(&self) -> &'static str {
        match self {
            JobKind::PdfToImage | JobKind::PdfToSvg => "PDF_Images",
            JobKind::PdfMerge | JobKind::PdfSplit | JobKind::PdfExtract => "PDF_Operations",
            JobKind::ArchiveCompress | JobKind::ArchiveExtract => "Archives",
            JobKind::VideoToGif => "GIF",
        }
    }

    /// Kinds that operate on exactly one input file; the builder keeps only
    /// the first queued file for these.
    pub fn single_input(&self) -> bool {
        matches!(
            self,
            JobKind::PdfSplit | JobKind::PdfExtract | JobKind::VideoToGif
        )
    }

    /// Kinds where each input file is one independent converter invocation
    /// whose results are folded into a single report.
    pub fn per_file_dispatch(&self) -> bool {
        matches!(
            self,
            JobKind::PdfToImage | JobKind::PdfToSvg | JobKind::ArchiveExtract
        )
    }
}

impl JobOptions {
    pub fn kind(&self) -> JobKind {
        match self {
            JobOptions::PdfToImage(_) => JobKind::PdfToImage,
            JobOptions::PdfToSvg { .. } => JobKind::PdfToSvg,
            JobOptions::PdfMerge { .. } => JobKind::PdfMerge,
            JobOptions::PdfSplit { .. } => JobKind::PdfSplit,
            JobOptions::PdfExtract { .. } => JobKind::PdfExtract,
            JobOptions::ArchiveCompress(_) => JobKind::ArchiveCompress,
            JobOptions::ArchiveExtract { .. } => JobKind::ArchiveExtract,
            JobOptions::VideoToGif(_) => JobKind::VideoToGif,
        }
    }
}

/// A fully resolved conversion job.
///
/// Immutable and self-contained: holds no references into the queue or the
/// config store it was built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Input files in queue order.
    pub inputs: Vec<PathBuf>,
    /// Validated kind-specific payload.
    pub options: JobOptions,
    /// Concrete destination folder, date subfolder already applied when
    /// configured. The executor creates it; the builder does no I/O.
    pub output_folder: PathBuf,
}

impl JobDescriptor {
    pub fn kind(&self) -> JobKind {
        self.options.kind()
    }
}

/// Builds [`JobDescriptor`]s from user state and settings.
pub struct JobBuilder;

impl JobBuilder {
    /// Validate and resolve a job.
    ///
    /// Checks run in a fixed order so callers see the most fundamental
    /// problem first: an empty queue before a bad page selector, a bad page
    /// selector before any clamping.
    pub fn build(
        queue: &FileQueue,
        options: ToolOptions,
        config: &AppConfig,
    ) -> Result<JobDescriptor, ValidationError> {
        if queue.is_empty() {
            return Err(ValidationError::NoInput);
        }

        let options = normalize_options(options)?;
        let kind = options.kind();

        let mut inputs = queue.paths();
        if kind.single_input() {
            inputs.truncate(1);
        }

        Ok(JobDescriptor {
            inputs,
            options,
            output_folder: resolve_output_folder(config, kind),
        })
    }
}

/// Resolve the destination folder for a job kind under the given settings:
/// export root (OS documents folder when unset) / export folder name /
/// category folder / optional local-date subfolder.
pub fn resolve_output_folder(config: &AppConfig, kind: JobKind) -> PathBuf {
    let base = if config.export_folder.is_empty() {
        dirs::document_dir().unwrap_or_else(|| PathBuf::from("."))
    } else {
        PathBuf::from(&config.export_folder)
    };
    let mut folder = base
        .join(&config.export_folder_name)
        .join(kind.category_folder());
    if config.auto_create_date_folders {
        folder = folder.join(chrono::Local::now().format("%Y-%m-%d").to_string());
    }
    folder
}

/// Validate page selections and clamp numeric options, kind by kind.
fn normalize_options(options: ToolOptions) -> Result<JobOptions, ValidationError> {
    Ok(match options {
        ToolOptions::PdfToImage { format, dpi, pages } => JobOptions::PdfToImage(ImageExportOptions {
            format,
            dpi: snap_dpi(dpi),
            pages: resolve_page_mode(&pages)?,
        }),
        ToolOptions::PdfToSvg { pages } => JobOptions::PdfToSvg {
            pages: resolve_page_mode(&pages)?,
        },
        ToolOptions::PdfMerge { output_name } => JobOptions::PdfMerge {
            output_name: default_name(output_name, "merged"),
        },
        ToolOptions::PdfSplit { split_points } => JobOptions::PdfSplit {
            split_points: require_selection(&split_points)?,
        },
        ToolOptions::PdfExtract { pages, output_name } => JobOptions::PdfExtract {
            pages: require_selection(&pages)?,
            output_name: default_name(output_name, "extracted"),
        },
        ToolOptions::ArchiveCompress {
            format,
            password,
            output_name,
        } => JobOptions::ArchiveCompress(ArchiveOptions {
            format,
            password,
            output_name: default_name(output_name, "archive"),
        }),
        ToolOptions::ArchiveExtract { password } => JobOptions::ArchiveExtract { password },
        ToolOptions::VideoToGif(gif) => JobOptions::VideoToGif(clamp_gif_options(gif)),
    })
}

/// An optional page selection: `All` (or a blank selector) means no
/// restriction; a typed selector must match at least one page.
fn resolve_page_mode(mode: &PageMode) -> Result<Option<PageSelection>, ValidationError> {
    match mode {
        PageMode::All => Ok(None),
        PageMode::Select(input) if input.trim().is_empty() => Ok(None),
        PageMode::Select(input) => {
            let selection = pages::parse(input);
            if selection.is_empty() {
                Err(ValidationError::EmptyPageSelection {
                    input: input.clone(),
                })
            } else {
                Ok(Some(selection))
            }
        }
    }
}

/// A mandatory page selection (split points, extraction pages): the
/// selector must be present and must match at least one page.
fn require_selection(input: &str) -> Result<PageSelection, ValidationError> {
    let selection = pages::parse(input);
    if selection.is_empty() {
        Err(ValidationError::EmptyPageSelection {
            input: input.to_string(),
        })
    } else {
        Ok(selection)
    }
}

fn default_name(name: String, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Snap a DPI value to the nearest member of [`RECOGNIZED_DPI`].
fn snap_dpi(dpi: u32) -> u32 {
    let snapped = RECOGNIZED_DPI
        .iter()
        .copied()
        .min_by_key(|candidate| candidate.abs_diff(dpi))
        .unwrap_or(150);
    if snapped != dpi {
        debug!(requested = dpi, snapped, "snapped dpi to recognized value");
    }
    snapped
}

fn clamp_gif_options(gif: GifOptions) -> GifOptions {
    let fps = gif.fps.clamp(*FPS_RANGE.start(), *FPS_RANGE.end());
    let quality = gif.quality.clamp(*QUALITY_RANGE.start(), *QUALITY_RANGE.end());
    if fps != gif.fps || quality != gif.quality {
        debug!(
            requested_fps = gif.fps,
            fps,
            requested_quality = gif.quality,
            quality,
            "clamped gif options to slider ranges"
        );
    }
    let start_time = gif.start_time.max(0.0);
    GifOptions {
        start_time,
        end_time: gif.end_time.max(start_time),
        width: gif.width.max(1),
        height: gif.height.max(1),
        fps,
        quality,
        output_name: default_name(gif.output_name, "output"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::{DroppedFile, ToolKind};

    fn pdf_queue(names: &[&str]) -> FileQueue {
        let mut q = FileQueue::new(ToolKind::PdfConvert);
        q.add(
            names
                .iter()
                .map(|n| DroppedFile::new(format!("/in/{n}"), 100)),
        );
        q
    }

    fn plain_config() -> AppConfig {
        AppConfig {
            export_folder: "/exports".into(),
            auto_create_date_folders: false,
            ..AppConfig::default()
        }
    }

    fn image_options(pages: PageMode) -> ToolOptions {
        ToolOptions::PdfToImage {
            format: ImageFormat::Png,
            dpi: 150,
            pages,
        }
    }

    #[test]
    fn empty_queue_is_rejected_first() {
        let q = FileQueue::new(ToolKind::PdfConvert);
        // Even with a bad selector, the empty queue is what gets reported.
        let err = JobBuilder::build(
            &q,
            image_options(PageMode::Select("garbage".into())),
            &plain_config(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::NoInput);
    }

    #[test]
    fn typed_selector_matching_nothing_is_an_error() {
        let q = pdf_queue(&["a.pdf"]);
        let err = JobBuilder::build(
            &q,
            image_options(PageMode::Select("abc".into())),
            &plain_config(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyPageSelection {
                input: "abc".into()
            }
        );
    }

    #[test]
    fn blank_selector_means_all_pages() {
        let q = pdf_queue(&["a.pdf"]);
        let job = JobBuilder::build(
            &q,
            image_options(PageMode::Select("   ".into())),
            &plain_config(),
        )
        .unwrap();
        match job.options {
            JobOptions::PdfToImage(opts) => assert_eq!(opts.pages, None),
            other => panic!("unexpected options: {other:?}"),
        }
    }

    #[test]
    fn typed_selector_is_parsed_and_carried() {
        let q = pdf_queue(&["a.pdf"]);
        let job = JobBuilder::build(
            &q,
            image_options(PageMode::Select("1-3,5".into())),
            &plain_config(),
        )
        .unwrap();
        match job.options {
            JobOptions::PdfToImage(opts) => {
                assert_eq!(opts.pages.unwrap().pages(), &[1, 2, 3, 5]);
            }
            other => panic!("unexpected options: {other:?}"),
        }
    }

    #[test]
    fn dpi_snaps_to_the_nearest_recognized_value() {
        let q = pdf_queue(&["a.pdf"]);
        for (requested, expected) in [(200, 150), (999, 600), (72, 72), (10, 72), (400, 300)] {
            let job = JobBuilder::build(
                &q,
                ToolOptions::PdfToImage {
                    format: ImageFormat::Jpg,
                    dpi: requested,
                    pages: PageMode::All,
                },
                &plain_config(),
            )
            .unwrap();
            match job.options {
                JobOptions::PdfToImage(opts) => {
                    assert_eq!(opts.dpi, expected, "dpi {requested}")
                }
                other => panic!("unexpected options: {other:?}"),
            }
        }
    }

    #[test]
    fn gif_options_clamp_to_slider_ranges() {
        let mut q = FileQueue::new(ToolKind::VideoToGif);
        q.add([DroppedFile::new("/in/clip.mp4", 100)]);
        let job = JobBuilder::build(
            &q,
            ToolOptions::VideoToGif(GifOptions {
                start_time: -3.0,
                end_time: -10.0,
                width: 0,
                height: 270,
                fps: 60,
                quality: 0,
                output_name: "  ".into(),
            }),
            &plain_config(),
        )
        .unwrap();
        match job.options {
            JobOptions::VideoToGif(gif) => {
                assert_eq!(gif.start_time, 0.0);
                assert_eq!(gif.end_time, 0.0);
                assert_eq!(gif.width, 1);
                assert_eq!(gif.fps, 30);
                assert_eq!(gif.quality, 1);
                assert_eq!(gif.output_name, "output");
            }
            other => panic!("unexpected options: {other:?}"),
        }
    }

    #[test]
    fn split_requires_a_matching_selector() {
        let q = pdf_queue(&["a.pdf", "b.pdf"]);
        let err = JobBuilder::build(
            &q,
            ToolOptions::PdfSplit {
                split_points: "".into(),
            },
            &plain_config(),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::EmptyPageSelection { .. }));
    }

    #[test]
    fn single_input_kinds_keep_only_the_first_file() {
        let q = pdf_queue(&["a.pdf", "b.pdf", "c.pdf"]);
        let job = JobBuilder::build(
            &q,
            ToolOptions::PdfSplit {
                split_points: "3,6".into(),
            },
            &plain_config(),
        )
        .unwrap();
        assert_eq!(job.inputs, vec![PathBuf::from("/in/a.pdf")]);
        assert_eq!(job.kind(), JobKind::PdfSplit);
    }

    #[test]
    fn merge_keeps_every_input_in_order() {
        let q = pdf_queue(&["a.pdf", "b.pdf", "c.pdf"]);
        let job = JobBuilder::build(
            &q,
            ToolOptions::PdfMerge {
                output_name: "".into(),
            },
            &plain_config(),
        )
        .unwrap();
        assert_eq!(job.inputs.len(), 3);
        assert_eq!(
            job.options,
            JobOptions::PdfMerge {
                output_name: "merged".into()
            }
        );
    }

    #[test]
    fn destination_is_category_scoped() {
        let q = pdf_queue(&["a.pdf"]);
        let job = JobBuilder::build(&q, image_options(PageMode::All), &plain_config()).unwrap();
        assert_eq!(
            job.output_folder,
            PathBuf::from("/exports/MediaForge/PDF_Images")
        );
    }

    #[test]
    fn date_folder_is_appended_when_configured() {
        let q = pdf_queue(&["a.pdf"]);
        let config = AppConfig {
            export_folder: "/exports".into(),
            auto_create_date_folders: true,
            ..AppConfig::default()
        };
        let job = JobBuilder::build(&q, image_options(PageMode::All), &config).unwrap();
        let leaf = job
            .output_folder
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        // YYYY-MM-DD
        assert_eq!(leaf.len(), 10, "got leaf {leaf:?}");
        assert!(leaf.as_bytes()[4] == b'-' && leaf.as_bytes()[7] == b'-');
        assert_eq!(
            job.output_folder.parent().unwrap(),
            PathBuf::from("/exports/MediaForge/PDF_Images")
        );
    }

    #[test]
    fn descriptor_serializes_with_a_kind_tag() {
        let q = pdf_queue(&["a.pdf"]);
        let job = JobBuilder::build(&q, image_options(PageMode::All), &plain_config()).unwrap();
        let json = serde_json::to_string(&job).unwrap();
        assert!(json.contains(r#""kind":"pdf_to_image""#), "got: {json}");
        let back: JobDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(back, job);
    }

    #[test]
    fn category_folders_cover_all_kinds() {
        use JobKind::*;
        assert_eq!(PdfToImage.category_folder(), "PDF_Images");
        assert_eq!(PdfToSvg.category_folder(), "PDF_Images");
        assert_eq!(PdfMerge.category_folder(), "PDF_Operations");
        assert_eq!(PdfSplit.category_folder(), "PDF_Operations");
        assert_eq!(PdfExtract.category_folder(), "PDF_Operations");
        assert_eq!(ArchiveCompress.category_folder(), "Archives");
        assert_eq!(ArchiveExtract.category_folder(), "Archives");
        assert_eq!(VideoToGif.category_folder(), "GIF");
    }

    #[test]
    fn every_category_is_a_known_export_folder() {
        use crate::config::CATEGORY_FOLDERS;
        for kind in [
            JobKind::PdfToImage,
            JobKind::PdfToSvg,
            JobKind::PdfMerge,
            JobKind::PdfSplit,
            JobKind::PdfExtract,
            JobKind::ArchiveCompress,
            JobKind::ArchiveExtract,
            JobKind::VideoToGif,
        ] {
            assert!(
                CATEGORY_FOLDERS.contains(&kind.category_folder()),
                "{kind:?} maps outside the export folder layout"
            );
        }
    }
}

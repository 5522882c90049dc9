//! The converter backend as an injected capability.
//!
//! The real converter is an opaque native component reached over an RPC
//! boundary; this layer never sees pixels, codecs, or archive internals.
//! Modeling it as a trait — one method per backend operation — keeps the
//! job builder, session, and aggregator testable against a recording mock,
//! and keeps the RPC shim that implements it for production trivially thin.
//!
//! All methods are async: every one of them crosses a process boundary and
//! may complete out of order relative to continued user interaction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ConversionError, ProbeError};
use crate::job::{ArchiveOptions, GifOptions, ImageExportOptions};
use crate::pages::PageSelection;
use crate::report::ConvertResult;

/// Metadata for one PDF file, as reported by the backend probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfInfo {
    pub path: PathBuf,
    pub page_count: u32,
    pub file_size: u64,
}

/// Everything the external converter can do, one method per operation.
///
/// Implementations must be cheap to share (`Send + Sync`); the session
/// holds one for its lifetime. Every conversion method receives the
/// already-resolved `output_folder` from the job descriptor, so an
/// implementation needs no access to configuration.
#[async_trait]
pub trait Converter: Send + Sync {
    /// Probe a PDF for its page count and size. Failures are recovered by
    /// the queue with a page count of 1; they never fail a session.
    async fn get_pdf_info(&self, path: &Path) -> Result<PdfInfo, ProbeError>;

    /// Rasterize PDF pages to images.
    async fn convert_pdf_to_images(
        &self,
        paths: &[PathBuf],
        options: &ImageExportOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Export PDF pages as SVG.
    async fn convert_pdf_to_svg(
        &self,
        paths: &[PathBuf],
        pages: Option<&PageSelection>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Merge several PDFs into one.
    async fn merge_pdfs(
        &self,
        paths: &[PathBuf],
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Split one PDF after each of the given pages.
    async fn split_pdf(
        &self,
        path: &Path,
        split_points: &PageSelection,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Extract the given pages of one PDF into a new document.
    async fn extract_pdf_pages(
        &self,
        path: &Path,
        pages: &PageSelection,
        output_name: &str,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Pack files into an archive.
    async fn create_archive(
        &self,
        paths: &[PathBuf],
        options: &ArchiveOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Unpack one archive.
    async fn extract_archive(
        &self,
        path: &Path,
        password: Option<&str>,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Export a video clip as a GIF.
    async fn convert_video_to_gif(
        &self,
        path: &Path,
        options: &GifOptions,
        output_folder: &Path,
    ) -> Result<ConvertResult, ConversionError>;

    /// Reveal a folder in the OS file manager. Best-effort; the session
    /// logs failures and moves on.
    async fn open_folder(&self, path: &Path) -> Result<(), ConversionError>;
}

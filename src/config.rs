//! Application configuration: built-in defaults and the persisted record.
//!
//! [`AppConfig`] is the single settings object for the whole application.
//! It is constructed once at startup from a merge of built-in defaults and
//! persisted overrides (see [`crate::store::ConfigStore`]), and replaced
//! wholesale when the user applies new settings.
//!
//! # Merge semantics
//! Every field carries a serde default, so a persisted record from an older
//! build (missing keys) or a newer build (extra keys) loads cleanly: missing
//! keys fall back to the defaults below, unknown keys are ignored. There is
//! no schema version field; this tolerance is the compatibility story.

use serde::{Deserialize, Serialize};

/// DPI values the PDF rasterizer is known to handle well.
///
/// The settings UI only offers these four, but a persisted config may carry
/// any positive value (it round-trips unchanged); the job builder snaps to
/// the nearest recognized value when a job is actually built.
pub const RECOGNIZED_DPI: [u32; 4] = [72, 150, 300, 600];

/// Category folder names, one per tool family, created under the export root.
pub const CATEGORY_FOLDERS: [&str; 4] = ["PDF_Images", "PDF_Operations", "Archives", "GIF"];

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Process-wide application settings.
///
/// Lives for the process lifetime inside a [`crate::store::ConfigStore`];
/// mutated only via [`crate::store::ConfigStore::replace`], which persists
/// immediately.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root folder for all exports. Empty string means "use the OS
    /// documents folder" — resolved at job-build time, not here.
    pub export_folder: String,

    /// Name of the subfolder created under [`Self::export_folder`].
    pub export_folder_name: String,

    /// UI color theme.
    pub theme: Theme,

    /// Default rasterization DPI offered by the PDF conversion tool.
    ///
    /// Usually one of [`RECOGNIZED_DPI`]; other positive values are
    /// accepted and preserved.
    pub default_pdf_dpi: u32,

    /// When true, job outputs land in a `YYYY-MM-DD` subfolder of the
    /// category folder.
    pub auto_create_date_folders: bool,

    /// Folder watched by a cloud-sync client, if the user configured one.
    /// `None` means no cloud sync.
    pub cloud_sync_folder: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_folder: String::new(),
            export_folder_name: String::from("MediaForge"),
            theme: Theme::Dark,
            default_pdf_dpi: 150,
            auto_create_date_folders: true,
            cloud_sync_folder: None,
        }
    }
}

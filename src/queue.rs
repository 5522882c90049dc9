//! The per-tool input file queue.
//!
//! Each tool session owns one [`FileQueue`]. Dropped files are filtered by
//! the active tool's accepted extensions — rejected candidates are dropped
//! silently (the caller can surface "N rejected" from the count
//! difference) — and accepted files keep their drop order, so batch jobs
//! convert in the order the user assembled.
//!
//! # Probe tokens
//! PDF page counts arrive from an asynchronous metadata probe that can
//! finish after the user has already removed the file (indices shift on
//! removal, so an index would identify the wrong item). Every accepted file
//! therefore gets a [`ProbeToken`] that stays valid for the queue's
//! lifetime; a completion whose token no longer resolves is discarded.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::ProbeError;

/// Which tool the queue is feeding. Determines the accepted extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// PDF → image/SVG conversion. Accepts `.pdf`.
    PdfConvert,
    /// Merge / split / extract. Accepts `.pdf`.
    PdfOperations,
    /// Archive extraction. Accepts `.zip`, `.7z`, `.rar`.
    ArchiveExtract,
    /// Archive creation. Accepts anything.
    ArchiveCompress,
    /// Video → GIF. Accepts `.mp4`, `.avi`, `.mov`, `.webm`.
    VideoToGif,
}

impl ToolKind {
    /// Extension predicate for dropped files, matched case-insensitively.
    pub fn accepts(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let ext = ext.as_deref();
        match self {
            ToolKind::PdfConvert | ToolKind::PdfOperations => ext == Some("pdf"),
            ToolKind::ArchiveExtract => matches!(ext, Some("zip" | "7z" | "rar")),
            ToolKind::ArchiveCompress => true,
            ToolKind::VideoToGif => matches!(ext, Some("mp4" | "avi" | "mov" | "webm")),
        }
    }
}

/// Stable identity of a queued file, independent of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeToken(u64);

/// A file candidate as it arrives from a drop event or picker dialog.
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub path: PathBuf,
    /// Size in bytes as reported by the drop source; 0 when unknown.
    pub size: u64,
}

impl DroppedFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }
}

/// A file accepted into the queue.
#[derive(Debug, Clone)]
pub struct FileItem {
    /// Stable identity for matching late probe completions.
    pub token: ProbeToken,
    pub path: PathBuf,
    /// Display name (the path's final component).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Page count from the metadata probe; 1 until (and unless) a probe
    /// succeeds.
    pub page_count: u32,
}

/// What became of a probe completion handed to the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeDisposition {
    /// The item is still queued; its page count was updated (or kept at the
    /// fallback after a probe failure).
    Applied,
    /// The item was removed before the probe finished; the result was
    /// dropped.
    Discarded,
}

/// Ordered input files for one tool session.
#[derive(Debug)]
pub struct FileQueue {
    kind: ToolKind,
    items: Vec<FileItem>,
    next_token: u64,
}

impl FileQueue {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            kind,
            items: Vec::new(),
            next_token: 0,
        }
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    /// Append every candidate the active tool accepts, preserving the
    /// candidates' relative order. Returns the tokens of the accepted
    /// items so the caller can launch metadata probes for them.
    ///
    /// Rejected candidates vanish without an error; compare
    /// `candidates.len()` with the returned length to report them.
    pub fn add(&mut self, candidates: impl IntoIterator<Item = DroppedFile>) -> Vec<ProbeToken> {
        let mut accepted = Vec::new();
        for candidate in candidates {
            if !self.kind.accepts(&candidate.path) {
                trace!(path = %candidate.path.display(), "rejected by extension filter");
                continue;
            }
            let token = ProbeToken(self.next_token);
            self.next_token += 1;
            let name = candidate
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| candidate.path.to_string_lossy().into_owned());
            self.items.push(FileItem {
                token,
                path: candidate.path,
                name,
                size: candidate.size,
                page_count: 1,
            });
            accepted.push(token);
        }
        accepted
    }

    /// Remove the item at `index`. Out-of-range requests are no-ops.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            let removed = self.items.remove(index);
            debug!(name = %removed.name, "removed from queue");
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Switch the queue to a different tool. Implies [`Self::clear`]; the
    /// previous tool's files are never valid input for the next one.
    pub fn switch_kind(&mut self, kind: ToolKind) {
        if self.kind != kind {
            self.kind = kind;
            self.clear();
        }
    }

    pub fn list(&self) -> &[FileItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Paths in queue order, for building a job descriptor.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.items.iter().map(|i| i.path.clone()).collect()
    }

    /// Sum of known page counts, for the conversion summary panel.
    pub fn total_pages(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.page_count)).sum()
    }

    /// Path of the queued item a probe was launched for, if it is still
    /// queued.
    pub fn path_for(&self, token: ProbeToken) -> Option<&Path> {
        self.items
            .iter()
            .find(|i| i.token == token)
            .map(|i| i.path.as_path())
    }

    /// Apply an asynchronous probe completion.
    ///
    /// A failed probe keeps the fallback page count of 1 — probing never
    /// turns into a hard failure. A completion for a token that no longer
    /// resolves (the item was removed or the queue cleared) is discarded.
    pub fn complete_probe(
        &mut self,
        token: ProbeToken,
        result: Result<u32, ProbeError>,
    ) -> ProbeDisposition {
        let Some(item) = self.items.iter_mut().find(|i| i.token == token) else {
            debug!(?token, "discarding probe result for a removed file");
            return ProbeDisposition::Discarded;
        };
        match result {
            Ok(page_count) => {
                item.page_count = page_count.max(1);
            }
            Err(err) => {
                debug!(name = %item.name, %err, "metadata probe failed; keeping page count 1");
            }
        }
        ProbeDisposition::Applied
    }
}

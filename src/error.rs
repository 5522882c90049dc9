//! Error types for the mediaforge job layer.
//!
//! Four distinct error types reflect four distinct failure modes:
//!
//! * [`ValidationError`] — **Caller-fixable**: the job request itself is
//!   wrong (empty queue, page selector that matched nothing, a job already
//!   running). Raised before any converter call is made; never retried
//!   automatically.
//!
//! * [`ProbeError`] — **Recoverable**: a per-file metadata probe failed.
//!   The queue falls back to a page count of 1 and carries on; this error
//!   never surfaces as a hard failure.
//!
//! * [`PersistError`] — **Non-fatal**: persisting settings failed. The
//!   in-memory configuration stays applied (see
//!   [`crate::store::SaveFailurePolicy`]) and the caller is expected to
//!   warn the user.
//!
//! * [`ConversionError`] — **Terminal for one invocation**: the backend
//!   converter failed or reported failure. Surfaced verbatim through the
//!   report message; resubmission is a user decision.
//!
//! No error in this layer is fatal to the process. The worst outcome is a
//! visible failure report.

use std::path::PathBuf;
use thiserror::Error;

/// A job request that cannot be turned into a [`crate::job::JobDescriptor`].
///
/// Every variant is detectable before any external call, so a caller that
/// sees one of these knows the converter was never invoked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The file queue is empty; there is nothing to convert.
    #[error("no input files — add at least one file before converting")]
    NoInput,

    /// A page selector was supplied but matched no pages.
    ///
    /// An *absent* selector means "all pages" and is not an error; a typed
    /// selector that parses to nothing means the user expected specific
    /// pages and got none.
    #[error("page selection '{input}' matched no pages\nUse comma-separated numbers or ranges, e.g. \"1-3, 5, 8-10\".")]
    EmptyPageSelection { input: String },

    /// A page selector segment was rejected under
    /// [`crate::pages::MalformedSegmentPolicy::Reject`].
    #[error("unrecognized page selector segment '{segment}'")]
    InvalidPageSegment { segment: String },

    /// Another job is already running in this tool session.
    ///
    /// Jobs are single-flight per session so two conversions never write
    /// into the same output folder at once.
    #[error("a conversion is already running — wait for it to finish before starting another")]
    JobInFlight,
}

/// A per-file metadata probe failure.
///
/// Recovered locally: the queued item keeps its default page count of 1.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    /// The backend could not read metadata from the file.
    #[error("could not read metadata from '{path}': {detail}")]
    Unreadable { path: PathBuf, detail: String },

    /// The backend itself was not reachable for probing.
    #[error("metadata probe unavailable: {detail}")]
    Unavailable { detail: String },
}

/// A settings persistence failure.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The settings record could not be written to its backing store.
    #[error("failed to write settings to '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings record could not be read from its backing store.
    #[error("failed to read settings from '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory configuration could not be encoded.
    #[error("failed to encode settings: {detail}")]
    Encode { detail: String },

    /// A non-filesystem persistence collaborator rejected the update.
    #[error("settings store rejected the update: {detail}")]
    Backend { detail: String },
}

/// A converter invocation failure.
///
/// The message is surfaced verbatim in the final report; this layer never
/// retries a conversion on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The backend ran and reported a failure.
    #[error("{message}")]
    Backend { message: String },

    /// The backend could not be invoked at all.
    #[error("converter backend unavailable: {detail}")]
    Unavailable { detail: String },
}

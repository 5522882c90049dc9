//! Result aggregation: converter outcomes → one report.
//!
//! Batch-capable tools invoke the converter once per input file, so a job
//! can end with a mix of successes and failures. [`aggregate`] is the one
//! place those partial results fold into a single [`ConvertResult`]; it
//! never drops the fact that something failed, and it keeps output order
//! aligned with input order so the report reads like the queue did.
//!
//! [`normalize`] guards the single-invocation path: whatever shape the
//! backend returns is coerced into one where `success` and `output_files`
//! agree.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConversionError;

/// The uniform report every conversion ends in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertResult {
    /// True only when at least one output file was produced.
    pub success: bool,
    /// Produced files, ordered to match the inputs that produced them.
    /// Empty only when `success` is false.
    pub output_files: Vec<PathBuf>,
    /// The folder all outputs share.
    pub output_folder: PathBuf,
    /// Human-readable summary; always present.
    pub message: String,
}

impl ConvertResult {
    /// A failure report with no outputs.
    pub fn failure(output_folder: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            output_files: Vec::new(),
            output_folder: output_folder.into(),
            message: message.into(),
        }
    }
}

/// One converter invocation's outcome, tied to the input that produced it.
#[derive(Debug)]
pub struct FileOutcome {
    pub input: PathBuf,
    pub outcome: Result<ConvertResult, ConversionError>,
}

/// Enforce the report invariant on a single backend result: a claimed
/// success with zero outputs becomes a failure, with the discrepancy noted
/// in the message instead of papered over.
pub fn normalize(mut result: ConvertResult) -> ConvertResult {
    if result.success && result.output_files.is_empty() {
        warn!("backend reported success with no output files; demoting to failure");
        result.success = false;
        result.message = if result.message.trim().is_empty() {
            "no output files were produced".to_string()
        } else {
            format!("{} — no output files were produced", result.message)
        };
    }
    if result.message.trim().is_empty() {
        result.message = if result.success {
            "conversion complete".to_string()
        } else {
            "conversion failed".to_string()
        };
    }
    result
}

/// Fold per-file outcomes into one report.
///
/// Output files keep input order. `success` is true exactly when something
/// was produced; the message counts failures when there are any and carries
/// the first backend error verbatim when nothing succeeded.
pub fn aggregate(output_folder: &Path, outcomes: &[FileOutcome]) -> ConvertResult {
    let total = outcomes.len();
    let mut output_files: Vec<PathBuf> = Vec::new();
    let mut failed = 0usize;
    let mut first_error: Option<String> = None;

    for item in outcomes {
        match &item.outcome {
            Ok(result) => {
                let result = normalize(result.clone());
                if result.success {
                    output_files.extend(result.output_files);
                } else {
                    failed += 1;
                    first_error.get_or_insert(result.message);
                }
            }
            Err(err) => {
                failed += 1;
                first_error.get_or_insert(err.to_string());
            }
        }
    }

    let succeeded = total - failed;
    let message = if total == 0 {
        "nothing to convert".to_string()
    } else if failed == 0 {
        format!("converted {total} {}", plural(total))
    } else if succeeded == 0 {
        format!(
            "all {total} {} failed: {}",
            plural(total),
            first_error.as_deref().unwrap_or("unknown error")
        )
    } else {
        format!(
            "converted {succeeded} of {total} {}, {failed} failed ({})",
            plural(total),
            first_error.as_deref().unwrap_or("unknown error")
        )
    };

    ConvertResult {
        success: !output_files.is_empty(),
        output_files,
        output_folder: output_folder.to_path_buf(),
        message,
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        "file"
    } else {
        "files"
    }
}

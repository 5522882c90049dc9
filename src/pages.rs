//! Page-selector parsing: free-form strings → normalized page sets.
//!
//! Users type selectors like `"1-3, 5, 8-10"` into the page-selection field.
//! [`parse`] turns such a string into a [`PageSelection`]: deduplicated,
//! ascending, 1-based page numbers.
//!
//! # Tolerance policy
//! The selector field is edited live, so the parser sees half-typed input
//! constantly. The shipped behavior is to skip anything it cannot read — a
//! reversed range, a stray word, a dangling comma — and keep whatever did
//! parse. That leniency is deliberate but debatable, so it is isolated
//! behind [`MalformedSegmentPolicy`]: [`parse_with`] can reject the first
//! malformed segment instead, without any change to the default call sites.
//!
//! This module knows nothing about actual documents; selected numbers are
//! not checked against a page count here. An empty *input* yields an empty
//! selection, which callers in this domain read as "all pages" — see
//! [`crate::job::PageMode`] for how that is kept distinct from a typed
//! selector that matched nothing.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ValidationError;

/// An ordered, deduplicated, ascending set of 1-based page numbers.
///
/// Derived from user input on demand; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSelection(Vec<u32>);

impl PageSelection {
    /// Build a selection from arbitrary page numbers: zeros are dropped,
    /// duplicates collapse, order is normalized ascending.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Self {
        let mut v: Vec<u32> = pages.into_iter().filter(|&p| p > 0).collect();
        v.sort_unstable();
        v.dedup();
        Self(v)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The selected pages, ascending.
    pub fn pages(&self) -> &[u32] {
        &self.0
    }

    /// Render back to a canonical selector string, compressing consecutive
    /// runs: `[1,2,3,5]` → `"1-3,5"`. `parse(render(sel)) == sel` for every
    /// selection, which is what makes parsing idempotent.
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut i = 0;
        while i < self.0.len() {
            let start = self.0[i];
            let mut end = start;
            while i + 1 < self.0.len() && self.0[i + 1] == end + 1 {
                i += 1;
                end = self.0[i];
            }
            parts.push(if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            });
            i += 1;
        }
        parts.join(",")
    }
}

impl FromIterator<u32> for PageSelection {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self::from_pages(iter)
    }
}

/// What to do with a selector segment that cannot be read.
///
/// [`Skip`](Self::Skip) is the shipped default; [`Reject`](Self::Reject)
/// exists so the contract can be tightened later without touching call
/// sites that rely on the lenient behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedSegmentPolicy {
    /// Malformed segments yield no pages and the rest of the string still
    /// parses. Blank segments (`"1,,3"`) are always skipped; they carry no
    /// intent either way.
    #[default]
    Skip,
    /// The first malformed segment aborts the parse with
    /// [`ValidationError::InvalidPageSegment`].
    Reject,
}

/// Parse a free-form page selector with the default lenient policy.
///
/// `"1-3,5,8-10"` → `[1,2,3,5,8,9,10]`. Reversed ranges (`"5-3"`) and
/// unreadable segments yield nothing. An empty or blank input yields an
/// empty selection.
pub fn parse(input: &str) -> PageSelection {
    match parse_with(input, MalformedSegmentPolicy::Skip) {
        Ok(sel) => sel,
        // Skip never errors.
        Err(_) => PageSelection::default(),
    }
}

/// Parse a free-form page selector under an explicit
/// [`MalformedSegmentPolicy`].
pub fn parse_with(
    input: &str,
    policy: MalformedSegmentPolicy,
) -> Result<PageSelection, ValidationError> {
    let mut pages: Vec<u32> = Vec::new();
    for raw in input.split(',') {
        let segment = raw.trim();
        if segment.is_empty() {
            continue;
        }
        match expand_segment(segment) {
            Some(expanded) => pages.extend(expanded),
            None => match policy {
                MalformedSegmentPolicy::Skip => {
                    trace!(segment, "skipping malformed page selector segment");
                }
                MalformedSegmentPolicy::Reject => {
                    return Err(ValidationError::InvalidPageSegment {
                        segment: segment.to_string(),
                    });
                }
            },
        }
    }
    Ok(PageSelection::from_pages(pages))
}

/// Expand one trimmed, non-empty segment.
///
/// `None` means the segment is malformed: a non-numeric token, a zero page
/// number, a reversed range, or a range with an unreadable endpoint (the
/// leading hyphen in `"-1-5"` leaves an empty first endpoint, so the whole
/// segment is malformed).
fn expand_segment(segment: &str) -> Option<Vec<u32>> {
    if let Some((lhs, rhs)) = segment.split_once('-') {
        let start = parse_page_number(lhs)?;
        let end = parse_page_number(rhs)?;
        if start > end {
            return None;
        }
        Some((start..=end).collect())
    } else {
        parse_page_number(segment).map(|p| vec![p])
    }
}

fn parse_page_number(token: &str) -> Option<u32> {
    token.trim().parse::<u32>().ok().filter(|&p| p > 0)
}

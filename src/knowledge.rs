//! # Knowledge-base file screening
//!
//! Client-side intake checks for files attached to a chatbot create or
//! update. Two rules, enforced before any network call:
//!
//! - the extension must be one of the document/plain-text formats the
//!   backend accepts (`pdf`, `txt`, `docx`, `md`);
//! - each file must be at most 10 MB.
//!
//! Acceptance is partial: a file failing either check is excluded and
//! reported with its reason, and the remaining valid files still go out.
//! A rejection never aborts the submission.

use std::{fmt, fs, path::PathBuf};

/// Extensions the backend accepts for knowledge documents.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "txt", "docx", "md"];

/// Per-file size ceiling: 10 MB.
pub const MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

/// Why a file was excluded from the upload set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Extension outside [`ALLOWED_EXTENSIONS`] (or missing entirely).
    Extension,
    /// File larger than [`MAX_FILE_BYTES`]; carries the observed size.
    TooLarge(u64),
    /// The file could not be stat'ed at all.
    Unreadable(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Extension => write!(
                f,
                "unsupported file type (allowed: {})",
                ALLOWED_EXTENSIONS.join(", ")
            ),
            RejectReason::TooLarge(size) => write!(
                f,
                "file is {:.1} MB, larger than the 10 MB limit",
                *size as f64 / (1024.0 * 1024.0)
            ),
            RejectReason::Unreadable(e) => write!(f, "could not read file: {e}"),
        }
    }
}

/// A file excluded from the upload set, with the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: RejectReason,
}

/// Outcome of screening a selection of files.
#[derive(Debug, Default)]
pub struct Screened {
    /// Files that passed both checks, in selection order.
    pub accepted: Vec<PathBuf>,
    /// Files excluded, each with its reason.
    pub rejected: Vec<RejectedFile>,
}

impl Screened {
    /// True when at least one file was excluded.
    pub fn has_rejections(&self) -> bool {
        !self.rejected.is_empty()
    }
}

/// Check the extension rule alone. Comparison is case-insensitive.
pub fn extension_allowed(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Partition a file selection into accepted and rejected sets.
///
/// Order within `accepted` matches the input order, so the multipart body
/// carries files in the order the user picked them.
///
/// # Parameters
/// - `paths`: The files selected for upload.
///
/// # Returns
/// A [`Screened`] with every input accounted for exactly once.
pub fn screen_files(paths: &[PathBuf]) -> Screened {
    let mut screened = Screened::default();

    for path in paths {
        if !extension_allowed(path) {
            screened.rejected.push(RejectedFile {
                path: path.clone(),
                reason: RejectReason::Extension,
            });
            continue;
        }

        match fs::metadata(path) {
            Ok(meta) if meta.len() > MAX_FILE_BYTES => {
                screened.rejected.push(RejectedFile {
                    path: path.clone(),
                    reason: RejectReason::TooLarge(meta.len()),
                });
            }
            Ok(_) => screened.accepted.push(path.clone()),
            Err(e) => screened.rejected.push(RejectedFile {
                path: path.clone(),
                reason: RejectReason::Unreadable(e.to_string()),
            }),
        }
    }

    screened
}

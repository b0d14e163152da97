//! Pre-flight validation of selected files
//!
//! Runs before any I/O. Each file is checked on its own; a bad file never
//! affects its neighbours.

use std::fmt;

use shared::{ErrorCode, Notification};

use super::file::ImageFile;
use super::notify::NotificationSink;
use crate::config::UploadRules;

/// Why a file was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    UnsupportedType,
    TooLarge,
}

impl RejectReason {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            RejectReason::UnsupportedType => ErrorCode::UnsupportedFileFormat,
            RejectReason::TooLarge => ErrorCode::FileTooLarge,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedType => write!(f, "unsupported file type"),
            RejectReason::TooLarge => write!(f, "file too large"),
        }
    }
}

/// Result of validating one batch
#[derive(Debug, Default)]
pub struct ValidationOutcome {
    /// Files that may be uploaded, in input order
    pub accepted: Vec<ImageFile>,
    pub rejected: Vec<(ImageFile, RejectReason)>,
}

/// Check a single file against the rules
///
/// The type is checked first, so a file breaking both rules is reported as
/// [`RejectReason::UnsupportedType`].
pub fn check(file: &ImageFile, rules: &UploadRules) -> Result<(), RejectReason> {
    if !is_allowed_type(file.mime_type(), rules) {
        return Err(RejectReason::UnsupportedType);
    }
    if file.size() > rules.max_file_bytes {
        return Err(RejectReason::TooLarge);
    }
    Ok(())
}

fn is_allowed_type(mime_type: &str, rules: &UploadRules) -> bool {
    let mime = mime_type.trim().to_ascii_lowercase();
    // Some pickers report a bare subtype ("png") instead of "image/png"
    let full = if mime.contains('/') {
        mime
    } else {
        format!("image/{}", mime)
    };
    rules.allowed_mime_types.iter().any(|t| *t == full)
}

/// Validate a batch, reporting each rejection once through `sink`
pub fn validate(
    files: Vec<ImageFile>,
    rules: &UploadRules,
    sink: &dyn NotificationSink,
) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    for file in files {
        match check(&file, rules) {
            Ok(()) => outcome.accepted.push(file),
            Err(reason) => {
                tracing::warn!(
                    file = %file.name(),
                    mime_type = %file.mime_type(),
                    size = file.size(),
                    reason = %reason,
                    code = %reason.error_code(),
                    "Image rejected"
                );
                sink.notify(Notification::error(rejection_message(&file, reason, rules)));
                outcome.rejected.push((file, reason));
            }
        }
    }

    outcome
}

fn rejection_message(file: &ImageFile, reason: RejectReason, rules: &UploadRules) -> String {
    match reason {
        RejectReason::UnsupportedType => format!(
            "{}: unsupported file type. Allowed: JPEG, PNG, WebP",
            file.name()
        ),
        RejectReason::TooLarge => format!(
            "{}: file too large. Maximum size is {}MB",
            file.name(),
            rules.max_file_bytes / 1024 / 1024
        ),
    }
}

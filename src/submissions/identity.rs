use crate::error::{Result, SubExtractError};
use once_cell::sync::Lazy;
use regex::Regex;

/// Bulk-download archive name:
/// `<anything but _>_<username>_<anything>_<YYYY-MM-DD>-<rest>`.
static SUBMISSION_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[^_]+_(?P<submitter>[a-z]+[0-9]*)_.+_(?P<date>[0-9]{4}-[0-9]{2}-[0-9]{2})-.*$",
    )
    .expect("submission name pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitterIdentity {
    pub submitter_key: String,
    /// `YYYY-MM-DD` as it appears in the name; shape only, never calendar-checked.
    pub submission_date: String,
}

/// Splits an archive name into submitter key and submission date.
///
/// The name may carry a leading path. Anything short of a full match is
/// reported as [`SubExtractError::MalformedFilename`].
pub fn parse_identity(filename: &str) -> Result<SubmitterIdentity> {
    let malformed = || SubExtractError::MalformedFilename {
        filename: filename.to_string(),
    };

    let captures = SUBMISSION_NAME.captures(filename).ok_or_else(malformed)?;

    match (captures.name("submitter"), captures.name("date")) {
        (Some(submitter), Some(date)) => Ok(SubmitterIdentity {
            submitter_key: submitter.as_str().to_string(),
            submission_date: date.as_str().to_string(),
        }),
        _ => Err(malformed()),
    }
}

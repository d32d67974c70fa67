use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubExtractError {
    #[error("Archive name does not follow the submission pattern: {filename}")]
    MalformedFilename { filename: String },

    #[error("{file} not found in {archive}")]
    MemberNotFound { file: String, archive: String },

    #[error("Member {member} in {archive} is not valid UTF-8 text")]
    Decode {
        member: String,
        archive: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Failed to open archive {archive}: {message}")]
    ArchiveOpen {
        archive: String,
        message: String,
        #[source]
        source: Option<zip::result::ZipError>,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("No archives matching {filter} in {directory}")]
    NoArchivesFound { directory: String, filter: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

impl SubExtractError {
    pub fn archive_open<A: Into<String>>(archive: A, source: zip::result::ZipError) -> Self {
        SubExtractError::ArchiveOpen {
            archive: archive.into(),
            message: source.to_string(),
            source: Some(source),
        }
    }

    /// Errors the batch driver records against a single (submitter, file)
    /// pair before moving on to the next one.
    pub fn is_per_request(&self) -> bool {
        matches!(
            self,
            SubExtractError::MalformedFilename { .. }
                | SubExtractError::MemberNotFound { .. }
                | SubExtractError::Decode { .. }
                | SubExtractError::ArchiveOpen { .. }
                | SubExtractError::Io(_)
                | SubExtractError::InvalidPath { .. }
        )
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SubExtractError {
    fn user_message(&self) -> String {
        match self {
            SubExtractError::MalformedFilename { filename } => {
                format!("Unrecognised archive name: {}", filename)
            }
            SubExtractError::MemberNotFound { file, archive } => {
                format!("{} not found in {}", file, archive)
            }
            SubExtractError::Decode { member, archive, .. } => {
                format!("{} in {} is not a UTF-8 text file", member, archive)
            }
            SubExtractError::ArchiveOpen { archive, message, .. } => {
                format!("Could not read archive {}: {}", archive, message)
            }
            SubExtractError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SubExtractError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            SubExtractError::NoArchivesFound { directory, filter } => {
                format!("No archives matching '{}' found in {}", filter, directory)
            }
            SubExtractError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SubExtractError::MalformedFilename { .. } => Some(
                "Archives are expected to be named like <assignment>_<username>_attempt_<YYYY-MM-DD>-<time>.zip, as produced by the bulk download.".to_string()
            ),
            SubExtractError::MemberNotFound { .. } => Some(
                "Check the expected file name, or inspect the archive by hand; files under paths containing 'test' are ignored.".to_string()
            ),
            SubExtractError::Decode { .. } => Some(
                "Only text files can be extracted. Request the source file instead of a compiled or binary one.".to_string()
            ),
            SubExtractError::ArchiveOpen { .. } => Some(
                "The archive may be truncated or corrupt. Re-download it from the course site.".to_string()
            ),
            SubExtractError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            SubExtractError::NoArchivesFound { .. } => Some(
                "Point the archive directory at the unpacked bulk download, or adjust --filter.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SubExtractError {
    fn from(error: toml::de::Error) -> Self {
        SubExtractError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SubExtractError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = SubExtractError::MemberNotFound {
            file: "Main.txt".to_string(),
            archive: "hw1_alice_attempt_2024-03-01-10-00.zip".to_string(),
        };
        assert_eq!(
            error.user_message(),
            "Main.txt not found in hw1_alice_attempt_2024-03-01-10-00.zip"
        );
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_per_request_classification() {
        let missing = SubExtractError::MemberNotFound {
            file: "a.txt".to_string(),
            archive: "x.zip".to_string(),
        };
        assert!(missing.is_per_request());
        assert!(!SubExtractError::Cancelled.is_per_request());
        assert!(!SubExtractError::Config {
            message: "bad".to_string()
        }
        .is_per_request());
    }

    #[test]
    fn test_archive_open_keeps_source() {
        let error = SubExtractError::archive_open(
            "broken.zip",
            zip::result::ZipError::FileNotFound,
        );
        assert!(error.to_string().starts_with("Failed to open archive broken.zip"));
        assert!(std::error::Error::source(&error).is_some());
    }
}

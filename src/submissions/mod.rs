pub mod archive_filter;
pub mod identity;
pub mod index;

pub use archive_filter::ArchiveFilter;
pub use identity::{parse_identity, SubmitterIdentity};
pub use index::{build_submission_index, SkippedArchive, SubmissionIndex, SubmissionRecord};

pub mod archive;
pub mod distance;
pub mod engine;
pub mod report;

pub use archive::{ArchiveSource, ZipArchiveSource};
pub use distance::edit_distance;
pub use engine::{extract, ExtractionOutcome, ExtractionRequest, FuzzyExtractor, MemberMatch};
pub use report::{BatchReport, BatchReportBuilder, BatchSummary, PairReport};

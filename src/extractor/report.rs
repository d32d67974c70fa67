use crate::error::SubExtractError;
use crate::extractor::engine::ExtractionOutcome;
use crate::submissions::{SkippedArchive, SubmissionIndex, SubmissionRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// What happened to one (submitter, requested file) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub submitter: String,
    pub requested: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ExtractionOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PairReport {
    pub fn extracted(submitter: &str, requested: &str, outcome: ExtractionOutcome) -> Self {
        Self {
            submitter: submitter.to_string(),
            requested: requested.to_string(),
            outcome: Some(outcome),
            error: None,
        }
    }

    pub fn failed(submitter: &str, requested: &str, error: &SubExtractError) -> Self {
        Self {
            submitter: submitter.to_string(),
            requested: requested.to_string(),
            outcome: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn status(&self) -> &'static str {
        match &self.outcome {
            Some(ExtractionOutcome::Exact { .. }) => "exact",
            Some(ExtractionOutcome::Fuzzy { .. }) => "fuzzy",
            Some(ExtractionOutcome::NoMatch) => "no match",
            None => "failed",
        }
    }

    pub fn describe(&self) -> String {
        match (&self.outcome, &self.error) {
            (Some(ExtractionOutcome::Exact { output, .. }), _) => {
                format!("{}: {} -> {}", self.submitter, self.requested, output.display())
            }
            (Some(ExtractionOutcome::Fuzzy { member, distance, output }), _) => format!(
                "{}: {} matched {} (distance {}) -> {}",
                self.submitter,
                self.requested,
                member,
                distance,
                output.display()
            ),
            (Some(ExtractionOutcome::NoMatch), _) => {
                format!("{}: {} has no exact match", self.submitter, self.requested)
            }
            (None, Some(error)) => format!("{}: {}", self.submitter, error),
            (None, None) => format!("{}: {}", self.submitter, self.requested),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub submitters: usize,
    pub requests: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub no_match: usize,
    pub failed: usize,
    pub skipped_archives: usize,
}

impl BatchSummary {
    pub fn from_pairs(pairs: &[PairReport], submitters: usize, skipped_archives: usize) -> Self {
        let mut summary = Self {
            submitters,
            requests: pairs.len(),
            skipped_archives,
            ..Self::default()
        };

        for pair in pairs {
            match &pair.outcome {
                Some(ExtractionOutcome::Exact { .. }) => summary.exact += 1,
                Some(ExtractionOutcome::Fuzzy { .. }) => summary.fuzzy += 1,
                Some(ExtractionOutcome::NoMatch) => summary.no_match += 1,
                None => summary.failed += 1,
            }
        }

        summary
    }

    pub fn written(&self) -> usize {
        self.exact + self.fuzzy
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub extraction_time: DateTime<Utc>,
    pub archive_directory: PathBuf,
    pub output_directory: PathBuf,
    pub requested_files: Vec<String>,
    pub exact_only: bool,
    pub submissions: Vec<SubmissionRecord>,
    pub pairs: Vec<PairReport>,
    pub skipped_archives: Vec<SkippedArchive>,
    pub replaced_archives: Vec<PathBuf>,
    pub summary: BatchSummary,
    pub duration: Duration,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0 || self.summary.skipped_archives > 0
    }

    /// Failure lines in the order they occurred, skipped archives first.
    pub fn errors(&self) -> Vec<String> {
        self.skipped_archives
            .iter()
            .map(|skipped| format!("Skipped {}: {}", skipped.path.display(), skipped.reason))
            .chain(self.pairs.iter().filter(|p| p.is_failure()).map(PairReport::describe))
            .collect()
    }
}

/// Collects pair results while a batch is running.
pub struct BatchReportBuilder {
    started: Instant,
    extraction_time: DateTime<Utc>,
    archive_directory: PathBuf,
    output_directory: PathBuf,
    requested_files: Vec<String>,
    exact_only: bool,
}

impl BatchReportBuilder {
    pub fn new(
        archive_directory: PathBuf,
        output_directory: PathBuf,
        requested_files: &[String],
        exact_only: bool,
    ) -> Self {
        Self {
            started: Instant::now(),
            extraction_time: Utc::now(),
            archive_directory,
            output_directory,
            requested_files: requested_files.to_vec(),
            exact_only,
        }
    }

    pub fn finish(self, index: &SubmissionIndex, pairs: Vec<PairReport>) -> BatchReport {
        let summary = BatchSummary::from_pairs(&pairs, index.len(), index.skipped().len());

        BatchReport {
            extraction_time: self.extraction_time,
            archive_directory: self.archive_directory,
            output_directory: self.output_directory,
            requested_files: self.requested_files,
            exact_only: self.exact_only,
            submissions: index.records().cloned().collect(),
            pairs,
            skipped_archives: index.skipped().to_vec(),
            replaced_archives: index.replaced().to_vec(),
            summary,
            duration: self.started.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact(submitter: &str) -> PairReport {
        PairReport::extracted(
            submitter,
            "proj1/Main.txt",
            ExtractionOutcome::Exact {
                member: "proj1/Main.txt".to_string(),
                output: PathBuf::from(format!("out/{}_Main.txt", submitter)),
            },
        )
    }

    #[test]
    fn test_summary_counts() {
        let pairs = vec![
            exact("alice"),
            PairReport::extracted(
                "bob",
                "proj1/Main.txt",
                ExtractionOutcome::Fuzzy {
                    member: "Main.txt".to_string(),
                    distance: 6,
                    output: PathBuf::from("out/bob_Main.txt"),
                },
            ),
            PairReport::extracted("carol", "proj1/Main.txt", ExtractionOutcome::NoMatch),
            PairReport::failed(
                "dave",
                "proj1/Main.txt",
                &SubExtractError::MemberNotFound {
                    file: "Main.txt".to_string(),
                    archive: "dave.zip".to_string(),
                },
            ),
        ];

        let summary = BatchSummary::from_pairs(&pairs, 4, 1);
        assert_eq!(summary.requests, 4);
        assert_eq!(summary.exact, 1);
        assert_eq!(summary.fuzzy, 1);
        assert_eq!(summary.no_match, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.written(), 2);
        assert_eq!(summary.skipped_archives, 1);
    }

    #[test]
    fn test_pair_descriptions() {
        assert_eq!(exact("alice").status(), "exact");
        assert!(exact("alice").describe().contains("alice_Main.txt"));

        let failed = PairReport::failed(
            "dave",
            "Main.txt",
            &SubExtractError::MemberNotFound {
                file: "Main.txt".to_string(),
                archive: "dave.zip".to_string(),
            },
        );
        assert!(failed.is_failure());
        assert_eq!(failed.status(), "failed");
        assert_eq!(failed.describe(), "dave: Main.txt not found in dave.zip");
    }

    #[test]
    fn test_report_serializes_outcome_kind() {
        let builder = BatchReportBuilder::new(
            PathBuf::from("downloads"),
            PathBuf::from("out"),
            &["proj1/Main.txt".to_string()],
            false,
        );
        let report = builder.finish(&SubmissionIndex::default(), vec![exact("alice")]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["pairs"][0]["outcome"]["kind"], "exact");
        assert!(json["pairs"][0].get("error").is_none());
        assert_eq!(json["summary"]["exact"], 1);
        assert!(!report.has_failures());
        assert!(report.errors().is_empty());
    }
}

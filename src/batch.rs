use crate::config::Config;
use crate::error::{Result, SubExtractError};
use crate::extractor::{
    BatchReport, BatchReportBuilder, ExtractionRequest, FuzzyExtractor, PairReport,
};
use crate::submissions::{build_submission_index, SubmissionIndex, SubmissionRecord};
use crate::ui::GracefulShutdown;
use std::fs;
use std::path::Path;

/// Called once per finished (submitter, file) pair.
pub type PairCallback<'a> = &'a (dyn Fn(&PairReport) + Sync);

/// Runs every requested file against every submission in a directory.
///
/// A failure for one pair (missing member, binary content, unreadable
/// archive) is recorded in the report and the batch carries on. Only
/// cancellation and setup problems abort the run.
pub struct BatchExtractor<'a> {
    config: &'a Config,
    shutdown: Option<&'a GracefulShutdown>,
}

impl<'a> BatchExtractor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            shutdown: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: &'a GracefulShutdown) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn index(&self, archive_dir: &Path) -> Result<SubmissionIndex> {
        let index = build_submission_index(archive_dir, &self.config.scan.filter)?;

        if index.is_empty() && index.skipped().is_empty() {
            return Err(SubExtractError::NoArchivesFound {
                directory: archive_dir.display().to_string(),
                filter: self.config.scan.filter.clone(),
            });
        }

        Ok(index)
    }

    pub fn run(
        &self,
        archive_dir: &Path,
        output_dir: &Path,
        files: &[String],
        progress: Option<PairCallback<'_>>,
    ) -> Result<BatchReport> {
        let index = self.index(archive_dir)?;
        self.run_with_index(&index, archive_dir, output_dir, files, progress)
    }

    pub fn run_with_index(
        &self,
        index: &SubmissionIndex,
        archive_dir: &Path,
        output_dir: &Path,
        files: &[String],
        progress: Option<PairCallback<'_>>,
    ) -> Result<BatchReport> {
        if files.is_empty() {
            return Err(SubExtractError::Config {
                message: "At least one file to extract must be given".to_string(),
            });
        }

        self.prepare_output_dir(output_dir)?;

        let builder = BatchReportBuilder::new(
            archive_dir.to_path_buf(),
            output_dir.to_path_buf(),
            files,
            self.config.extract.exact_only,
        );
        let extractor = FuzzyExtractor::new(output_dir)
            .with_exclude_marker(self.config.extract.exclude_marker.clone());

        let records: Vec<&SubmissionRecord> = index.records().collect();
        let pairs = self.extract_all(&extractor, &records, files, progress)?;

        Ok(builder.finish(index, pairs))
    }

    #[cfg(not(feature = "parallel"))]
    fn extract_all(
        &self,
        extractor: &FuzzyExtractor,
        records: &[&SubmissionRecord],
        files: &[String],
        progress: Option<PairCallback<'_>>,
    ) -> Result<Vec<PairReport>> {
        let mut pairs = Vec::with_capacity(records.len() * files.len());
        for record in records {
            pairs.extend(self.extract_submission(extractor, record, files, progress)?);
        }
        Ok(pairs)
    }

    #[cfg(feature = "parallel")]
    fn extract_all(
        &self,
        extractor: &FuzzyExtractor,
        records: &[&SubmissionRecord],
        files: &[String],
        progress: Option<PairCallback<'_>>,
    ) -> Result<Vec<PairReport>> {
        use rayon::prelude::*;

        // Each submitter writes under its own prefix, so archives can be
        // processed side by side. Collecting keeps submitter order.
        let per_submitter: Vec<Vec<PairReport>> = records
            .par_iter()
            .map(|record| self.extract_submission(extractor, record, files, progress))
            .collect::<Result<_>>()?;

        Ok(per_submitter.into_iter().flatten().collect())
    }

    fn extract_submission(
        &self,
        extractor: &FuzzyExtractor,
        record: &SubmissionRecord,
        files: &[String],
        progress: Option<PairCallback<'_>>,
    ) -> Result<Vec<PairReport>> {
        let prefix = self.config.prefix_for(&record.submitter_key);
        let mut pairs = Vec::with_capacity(files.len());

        for file in files {
            if let Some(shutdown) = self.shutdown {
                shutdown.check_shutdown()?;
            }

            let request = ExtractionRequest::new(file, &prefix)
                .with_exact_only(self.config.extract.exact_only);

            let pair = match extractor.extract(&record.archive_path, &request) {
                Ok(outcome) => PairReport::extracted(&record.submitter_key, file, outcome),
                Err(e) if e.is_per_request() => PairReport::failed(&record.submitter_key, file, &e),
                Err(e) => return Err(e),
            };

            if let Some(callback) = progress {
                callback(&pair);
            }
            pairs.push(pair);
        }

        Ok(pairs)
    }

    fn prepare_output_dir(&self, output_dir: &Path) -> Result<()> {
        if output_dir.is_dir() {
            return Ok(());
        }

        if output_dir.exists() {
            return Err(SubExtractError::InvalidPath {
                path: format!("{} exists and is not a directory", output_dir.display()),
            });
        }

        if !self.config.extract.create_output_dir {
            return Err(SubExtractError::InvalidPath {
                path: format!("Output directory does not exist: {}", output_dir.display()),
            });
        }

        fs::create_dir_all(output_dir)?;
        Ok(())
    }
}

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod submissions;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractConfig, ScanConfig};
pub use error::{Result, SubExtractError, UserFriendlyError};

// Core functionality re-exports
pub use batch::BatchExtractor;
pub use extractor::{
    edit_distance, extract, ArchiveSource, BatchReport, ExtractionOutcome, ExtractionRequest,
    FuzzyExtractor, PairReport, ZipArchiveSource,
};
pub use submissions::{
    build_submission_index, parse_identity, SubmissionIndex, SubmissionRecord, SubmitterIdentity,
};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressAwareOutput, ProgressManager};

use std::path::Path;

/// Main library interface: one configured batch run with its terminal UI.
pub struct SubExtract {
    config: Config,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl SubExtract {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Result<Self> {
        let output_formatter = OutputFormatter::new(output_mode, verbose, quiet);
        let progress_manager = ProgressManager::new(!quiet && output_mode == OutputMode::Human);
        let shutdown = GracefulShutdown::new()?;

        Ok(Self {
            config,
            output_formatter,
            progress_manager,
            shutdown,
        })
    }

    /// Create a SubExtract instance for testing (no signal handler conflicts)
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            progress_manager: ProgressManager::new(false),
            shutdown: GracefulShutdown::new_for_test(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.verbosity_level(), cli_args.quiet)
    }

    /// Extract every requested file from every submission archive in
    /// `archive_dir` into `output_dir`.
    pub fn extract_submissions(
        &self,
        archive_dir: &Path,
        output_dir: &Path,
        files: &[String],
    ) -> Result<BatchReport> {
        self.shutdown.check_shutdown()?;
        let batch = BatchExtractor::new(&self.config).with_shutdown(&self.shutdown);

        self.output_formatter.start_operation("Indexing submissions");
        let spinner = self.progress_manager.create_spinner("Reading archive names...");
        let index = batch.index(archive_dir);
        spinner.finish_and_clear();
        let index = index?;
        self.output_formatter
            .info(&format!("Found {} submissions in {}", index.len(), archive_dir.display()));
        for skipped in index.skipped() {
            self.output_formatter
                .warning(&format!("Skipping {}: {}", skipped.path.display(), skipped.reason));
        }
        for replaced in index.replaced() {
            self.output_formatter
                .debug(&format!("Superseded by a later archive: {}", replaced.display()));
        }

        self.output_formatter.start_operation("Extracting files");
        let total_pairs = (index.len() * files.len()) as u64;
        let pair_progress = self.progress_manager.create_pair_progress(total_pairs);
        let output = ProgressAwareOutput::new(&self.output_formatter, Some(&self.progress_manager));
        let on_pair = |pair: &PairReport| {
            ui::progress::update_pair_progress(&pair_progress, pair);
            output.print_pair(pair);
        };

        let report = batch.run_with_index(&index, archive_dir, output_dir, files, Some(&on_pair));

        match &report {
            Ok(report) => ui::progress::finish_progress_with_summary(
                &pair_progress,
                &format!("Extracted {} files", report.summary.written()),
                report.duration,
            ),
            Err(_) => pair_progress.abandon(),
        }

        report
    }

    /// Show what a run would do without opening any archive.
    pub fn dry_run(&self, archive_dir: &Path, output_dir: &Path, files: &[String]) -> Result<()> {
        let formatter = &self.output_formatter;
        let batch = BatchExtractor::new(&self.config);
        let index = batch.index(archive_dir)?;

        if formatter.mode() != OutputMode::Json {
            formatter.info("DRY RUN MODE - No files will be extracted");
            formatter.print_separator();
        }

        formatter.print_submission_index(&index);

        if formatter.mode() != OutputMode::Json {
            formatter.print_separator();
            formatter.info("Extraction plan:");
            for record in index.records() {
                for file in files {
                    let request = ExtractionRequest::new(file, "");
                    let target = format!(
                        "{}{}",
                        self.config.prefix_for(&record.submitter_key),
                        request.base_name()
                    );
                    formatter.info(&format!(
                        "  {} -> {}",
                        file,
                        output_dir.join(target).display()
                    ));
                }
            }
            if self.config.extract.exact_only {
                formatter.info("Exact-only mode: no closest-path fallback");
            }
        }

        Ok(())
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_running()
    }

    pub fn request_shutdown(&self) {
        self.shutdown.request_shutdown();
    }

    pub fn handle_error(&self, error: &SubExtractError) {
        self.progress_manager.clear();
        self.output_formatter.print_user_friendly_error(error);
    }
}

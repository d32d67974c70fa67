use crate::error::{SubExtractError, UserFriendlyError};
use crate::extractor::{BatchReport, PairReport};
use crate::submissions::SubmissionIndex;
use console::{style, Emoji, Term};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static PACKAGE: Emoji = Emoji("📦 ", "> ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", PACKAGE, style(operation).bold());
                    } else {
                        println!("> {}", operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn print_user_friendly_error(&self, error: &SubExtractError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    /// One line per finished pair: failures as warnings, fuzzy hits at
    /// info level, exact hits only at debug level.
    pub fn print_pair(&self, pair: &PairReport) {
        if pair.is_failure() {
            self.warning(&pair.describe());
        } else if pair.outcome.as_ref().is_some_and(|o| o.matched()) {
            self.debug(&pair.describe());
        } else {
            self.info(&pair.describe());
        }
    }

    pub fn print_submission_index(&self, index: &SubmissionIndex) {
        match self.mode {
            OutputMode::Json => {
                let json_output = serde_json::to_string(index).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            _ => {
                if self.quiet {
                    return;
                }
                println!("Submissions found: {}", index.len());
                for record in index.records() {
                    println!(
                        "  {:<16} {}  {}",
                        record.submitter_key,
                        record.submission_date,
                        record.archive_path.display()
                    );
                }
                for skipped in index.skipped() {
                    println!("  skipped: {} ({})", skipped.path.display(), skipped.reason);
                }
            }
        }
    }

    pub fn print_batch_report(&self, report: &BatchReport) {
        match self.mode {
            OutputMode::Human => {
                if !self.quiet {
                    self.print_human_report(report)
                }
            }
            // One object per line, like every other JSON message
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green().bold())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow().bold())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn highlight(&self, value: impl ToString) -> String {
        if self.use_colors {
            style(value.to_string()).cyan().bold().to_string()
        } else {
            value.to_string()
        }
    }

    fn print_human_report(&self, report: &BatchReport) {
        self.print_header("Extraction Report");

        let summary = &report.summary;
        println!("Archives:     {}", report.archive_directory.display());
        println!("Output:       {}", report.output_directory.display());
        println!("Files:        {}", report.requested_files.join(", "));
        println!(
            "Mode:         {}",
            if report.exact_only { "exact paths only" } else { "closest path fallback" }
        );
        println!();
        println!("  Submitters:      {}", self.highlight(summary.submitters));
        println!("  Exact matches:   {}", self.highlight(summary.exact));
        println!("  Closest matches: {}", self.highlight(summary.fuzzy));
        if report.exact_only {
            println!("  Not matched:     {}", self.highlight(summary.no_match));
        }
        println!("  Failed:          {}", self.highlight(summary.failed));
        println!("  Time taken:      {}", self.highlight(format_duration(report.duration)));

        let fuzzy: Vec<&PairReport> = report
            .pairs
            .iter()
            .filter(|p| p.status() == "fuzzy")
            .collect();
        if !fuzzy.is_empty() && self.verbose_level == 0 {
            println!();
            println!("Closest-path matches (check these by hand):");
            for pair in fuzzy {
                println!("  - {}", pair.describe());
            }
        }

        let errors = report.errors();
        if !errors.is_empty() {
            println!();
            println!("Issues encountered:");
            for error in &errors {
                println!("  - {}", error);
            }
        }

        self.print_separator();
        if report.has_failures() {
            self.warning(&format!(
                "Extracted {} of {} files with {} problem(s)",
                summary.written(),
                summary.requests,
                errors.len()
            ));
        } else {
            self.success(&format!("Extracted {} of {} files", summary.written(), summary.requests));
        }
    }

    fn print_plain_report(&self, report: &BatchReport) {
        let summary = &report.summary;
        println!("REPORT: Extraction completed");
        println!("Submitters: {}", summary.submitters);
        println!("Exact: {}", summary.exact);
        println!("Fuzzy: {}", summary.fuzzy);
        println!("No match: {}", summary.no_match);
        println!("Failed: {}", summary.failed);
        println!("Duration: {:?}", report.duration);

        for pair in &report.pairs {
            println!("{}: {}", pair.status().to_uppercase(), pair.describe());
        }
        for skipped in &report.skipped_archives {
            println!("SKIPPED: {} ({})", skipped.path.display(), skipped.reason);
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }

    pub fn print_pair(&self, pair: &PairReport) {
        self.suspend_and_print(|f| f.print_pair(pair));
    }
}

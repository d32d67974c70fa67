use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "subextract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pull named files out of a batch of LMS submission archives")]
#[command(
    long_about = "SubExtract reads the per-student zip archives of an LMS bulk download, \
                  finds the requested files inside each one (falling back to the closest \
                  path when a student used a different layout) and writes them into one \
                  directory as <username>_<file>."
)]
#[command(after_help = "EXAMPLES:\n  \
    subextract graded ./downloads src/Main.java README.md\n  \
    subextract graded ./downloads hw2/Lab.py --exact\n  \
    subextract graded ./downloads Main.java --filter 'Homework 3_*.zip' -v\n  \
    subextract graded ./downloads Main.java --dry-run")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Directory the extracted files are written to (created if missing)
    #[arg(required_unless_present = "generate_config")]
    pub output_dir: Option<PathBuf>,

    /// Directory holding the downloaded submission archives
    #[arg(required_unless_present = "generate_config")]
    pub archive_dir: Option<PathBuf>,

    /// Paths of the files to extract, as laid out in a well-formed submission
    #[arg(required_unless_present = "generate_config", num_args = 1..)]
    pub files: Vec<String>,

    /// Glob selecting archive file names
    #[arg(long, help = "Archive file name filter (default: *.zip)")]
    pub filter: Option<String>,

    /// Only accept members whose path equals the requested path
    #[arg(long, help = "Disable the closest-path fallback")]
    pub exact: bool,

    /// Substring that excludes archive members from matching
    #[arg(long, help = "Skip archive members whose path contains this text (default: test)")]
    pub exclude_marker: Option<String>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// List submissions and planned extractions without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Write a sample configuration file and exit")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_filter(self.filter.clone())
            .with_exact_only(self.exact)
            .with_exclude_marker(self.exclude_marker.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments() {
        let cli = Cli::try_parse_from([
            "subextract",
            "out",
            "downloads",
            "src/Main.java",
            "README.md",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert_eq!(cli.archive_dir, Some(PathBuf::from("downloads")));
        assert_eq!(cli.files, vec!["src/Main.java", "README.md"]);
        assert!(!cli.exact);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Cli::try_parse_from(["subextract", "out", "downloads"]).is_err());
    }

    #[test]
    fn test_generate_config_needs_no_positionals() {
        let cli = Cli::try_parse_from(["subextract", "--generate-config"]).unwrap();
        assert!(cli.generate_config);
        assert!(cli.output_dir.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["subextract", "-q", "-v", "o", "d", "f"]).is_err());
    }

    #[test]
    fn test_cli_overrides_reach_config() {
        let cli = Cli::try_parse_from([
            "subextract",
            "out",
            "downloads",
            "Main.java",
            "--exact",
            "--filter",
            "hw2_*.zip",
            "--config",
            "/definitely/not/here.toml",
        ])
        .unwrap();

        // An explicit config path that does not exist is an error
        assert!(cli.load_config().is_err());

        let overrides = cli.create_cli_overrides();
        let mut config = Config::default();
        config.merge_with_cli_args(&overrides);
        assert!(config.extract.exact_only);
        assert_eq!(config.scan.filter, "hw2_*.zip");
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::try_parse_from(["subextract", "-vv", "o", "d", "f"]).unwrap();
        assert_eq!(cli.verbosity_level(), 2);

        let quiet = Cli::try_parse_from(["subextract", "-q", "o", "d", "f"]).unwrap();
        assert_eq!(quiet.verbosity_level(), 0);
    }
}

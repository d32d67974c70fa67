use crate::error::{Result, SubExtractError};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_ARCHIVE_FILTER: &str = "*.zip";
pub const DEFAULT_EXCLUDE_MARKER: &str = "test";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub extract: ExtractConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Glob applied to file names in the archive directory
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub exact_only: bool,
    /// Members whose path contains this substring are never selected
    pub exclude_marker: String,
    /// Joins the submitter key and the file name in the output directory
    pub prefix_separator: String,
    pub create_output_dir: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_ARCHIVE_FILTER.to_string(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            exact_only: false,
            exclude_marker: DEFAULT_EXCLUDE_MARKER.to_string(),
            prefix_separator: "_".to_string(),
            create_output_dir: true,
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SubExtractError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SubExtractError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SubExtractError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["subextract.toml", ".subextract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref filter) = cli_args.filter {
            self.scan.filter = filter.clone();
        }

        if cli_args.exact_only {
            self.extract.exact_only = true;
        }

        if let Some(ref marker) = cli_args.exclude_marker {
            self.extract.exclude_marker = marker.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.scan.filter.trim().is_empty() {
            return Err(SubExtractError::Config {
                message: "Archive filter must not be empty".to_string(),
            });
        }

        if self.scan.filter.contains('/') || self.scan.filter.contains('\\') {
            return Err(SubExtractError::Config {
                message: format!(
                    "Archive filter matches file names only, not paths: {}",
                    self.scan.filter
                ),
            });
        }

        if self.extract.exclude_marker.is_empty() {
            return Err(SubExtractError::Config {
                message: "Exclude marker must not be empty".to_string(),
            });
        }

        let separator = &self.extract.prefix_separator;
        if separator.contains('/') || separator.contains('\\') {
            return Err(SubExtractError::Config {
                message: "Prefix separator cannot contain path separators".to_string(),
            });
        }

        // Output names stay unique per submitter only if the separator
        // cannot be read as part of a submitter key
        if !separator.starts_with(|c: char| !c.is_ascii_lowercase() && !c.is_ascii_digit()) {
            return Err(SubExtractError::Config {
                message: format!(
                    "Prefix separator must start with a character that cannot appear in a \
                     submitter key (a-z, 0-9): '{}'",
                    separator
                ),
            });
        }

        Ok(())
    }

    /// Output file prefix for one submitter, e.g. `alice42_`.
    pub fn prefix_for(&self, submitter: &str) -> String {
        format!("{}{}", submitter, self.extract.prefix_separator)
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub filter: Option<String>,
    pub exact_only: bool,
    pub exclude_marker: Option<String>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: Option<String>) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_exact_only(mut self, exact_only: bool) -> Self {
        self.exact_only = exact_only;
        self
    }

    pub fn with_exclude_marker(mut self, marker: Option<String>) -> Self {
        self.exclude_marker = marker;
        self
    }
}

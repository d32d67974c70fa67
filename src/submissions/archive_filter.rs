use crate::error::{Result, SubExtractError};
use regex::Regex;
use std::path::Path;

/// Shell-style file name filter (`*`, `?` and `[...]` classes) used to pick
/// archives out of a download directory.
pub struct ArchiveFilter {
    glob: String,
    pattern: Regex,
}

impl ArchiveFilter {
    pub fn new(glob: &str) -> Result<Self> {
        let pattern = Regex::new(&glob_to_regex(glob)).map_err(|e| SubExtractError::Config {
            message: format!("Invalid archive filter '{}': {}", glob, e),
        })?;

        Ok(Self {
            glob: glob.to_string(),
            pattern,
        })
    }

    pub fn is_candidate(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|s| s.to_str()) else {
            return false;
        };

        // Like a shell glob, a leading dot has to be matched explicitly
        if file_name.starts_with('.') && !self.glob.starts_with('.') {
            return false;
        }

        self.pattern.is_match(file_name)
    }

    pub fn glob(&self) -> &str {
        &self.glob
    }
}

impl Default for ArchiveFilter {
    fn default() -> Self {
        Self {
            glob: crate::config::DEFAULT_ARCHIVE_FILTER.to_string(),
            pattern: Regex::new(r"^.*\.zip$").expect("default archive pattern is valid"),
        }
    }
}

fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2 + 2);
    regex.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            '[' => {
                // Copy the class through unchanged when it is closed,
                // translating the shell negation `[!...]` to `[^...]`.
                let class: String = chars.clone().take_while(|c| *c != ']').collect();
                let closed = chars.clone().nth(class.chars().count()) == Some(']');
                if closed && !class.is_empty() {
                    regex.push('[');
                    let mut body = class.as_str();
                    if let Some(rest) = body.strip_prefix('!') {
                        regex.push('^');
                        body = rest;
                    }
                    for c in body.chars() {
                        if c == '\\' || c == '[' {
                            regex.push('\\');
                        }
                        regex.push(c);
                    }
                    regex.push(']');
                    for _ in 0..=class.chars().count() {
                        chars.next();
                    }
                } else {
                    regex.push_str(r"\[");
                }
            }
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }

    regex.push('$');
    regex
}

use crate::config::DEFAULT_EXCLUDE_MARKER;
use crate::error::{Result, SubExtractError};
use crate::extractor::archive::{ArchiveSource, ZipArchiveSource};
use crate::extractor::distance::edit_distance;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// One file to pull out of one archive.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionRequest<'a> {
    /// Path of the file as it appears in a well-formed submission
    pub expected_path: &'a str,
    /// Disable the closest-path fallback
    pub exact_only: bool,
    /// Prepended to the base file name in the output directory
    pub prefix: &'a str,
}

impl<'a> ExtractionRequest<'a> {
    pub fn new(expected_path: &'a str, prefix: &'a str) -> Self {
        Self {
            expected_path,
            exact_only: false,
            prefix,
        }
    }

    pub fn with_exact_only(mut self, exact_only: bool) -> Self {
        self.exact_only = exact_only;
        self
    }

    /// Final component of the expected path; names the output file.
    pub fn base_name(&self) -> &'a str {
        self.expected_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.expected_path)
    }
}

/// Which member, if any, a request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberMatch {
    Exact(String),
    Closest { name: String, distance: usize },
    Missing,
}

/// Result of a request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractionOutcome {
    /// The expected path exists verbatim in the archive
    Exact { member: String, output: PathBuf },
    /// A member with the same file name was written instead
    Fuzzy {
        member: String,
        distance: usize,
        output: PathBuf,
    },
    /// Exact-only request with no exact member; nothing written
    NoMatch,
}

impl ExtractionOutcome {
    pub fn matched(&self) -> bool {
        matches!(self, ExtractionOutcome::Exact { .. })
    }

    pub fn source_member(&self) -> Option<&str> {
        match self {
            ExtractionOutcome::Exact { member, .. } | ExtractionOutcome::Fuzzy { member, .. } => {
                Some(member)
            }
            ExtractionOutcome::NoMatch => None,
        }
    }

    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ExtractionOutcome::Exact { output, .. } | ExtractionOutcome::Fuzzy { output, .. } => {
                Some(output)
            }
            ExtractionOutcome::NoMatch => None,
        }
    }
}

/// Finds a requested file inside a submission archive and writes it,
/// prefixed, into a shared output directory.
#[derive(Debug, Clone)]
pub struct FuzzyExtractor {
    target_dir: PathBuf,
    exclude_marker: String,
}

impl FuzzyExtractor {
    pub fn new<P: Into<PathBuf>>(target_dir: P) -> Self {
        Self {
            target_dir: target_dir.into(),
            exclude_marker: DEFAULT_EXCLUDE_MARKER.to_string(),
        }
    }

    pub fn with_exclude_marker<S: Into<String>>(mut self, marker: S) -> Self {
        self.exclude_marker = marker.into();
        self
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Opens the zip at `archive_path` and serves `request` from it.
    pub fn extract(
        &self,
        archive_path: &Path,
        request: &ExtractionRequest<'_>,
    ) -> Result<ExtractionOutcome> {
        let mut archive = ZipArchiveSource::open(archive_path)?;
        self.extract_from(&mut archive, request)
    }

    pub fn extract_from<A: ArchiveSource>(
        &self,
        archive: &mut A,
        request: &ExtractionRequest<'_>,
    ) -> Result<ExtractionOutcome> {
        let base = request.base_name();
        if base.is_empty() {
            return Err(SubExtractError::InvalidPath {
                path: format!("Expected path has no file name: {}", request.expected_path),
            });
        }

        let names = archive.member_names();
        match self.resolve(&names, request) {
            MemberMatch::Exact(member) => {
                let output = self.write_member(archive, &member, request)?;
                Ok(ExtractionOutcome::Exact { member, output })
            }
            MemberMatch::Closest { name, distance } => {
                let output = self.write_member(archive, &name, request)?;
                Ok(ExtractionOutcome::Fuzzy {
                    member: name,
                    distance,
                    output,
                })
            }
            MemberMatch::Missing if request.exact_only => Ok(ExtractionOutcome::NoMatch),
            MemberMatch::Missing => Err(SubExtractError::MemberNotFound {
                file: base.to_string(),
                archive: archive.label().to_string(),
            }),
        }
    }

    /// Picks the member a request refers to, without touching any content.
    ///
    /// Names containing the exclude marker are ignored. The first member equal
    /// to the expected path wins outright. Otherwise, unless the request is
    /// exact-only, the member ending in the same file name with the smallest
    /// edit distance to the expected path is chosen; on ties the earlier
    /// member in listing order is kept.
    pub fn resolve(&self, names: &[String], request: &ExtractionRequest<'_>) -> MemberMatch {
        let base = request.base_name();
        let mut best: Option<(&str, usize)> = None;

        for name in names {
            if name.contains(self.exclude_marker.as_str()) {
                continue;
            }

            if name == request.expected_path {
                return MemberMatch::Exact(name.clone());
            }

            if request.exact_only || !name.ends_with(base) {
                continue;
            }

            let distance = edit_distance(request.expected_path, name);
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((name, distance));
            }
        }

        match best {
            Some((name, distance)) => MemberMatch::Closest {
                name: name.to_string(),
                distance,
            },
            None => MemberMatch::Missing,
        }
    }

    fn write_member<A: ArchiveSource>(
        &self,
        archive: &mut A,
        member: &str,
        request: &ExtractionRequest<'_>,
    ) -> Result<PathBuf> {
        let bytes = archive.read_member(member)?;
        let text = String::from_utf8(bytes).map_err(|source| SubExtractError::Decode {
            member: member.to_string(),
            archive: archive.label().to_string(),
            source,
        })?;

        let output = self.output_path(request)?;

        if output.is_dir() {
            return Err(SubExtractError::InvalidPath {
                path: format!("Output path is a directory: {}", output.display()),
            });
        }
        if output.exists() {
            fs::remove_file(&output)?;
        }

        fs::write(&output, text)?;
        Ok(output)
    }

    fn output_path(&self, request: &ExtractionRequest<'_>) -> Result<PathBuf> {
        let file_name = format!("{}{}", request.prefix, request.base_name());
        let relative = Path::new(&file_name);

        // The name must stay a single component directly inside target_dir
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.target_dir.join(relative)),
            _ => Err(SubExtractError::InvalidPath {
                path: format!("Output file name is not a plain file name: {}", file_name),
            }),
        }
    }
}

/// Serves a single request against the zip at `archive_path`, writing into
/// `target_dir` and ignoring members whose path contains `test`.
pub fn extract<P: AsRef<Path>, T: Into<PathBuf>>(
    archive_path: P,
    expected_path: &str,
    exact_only: bool,
    prefix: &str,
    target_dir: T,
) -> Result<ExtractionOutcome> {
    let request = ExtractionRequest::new(expected_path, prefix).with_exact_only(exact_only);
    FuzzyExtractor::new(target_dir).extract(archive_path.as_ref(), &request)
}

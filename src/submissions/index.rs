use crate::error::{Result, SubExtractError};
use crate::submissions::archive_filter::ArchiveFilter;
use crate::submissions::identity::parse_identity;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    pub submitter_key: String,
    pub archive_path: PathBuf,
    pub submission_date: String,
}

/// An archive that passed the filter but could not be attributed to anyone.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedArchive {
    pub path: PathBuf,
    pub reason: String,
}

/// Submitter key to archive mapping for one download directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SubmissionIndex {
    records: BTreeMap<String, SubmissionRecord>,
    skipped: Vec<SkippedArchive>,
    /// Archives dropped because a later archive carried the same key
    replaced: Vec<PathBuf>,
}

impl SubmissionIndex {
    pub fn get(&self, submitter_key: &str) -> Option<&SubmissionRecord> {
        self.records.get(submitter_key)
    }

    /// Records in submitter key order.
    pub fn records(&self) -> impl Iterator<Item = &SubmissionRecord> {
        self.records.values()
    }

    pub fn submitters(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn skipped(&self) -> &[SkippedArchive] {
        &self.skipped
    }

    pub fn replaced(&self) -> &[PathBuf] {
        &self.replaced
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn insert(&mut self, record: SubmissionRecord) {
        if let Some(previous) = self.records.insert(record.submitter_key.clone(), record) {
            self.replaced.push(previous.archive_path);
        }
    }
}

/// Lists `directory` (non-recursively), keeps file names matching `glob_filter`
/// and keys each archive by the submitter parsed from its name.
///
/// Archives are visited in file name order; when two archives yield the same
/// key the later one wins. Names that do not parse are kept in
/// [`SubmissionIndex::skipped`] instead of failing the whole scan.
pub fn build_submission_index<P: AsRef<Path>>(
    directory: P,
    glob_filter: &str,
) -> Result<SubmissionIndex> {
    let directory = directory.as_ref();
    let filter = ArchiveFilter::new(glob_filter)?;

    if !directory.is_dir() {
        return Err(SubExtractError::InvalidPath {
            path: format!("{} is not a directory", directory.display()),
        });
    }

    let mut index = SubmissionIndex::default();

    let walker = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| {
            e.into_io_error().map(SubExtractError::Io).unwrap_or_else(|| {
                SubExtractError::InvalidPath {
                    path: directory.display().to_string(),
                }
            })
        })?;

        if !entry.file_type().is_file() || !filter.is_candidate(entry.path()) {
            continue;
        }

        let file_name = entry.file_name().to_string_lossy();
        match parse_identity(&file_name) {
            Ok(identity) => index.insert(SubmissionRecord {
                submitter_key: identity.submitter_key,
                archive_path: entry.path().to_path_buf(),
                submission_date: identity.submission_date,
            }),
            Err(e) => index.skipped.push(SkippedArchive {
                path: entry.path().to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    Ok(index)
}

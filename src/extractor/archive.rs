use crate::error::{Result, SubExtractError};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::result::ZipError;

/// Read-only view of a submission archive: its member names in native
/// listing order, and member contents by exact name.
pub trait ArchiveSource {
    /// Name used when reporting errors against this archive.
    fn label(&self) -> &str;

    fn member_names(&self) -> Vec<String>;

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>>;
}

pub struct ZipArchiveSource<R: Read + Seek> {
    archive: zip::ZipArchive<R>,
    label: String,
}

impl ZipArchiveSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let label = path.display().to_string();

        let file = File::open(path)
            .map_err(|e| SubExtractError::archive_open(label.clone(), ZipError::Io(e)))?;

        Self::new(BufReader::new(file), label)
    }
}

impl<R: Read + Seek> ZipArchiveSource<R> {
    pub fn new<S: Into<String>>(reader: R, label: S) -> Result<Self> {
        let label = label.into();
        let archive = zip::ZipArchive::new(reader)
            .map_err(|e| SubExtractError::archive_open(label.clone(), e))?;

        Ok(Self { archive, label })
    }
}

impl<R: Read + Seek> ArchiveSource for ZipArchiveSource<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn member_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut member = self
            .archive
            .by_name(name)
            .map_err(|e| SubExtractError::archive_open(self.label.clone(), e))?;

        let mut content = Vec::with_capacity(member.size() as usize);
        member
            .read_to_end(&mut content)
            .map_err(|e| SubExtractError::archive_open(self.label.clone(), ZipError::Io(e)))?;

        Ok(content)
    }
}

/// In-memory archive for driving the engine with a fixed listing order.
#[cfg(test)]
pub(crate) struct MemoryArchive {
    pub label: String,
    pub members: Vec<(String, Vec<u8>)>,
    pub reads: Vec<String>,
}

#[cfg(test)]
impl MemoryArchive {
    pub fn new(members: &[(&str, &str)]) -> Self {
        Self {
            label: "memory.zip".to_string(),
            members: members
                .iter()
                .map(|(name, body)| (name.to_string(), body.as_bytes().to_vec()))
                .collect(),
            reads: Vec::new(),
        }
    }

    pub fn with_bytes(mut self, name: &str, body: &[u8]) -> Self {
        self.members.push((name.to_string(), body.to_vec()));
        self
    }
}

#[cfg(test)]
impl ArchiveSource for MemoryArchive {
    fn label(&self) -> &str {
        &self.label
    }

    fn member_names(&self) -> Vec<String> {
        self.members.iter().map(|(name, _)| name.clone()).collect()
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>> {
        self.reads.push(name.to_string());
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, body)| body.clone())
            .ok_or_else(|| {
                SubExtractError::archive_open(self.label.clone(), ZipError::FileNotFound)
            })
    }
}

/// Writes a real zip with members in the given order.
#[cfg(test)]
pub(crate) fn write_test_zip(path: &Path, members: &[(&str, &[u8])]) {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    for (name, body) in members {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap();
}

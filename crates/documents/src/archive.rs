use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::Result;

/// File name plus contents, ready to be written or packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedBuffer {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl NamedBuffer {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Packages `files` into a deflated ZIP. Repeated names get a ` (n)` suffix.
pub fn zip_buffers(files: &[NamedBuffer]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut used = HashSet::new();
    for file in files {
        let name = unique_name(&file.name, &mut used);
        zip.start_file(name.as_str(), options)?;
        zip.write_all(&file.bytes)?;
    }
    let cursor = zip.finish()?;
    tracing::debug!(entries = files.len(), "packaged archive");
    Ok(cursor.into_inner())
}

fn unique_name(name: &str, used: &mut HashSet<String>) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let mut n = 2;
    loop {
        let candidate = format!("{stem} ({n}){ext}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn archive_contains_every_buffer() {
        let files = vec![
            NamedBuffer::new("report-page-1.png", vec![1, 2, 3]),
            NamedBuffer::new("report-page-2.png", b"second".to_vec()),
        ];
        let bytes = zip_buffers(&files).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut second = archive.by_name("report-page-2.png").unwrap();
        let mut content = Vec::new();
        second.read_to_end(&mut content).unwrap();
        assert_eq!(content, b"second");
    }

    #[test]
    fn duplicate_names_are_disambiguated() {
        let files = vec![
            NamedBuffer::new("a.png", vec![1]),
            NamedBuffer::new("a.png", vec![2]),
            NamedBuffer::new("a.png", vec![3]),
        ];
        let bytes = zip_buffers(&files).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<_> = archive.file_names().map(str::to_string).collect();
        names.sort();
        assert_eq!(names, ["a (2).png", "a (3).png", "a.png"]);
    }
}

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use core_types::MediaKind;
use walkdir::WalkDir;

/// A file accepted by a tool, with the MIME type its extension maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    pub mime: &'static str,
}

impl InputFile {
    pub fn read(&self) -> Result<Vec<u8>> {
        std::fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))
    }

    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Resolves files and directories (walked recursively) to the inputs `kind`
/// accepts. Argument order is kept; files inside a directory are sorted.
/// Explicit files of the wrong type are an error, unsupported files found
/// while walking are skipped.
pub fn collect_inputs(paths: &[PathBuf], kind: MediaKind) -> Result<Vec<InputFile>> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<InputFile> = WalkDir::new(path)
                .into_iter()
                .filter_map(|res| res.ok())
                .filter(|entry| entry.file_type().is_file())
                .filter_map(|entry| classify(entry.path(), kind))
                .collect();
            found.sort_by(|a, b| a.path.cmp(&b.path));
            tracing::debug!(dir = %path.display(), files = found.len(), "walked input directory");
            inputs.extend(found);
        } else if path.is_file() {
            let input = classify(path, kind).with_context(|| {
                format!("{} is not a supported {} file", path.display(), kind.label())
            })?;
            inputs.push(input);
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    if inputs.is_empty() {
        bail!("no {} files found", kind.label());
    }
    Ok(inputs)
}

/// Single-input variant of [`collect_inputs`].
pub fn single_input(path: &Path, kind: MediaKind) -> Result<InputFile> {
    let mut inputs = collect_inputs(&[path.to_path_buf()], kind)?;
    if inputs.len() > 1 {
        bail!("{} holds {} files; pass a single file", path.display(), inputs.len());
    }
    Ok(inputs.remove(0))
}

fn classify(path: &Path, kind: MediaKind) -> Option<InputFile> {
    let ext = path.extension().and_then(OsStr::to_str)?;
    let mime = kind.mime_for_extension(ext)?;
    Some(InputFile {
        path: path.to_path_buf(),
        mime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn walks_directories_and_filters_by_kind() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("b.PNG"), b"png").unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpg").unwrap();
        fs::write(nested.join("c.webp"), b"webp").unwrap();
        fs::write(dir.path().join("notes.txt"), b"txt").unwrap();
        fs::write(dir.path().join("doc.pdf"), b"pdf").unwrap();

        let inputs = collect_inputs(&[dir.path().to_path_buf()], MediaKind::Image).unwrap();
        let names: Vec<String> = inputs.iter().map(InputFile::name).collect();
        assert_eq!(names, ["a.jpg", "b.PNG", "c.webp"]);
        assert_eq!(inputs[1].mime, "image/png");

        let pdfs = collect_inputs(&[dir.path().to_path_buf()], MediaKind::Pdf).unwrap();
        assert_eq!(pdfs.len(), 1);
        assert_eq!(pdfs[0].mime, "application/pdf");
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempdir().unwrap();
        let second = dir.path().join("z.pdf");
        let first = dir.path().join("a.pdf");
        fs::write(&second, b"1").unwrap();
        fs::write(&first, b"2").unwrap();

        let inputs = collect_inputs(&[second.clone(), first.clone()], MediaKind::Pdf).unwrap();
        assert_eq!(inputs[0].path, second);
        assert_eq!(inputs[1].path, first);
    }

    #[test]
    fn rejects_wrong_type_missing_files_and_empty_results() {
        let dir = tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        fs::write(&text, b"txt").unwrap();

        assert!(collect_inputs(&[text], MediaKind::Image).is_err());
        assert!(collect_inputs(&[dir.path().join("missing.png")], MediaKind::Image).is_err());
        let err = collect_inputs(&[dir.path().to_path_buf()], MediaKind::Pdf).unwrap_err();
        assert!(err.to_string().contains("no PDF files"));
    }
}

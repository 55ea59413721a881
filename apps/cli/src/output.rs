use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Where to write `default_name`: the explicit path, the explicit directory,
/// the last output directory, or the working directory, in that order.
pub fn resolve_output(explicit: Option<&Path>, fallback_dir: Option<&Path>, default_name: &str) -> PathBuf {
    match explicit {
        Some(path) if path.is_dir() => path.join(default_name),
        Some(path) => path.to_path_buf(),
        None => match fallback_dir {
            Some(dir) if dir.is_dir() => dir.join(default_name),
            _ => PathBuf::from(default_name),
        },
    }
}

/// Writes `bytes` through a temporary file in the destination directory and
/// moves it into place. The temporary file is removed if anything fails.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut temp = NamedTempFile::new_in(&dir)
        .with_context(|| format!("creating a temporary file in {}", dir.display()))?;
    temp.write_all(bytes)?;
    temp.flush()?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_directory_receives_default_name() {
        let dir = tempdir().unwrap();
        let resolved = resolve_output(Some(dir.path()), None, "merged.pdf");
        assert_eq!(resolved, dir.path().join("merged.pdf"));

        let file = dir.path().join("custom.pdf");
        assert_eq!(resolve_output(Some(&file), None, "merged.pdf"), file);
    }

    #[test]
    fn falls_back_to_last_directory_then_cwd() {
        let dir = tempdir().unwrap();
        assert_eq!(
            resolve_output(None, Some(dir.path()), "speech.wav"),
            dir.path().join("speech.wav")
        );
        let gone = dir.path().join("gone");
        assert_eq!(resolve_output(None, Some(&gone), "speech.wav"), PathBuf::from("speech.wav"));
    }

    #[test]
    fn writes_through_temp_file_and_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("out").join("result.bin");
        write_output(&target, b"payload").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"payload");

        let leftovers = std::fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }
}

//! Atomic, crash-safe file writes (§4.H, §7): write to a temp sibling, then
//! rename on close. A crash between write and rename leaves the temp file
//! behind; [`sweep_temporaries`] cleans those up at the start of the next
//! run.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{OutputError, Result};

pub struct AtomicFileWriter;

impl AtomicFileWriter {
    /// Write `lines` (already in final order) to `dir/filename`, atomically.
    pub fn write_lines<'a>(
        dir: &Path,
        filename: &str,
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        for line in lines {
            writeln!(tmp, "{line}").map_err(|source| OutputError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        tmp.flush().map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let final_path = dir.join(filename);
        tmp.persist(&final_path)
            .map_err(|e| OutputError::Persist {
                path: final_path.clone(),
                source: e.error,
            })?;
        Ok(final_path)
    }

    /// Write pre-rendered bytes (e.g. a finished CSV or JSON buffer)
    /// atomically.
    pub fn write_bytes(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(dir).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        tmp.write_all(bytes).map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        tmp.flush().map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let final_path = dir.join(filename);
        tmp.persist(&final_path)
            .map_err(|e| OutputError::Persist {
                path: final_path.clone(),
                source: e.error,
            })?;
        Ok(final_path)
    }
}

/// Remove stray `tempfile`-pattern temporaries (`.tmp*`) left behind by a
/// crashed prior run, as required by §4.H/§7/§8 scenario 6.
pub fn sweep_temporaries(dir: &Path) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }
    let mut removed = 0;
    for entry in std::fs::read_dir(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })? {
        let entry = entry.map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_tmp = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(".tmp"));
        if is_tmp {
            std::fs::remove_file(&path).map_err(|source| OutputError::Io { path, source })?;
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_final_file_not_a_temp_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = AtomicFileWriter::write_lines(dir.path(), "clean.txt", ["a@b.com", "c@d.com"].into_iter())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "clean.txt");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "a@b.com\nc@d.com\n");
    }

    #[test]
    fn sweep_removes_leftover_tmp_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".tmpabc123"), b"partial").unwrap();
        std::fs::write(dir.path().join("clean.txt"), b"kept").unwrap();
        let removed = sweep_temporaries(dir.path()).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("clean.txt").exists());
        assert!(!dir.path().join(".tmpabc123").exists());
    }
}

//! Whole-file output written through a temporary file and an atomic rename.
//!
//! Readers of the destination path either see the previous file or the fully
//! written new one, never a partial write.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, WordstatError};

/// Write `path` by running `write` against a buffered temporary file in the
/// same directory, then renaming it into place.
///
/// Missing parent directories are created. If `write` fails the temporary file
/// is removed and `path` is left untouched.
pub fn write_atomically<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    let mut writer = BufWriter::new(temp);
    write(&mut writer)?;
    writer.flush()?;

    let temp = writer
        .into_inner()
        .map_err(|e| WordstatError::Io(e.into_error()))?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| WordstatError::Io(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("result.txt");

        write_atomically(&path, |w| {
            writeln!(w, "hello")?;
            Ok(())
        })
        .unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_failed_write_keeps_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.txt");
        fs::write(&path, "old\n").unwrap();

        let result = write_atomically(&path, |w| {
            writeln!(w, "partial")?;
            Err(WordstatError::other("formatter failed"))
        });

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "old\n");
        // Only the original file remains in the directory.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}

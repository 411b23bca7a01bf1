use crate::infrastructure::error::InfrastructureError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

/// Write content to a file atomically using a temporary file.
///
/// The target is either fully written or left as it was.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    StagedFile::write(path.as_ref(), content.as_ref())?.commit()
}

/// A fully written temporary file waiting to replace `target`.
///
/// The temporary lives in the target's directory so the final rename never
/// crosses filesystems. Dropping a `StagedFile` without committing deletes
/// the temporary and leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: TempPath,
    target: PathBuf,
}

impl StagedFile {
    /// Stages `content` for `target`, flushed to disk.
    pub fn write(target: &Path, content: &[u8]) -> Result<Self, InfrastructureError> {
        let mut file = tempfile::NamedTempFile::new_in(parent_of(target))?;
        file.write_all(content)?;
        file.as_file().sync_all()?;

        Ok(Self {
            temp: file.into_temp_path(),
            target: target.to_path_buf(),
        })
    }

    /// Reserves an empty temporary for a writer that needs a path (e.g. a
    /// database `COPY ... TO`). `suffix` keeps the extension recognisable.
    pub fn reserve(target: &Path, suffix: &str) -> Result<Self, InfrastructureError> {
        let file = tempfile::Builder::new()
            .prefix(".staged-")
            .suffix(suffix)
            .tempfile_in(parent_of(target))?;

        Ok(Self {
            temp: file.into_temp_path(),
            target: target.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.temp
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Renames the temporary over the target.
    pub fn commit(self) -> Result<(), InfrastructureError> {
        self.temp
            .persist(&self.target)
            .map_err(|e| InfrastructureError::Io(e.error))
    }
}

/// Commits staged files in order. Callers stage everything first, so a
/// failure while staging never touches any target.
pub fn commit_all(staged: Vec<StagedFile>) -> Result<(), InfrastructureError> {
    for file in staged {
        file.commit()?;
    }
    Ok(())
}

fn parent_of(path: &Path) -> &Path {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_file() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");
        let content = "Hello, World!";

        atomic_write(&file_path, content)?;

        assert!(file_path.exists());
        let read_content = fs::read_to_string(file_path)?;
        assert_eq!(read_content, content);
        Ok(())
    }

    #[test]
    fn test_atomic_write_overwrites_existing() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("test.txt");

        atomic_write(&file_path, "Initial")?;
        atomic_write(&file_path, "Updated")?;

        let read_content = fs::read_to_string(file_path)?;
        assert_eq!(read_content, "Updated");
        Ok(())
    }

    #[test]
    fn test_dropped_stage_leaves_target_untouched() -> Result<()> {
        let dir = tempdir()?;
        let target = dir.path().join("runs.json");
        fs::write(&target, "old")?;

        let staged = StagedFile::write(&target, b"new")?;
        let temp = staged.path().to_path_buf();
        assert!(temp.exists());
        drop(staged);

        assert!(!temp.exists());
        assert_eq!(fs::read_to_string(&target)?, "old");
        Ok(())
    }

    #[test]
    fn test_commit_all_replaces_every_target() -> Result<()> {
        let dir = tempdir()?;
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        fs::write(&a, "old-a")?;

        let staged = vec![StagedFile::write(&a, b"new-a")?, StagedFile::write(&b, b"new-b")?];
        commit_all(staged)?;

        assert_eq!(fs::read_to_string(&a)?, "new-a");
        assert_eq!(fs::read_to_string(&b)?, "new-b");
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        Ok(())
    }

    #[test]
    fn test_reserve_keeps_suffix() -> Result<()> {
        let dir = tempdir()?;
        let staged = StagedFile::reserve(&dir.path().join("runs.parquet"), ".parquet")?;
        assert!(staged.path().to_string_lossy().ends_with(".parquet"));
        assert_eq!(staged.target(), dir.path().join("runs.parquet"));
        Ok(())
    }
}

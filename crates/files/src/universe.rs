//! The shared local content directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::FilesError;

/// Name of the shared content directory.
pub const UNIVERSE_DIR: &str = "universe";

/// `universe` beside the running executable.
pub fn default_universe_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    let base = exe
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join(UNIVERSE_DIR))
}

/// Copy `file` into `universe_dir`, keeping its base name.
///
/// Creates the directory if needed. Copying a file onto itself is a no-op.
pub fn copy_to_universe(file: &Path, universe_dir: &Path) -> Result<PathBuf, FilesError> {
    let name = file
        .file_name()
        .ok_or_else(|| FilesError::NotAFile(file.to_path_buf()))?;
    let metadata = fs::metadata(file).map_err(|e| FilesError::from_io(file, e))?;
    if !metadata.is_file() {
        return Err(FilesError::NotAFile(file.to_path_buf()));
    }

    fs::create_dir_all(universe_dir).map_err(|source| FilesError::Io {
        path: universe_dir.to_path_buf(),
        source,
    })?;
    let dest = universe_dir.join(name);

    if same_file(file, &dest) {
        tracing::debug!("{} already in universe", dest.display());
        return Ok(dest);
    }

    fs::copy(file, &dest).map_err(|source| FilesError::CopyFailed {
        from: file.to_path_buf(),
        to: dest.clone(),
        source,
    })?;
    Ok(dest)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_keeps_base_name() {
        let src_dir = tempfile::tempdir().unwrap();
        let universe = tempfile::tempdir().unwrap();
        let src = src_dir.path().join("report.pdf");
        fs::write(&src, b"%PDF-1.7").unwrap();

        let dest = copy_to_universe(&src, &universe.path().join(UNIVERSE_DIR)).unwrap();
        assert_eq!(dest, universe.path().join(UNIVERSE_DIR).join("report.pdf"));
        assert_eq!(fs::read(dest).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn test_copy_overwrites_previous_copy() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let universe = dir.path().join("u");

        fs::write(&src, b"one").unwrap();
        copy_to_universe(&src, &universe).unwrap();
        fs::write(&src, b"two").unwrap();
        let dest = copy_to_universe(&src, &universe).unwrap();

        assert_eq!(fs::read(dest).unwrap(), b"two");
    }

    #[test]
    fn test_copy_onto_itself() {
        let universe = tempfile::tempdir().unwrap();
        let inside = universe.path().join("x.bin");
        fs::write(&inside, b"data").unwrap();

        let dest = copy_to_universe(&inside, universe.path()).unwrap();
        assert_eq!(fs::read(dest).unwrap(), b"data");
    }

    #[test]
    fn test_copy_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let err = copy_to_universe(&dir.path().join("ghost"), dir.path()).unwrap_err();
        assert!(matches!(err, FilesError::NotFound(_)));
    }

    #[test]
    fn test_default_universe_dir_is_beside_executable() {
        let dir = default_universe_dir().unwrap();
        assert!(dir.ends_with(UNIVERSE_DIR));
    }
}

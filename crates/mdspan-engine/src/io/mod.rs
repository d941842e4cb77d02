use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a markdown file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.is_file() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Absolute, symlink-free form of `path`
pub fn canonical_path(path: &Path) -> Result<PathBuf, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    Ok(fs::canonicalize(path)?)
}

/// Returns true if `path` has one of `extensions`, compared case-insensitively
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("test.md");
        fs::write(&file, "# Test\n\nContent").unwrap();

        assert_eq!(read_file(&file).unwrap(), "# Test\n\nContent");
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.md");

        assert!(matches!(read_file(&missing), Err(IoError::NotFound(p)) if p == missing));
        assert!(matches!(canonical_path(&missing), Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["md".to_string(), "markdown".to_string()];
        assert!(has_extension(Path::new("a/b.MD"), &exts));
        assert!(has_extension(Path::new("notes.markdown"), &exts));
        assert!(!has_extension(Path::new("image.png"), &exts));
        assert!(!has_extension(Path::new("README"), &exts));
    }
}

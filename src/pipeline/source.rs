//! Byte sources: where plugin Lua files are read from.

use std::io;

/// Read-only access to plugin files, keyed by the descriptor's `path`.
pub trait ByteSource {
    /// Return the full content stored at `path`.
    fn read(&self, path: &str) -> io::Result<Vec<u8>>;
}

/// Reads plugin files from the local file system.
///
/// Relative paths resolve against the process working directory, which for
/// a CI job is the repository checkout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl ByteSource for FsSource {
    fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_existing_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"return 1").unwrap();
        let path = tmp.path().to_string_lossy().to_string();
        assert_eq!(FsSource.read(&path).unwrap(), b"return 1");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.lua");
        let err = FsSource.read(&path.to_string_lossy()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn empty_path_fails() {
        assert!(FsSource.read("").is_err());
    }
}

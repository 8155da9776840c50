//! Filesystem cache backend.
//!
//! Entries are plain text files stored flat in a caller-owned directory,
//! one per key, named by [`CacheKey::file_name`]. There is no index: the
//! existence of the file is the only metadata.
//!
//! Writes go through a temporary file and a rename, so readers never see a
//! half-written entry. There is no locking: two processes that miss on the
//! same key will both generate and both write, and the last rename wins.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{CacheBackend, CacheKey};
use crate::{LongformError, Result};

/// Longest file name accepted by common filesystems, in bytes.
const MAX_FILE_NAME_BYTES: usize = 255;

/// Longest full path accepted by the host platform, in bytes.
#[cfg(windows)]
const MAX_PATH_BYTES: usize = 260;
#[cfg(not(windows))]
const MAX_PATH_BYTES: usize = 4096;

/// Cache backend writing one text file per key into a directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Use an existing directory as cache storage.
    ///
    /// The directory is never created or cleaned by the cache.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(LongformError::InvalidPath(format!(
                "cache directory {} does not exist or is not a directory",
                dir.display()
            )));
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the entry for `key`, validated for the host platform.
    pub fn path_for(&self, key: &CacheKey) -> Result<PathBuf> {
        let file_name = key.file_name();
        validate_file_name(&file_name)?;
        let path = self.dir.join(&file_name);
        let path_len = path.as_os_str().len();
        if path_len > MAX_PATH_BYTES {
            return Err(LongformError::InvalidPath(format!(
                "cache path is {path_len} bytes long (max {MAX_PATH_BYTES}): {}",
                path.display()
            )));
        }
        Ok(path)
    }
}

impl CacheBackend for DiskCache {
    fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text.trim_end().to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &CacheKey, text: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Each write gets its own temp file; only the rename is shared.
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(text.trim_end().as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), bytes = text.len(), "wrote cache entry");
        Ok(())
    }
}

fn validate_file_name(file_name: &str) -> Result<()> {
    if file_name.len() > MAX_FILE_NAME_BYTES {
        return Err(LongformError::InvalidPath(format!(
            "cache file name is {} bytes long (max {MAX_FILE_NAME_BYTES}): {file_name}",
            file_name.len()
        )));
    }
    if file_name.contains(['\0', '/', '\\']) {
        return Err(LongformError::InvalidPath(format!(
            "cache file name contains a separator or NUL: {file_name:?}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Strategy;

    #[test]
    fn missing_directory_is_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = DiskCache::new(dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, LongformError::InvalidPath(_)));
    }

    #[test]
    fn file_is_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cache.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(
            DiskCache::new(&file),
            Err(LongformError::InvalidPath(_))
        ));
    }

    #[test]
    fn get_on_empty_directory_misses() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        let key = CacheKey::new("task", Strategy::Oneshot, "prompt").unwrap();
        assert!(cache.get(&key).unwrap().is_none());
    }

    #[test]
    fn put_then_get_trims_trailing_whitespace() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        let key = CacheKey::new("task", Strategy::Oneshot, "prompt").unwrap();

        cache.put(&key, "content\n\n").unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join(key.file_name())).unwrap();
        assert_eq!(on_disk, "content");
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some("content"));
    }

    #[test]
    fn no_temporary_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        let key = CacheKey::new("task", Strategy::Multishot, "prompt").unwrap();
        cache.put(&key, "content").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, [key.file_name()]);
    }

    #[test]
    fn concurrent_puts_for_one_prompt_keep_entries_apart() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();

        for i in 0..200 {
            let prompt = format!("prompt {i}");
            let oneshot = CacheKey::new("Outline", Strategy::Oneshot, &prompt).unwrap();
            let multishot = CacheKey::new("Outline", Strategy::Multishot, &prompt).unwrap();
            let a = "A".repeat(20_000);
            let b = "B".repeat(20_000);

            std::thread::scope(|s| {
                s.spawn(|| cache.put(&oneshot, &a).unwrap());
                s.spawn(|| cache.put(&multishot, &b).unwrap());
            });

            assert_eq!(cache.get(&oneshot).unwrap().as_deref(), Some(a.as_str()));
            assert_eq!(cache.get(&multishot).unwrap().as_deref(), Some(b.as_str()));
        }
    }

    #[test]
    fn overlong_prefix_is_invalid_path() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path()).unwrap();
        let key = CacheKey::new(&"a".repeat(300), Strategy::Oneshot, "prompt").unwrap();
        assert!(matches!(
            cache.path_for(&key),
            Err(LongformError::InvalidPath(_))
        ));
        assert!(matches!(cache.get(&key), Err(LongformError::InvalidPath(_))));
    }
}

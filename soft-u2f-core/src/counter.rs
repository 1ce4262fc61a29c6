//! Usage counter stores
//!
//! [`MemoryCounter`] keeps the counter in a mutex; [`FileCounter`] (std only)
//! additionally persists every new value before handing it out.

use crate::callbacks::CounterStore;
use crate::status::{Result, StatusWord};

use spin::Mutex;

/// Mutex-guarded in-memory counter
#[derive(Debug, Default)]
pub struct MemoryCounter {
    value: Mutex<u32>,
}

impl MemoryCounter {
    /// Create a counter starting at `initial`
    pub fn new(initial: u32) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

impl CounterStore for MemoryCounter {
    fn increment(&self) -> Result<u32> {
        let mut value = self.value.lock();
        let next = value.checked_add(1).ok_or_else(|| {
            log::warn!("Usage counter exhausted");
            StatusWord::NoMemory
        })?;
        *value = next;
        Ok(next)
    }

    fn current(&self) -> Result<u32> {
        Ok(*self.value.lock())
    }
}

#[cfg(feature = "std")]
pub use file::FileCounter;

#[cfg(feature = "std")]
mod file {
    use super::*;

    use std::fs::File;
    use std::io::{self, Read, Write};
    use std::path::{Path, PathBuf};

    use tempfile::NamedTempFile;

    use crate::consts::COUNTER_SIZE;

    /// Counter persisted as 4 big-endian bytes in a file
    ///
    /// Each increment writes a uniquely named temporary file in the same
    /// directory, syncs it, renames it over the counter file and then syncs
    /// the directory, all before the new value is returned. A value that was
    /// handed out survives a crash.
    #[derive(Debug)]
    pub struct FileCounter {
        path: PathBuf,
        value: Mutex<u32>,
    }

    impl FileCounter {
        /// Open the counter at `path`, starting from 0 if the file does not exist
        ///
        /// # Errors
        ///
        /// `NoMemory` if the file exists but cannot be read or is not exactly
        /// four bytes long.
        pub fn open(path: impl AsRef<Path>) -> Result<Self> {
            let path = path.as_ref().to_path_buf();

            let value = match File::open(&path) {
                Ok(mut file) => read_value(&mut file).map_err(|e| {
                    log::warn!("Failed to read counter file {}: {}", path.display(), e);
                    StatusWord::NoMemory
                })?,
                Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
                Err(e) => {
                    log::warn!("Failed to open counter file {}: {}", path.display(), e);
                    return Err(StatusWord::NoMemory);
                }
            };

            log::debug!("Opened counter file {} at {}", path.display(), value);

            Ok(Self {
                path,
                value: Mutex::new(value),
            })
        }

        /// Location of the counter file
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn persist(&self, value: u32) -> io::Result<()> {
            let dir = match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };

            let mut tmp = NamedTempFile::new_in(dir)?;
            tmp.write_all(&value.to_be_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&self.path).map_err(|e| e.error)?;

            sync_dir(dir)
        }
    }

    /// Flush the directory entry written by the rename
    #[cfg(unix)]
    fn sync_dir(dir: &Path) -> io::Result<()> {
        File::open(dir)?.sync_all()
    }

    /// Directory handles cannot be synced on this platform
    #[cfg(not(unix))]
    fn sync_dir(_dir: &Path) -> io::Result<()> {
        Ok(())
    }

    fn read_value(file: &mut File) -> io::Result<u32> {
        let mut bytes = Vec::with_capacity(COUNTER_SIZE);
        file.read_to_end(&mut bytes)?;

        let bytes: [u8; COUNTER_SIZE] = bytes.as_slice().try_into().map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, "counter file must be 4 bytes")
        })?;

        Ok(u32::from_be_bytes(bytes))
    }

    impl CounterStore for FileCounter {
        fn increment(&self) -> Result<u32> {
            let mut value = self.value.lock();
            let next = value.checked_add(1).ok_or_else(|| {
                log::warn!("Usage counter exhausted");
                StatusWord::NoMemory
            })?;

            self.persist(next).map_err(|e| {
                log::warn!("Failed to persist counter to {}: {}", self.path.display(), e);
                StatusWord::NoMemory
            })?;

            *value = next;
            Ok(next)
        }

        fn current(&self) -> Result<u32> {
            Ok(*self.value.lock())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_counter_increments() {
        let counter = MemoryCounter::default();
        assert_eq!(counter.current().unwrap(), 0);
        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment().unwrap(), 2);
        assert_eq!(counter.current().unwrap(), 2);
    }

    #[test]
    fn test_memory_counter_overflow() {
        let counter = MemoryCounter::new(u32::MAX - 1);
        assert_eq!(counter.increment().unwrap(), u32::MAX);
        assert_eq!(counter.increment(), Err(StatusWord::NoMemory));
        assert_eq!(counter.current().unwrap(), u32::MAX);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_counter_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter");

        let counter = FileCounter::open(&path).unwrap();
        assert_eq!(counter.current().unwrap(), 0);
        assert_eq!(counter.increment().unwrap(), 1);
        assert_eq!(counter.increment().unwrap(), 2);
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0, 2]);
        drop(counter);

        let reopened = FileCounter::open(&path).unwrap();
        assert_eq!(reopened.current().unwrap(), 2);
        assert_eq!(reopened.increment().unwrap(), 3);
        assert_eq!(reopened.path(), path.as_path());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_counter_leaves_no_temporary_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter");

        let counter = FileCounter::open(&path).unwrap();
        for expected in 1..=5 {
            assert_eq!(counter.increment().unwrap(), expected);
        }

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("counter")]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_counters_sharing_a_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter");

        let first = std::sync::Arc::new(FileCounter::open(&path).unwrap());
        let second = std::sync::Arc::new(FileCounter::open(&path).unwrap());

        let handles: Vec<_> = [first, second]
            .into_iter()
            .map(|counter| {
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        counter.increment().unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Both writers renamed whole files into place; the survivor is intact
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 0, 0, 50]);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_counter_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counter");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        assert_eq!(FileCounter::open(&path).unwrap_err(), StatusWord::NoMemory);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_file_counter_write_failure_keeps_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("counter");

        let counter = FileCounter::open(&path).unwrap();
        assert_eq!(counter.increment(), Err(StatusWord::NoMemory));
        assert_eq!(counter.current().unwrap(), 0);
    }
}

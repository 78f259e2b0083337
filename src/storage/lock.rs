//! Exclusive advisory lock on a store directory.

use crate::config::LOCK_FILENAME;
use crate::error::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Held for the lifetime of an open session. Released on drop.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Take the lock without blocking; fails with `LockHeld` if another
    /// session owns it.
    #[cfg(unix)]
    pub fn acquire(root: &Path) -> Result<Self> {
        use std::os::unix::io::AsRawFd;

        let path = root.join(LOCK_FILENAME);
        let file = std::fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let ret = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
        if ret != 0 {
            let err = std::io::Error::last_os_error();
            if err.kind() == std::io::ErrorKind::WouldBlock {
                return Err(Error::LockHeld(root.to_path_buf()));
            }
            return Err(err.into());
        }

        tracing::debug!(path = %path.display(), "acquired store lock");
        Ok(Self { file, path })
    }

    /// Lock-file fallback: the file's existence is the lock.
    #[cfg(not(unix))]
    pub fn acquire(root: &Path) -> Result<Self> {
        let path = root.join(LOCK_FILENAME);
        let file = match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(Error::LockHeld(root.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { file, path })
    }
}

impl Drop for StoreLock {
    #[cfg(unix)]
    fn drop(&mut self) {
        use std::os::unix::io::AsRawFd;

        unsafe {
            libc::flock(self.file.as_raw_fd(), libc::LOCK_UN);
        }
        tracing::debug!(path = %self.path.display(), "released store lock");
    }

    #[cfg(not(unix))]
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

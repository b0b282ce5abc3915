use std::path::PathBuf;

use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("failed to prepare {0}: {1}")]
    Prepare(String, std::io::Error),
    #[error("failed to release {0}: {1}")]
    Release(String, std::io::Error),
}

/// Resources shared by the capture and display side for the session lifetime.
pub trait MediaManager: Send {
    fn init(&mut self) -> Result<(), MediaError>;

    /// Safe to call in any state, including before `init`.
    fn deinit(&mut self) -> Result<(), MediaError>;
}

const LOCK_FILE: &str = ".marker-scan.lock";

/// Owns the output directory: creates it and marks it in use with a lock file
/// holding our pid. The lock is removed on release.
pub struct OutputMedia {
    dir: PathBuf,
    lock: Option<PathBuf>,
}

impl OutputMedia {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: None,
        }
    }
}

impl MediaManager for OutputMedia {
    fn init(&mut self) -> Result<(), MediaError> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| MediaError::Prepare(self.dir.display().to_string(), e))?;
        let lock = self.dir.join(LOCK_FILE);
        if lock.exists() {
            warn!(path = %lock.display(), "stale lock file found, taking it over");
        }
        std::fs::write(&lock, std::process::id().to_string())
            .map_err(|e| MediaError::Prepare(lock.display().to_string(), e))?;
        debug!(path = %lock.display(), "media lock acquired");
        self.lock = Some(lock);
        Ok(())
    }

    fn deinit(&mut self) -> Result<(), MediaError> {
        if let Some(lock) = self.lock.take() {
            std::fs::remove_file(&lock)
                .map_err(|e| MediaError::Release(lock.display().to_string(), e))?;
            debug!(path = %lock.display(), "media lock released");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_lifecycle() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("out");
        let mut media = OutputMedia::new(&dir);
        media.init().unwrap();
        assert!(dir.join(LOCK_FILE).exists());
        media.deinit().unwrap();
        assert!(!dir.join(LOCK_FILE).exists());
        // second release is a no-op
        media.deinit().unwrap();
    }

    #[test]
    fn deinit_before_init_is_harmless() {
        let tmp = tempfile::tempdir().unwrap();
        let mut media = OutputMedia::new(tmp.path());
        media.deinit().unwrap();
    }
}

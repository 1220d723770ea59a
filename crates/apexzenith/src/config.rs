//! Filesystem locations for everything the daemon writes.

use std::fs;
use std::io;
use std::path::PathBuf;

/// Environment variable overriding the output directory.
pub const DATA_DIR_ENV: &str = "ZENITH_DATA_DIR";

/// Default output directory, relative to the working directory. The daemon
/// has always written next to wherever it was launched from, so the default
/// stays relative rather than moving under a platform data root.
pub const DEFAULT_DATA_DIR: &str = "ApexZenith_Daemon_Output";

pub struct Paths;

impl Paths {
    /// Output directory holding the database and log files.
    /// `ZENITH_DATA_DIR` wins when set and non-empty.
    pub fn data_dir() -> PathBuf {
        match std::env::var(DATA_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => PathBuf::from(DEFAULT_DATA_DIR),
        }
    }

    /// Path of `file_name` inside the output directory.
    pub fn in_data_dir(file_name: &str) -> PathBuf {
        Self::data_dir().join(file_name)
    }

    /// Create the output directory if it does not exist yet. Safe to call on
    /// every start.
    pub fn ensure_data_dir() -> io::Result<PathBuf> {
        let dir = Self::data_dir();
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test so the env var is only touched from one thread.
    #[test]
    fn test_data_dir_override_and_default() {
        std::env::remove_var(DATA_DIR_ENV);
        assert_eq!(Paths::data_dir(), PathBuf::from(DEFAULT_DATA_DIR));
        assert_eq!(
            Paths::in_data_dir("immortal_memory.db"),
            PathBuf::from(DEFAULT_DATA_DIR).join("immortal_memory.db")
        );

        let tmp = tempfile::TempDir::new().unwrap();
        let target = tmp.path().join("out");
        std::env::set_var(DATA_DIR_ENV, &target);
        assert_eq!(Paths::data_dir(), target);

        let created = Paths::ensure_data_dir().unwrap();
        assert_eq!(created, target);
        assert!(target.is_dir());
        // A second call is a no-op.
        Paths::ensure_data_dir().unwrap();

        std::env::remove_var(DATA_DIR_ENV);
    }
}

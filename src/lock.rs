//! Lock file management for single-instance enforcement.
//!
//! Two daemons writing the same GPIO line would fight over the relay, so
//! an exclusive lock in the runtime directory guards startup. The lock
//! file carries the holder's PID for diagnostics.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

/// Path of the lock file in the runtime directory.
pub fn get_lock_path() -> String {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
    format!("{runtime_dir}/sunswitch.lock")
}

/// Acquire the exclusive instance lock.
///
/// # Returns
/// - `Ok(Some((file, path)))` when the lock was acquired; keep the file
///   open for the process lifetime, the OS releases it on exit.
/// - `Ok(None)` when another live instance holds the lock.
pub fn acquire_lock() -> Result<Option<(File, String)>> {
    let lock_path = get_lock_path();

    let mut lock_file = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(&lock_path)
        .with_context(|| format!("Failed to open lock file {lock_path}"))?;

    match lock_file.try_lock_exclusive() {
        Ok(()) => {
            lock_file.set_len(0)?;
            lock_file.seek(SeekFrom::Start(0))?;
            writeln!(&lock_file, "{}", std::process::id())?;
            lock_file.flush()?;
            Ok(Some((lock_file, lock_path)))
        }
        Err(_) => {
            let mut contents = String::new();
            let _ = lock_file.read_to_string(&mut contents);
            let holder = contents.lines().next().unwrap_or("unknown");
            log_pipe!();
            log_error!("Another sunswitch instance is already running (PID {holder})");
            log_indented!("Only one instance may drive the output line at a time");
            Ok(None)
        }
    }
}

/// Remove the lock file at shutdown.
pub fn cleanup_lock(lock_file: File, lock_path: &str, debug_enabled: bool) {
    drop(lock_file);
    if let Err(e) = std::fs::remove_file(lock_path)
        && debug_enabled
    {
        log_warning!("Failed to remove lock file {lock_path}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_lock_attempt_is_refused() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sunswitch.lock");
        let first = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .unwrap();
        first.try_lock_exclusive().unwrap();

        let second = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .unwrap();
        assert!(second.try_lock_exclusive().is_err());
    }
}

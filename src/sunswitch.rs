//! Application coordinator that manages the complete lifecycle of sunswitch.
//!
//! Handles resource acquisition and orchestration of the scheduler:
//! configuration loading, single-instance lock, signal handler setup, GPIO
//! acquisition (with graceful degradation), and the core run loop.

use anyhow::Result;

use crate::{
    backend::create_backend,
    config::Config,
    core::{Core, CoreParams},
    display::LogDisplay,
    lock,
    signals::setup_signal_handler,
};

/// Builder for configuring and running the sunswitch daemon.
///
/// # Examples
///
/// ```no_run
/// use sunswitch::Sunswitch;
///
/// # fn main() -> anyhow::Result<()> {
/// Sunswitch::new(false).run()?;
/// # Ok(())
/// # }
/// ```
pub struct Sunswitch {
    debug_enabled: bool,
    create_lock: bool,
}

impl Sunswitch {
    /// Create a new runner with defaults matching a normal daemon start.
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            create_lock: true,
        }
    }

    /// Skip lock file creation (for supervised test harnesses).
    pub fn without_lock(mut self) -> Self {
        self.create_lock = false;
        self
    }

    /// Execute the daemon with the configured settings.
    ///
    /// Runs until a termination signal arrives. GPIO acquisition failure
    /// degrades to an inert scheduler instead of returning an error.
    pub fn run(self) -> Result<()> {
        log_version!();

        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled - showing detailed operations");
        }

        let config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                log_error_exit!("Configuration failed");
                eprintln!("{e:?}");
                std::process::exit(crate::constants::EXIT_FAILURE);
            }
        };

        let lock_info = if self.create_lock {
            match lock::acquire_lock()? {
                Some(info) => Some(info),
                None => {
                    // Another instance owns the line; exit quietly.
                    log_end!();
                    return Ok(());
                }
            }
        } else {
            None
        };

        let signal_state = setup_signal_handler(self.debug_enabled)?;

        config.log_config();

        // Acquisition failure is a deployment misconfiguration, not a crash:
        // the scheduler runs inert and the problem is surfaced in the log.
        let backend = match create_backend(&config, self.debug_enabled) {
            Ok(backend) => {
                log_block_start!("Acquired output line, starting scheduler...");
                Some(backend)
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to acquire output line: {e}");
                None
            }
        };

        let core = Core::new(CoreParams {
            backend,
            display: Box::new(LogDisplay),
            config,
            signal_state,
            debug_enabled: self.debug_enabled,
        });
        core.execute()?;

        if let Some((lock_file, lock_path)) = lock_info {
            lock::cleanup_lock(lock_file, &lock_path, self.debug_enabled);
        }
        log_end!();

        Ok(())
    }
}

//! Recording backend for tests.

use anyhow::Result;
use std::sync::{Arc, Mutex};

use super::{Level, SwitchBackend};

/// Backend that records every level written instead of touching hardware.
pub struct MockBackend {
    writes: Arc<Mutex<Vec<Level>>>,
}

impl MockBackend {
    /// Create a mock and a handle to its write log.
    pub fn new() -> (Self, Arc<Mutex<Vec<Level>>>) {
        let writes = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                writes: Arc::clone(&writes),
            },
            writes,
        )
    }
}

impl SwitchBackend for MockBackend {
    fn write(&mut self, level: Level) -> Result<()> {
        self.writes.lock().unwrap().push(level);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

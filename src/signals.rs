//! Signal handling and shutdown coordination.
//!
//! A dedicated thread waits on SIGINT/SIGTERM/SIGHUP via `signal-hook` and
//! converts them into a message on the wakeup channel. The scheduler's
//! sleep blocks on that channel with a timeout, so a shutdown request
//! interrupts even a multi-hour wait immediately.

use anyhow::{Context, Result};
use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender, channel};

/// Messages delivered on the wakeup channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMessage {
    /// Process received a termination signal.
    Shutdown,
}

/// Shared signal state handed to the scheduler.
pub struct SignalState {
    /// Cleared when a termination signal arrives.
    pub running: Arc<AtomicBool>,
    /// Sender side, cloned into the signal thread.
    pub signal_sender: Sender<SignalMessage>,
    /// Receiver the scheduler sleeps on.
    pub signal_receiver: Receiver<SignalMessage>,
}

impl SignalState {
    /// Build signal state without registering OS handlers.
    ///
    /// Used directly by tests; production code goes through
    /// [`setup_signal_handler`].
    pub fn new() -> Self {
        let (signal_sender, signal_receiver) = channel();
        Self {
            running: Arc::new(AtomicBool::new(true)),
            signal_sender,
            signal_receiver,
        }
    }
}

impl Default for SignalState {
    fn default() -> Self {
        Self::new()
    }
}

/// Register termination signal handlers and spawn the forwarding thread.
pub fn setup_signal_handler(debug_enabled: bool) -> Result<SignalState> {
    let state = SignalState::new();
    let running = Arc::clone(&state.running);
    let sender = state.signal_sender.clone();

    let mut signals =
        Signals::new([SIGINT, SIGTERM, SIGHUP]).context("Failed to register signal handlers")?;

    std::thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            if debug_enabled {
                log_pipe!();
                log_debug!("Received signal {signal}, shutting down");
            }
            running.store(false, Ordering::SeqCst);
            let _ = sender.send(SignalMessage::Shutdown);
        }
    });

    Ok(state)
}

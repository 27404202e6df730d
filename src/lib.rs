//! # Sunswitch Library
//!
//! Internal library for the sunswitch binary.
//!
//! Sunswitch computes daily sunrise/sunset instants for a fixed geographic
//! location and drives a binary GPIO output so it is asserted during night
//! hours and released during day hours, re-arming itself every 24 hours
//! without external supervision. It targets always-on embedded controllers
//! with no time service beyond the host clock.
//!
//! ## Architecture
//!
//! - **Entry Point**: `Sunswitch` struct coordinates resource acquisition
//! - **Solar Math**: `solar` module computes sunrise/sunset instants,
//!   including the polar day/night degenerate case
//! - **Scheduler**: internal `core` module owns the schedule state and the
//!   two self-re-arming one-shot deadlines
//! - **Hardware**: `backend` module abstracts the output line (sysfs GPIO)
//! - **Status**: `display` module renders next-event and last-action fields
//! - **Infrastructure**: configuration, signal handling, instance locking,
//!   logging, and an injectable time source

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod backend;
pub mod config;
pub mod constants;
pub mod core;
pub mod display;
pub mod lock;
pub mod signals;
pub mod solar;
pub mod time_source;

mod sunswitch;

// Re-export for binary
pub use sunswitch::Sunswitch;

//! Main entry point and CLI dispatch.
//!
//! Parses command-line arguments and hands control to the `Sunswitch`
//! coordinator. Everything else lives in the library so the internals stay
//! testable.

use anyhow::Result;

use sunswitch::Sunswitch;
use sunswitch::args::{CliAction, ParsedArgs, display_help, display_version};

fn main() -> Result<()> {
    let parsed = ParsedArgs::parse(std::env::args().skip(1));

    match parsed.action {
        CliAction::Run { debug_enabled } => Sunswitch::new(debug_enabled).run(),
        CliAction::ShowHelp => {
            display_help();
            Ok(())
        }
        CliAction::ShowVersion => {
            display_version();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(sunswitch::constants::EXIT_FAILURE);
        }
    }
}

//! Command-line argument parsing.
//!
//! The daemon has a deliberately small CLI surface: `--debug`, `--help`
//! and `--version`. Unknown options show help instead of being ignored.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon with these settings.
    Run { debug_enabled: bool },
    /// Display help information and exit.
    ShowHelp,
    /// Display version information and exit.
    ShowVersion,
    /// Show help due to unknown arguments and exit with failure.
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;

        for arg in args {
            match arg.as_ref() {
                "-d" | "--debug" => debug_enabled = true,
                "-h" | "--help" => {
                    return ParsedArgs {
                        action: CliAction::ShowHelp,
                    };
                }
                "-V" | "--version" => {
                    return ParsedArgs {
                        action: CliAction::ShowVersion,
                    };
                }
                _ => {
                    return ParsedArgs {
                        action: CliAction::ShowHelpDueToError,
                    };
                }
            }
        }

        ParsedArgs {
            action: CliAction::Run { debug_enabled },
        }
    }
}

/// Print usage information.
pub fn display_help() {
    log_version!();
    log_block_start!("Usage: sunswitch [OPTIONS]");
    log_indented!("-d, --debug      Enable detailed operational logging");
    log_indented!("-h, --help       Show this help and exit");
    log_indented!("-V, --version    Show version and exit");
    log_block_start!(
        "Configuration: $XDG_CONFIG_HOME/sunswitch/sunswitch.toml (created on first run)"
    );
    log_end!();
}

/// Print version information.
pub fn display_version() {
    log_version!();
    log_decorated!("Daylight-driven GPIO switch daemon");
    log_end!();
}

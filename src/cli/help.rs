//! Help text and logging utilities

use crate::cli::args::Cli;
use clap::CommandFactory;

/// Generate help text for the CLI
pub fn generate_help() -> String {
    Cli::command().render_help().to_string()
}

/// Log filter for a `-v` count
pub fn get_log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_levels() {
        assert_eq!(get_log_level(0), "info");
        assert_eq!(get_log_level(1), "debug");
        assert_eq!(get_log_level(4), "trace");
    }

    #[test]
    fn test_help_lists_commands() {
        let help = generate_help();
        for command in ["run", "validate", "operations"] {
            assert!(help.contains(command), "help is missing {command}");
        }
    }
}

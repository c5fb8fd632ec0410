//! Command-line arguments
//!
//! Every flag is optional; values given here override the configuration
//! file, which overrides the built-in defaults.

use crate::core::logging::LOG_LEVELS;
use crate::dispatch::MaxWait;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ses")]
#[command(about = "Prioritised event scheduler demonstration")]
#[command(disable_version_flag = true)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = LOG_LEVELS)]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// More log output (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count)]
    pub quiet: u8,

    /// Force coloured output
    #[arg(long = "color", action = ArgAction::SetTrue, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured output
    #[arg(long = "no-color", action = ArgAction::SetTrue)]
    pub no_color: bool,

    /// Number of greeting messages the demo posts
    #[arg(short = 'n', long = "messages", value_name = "COUNT")]
    pub messages: Option<usize>,

    /// Number of processing brackets the demo runs
    #[arg(short = 'p', long = "passes", value_name = "COUNT")]
    pub passes: Option<usize>,

    /// Lowest priority value processed (0 is most urgent)
    #[arg(long = "from", value_name = "PRIORITY")]
    pub from: Option<u8>,

    /// Highest priority value processed
    #[arg(long = "to", value_name = "PRIORITY")]
    pub to: Option<u8>,

    /// Idle time in milliseconds before a gate holder is reclaimed
    #[arg(long = "gate-timeout", value_name = "MS")]
    pub gate_timeout: Option<u64>,

    /// Admission wait for posts, in milliseconds or "forever"
    #[arg(long = "post-wait", value_name = "MS|forever")]
    pub post_wait: Option<MaxWait>,

    /// Print version and build information
    #[arg(short = 'V', long = "version", action = ArgAction::SetTrue)]
    pub version: bool,
}

impl Args {
    /// Net `-v` minus `-q` count
    pub fn verbosity(&self) -> i8 {
        (self.verbose.min(i8::MAX as u8) as i8) - (self.quiet.min(i8::MAX as u8) as i8)
    }

    /// `Some(true)` for `--color`, `Some(false)` for `--no-color`
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// `Some(None)` when file logging was switched off with `none` or `-`
    pub fn log_file_override(&self) -> Option<Option<PathBuf>> {
        self.log_file.as_ref().map(|path| {
            let text = path.to_string_lossy();
            if text.eq_ignore_ascii_case("none") || text == "-" {
                None
            } else {
                Some(path.clone())
            }
        })
    }
}

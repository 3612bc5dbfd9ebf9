//! CLI module for pulsemap
//!
//! - Argument parsing (`Cli`, `Commands`)
//! - Runtime setup (`setup`)

pub mod setup;

pub use crate::formatting::ColorMode;
pub use crate::io::OutputFormat;
pub use setup::{configure_thread_pool, get_worker_count, init_logging};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pulsemap")]
#[command(about = "Symptom trend, pattern and risk analysis for pulse logs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a pulse log: statistics, patterns and risk
    Analyze {
        /// JSON file containing an array of pulse entries
        path: PathBuf,

        /// Free-text notes to include in the risk assessment
        #[arg(long)]
        notes: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (defaults to the nearest .pulsemap.toml)
        #[arg(short, long, env = "PULSEMAP_CONFIG")]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        plain: bool,

        /// When to color output: auto, always or never
        #[arg(long, value_name = "WHEN", value_parser = parse_color_mode)]
        color: Option<ColorMode>,

        /// Number of worker threads (0 = all cores)
        #[arg(short = 'j', long = "jobs", default_value = "0")]
        jobs: usize,

        /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Assess risk over the most recent entries only
    Risk {
        /// JSON file containing an array of pulse entries
        path: PathBuf,

        /// Free-text notes to include in the risk assessment
        #[arg(long)]
        notes: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Configuration file (defaults to the nearest .pulsemap.toml)
        #[arg(short, long, env = "PULSEMAP_CONFIG")]
        config: Option<PathBuf>,

        /// Disable colored output
        #[arg(long)]
        plain: bool,

        /// When to color output: auto, always or never
        #[arg(long, value_name = "WHEN", value_parser = parse_color_mode)]
        color: Option<ColorMode>,

        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbosity: u8,
    },

    /// Initialize configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

fn parse_color_mode(value: &str) -> Result<ColorMode, String> {
    ColorMode::parse(value)
        .ok_or_else(|| format!("'{}' is not one of auto, always, never", value))
}

/// Parse CLI arguments using Clap
pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_defaults() {
        let cli = Cli::try_parse_from(["pulsemap", "analyze", "entries.json"]).unwrap();
        match cli.command {
            Commands::Analyze {
                path,
                format,
                notes,
                verbosity,
                jobs,
                ..
            } => {
                assert_eq!(path, PathBuf::from("entries.json"));
                assert_eq!(format, OutputFormat::Terminal);
                assert_eq!(notes, None);
                assert_eq!(verbosity, 0);
                assert_eq!(jobs, 0);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_analyze_flags() {
        let cli = Cli::try_parse_from([
            "pulsemap",
            "analyze",
            "log.json",
            "--format",
            "json",
            "--notes",
            "rough week",
            "-vv",
        ])
        .unwrap();
        match cli.command {
            Commands::Analyze {
                format,
                notes,
                verbosity,
                ..
            } => {
                assert_eq!(format, OutputFormat::Json);
                assert_eq!(notes.as_deref(), Some("rough week"));
                assert_eq!(verbosity, 2);
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_color_flag() {
        let cli = Cli::try_parse_from(["pulsemap", "risk", "log.json", "--color", "Always"]).unwrap();
        match cli.command {
            Commands::Risk { color, plain, .. } => {
                assert_eq!(color, Some(ColorMode::Always));
                assert!(!plain);
            }
            _ => panic!("Expected Risk command"),
        }

        let cli = Cli::try_parse_from(["pulsemap", "analyze", "log.json"]).unwrap();
        match cli.command {
            Commands::Analyze { color, .. } => assert_eq!(color, None),
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_unknown_color_rejected() {
        let err = Cli::try_parse_from(["pulsemap", "analyze", "log.json", "--color", "sometimes"])
            .unwrap_err();
        assert!(err.to_string().contains("auto, always, never"));
    }

    #[test]
    fn test_init_force() {
        let cli = Cli::try_parse_from(["pulsemap", "init", "--force"]).unwrap();
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("Expected Init command"),
        }
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(Cli::try_parse_from(["pulsemap", "risk", "log.json", "--format", "xml"]).is_err());
    }
}

use anyhow::Result;
use pulsemap::cli::{self, Commands};
use pulsemap::commands::{self, AnalyzeConfig, RiskCommandConfig};

fn main() -> Result<()> {
    let args = cli::parse_args();

    match args.command {
        Commands::Analyze {
            path,
            notes,
            format,
            output,
            config,
            plain,
            color,
            jobs,
            verbosity,
        } => {
            cli::init_logging(verbosity);
            commands::handle_analyze(AnalyzeConfig {
                path,
                notes,
                format,
                output,
                config,
                plain,
                color,
                jobs,
            })
        }
        Commands::Risk {
            path,
            notes,
            format,
            config,
            plain,
            color,
            verbosity,
        } => {
            cli::init_logging(verbosity);
            commands::handle_risk(RiskCommandConfig {
                path,
                notes,
                format,
                config,
                plain,
                color,
            })
        }
        Commands::Init { force } => {
            cli::init_logging(0);
            commands::init_config(force)
        }
    }
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use stalewatch::commands::{check, run};
use stalewatch::config::DEFAULT_CONFIG_PATH;
use stalewatch::logging::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "stalewatch")]
#[command(about = "Alert on documents stuck in the processing pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level (STALEWATCH_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detector and resolver until interrupted
    Run {
        /// Path to the config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Run one detector cycle and one resolver cycle, then exit
        #[arg(long)]
        once: bool,
    },

    /// Validate the config file and print the query for each category
    Check {
        /// Path to the config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, once } => {
            init_logging(cli.verbose)?;
            run::execute(&config, once)
        }
        Commands::Check { config } => check::execute(&config),
    }
}

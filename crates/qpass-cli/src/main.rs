//! qpass Command-Line Interface
//!
//! Generates passwords from single-qubit measurements.
//!
//! ```text
//! $ qpass generate --length 16
//! $ qpass generate --backend ibm --api-key <key>
//! $ qpass backends
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::IbmArgs;
use commands::{backends, generate, version};

/// qpass - passwords from quantum measurement
#[derive(Parser)]
#[command(name = "qpass")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a password
    Generate {
        /// Password length in characters (8-32)
        #[arg(short, long, default_value = "16", value_parser = clap::value_parser!(u8).range(8..=32))]
        length: u8,

        /// Entropy backend (simulator, ibm)
        #[arg(short, long, default_value = "simulator")]
        backend: String,

        /// Seed for the local simulator
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        ibm: IbmArgs,
    },

    /// List IBM Quantum devices and the least busy one
    Backends {
        #[command(flatten)]
        ibm: IbmArgs,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env must be loaded before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Generate {
            length,
            backend,
            seed,
            ibm,
        } => generate::execute(length, &backend, seed, &ibm).await,

        Commands::Backends { ibm } => backends::execute(&ibm).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

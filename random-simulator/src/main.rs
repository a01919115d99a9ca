use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use random_core::Seed;
use random_simulator::{
    generate_deterministic, generate_uniform_float64, generate_uniform_int64, parse_distribution,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "random-simulator",
    version,
    about = "Generate batches of random draws as CSV for offline analysis"
)]
struct Cli {
    /// Directory that receives the generated CSV files.
    #[arg(long, global = true, default_value = "results")]
    results_dir: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Uniform floats in [0, 1).
    UniformFloat64 {
        #[arg(long)]
        count: u64,
    },
    /// Uniform integers in [min, max].
    UniformInt64 {
        #[arg(long)]
        count: u64,
        #[arg(long)]
        min: i32,
        #[arg(long)]
        max: i32,
    },
    /// Seed-deterministic weighted selections for sequences 0..count.
    Deterministic {
        #[arg(long)]
        count: u64,
        /// 64 hex characters, e.g. 9912f3bcf715a55ae5c9d47f9f6562599912f3bcf715a55ae5c9d47f9f656259.
        #[arg(long, env = "SEED_HEX", hide_env_values = true)]
        seed_hex: String,
        /// Comma separated probabilities, e.g. "0.3, 0.5, 0.2".
        #[arg(long)]
        probabilities: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let path = match cli.command {
        Command::UniformFloat64 { count } => generate_uniform_float64(&cli.results_dir, count)?,
        Command::UniformInt64 { count, min, max } => {
            generate_uniform_int64(&cli.results_dir, count, min, max)?
        }
        Command::Deterministic {
            count,
            seed_hex,
            probabilities,
        } => {
            let seed = Seed::from_hex(&seed_hex)?;
            let distribution = parse_distribution(&probabilities)?;
            generate_deterministic(&cli.results_dir, count, &seed, &distribution)?
        }
    };

    println!("file with results was generated: {}", path.display());
    Ok(())
}

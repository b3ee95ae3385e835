use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod core;
mod coverage;
mod encoding;
mod parsing;
mod utils;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("kmer_coverage=debug,info")
    } else {
        EnvFilter::new("kmer_coverage=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Score(args) => {
            cli::score::run(args)?;
        }
        cli::Commands::Coverage(args) => {
            cli::coverage::run(args, cli.format)?;
        }
        cli::Commands::Table(args) => {
            cli::table::run(args, cli.format)?;
        }
    }

    Ok(())
}

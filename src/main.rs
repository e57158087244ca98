use clap::error::ErrorKind;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use mol_sim::cli;

fn main() -> anyhow::Result<()> {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        // Help is reported as a failed run
        Err(e) if e.kind() == ErrorKind::DisplayHelp => {
            e.print()?;
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("mol_sim=debug,info")
    } else {
        EnvFilter::new("mol_sim=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    cli::search::run(cli.search, cli.format, cli.verbose)
}

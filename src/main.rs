use anyhow::Context;
use clap::Parser;
use sshost::cli::{Cli, Commands};
use sshost::output;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,sshost=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = cli.load_settings().context("failed to load settings")?;

    match &cli.command {
        Commands::Scan(cmd) => cmd.execute(&settings, cli.verbose, cli.quiet).await?,
        Commands::Config(cmd) => cmd.execute(&settings).await?,
        Commands::Resolve(cmd) => cmd.execute(&settings, cli.quiet).await?,
        Commands::Probe(cmd) => cmd.execute(&settings, cli.verbose, cli.quiet).await?,
    }
    Ok(())
}

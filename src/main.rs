use clap::Parser;
use connwatch::cli::{check, simulate, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => check::execute(&args.config)?,
        Commands::Simulate(args) => simulate::execute(&args).await?,
    }

    Ok(())
}

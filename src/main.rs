use asset_forge::{config::Cli, run};
use clap::Parser;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    run(Cli::parse()).await
}

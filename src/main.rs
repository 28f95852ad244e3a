use berth::adapter::inbound::cli::{self, command::Cli};
use clap::Parser;

#[tokio::main]
async fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    cli::execute(Cli::parse()).await
}

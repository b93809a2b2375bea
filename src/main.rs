use clap::Parser;
use user_hub::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Api(args) => cli::api::run(args).await,
        Command::Consumer(args) => cli::consumer::run(args).await,
        Command::Cron(args) => cli::cron::run(args).await,
    }
}

pub mod cli;
pub mod client;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;

use cli::{ Cli, Command };
use std::error::Error;

pub async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    match cli.command {
        Command::Serve(args) => server::run(args).await,
        Command::Chat(args) => client::run(args).await,
    }
}

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli_args;
mod cli_command;
mod modules;
#[cfg(test)]
mod tests;

use crate::cli_args::Cli;
use crate::cli_command::handle_command;
use crate::modules::system::{config_path, FileSettingsStore};

pub(crate) const USER_AGENT: &str = concat!("tokensync/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let client = reqwest::Client::builder()
        .danger_accept_invalid_certs(cli.insecure)
        .user_agent(USER_AGENT)
        .build()?;
    let store = FileSettingsStore::new(config_path()?);
    handle_command(cli, &client, &store).await
}

fn init_logging(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter)?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

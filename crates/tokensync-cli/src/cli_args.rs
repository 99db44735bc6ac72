use clap::{ArgAction, Parser, Subcommand};

pub use crate::modules::host::args::*;
pub use crate::modules::sync::args::*;
pub use crate::modules::system::args::*;

#[derive(Parser)]
#[command(name = "tokensync")]
#[command(about = "Forward host session credentials to a token registry")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub host: HostArgs,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
    #[arg(long, help = "Allow http:// and invalid TLS certificates")]
    pub insecure: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(about = "Collect and print the session cookie, access token and email")]
    Show(ShowArgs),
    #[command(about = "Decode the claims of an access token")]
    Decode(DecodeArgs),
    #[command(about = "Upload the collected credentials to the registry")]
    Sync(SyncArgs),
    Config(ConfigArgs),
}

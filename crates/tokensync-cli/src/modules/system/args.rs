use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    #[command(about = "Print the stored registry settings")]
    Show,
    #[command(about = "Forget the stored registry settings and admin key")]
    Clear,
}

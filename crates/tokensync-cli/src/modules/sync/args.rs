use clap::Args;

#[derive(Args)]
pub struct ShowArgs {
    #[arg(long, help = "Print as JSON")]
    pub json: bool,
}

#[derive(Args)]
pub struct DecodeArgs {
    #[arg(help = "Access token to decode (defaults to the collected one)")]
    pub token: Option<String>,
}

#[derive(Args)]
pub struct SyncArgs {
    #[arg(long, env = "TOKENSYNC_SERVER_URL", help = "Registry base URL")]
    pub server_url: Option<String>,
    #[arg(
        long,
        env = "TOKENSYNC_ADMIN_KEY",
        hide_env_values = true,
        help = "Bearer key for the registry (empty string clears the stored one)"
    )]
    pub admin_key: Option<String>,
    #[arg(long, env = "TOKENSYNC_PROXY_URL", help = "Proxy URL recorded with the token")]
    pub proxy_url: Option<String>,
}

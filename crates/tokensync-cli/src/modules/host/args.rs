use std::path::PathBuf;

use clap::Args;
use tokensync_core::constants::host::DEFAULT_HOST;

#[derive(Args, Clone, Debug)]
pub struct HostArgs {
    #[arg(long, env = "TOKENSYNC_HOST", default_value = DEFAULT_HOST, help = "Host the session belongs to")]
    pub host: String,
    #[arg(
        long,
        env = "TOKENSYNC_COOKIES_FILE",
        help = "Netscape-format cookie jar exported from the browser"
    )]
    pub cookies_file: Option<PathBuf>,
    #[arg(
        long,
        env = "TOKENSYNC_SESSION_TOKEN",
        hide_env_values = true,
        help = "Use this session cookie value instead of reading the cookie jar"
    )]
    pub session_token: Option<String>,
    #[arg(
        long,
        env = "TOKENSYNC_ACCESS_TOKEN",
        hide_env_values = true,
        help = "Use this access token instead of asking the session endpoint"
    )]
    pub access_token: Option<String>,
}

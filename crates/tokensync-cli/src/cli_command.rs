use crate::cli_args::*;
use crate::modules::host::resolve_credential_source;
use crate::modules::sync::{handle_decode, handle_show, handle_sync, SyncContext};
use crate::modules::system::{handle_config_command, FileSettingsStore};

pub(crate) async fn handle_command(
    cli: Cli,
    client: &reqwest::Client,
    store: &FileSettingsStore,
) -> anyhow::Result<()> {
    if let Command::Config(args) = cli.command {
        return handle_config_command(args, store);
    }

    let source = resolve_credential_source(&cli.host, client, cli.insecure)?;
    let ctx = SyncContext {
        client,
        source: source.as_ref(),
        store,
        allow_insecure: cli.insecure,
    };

    match cli.command {
        Command::Show(args) => handle_show(args, &ctx).await?,
        Command::Decode(args) => handle_decode(args, &ctx).await?,
        Command::Sync(args) => handle_sync(args, &ctx).await?,
        Command::Config(_) => unreachable!(),
    }

    Ok(())
}

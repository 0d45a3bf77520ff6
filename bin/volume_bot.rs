//! Sends randomized native-currency transfers from every configured wallet
//! to throwaway addresses, then reports the totals.

use clap::Parser;
use init4_bin_base::utils::{from_env::FromEnv, metrics::init_metrics, tracing::init_tracing};
use std::path::PathBuf;
use tracing::{info, warn};
use volume::{
    bot::Bot, config::BotConfig, notify::TelegramNotifier, provider::RpcConnector,
    wallet::WalletSet,
};

#[derive(Parser, Debug)]
#[command(about = "Send randomized transfers from a set of EVM wallets")]
struct Args {
    /// Dotenv file holding the configuration and private keys.
    /// A missing file is ignored.
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
    /// Print wallet balances and exit without sending anything.
    #[arg(long, default_value_t = false)]
    balances_only: bool,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = Args::parse();

    // load before tracing so RUST_LOG may come from the file
    let env_file = dotenv::from_path(&args.env_file);
    let _guard = init_tracing();
    init_metrics();
    match env_file {
        Ok(()) => info!(path = %args.env_file.display(), "loaded env file"),
        Err(err) if err.not_found() => {}
        Err(err) => warn!(path = %args.env_file.display(), %err, "failed to read env file"),
    }

    let config = BotConfig::from_env()?;
    let notifier = TelegramNotifier::new(
        config.telegram_bot_token.clone(),
        config.telegram_chat_id.clone(),
    )?;
    let connector = RpcConnector::new(config.rpc_url.clone(), config.chain_id);

    Bot::new(&config, connector, &notifier)
        .run(WalletSet::from_env, args.balances_only)
        .await?;
    Ok(())
}

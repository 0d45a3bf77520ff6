use crate::{amount::AmountRange, pacing::DelayRange, provider::DEFAULT_RECEIPT_TIMEOUT};
use eyre::{WrapErr, ensure};
use init4_bin_base::utils::from_env::FromEnv;
use std::time::Duration;

/// Configuration for the transfer bot, read from the environment.
///
/// Private keys are not part of this struct, see
/// [`WalletSet::from_env`](crate::wallet::WalletSet::from_env).
#[derive(Debug, Clone, FromEnv)]
pub struct BotConfig {
    /// The RPC URL of the target chain.
    #[from_env(var = "RPC_URL", desc = "RPC URL of the target chain")]
    pub rpc_url: String,
    /// Chain id the RPC is expected to serve.
    #[from_env(var = "CHAIN_ID", desc = "Expected chain id of the RPC")]
    pub chain_id: u64,
    /// Block explorer base URL, used to print transaction links.
    #[from_env(var = "EXPLORER_URL", desc = "Block explorer base URL")]
    pub explorer_url: String,
    /// Transfers to send from each wallet.
    #[from_env(var = "TX_COUNT", desc = "Number of transfers per wallet")]
    pub tx_count: u64,
    /// Smallest transfer amount, in ether.
    #[from_env(var = "MIN_AMOUNT", desc = "Minimum transfer amount, in ether")]
    pub min_amount: String,
    /// Largest transfer amount, in ether.
    #[from_env(var = "MAX_AMOUNT", desc = "Maximum transfer amount, in ether")]
    pub max_amount: String,
    /// Shortest pause between transfers of one wallet, in ms.
    #[from_env(var = "MIN_TX_DELAY", desc = "Minimum pause between transfers, in ms")]
    pub min_tx_delay: u64,
    /// Longest pause between transfers of one wallet, in ms.
    #[from_env(var = "MAX_TX_DELAY", desc = "Maximum pause between transfers, in ms")]
    pub max_tx_delay: u64,
    /// Shortest pause between wallets, in ms.
    #[from_env(var = "MIN_WALLET_DELAY", desc = "Minimum pause between wallets, in ms")]
    pub min_wallet_delay: u64,
    /// Longest pause between wallets, in ms.
    #[from_env(var = "MAX_WALLET_DELAY", desc = "Maximum pause between wallets, in ms")]
    pub max_wallet_delay: u64,
    /// Seconds to wait for a transaction receipt. Defaults to 240.
    #[from_env(
        var = "RECEIPT_TIMEOUT",
        desc = "Seconds to wait for a transaction receipt",
        optional
    )]
    pub receipt_timeout: Option<u64>,
    /// Telegram bot token. Notifications are disabled without it.
    #[from_env(
        var = "TELEGRAM_BOT_TOKEN",
        desc = "Telegram bot token for run reports",
        optional
    )]
    pub telegram_bot_token: Option<String>,
    /// Telegram chat to report to. Notifications are disabled without it.
    #[from_env(
        var = "TELEGRAM_CHAT_ID",
        desc = "Telegram chat id for run reports",
        optional
    )]
    pub telegram_chat_id: Option<String>,
}

/// Validated batch parameters derived from [`BotConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    /// Transfers per wallet, at least 1.
    pub tx_count: u64,
    /// Transfer amount range.
    pub amount: AmountRange,
    /// Pause between transfers of one wallet.
    pub tx_delay: DelayRange,
    /// Pause between wallets.
    pub wallet_delay: DelayRange,
    /// Time to wait for each receipt.
    pub receipt_timeout: Duration,
}

impl BotConfig {
    /// Validate the numeric settings. Inverted ranges, unparseable amounts
    /// and a zero transfer count are errors.
    pub fn batch_settings(&self) -> eyre::Result<BatchSettings> {
        ensure!(self.tx_count > 0, "TX_COUNT must be at least 1");

        let amount = AmountRange::parse(&self.min_amount, &self.max_amount)
            .wrap_err("invalid MIN_AMOUNT/MAX_AMOUNT")?;
        let tx_delay = DelayRange::from_millis(self.min_tx_delay, self.max_tx_delay)
            .wrap_err("invalid MIN_TX_DELAY/MAX_TX_DELAY")?;
        let wallet_delay = DelayRange::from_millis(self.min_wallet_delay, self.max_wallet_delay)
            .wrap_err("invalid MIN_WALLET_DELAY/MAX_WALLET_DELAY")?;
        let receipt_timeout = self
            .receipt_timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RECEIPT_TIMEOUT);

        Ok(BatchSettings {
            tx_count: self.tx_count,
            amount,
            tx_delay,
            wallet_delay,
            receipt_timeout,
        })
    }
}

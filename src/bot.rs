use crate::{
    chain::ChainClient,
    config::BotConfig,
    driver::{BatchDriver, BatchResult},
    executor::TransferExecutor,
    notify::{Notifier, fatal_report},
    wallet::WalletSet,
};
use init4_bin_base::deps::tracing::{error, info, instrument};
use std::time::Duration;

/// How the bot reaches the chain.
pub trait Connector {
    /// Client used once the wallets are loaded.
    type Client: ChainClient;

    /// Check that the node answers, returning the latest block number.
    fn check_connectivity(&self) -> impl Future<Output = eyre::Result<u64>> + Send;

    /// Connect a client able to sign for every wallet in `wallets`.
    fn connect(
        &self,
        wallets: &WalletSet,
        receipt_timeout: Duration,
    ) -> impl Future<Output = eyre::Result<Self::Client>> + Send;
}

/// One run of the bot, from connectivity check to final report.
#[derive(Debug)]
pub struct Bot<'a, K, N> {
    config: &'a BotConfig,
    connector: K,
    notifier: &'a N,
}

impl<'a, K, N> Bot<'a, K, N>
where
    K: Connector,
    N: Notifier,
{
    /// Create a bot.
    pub const fn new(config: &'a BotConfig, connector: K, notifier: &'a N) -> Self {
        Self {
            config,
            connector,
            notifier,
        }
    }

    /// Run the whole sequence. Wallets come from `load_wallets`, called once
    /// the node has answered.
    ///
    /// With `balances_only` the run stops after the balance display and
    /// returns `None`. Any fatal error is logged and reported through the
    /// notifier before it is returned.
    pub async fn run<L>(
        &self,
        load_wallets: L,
        balances_only: bool,
    ) -> eyre::Result<Option<BatchResult>>
    where
        L: FnOnce() -> eyre::Result<WalletSet>,
    {
        match self.try_run(load_wallets, balances_only).await {
            Ok(result) => Ok(result),
            Err(err) => {
                let message = format!("{err:#}");
                error!(error = %message, "fatal error, stopping");
                self.notifier.notify(&fatal_report(&message)).await;
                Err(err)
            }
        }
    }

    #[instrument(skip_all, fields(chain_id = self.config.chain_id))]
    async fn try_run<L>(
        &self,
        load_wallets: L,
        balances_only: bool,
    ) -> eyre::Result<Option<BatchResult>>
    where
        L: FnOnce() -> eyre::Result<WalletSet>,
    {
        info!("bot starting");
        let settings = self.config.batch_settings()?;

        self.connector.check_connectivity().await?;

        let wallets = load_wallets()?;
        let client = self
            .connector
            .connect(&wallets, settings.receipt_timeout)
            .await?;

        wallets.log_balances(&client).await;
        if balances_only {
            return Ok(None);
        }

        let executor = TransferExecutor::new(&client, settings.amount)
            .with_explorer_url(self.config.explorer_url.clone());
        let result = BatchDriver::new(executor, self.notifier, settings)
            .run(&wallets)
            .await;

        info!("bot finished all tasks");
        Ok(Some(result))
    }
}

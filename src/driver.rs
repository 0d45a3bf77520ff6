use crate::{
    chain::ChainClient,
    config::BatchSettings,
    executor::{TransferExecutor, TransferOutcome},
    notify::{Notifier, batch_report},
    wallet::WalletSet,
};
use chrono::Utc;
use init4_bin_base::deps::tracing::{info, instrument, warn};

/// Transfer tallies for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// Confirmed transfers.
    pub success: u64,
    /// Transfers that were skipped or failed.
    pub failed: u64,
}

impl BatchResult {
    /// Count one outcome.
    pub const fn record(&mut self, outcome: &TransferOutcome) {
        if outcome.is_success() {
            self.success += 1;
        } else {
            self.failed += 1;
        }
    }

    /// Total transfers attempted.
    pub const fn total(&self) -> u64 {
        self.success + self.failed
    }
}

/// Runs the configured number of transfers for every wallet, one at a time.
///
/// Each transfer is fully confirmed (or failed) before the next one is built,
/// so the provider's nonce tracking never sees two pending transfers from the
/// same wallet.
#[derive(Debug)]
pub struct BatchDriver<'a, C, N> {
    executor: TransferExecutor<'a, C>,
    notifier: &'a N,
    settings: BatchSettings,
}

impl<'a, C, N> BatchDriver<'a, C, N>
where
    C: ChainClient,
    N: Notifier,
{
    /// Create a driver.
    pub const fn new(
        executor: TransferExecutor<'a, C>,
        notifier: &'a N,
        settings: BatchSettings,
    ) -> Self {
        Self {
            executor,
            notifier,
            settings,
        }
    }

    /// Send `tx_count` transfers from each wallet in order, pausing between
    /// transfers and between wallets, then report the totals.
    ///
    /// No pause follows the last transfer of a wallet or the last wallet.
    #[instrument(skip_all, fields(wallets = wallets.len(), tx_count = self.settings.tx_count))]
    pub async fn run(&self, wallets: &WalletSet) -> BatchResult {
        info!("starting transfer batch");

        let mut result = BatchResult::default();
        let total = wallets.len();

        for (position, wallet) in wallets.iter().enumerate() {
            info!(
                wallet = wallet.index(),
                total,
                address = %wallet.address(),
                "processing wallet"
            );

            for slot in 1..=self.settings.tx_count {
                let outcome = self.executor.send(wallet).await;
                result.record(&outcome);

                if slot < self.settings.tx_count {
                    self.settings.tx_delay.pause().await;
                }
            }

            if position + 1 < total {
                info!("pausing before next wallet");
                self.settings.wallet_delay.pause().await;
            }
        }

        info!(success = result.success, "all transfers finished");
        if result.failed > 0 {
            warn!(failed = result.failed, "some transfers failed");
        }

        self.notifier
            .notify(&batch_report(total, result, Utc::now()))
            .await;

        result
    }
}

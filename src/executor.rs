use crate::{
    amount::{AmountRange, display_ether},
    chain::{ChainClient, TRANSFER_GAS_LIMIT, TransferRequest},
    wallet::{Wallet, short_address},
};
use alloy::{
    primitives::{Address, TxHash, U256},
    signers::local::PrivateKeySigner,
};
use eyre::eyre;
use init4_bin_base::deps::{
    metrics::{counter, histogram},
    tracing::{error, info, instrument, warn},
};
use std::{fmt, time::Instant};

/// Longest error message logged for a failed transfer, in characters.
const MAX_ERROR_LEN: usize = 100;

/// Why a transfer did not go through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferFailure {
    /// The wallet cannot cover the amount plus the worst-case gas cost.
    /// Nothing was submitted.
    InsufficientFunds {
        /// Wallet balance, in wei.
        balance: U256,
        /// Amount plus gas budget, in wei.
        required: U256,
    },
    /// A fee query, balance query, submission or receipt wait failed.
    Rejected(String),
}

impl fmt::Display for TransferFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientFunds { .. } => f.write_str("insufficient funds"),
            Self::Rejected(message) => f.write_str(message),
        }
    }
}

/// Result of one transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The transfer was included and its receipt reports success.
    Confirmed {
        /// Value sent, in wei.
        amount: U256,
        /// Transaction hash.
        tx_hash: TxHash,
    },
    /// The transfer was not confirmed.
    Failed(TransferFailure),
}

impl TransferOutcome {
    /// True for [`TransferOutcome::Confirmed`].
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// Sends single randomized transfers from a wallet to throwaway addresses.
#[derive(Debug)]
pub struct TransferExecutor<'a, C> {
    client: &'a C,
    amount: AmountRange,
    explorer_url: Option<String>,
}

impl<'a, C> TransferExecutor<'a, C>
where
    C: ChainClient,
{
    /// Create an executor drawing amounts from `amount`.
    pub const fn new(client: &'a C, amount: AmountRange) -> Self {
        Self {
            client,
            amount,
            explorer_url: None,
        }
    }

    /// Log a block explorer link for every confirmed transfer.
    pub fn with_explorer_url(mut self, explorer_url: impl Into<String>) -> Self {
        self.explorer_url = Some(explorer_url.into());
        self
    }

    /// Send one transfer of a random amount from `wallet` to a freshly
    /// generated address whose key is discarded.
    ///
    /// Never returns an error: every failure becomes
    /// [`TransferOutcome::Failed`].
    #[instrument(skip_all, fields(wallet = wallet.index()))]
    pub async fn send(&self, wallet: &Wallet) -> TransferOutcome {
        let to = PrivateKeySigner::random().address();
        let amount = self.amount.sample(&mut rand::thread_rng());

        match self.try_send(wallet, to, amount).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = truncate(&format!("{err:#}"), MAX_ERROR_LEN);
                error!(error = %message, "transfer failed");
                counter!("volume_bot.tx_failed").increment(1);
                TransferOutcome::Failed(TransferFailure::Rejected(message))
            }
        }
    }

    async fn try_send(
        &self,
        wallet: &Wallet,
        to: Address,
        amount: U256,
    ) -> eyre::Result<TransferOutcome> {
        let fees = self.client.fee_data().await?;
        let balance = self.client.balance(wallet.address()).await?;

        let gas_budget = fees
            .gas_budget(TRANSFER_GAS_LIMIT)
            .ok_or_else(|| eyre!("fee data has neither a max fee nor a gas price"))?;
        let required = amount + gas_budget;
        if balance < required {
            warn!(
                balance = %display_ether(balance),
                amount = %display_ether(amount),
                gas_budget = %display_ether(gas_budget),
                "insufficient funds for transfer plus gas"
            );
            counter!("volume_bot.tx_underfunded").increment(1);
            return Ok(TransferOutcome::Failed(
                TransferFailure::InsufficientFunds { balance, required },
            ));
        }

        info!(
            amount = %display_ether(amount),
            to = %short_address(&to),
            "sending transfer"
        );
        let dispatched = Instant::now();
        let receipt = self
            .client
            .send_transfer(TransferRequest {
                from: wallet.address(),
                to,
                value: amount,
                fees,
            })
            .await?;

        histogram!("volume_bot.tx_confirm_time").record(dispatched.elapsed().as_secs_f64());
        counter!("volume_bot.tx_confirmed").increment(1);
        match &self.explorer_url {
            Some(base) => info!(
                tx_hash = %receipt.tx_hash,
                block_number = receipt.block_number,
                link = %format!("{}/tx/{}", base.trim_end_matches('/'), receipt.tx_hash),
                "transfer confirmed"
            ),
            None => info!(
                tx_hash = %receipt.tx_hash,
                block_number = receipt.block_number,
                "transfer confirmed"
            ),
        }

        Ok(TransferOutcome::Confirmed {
            amount,
            tx_hash: receipt.tx_hash,
        })
    }
}

fn truncate(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}

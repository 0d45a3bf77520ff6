use crate::{
    bot::Connector,
    chain::{ChainClient, FeeData, TRANSFER_GAS_LIMIT, TransferReceipt, TransferRequest},
    wallet::WalletSet,
};
use alloy::{
    network::{Ethereum, EthereumWallet, TransactionBuilder},
    primitives::{Address, U256},
    providers::{
        Identity, Provider, ProviderBuilder, RootProvider,
        fillers::{
            ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller, SimpleNonceManager,
            WalletFiller,
        },
    },
    rpc::types::TransactionRequest,
};
use eyre::{WrapErr, bail, eyre};
use init4_bin_base::deps::tracing::{debug, info, warn};
use std::time::Duration;
use tokio::time::timeout;

/// Default time to wait for a transaction receipt.
pub const DEFAULT_RECEIPT_TIMEOUT: Duration = Duration::from_secs(240);

/// Filler stack of [`TxSenderProvider`]. Nonces are fetched from the node
/// for every transaction and never cached locally.
pub type TxSenderFillers = JoinFill<
    JoinFill<
        JoinFill<JoinFill<Identity, GasFiller>, NonceFiller<SimpleNonceManager>>,
        ChainIdFiller,
    >,
    WalletFiller<EthereumWallet>,
>;

/// Type alias for the provider used to sign and send transfers.
pub type TxSenderProvider = FillProvider<TxSenderFillers, RootProvider, Ethereum>;

/// Builder for a [`TxSenderProvider`] signing with every signer held by
/// `wallet`.
pub fn sender_builder(wallet: EthereumWallet) -> ProviderBuilder<Identity, TxSenderFillers> {
    ProviderBuilder::new()
        .disable_recommended_fillers()
        .with_gas_estimation()
        .with_nonce_management(SimpleNonceManager::default())
        .fetch_chain_id()
        .wallet(wallet)
}

/// Connect a provider capable of filling and sending transactions for every
/// signer held by `wallet`.
pub async fn connect_provider(
    wallet: EthereumWallet,
    rpc_url: &str,
) -> eyre::Result<TxSenderProvider> {
    sender_builder(wallet)
        .connect(rpc_url)
        .await
        .map_err(Into::into)
}

/// Check that the node at `rpc_url` answers, returning the latest block
/// number. A chain id other than `expected_chain_id` is only warned about.
pub async fn check_connectivity(rpc_url: &str, expected_chain_id: u64) -> eyre::Result<u64> {
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .connect(rpc_url)
        .await?;

    let block_number = provider.get_block_number().await?;
    match provider.get_chain_id().await {
        Ok(chain_id) if chain_id != expected_chain_id => {
            warn!(chain_id, expected_chain_id, "node reports an unexpected chain id");
        }
        Ok(_) => {}
        Err(error) => warn!(%error, "failed to fetch chain id"),
    }

    Ok(block_number)
}

/// [`Connector`] for a JSON-RPC node.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    rpc_url: String,
    chain_id: u64,
}

impl RpcConnector {
    /// Connector for the node at `rpc_url`, expected to serve `chain_id`.
    pub const fn new(rpc_url: String, chain_id: u64) -> Self {
        Self { rpc_url, chain_id }
    }
}

impl Connector for RpcConnector {
    type Client = RpcChainClient;

    async fn check_connectivity(&self) -> eyre::Result<u64> {
        let block_number = check_connectivity(&self.rpc_url, self.chain_id)
            .await
            .wrap_err_with(|| format!("RPC connection to {} failed", self.rpc_url))?;
        info!(block_number, rpc_url = %self.rpc_url, "connected to RPC");
        Ok(block_number)
    }

    async fn connect(
        &self,
        wallets: &WalletSet,
        receipt_timeout: Duration,
    ) -> eyre::Result<RpcChainClient> {
        let provider = connect_provider(wallets.ethereum_wallet(), &self.rpc_url).await?;
        Ok(RpcChainClient::new(provider, receipt_timeout))
    }
}

/// Build the transaction for a transfer: fixed 21000 gas, EIP-1559 pricing
/// when a max fee is known, legacy pricing otherwise.
pub fn transfer_transaction(transfer: &TransferRequest) -> eyre::Result<TransactionRequest> {
    let tx = TransactionRequest::default()
        .with_from(transfer.from)
        .with_to(transfer.to)
        .with_value(transfer.value)
        .with_gas_limit(TRANSFER_GAS_LIMIT);

    let fees = transfer.fees;
    match (fees.max_fee_per_gas, fees.gas_price) {
        (Some(max_fee), _) => Ok(tx
            .with_max_fee_per_gas(max_fee)
            .with_max_priority_fee_per_gas(fees.max_priority_fee_per_gas.unwrap_or_default())),
        (None, Some(gas_price)) => Ok(tx.with_gas_price(gas_price)),
        (None, None) => bail!("no fee data available to price the transfer"),
    }
}

/// [`ChainClient`] backed by an alloy provider.
#[derive(Debug, Clone)]
pub struct RpcChainClient {
    provider: TxSenderProvider,
    receipt_timeout: Duration,
}

impl RpcChainClient {
    /// Wrap a connected provider. Receipt waits give up after `receipt_timeout`.
    pub const fn new(provider: TxSenderProvider, receipt_timeout: Duration) -> Self {
        Self {
            provider,
            receipt_timeout,
        }
    }
}

impl ChainClient for RpcChainClient {
    async fn balance(&self, address: Address) -> eyre::Result<U256> {
        self.provider.get_balance(address).await.map_err(Into::into)
    }

    async fn fee_data(&self) -> eyre::Result<FeeData> {
        let gas_price = self.provider.get_gas_price().await?;

        // pre-London chains have no base fee to estimate from
        let (max_fee_per_gas, max_priority_fee_per_gas) =
            match self.provider.estimate_eip1559_fees().await {
                Ok(estimate) => (
                    Some(estimate.max_fee_per_gas),
                    Some(estimate.max_priority_fee_per_gas),
                ),
                Err(error) => {
                    debug!(%error, "EIP-1559 fee estimation unavailable, using gas price");
                    (None, None)
                }
            };

        Ok(FeeData {
            gas_price: Some(gas_price),
            max_fee_per_gas,
            max_priority_fee_per_gas,
        })
    }

    async fn send_transfer(&self, transfer: TransferRequest) -> eyre::Result<TransferReceipt> {
        let tx = transfer_transaction(&transfer)?;
        debug!(?tx, "constructed transaction");

        let pending = self.provider.send_transaction(tx).await?;
        let tx_hash = *pending.tx_hash();
        debug!(%tx_hash, "transaction sent");

        let receipt = timeout(self.receipt_timeout, pending.get_receipt())
            .await
            .map_err(|_| eyre!("timeout waiting for receipt of {tx_hash}"))??;
        if !receipt.status() {
            bail!("transaction {tx_hash} reverted");
        }

        Ok(TransferReceipt {
            tx_hash,
            block_number: receipt.block_number,
        })
    }
}

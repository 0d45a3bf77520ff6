use alloy::primitives::{Address, TxHash, U256};

/// Gas used by a plain native-currency transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Current network pricing, in wei per gas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeeData {
    /// Legacy gas price.
    pub gas_price: Option<u128>,
    /// EIP-1559 max fee per gas.
    pub max_fee_per_gas: Option<u128>,
    /// EIP-1559 max priority fee per gas.
    pub max_priority_fee_per_gas: Option<u128>,
}

impl FeeData {
    /// The per-gas price used to budget a transfer: the EIP-1559 max fee if
    /// known, the legacy gas price otherwise.
    pub fn fee_per_gas(&self) -> Option<u128> {
        self.max_fee_per_gas.or(self.gas_price)
    }

    /// Worst-case cost of `gas_limit` gas at [`Self::fee_per_gas`].
    pub fn gas_budget(&self, gas_limit: u64) -> Option<U256> {
        self.fee_per_gas()
            .map(|fee| U256::from(gas_limit) * U256::from(fee))
    }
}

/// A native-currency transfer ready to be signed and submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Sending wallet. Must be one of the signers known to the client.
    pub from: Address,
    /// Destination address.
    pub to: Address,
    /// Value in wei.
    pub value: U256,
    /// Pricing to submit with.
    pub fees: FeeData,
}

/// Confirmation of an included transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Transaction hash.
    pub tx_hash: TxHash,
    /// Block the transaction was included in, if reported.
    pub block_number: Option<u64>,
}

/// The chain operations the transfer pipeline needs.
///
/// One client is shared by every wallet; it signs with whichever signer
/// matches [`TransferRequest::from`].
pub trait ChainClient {
    /// Balance of `address` in wei.
    fn balance(&self, address: Address) -> impl Future<Output = eyre::Result<U256>> + Send;

    /// Current fee data.
    fn fee_data(&self) -> impl Future<Output = eyre::Result<FeeData>> + Send;

    /// Sign and submit a transfer, then wait for its receipt.
    fn send_transfer(
        &self,
        transfer: TransferRequest,
    ) -> impl Future<Output = eyre::Result<TransferReceipt>> + Send;
}

impl<C: ChainClient> ChainClient for &C {
    fn balance(&self, address: Address) -> impl Future<Output = eyre::Result<U256>> + Send {
        (**self).balance(address)
    }

    fn fee_data(&self) -> impl Future<Output = eyre::Result<FeeData>> + Send {
        (**self).fee_data()
    }

    fn send_transfer(
        &self,
        transfer: TransferRequest,
    ) -> impl Future<Output = eyre::Result<TransferReceipt>> + Send {
        (**self).send_transfer(transfer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_prefers_max_fee_over_gas_price() {
        let fees = FeeData {
            gas_price: Some(3),
            max_fee_per_gas: Some(5),
            max_priority_fee_per_gas: Some(1),
        };
        assert_eq!(fees.gas_budget(TRANSFER_GAS_LIMIT), Some(U256::from(105_000)));
    }

    #[test]
    fn budget_falls_back_to_gas_price() {
        let fees = FeeData {
            gas_price: Some(3),
            ..Default::default()
        };
        assert_eq!(fees.gas_budget(TRANSFER_GAS_LIMIT), Some(U256::from(63_000)));
        assert_eq!(FeeData::default().gas_budget(TRANSFER_GAS_LIMIT), None);
    }
}

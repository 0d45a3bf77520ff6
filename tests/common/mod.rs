#![allow(dead_code)]

use alloy::primitives::{B256, U256};
use eyre::eyre;
use init4_bin_base::deps::metrics::{
    Counter, Gauge, Histogram, Key, KeyName, Metadata, Recorder, SharedString, Unit,
};
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, AtomicUsize, Ordering},
    },
    time::Duration,
};
use volume::{
    bot::Connector,
    chain::{ChainClient, FeeData, TransferReceipt, TransferRequest},
    notify::Notifier,
    wallet::WalletSet,
};

pub const KEY_1: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
pub const KEY_2: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

pub const GWEI: u128 = 1_000_000_000;

pub fn wallets(keys: &[&str]) -> WalletSet {
    WalletSet::from_list(&keys.join(",")).unwrap()
}

pub fn eip1559_fees(max_fee_per_gas: u128) -> FeeData {
    FeeData {
        gas_price: Some(max_fee_per_gas / 2),
        max_fee_per_gas: Some(max_fee_per_gas),
        max_priority_fee_per_gas: Some(GWEI),
    }
}

/// In-memory chain with a fixed balance for every address.
#[derive(Debug)]
pub struct MockChain {
    balance: U256,
    fees: FeeData,
    fail_fee_data: bool,
    fail_sends: bool,
    balance_queries: AtomicUsize,
    sent: Mutex<Vec<TransferRequest>>,
}

impl MockChain {
    pub fn new(balance: U256, fees: FeeData) -> Self {
        Self {
            balance,
            fees,
            fail_fee_data: false,
            fail_sends: false,
            balance_queries: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_fee_data(mut self) -> Self {
        self.fail_fee_data = true;
        self
    }

    pub fn rejecting_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn sent(&self) -> Vec<TransferRequest> {
        self.sent.lock().unwrap().clone()
    }

    pub fn balance_queries(&self) -> usize {
        self.balance_queries.load(Ordering::SeqCst)
    }
}

impl ChainClient for MockChain {
    async fn balance(&self, _address: alloy::primitives::Address) -> eyre::Result<U256> {
        self.balance_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.balance)
    }

    async fn fee_data(&self) -> eyre::Result<FeeData> {
        if self.fail_fee_data {
            return Err(eyre!("connection refused"));
        }
        Ok(self.fees)
    }

    async fn send_transfer(&self, transfer: TransferRequest) -> eyre::Result<TransferReceipt> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(transfer);
        if self.fail_sends {
            return Err(eyre!("nonce too low"));
        }
        Ok(TransferReceipt {
            tx_hash: B256::with_last_byte(sent.len() as u8),
            block_number: Some(100 + sent.len() as u64),
        })
    }
}

/// Notifier that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify(&self, text: &str) {
        self.messages.lock().unwrap().push(text.to_string());
    }
}

/// Connector handing out a shared [`MockChain`].
#[derive(Debug)]
pub struct MockConnector<'a> {
    chain: &'a MockChain,
    reachable: bool,
    connects: AtomicUsize,
}

impl<'a> MockConnector<'a> {
    pub fn new(chain: &'a MockChain) -> Self {
        Self {
            chain,
            reachable: true,
            connects: AtomicUsize::new(0),
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

impl<'a> Connector for &MockConnector<'a> {
    type Client = &'a MockChain;

    async fn check_connectivity(&self) -> eyre::Result<u64> {
        if !self.reachable {
            return Err(eyre!("RPC connection to http://localhost:8545 failed"));
        }
        Ok(100)
    }

    async fn connect(
        &self,
        _wallets: &WalletSet,
        _receipt_timeout: Duration,
    ) -> eyre::Result<&'a MockChain> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(self.chain)
    }
}

/// Metrics recorder that keeps counter totals and histogram names.
#[derive(Debug, Default)]
pub struct CountingRecorder {
    counters: Mutex<HashMap<String, Arc<AtomicU64>>>,
    histograms: Mutex<Vec<String>>,
}

impl CountingRecorder {
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .lock()
            .unwrap()
            .get(name)
            .map_or(0, |count| count.load(Ordering::SeqCst))
    }

    pub fn histograms(&self) -> Vec<String> {
        self.histograms.lock().unwrap().clone()
    }
}

impl Recorder for CountingRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {}

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> Counter {
        let count = self
            .counters
            .lock()
            .unwrap()
            .entry(key.name().to_string())
            .or_default()
            .clone();
        Counter::from_arc(count)
    }

    fn register_gauge(&self, _key: &Key, _metadata: &Metadata<'_>) -> Gauge {
        Gauge::noop()
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> Histogram {
        self.histograms.lock().unwrap().push(key.name().to_string());
        Histogram::noop()
    }
}

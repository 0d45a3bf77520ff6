//! Randomized native-currency transfer driver for EVM chains.

#![warn(
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    clippy::missing_const_for_fn,
    rustdoc::all
)]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![deny(unused_must_use, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

/// Transfer amount ranges.
pub mod amount;

/// Run sequence from connectivity check to final report.
pub mod bot;

/// Chain access used by the transfer pipeline.
pub mod chain;

/// Environment configuration.
pub mod config;

/// Sequential batch of transfers across all wallets.
pub mod driver;

/// Single transfer execution.
pub mod executor;

/// Run reports over Telegram.
pub mod notify;

/// Randomized pauses.
pub mod pacing;

/// Provider capable of filling and sending transactions.
pub mod provider;

/// Wallet loading.
pub mod wallet;

// used by the binary only
use clap as _;
use dotenv as _;
use tracing as _;

use alloy::primitives::{
    U256,
    utils::{format_ether, parse_ether},
};
use eyre::{WrapErr, ensure, eyre};
use rand::Rng;

/// Number of decimal places kept on a sampled transfer amount.
pub const AMOUNT_DECIMALS: u32 = 8;

/// Wei in the smallest representable step of a sampled amount (10^-8 ether).
const WEI_PER_STEP: u64 = 10_000_000_000;

/// Inclusive range of transfer amounts, stored in steps of 10^-8 ether.
///
/// Sampling is uniform over the steps, so every sampled value is a multiple
/// of 10^10 wei and has at most [`AMOUNT_DECIMALS`] decimal places when
/// expressed in ether.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountRange {
    min_steps: u64,
    max_steps: u64,
}

impl AmountRange {
    /// Parse a range from decimal ether strings, e.g. `"0.001"` and `"0.0025"`.
    ///
    /// Bounds with more than 8 decimals are rounded inward. Fails if either
    /// bound is not a valid ether amount, if `min > max`, or if no 8-decimal
    /// value falls inside the range.
    pub fn parse(min: &str, max: &str) -> eyre::Result<Self> {
        let min_wei =
            parse_ether(min.trim()).wrap_err_with(|| format!("invalid min amount {min:?}"))?;
        let max_wei =
            parse_ether(max.trim()).wrap_err_with(|| format!("invalid max amount {max:?}"))?;
        ensure!(
            min_wei <= max_wei,
            "min amount {min} is greater than max amount {max}"
        );

        let step = U256::from(WEI_PER_STEP);
        let mut min_steps = min_wei / step;
        if min_wei % step != U256::ZERO {
            min_steps += U256::from(1);
        }
        let max_steps = max_wei / step;
        ensure!(
            min_steps <= max_steps,
            "amount range [{min}, {max}] holds no value with at most {AMOUNT_DECIMALS} decimals"
        );

        Ok(Self {
            min_steps: u64::try_from(min_steps)
                .map_err(|_| eyre!("min amount {min} is too large"))?,
            max_steps: u64::try_from(max_steps)
                .map_err(|_| eyre!("max amount {max} is too large"))?,
        })
    }

    /// Lower bound in wei.
    pub fn min_wei(&self) -> U256 {
        U256::from(self.min_steps) * U256::from(WEI_PER_STEP)
    }

    /// Upper bound in wei.
    pub fn max_wei(&self) -> U256 {
        U256::from(self.max_steps) * U256::from(WEI_PER_STEP)
    }

    /// Draw an amount in wei.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> U256 {
        let steps = rng.gen_range(self.min_steps..=self.max_steps);
        U256::from(steps) * U256::from(WEI_PER_STEP)
    }
}

/// Format a wei value as ether without trailing zeros, e.g. `0.00125`.
pub fn display_ether(wei: U256) -> String {
    let formatted = format_ether(wei);
    match formatted.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                whole.to_string()
            } else {
                format!("{whole}.{frac}")
            }
        }
        None => formatted,
    }
}

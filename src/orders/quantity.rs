//! Dollar amount -> asset quantity conversion.
//!
//! All arithmetic stays in `Decimal`. The exchange rejects quantities with more
//! decimal places than the asset allows, so the result is rounded to the asset's
//! precision and carries exactly that scale.

use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{RobinhoodError, Result};

/// Most decimal places a `Decimal` can carry
pub const MAX_DECIMAL_SCALE: u32 = 28;

/// Currency code -> number of decimal places allowed in an order quantity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionTable {
    default_decimals: u32,
    overrides: HashMap<String, u32>,
}

impl PrecisionTable {
    /// Precisions above [`MAX_DECIMAL_SCALE`] are clamped to it
    pub fn new(default_decimals: u32, overrides: HashMap<String, u32>) -> Self {
        let overrides = overrides
            .into_iter()
            .map(|(code, decimals)| {
                let code = normalize_code(&code);
                let decimals = clamp_scale(&code, decimals);
                (code, decimals)
            })
            .collect();
        Self {
            default_decimals: clamp_scale("default", default_decimals),
            overrides,
        }
    }

    pub fn with_asset(mut self, code: &str, decimals: u32) -> Self {
        let code = normalize_code(code);
        let decimals = clamp_scale(&code, decimals);
        self.overrides.insert(code, decimals);
        self
    }

    pub fn decimals_for(&self, code: &str) -> u32 {
        self.overrides
            .get(&normalize_code(code))
            .copied()
            .unwrap_or(self.default_decimals)
    }

    pub fn default_decimals(&self) -> u32 {
        self.default_decimals
    }
}

impl Default for PrecisionTable {
    /// ETH trades in 6 decimal places, everything else in 8
    fn default() -> Self {
        Self::new(8, HashMap::from([("ETH".to_string(), 6)]))
    }
}

fn clamp_scale(code: &str, decimals: u32) -> u32 {
    if decimals > MAX_DECIMAL_SCALE {
        warn!(
            code,
            decimals,
            max = MAX_DECIMAL_SCALE,
            "precision above decimal scale limit, clamping"
        );
        MAX_DECIMAL_SCALE
    } else {
        decimals
    }
}

fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// `round(amount_in_dollars / price, precision(code))`, half away from zero
pub fn calculate_quantity(
    amount_in_dollars: Decimal,
    price: Decimal,
    currency_code: &str,
    precision: &PrecisionTable,
) -> Result<Decimal> {
    if price <= Decimal::ZERO {
        return Err(RobinhoodError::InvalidInput(format!(
            "reference price must be positive, got {price}"
        )));
    }
    if amount_in_dollars <= Decimal::ZERO {
        return Err(RobinhoodError::InvalidInput(format!(
            "dollar amount must be positive, got {amount_in_dollars}"
        )));
    }

    let decimals = precision.decimals_for(currency_code);
    let raw = amount_in_dollars.checked_div(price).ok_or_else(|| {
        RobinhoodError::InvalidInput(format!(
            "cannot divide {amount_in_dollars} by {price} within decimal range"
        ))
    })?;

    let mut quantity = raw.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    quantity.rescale(decimals);

    if quantity.is_zero() {
        return Err(RobinhoodError::InvalidInput(format!(
            "${amount_in_dollars} at {price} rounds to zero {currency_code} at {decimals} decimal places"
        )));
    }

    Ok(quantity)
}

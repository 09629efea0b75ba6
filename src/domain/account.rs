use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::wire::opt_decimal;

/// Common resource metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Meta {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Brokerage account
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(flatten)]
    pub meta: Meta,
    pub account_number: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub buying_power: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_available_for_withdrawal: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_held_for_orders: Option<Decimal>,
    #[serde(default)]
    pub cash_balances: Option<CashBalances>,
    #[serde(default)]
    pub margin_balances: Option<MarginBalances>,
    #[serde(default)]
    pub deactivated: bool,
    #[serde(default)]
    pub deposit_halted: bool,
    #[serde(default)]
    pub withdrawal_halted: bool,
    #[serde(default)]
    pub only_position_closing_trades: bool,
    #[serde(default)]
    pub sweep_enabled: bool,
    /// URL of the account's portfolio resource
    #[serde(default)]
    pub portfolio: Option<String>,
    /// URL of the account's positions collection
    #[serde(default)]
    pub positions: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub uncleared_deposits: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub unsettled_funds: Option<Decimal>,
    #[serde(default)]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CashBalances {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub buying_power: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_available_for_withdrawal: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_held_for_orders: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub uncleared_deposits: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub unsettled_funds: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarginBalances {
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_available_for_withdrawal: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cash_held_for_orders: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub day_trade_buying_power: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub day_trade_ratio: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub margin_limit: Option<Decimal>,
    #[serde(default)]
    pub marked_pattern_day_trader_date: Option<String>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub overnight_buying_power: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub overnight_ratio: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub unallocated_margin_cash: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub uncleared_deposits: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub unsettled_funds: Option<Decimal>,
}

/// Crypto trading account; its id goes into every crypto order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CryptoAccount {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl CryptoAccount {
    pub fn is_active(&self) -> bool {
        self.status.eq_ignore_ascii_case("active")
    }
}

/// Amount with its currency, as reported by the unified account endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct Money {
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub currency_id: Option<String>,
}

/// Whole-account summary across equities, options and crypto
#[derive(Debug, Clone, Deserialize)]
pub struct UnifiedAccount {
    pub account_buying_power: Option<Money>,
    #[serde(default)]
    pub cash_available_from_instant_deposits: Option<Money>,
    #[serde(default)]
    pub cash_held_for_currency_orders: Option<Money>,
    #[serde(default)]
    pub cash_held_for_dividends: Option<Money>,
    #[serde(default)]
    pub cash_held_for_equity_orders: Option<Money>,
    #[serde(default)]
    pub cash_held_for_options_collateral: Option<Money>,
    #[serde(default)]
    pub cash_held_for_orders: Option<Money>,
    #[serde(default)]
    pub crypto_buying_power: Option<Money>,
    #[serde(default)]
    pub portfolio_equity: Option<Money>,
    #[serde(default)]
    pub uninvested_cash: Option<Money>,
    #[serde(default)]
    pub withdrawable_cash: Option<Money>,
}

/// Equity position
#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    #[serde(flatten)]
    pub meta: Meta,
    pub account: String,
    pub instrument: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub average_buy_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub intraday_average_buy_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub intraday_quantity: Option<Decimal>,
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub shares_held_for_buys: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub shares_held_for_sells: Option<Decimal>,
}

/// Query parameters for the positions endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionParams {
    /// Only return positions with a non-zero quantity
    pub nonzero: bool,
}

impl PositionParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs = Vec::new();
        if self.nonzero {
            pairs.push(("nonzero", "true"));
        }
        pairs
    }
}

/// What was paid for a crypto holding
#[derive(Debug, Clone, Deserialize)]
pub struct CostBasis {
    pub currency_id: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub direct_cost_basis: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub direct_quantity: Option<Decimal>,
    pub id: String,
}

/// Crypto holding
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoPosition {
    #[serde(flatten)]
    pub meta: Meta,
    pub id: String,
    pub account_id: String,
    pub currency: super::CryptoCurrency,
    #[serde(default)]
    pub cost_bases: Vec<CostBasis>,
    pub quantity: Decimal,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub quantity_available: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub quantity_held_for_buy: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub quantity_held_for_sell: Option<Decimal>,
}

impl CryptoPosition {
    /// Total direct cost across all cost bases
    pub fn total_cost(&self) -> Decimal {
        self.cost_bases
            .iter()
            .filter_map(|c| c.direct_cost_basis)
            .sum()
    }
}

/// Paged list envelope used by collection endpoints
#[derive(Debug, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

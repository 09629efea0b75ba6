use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::market_hours::is_regular_trading_time;
use crate::wire::opt_decimal;

/// A crypto (or fiat) currency as described by the crypto API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoCurrency {
    pub id: String,
    /// Ticker-like code, e.g. "BTC" or "ETH"; selects quantity precision
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub increment: Option<Decimal>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// A tradable pair, e.g. BTC-USD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub id: String,
    pub asset_currency: CryptoCurrency,
    #[serde(default)]
    pub quote_currency: Option<CryptoCurrency>,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub min_order_size: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub max_order_size: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub min_order_quantity_increment: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub min_order_price_increment: Option<Decimal>,
    #[serde(default)]
    pub tradability: Option<String>,
}

impl CurrencyPair {
    /// Asset currency code used for precision lookup
    pub fn code(&self) -> &str {
        &self.asset_currency.code
    }

    pub fn is_tradable(&self) -> bool {
        self.tradability.as_deref().map_or(true, |t| t == "tradable")
    }
}

/// Latest equity quote
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    pub symbol: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub adjusted_previous_close: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub ask_price: Option<Decimal>,
    #[serde(default)]
    pub ask_size: i64,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub bid_price: Option<Decimal>,
    #[serde(default)]
    pub bid_size: i64,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub last_extended_hours_trade_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub last_trade_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub previous_close: Option<Decimal>,
    #[serde(default)]
    pub previous_close_date: Option<String>,
    #[serde(default)]
    pub trading_halted: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Quote {
    /// Last regular-session trade price during market hours, the extended-hours
    /// price otherwise (falling back to the regular price when absent).
    pub fn price_at(&self, now: DateTime<Utc>) -> Option<Decimal> {
        if is_regular_trading_time(now) {
            self.last_trade_price
        } else {
            self.last_extended_hours_trade_price
                .or(self.last_trade_price)
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price_at(Utc::now())
    }
}

/// Latest crypto quote; changes roughly every second
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoQuote {
    pub id: String,
    pub symbol: String,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub ask_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub bid_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub high_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub low_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub mark_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub open_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub volume: Option<Decimal>,
}

impl CryptoQuote {
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.bid_price, self.ask_price) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::TWO),
            _ => None,
        }
    }
}

/// One OHLCV bar
#[derive(Debug, Clone, Deserialize)]
pub struct Historical {
    pub begins_at: DateTime<Utc>,
    pub open_price: Decimal,
    pub close_price: Decimal,
    pub high_price: Decimal,
    pub low_price: Decimal,
    #[serde(default)]
    pub volume: i64,
    #[serde(default)]
    pub session: String,
    #[serde(default)]
    pub interpolated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn quote() -> Quote {
        serde_json::from_value(json!({
            "symbol": "AAPL",
            "last_trade_price": "190.10",
            "last_extended_hours_trade_price": "191.25",
            "ask_price": "190.20",
            "ask_size": 100,
            "bid_price": "190.00",
            "bid_size": 200,
            "previous_close": null,
            "trading_halted": false
        }))
        .unwrap()
    }

    #[test]
    fn test_quote_price_switches_with_session() {
        let q = quote();
        // Wednesday 2024-01-10 15:00 UTC = 10:00 EST
        let regular = Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap();
        assert_eq!(q.price_at(regular), Some(dec!(190.10)));
        // 23:00 UTC = 18:00 EST
        let after = Utc.with_ymd_and_hms(2024, 1, 10, 23, 0, 0).unwrap();
        assert_eq!(q.price_at(after), Some(dec!(191.25)));
    }

    #[test]
    fn test_currency_pair_decodes_asset_code() {
        let pair: CurrencyPair = serde_json::from_value(json!({
            "id": "76637d50-c702-4ed1-bcb5-5b0732a81f48",
            "symbol": "ETH-USD",
            "name": "Ethereum to US Dollar",
            "asset_currency": {
                "id": "c527e2b5-9b3d-4ed8-8e2d-b27f2a4b6a7c",
                "code": "ETH",
                "name": "Ethereum",
                "increment": "0.000001",
                "type": "cryptocurrency"
            },
            "min_order_size": "0.000100",
            "tradability": "tradable"
        }))
        .unwrap();
        assert_eq!(pair.code(), "ETH");
        assert_eq!(pair.asset_currency.increment, Some(dec!(0.000001)));
        assert!(pair.is_tradable());
    }

    #[test]
    fn test_crypto_quote_mid() {
        let q: CryptoQuote = serde_json::from_value(json!({
            "id": "pair-1",
            "symbol": "BTCUSD",
            "ask_price": "100.50",
            "bid_price": "99.50",
            "mark_price": "100.00",
            "volume": "0"
        }))
        .unwrap();
        assert_eq!(q.mid_price(), Some(dec!(100.00)));
    }
}

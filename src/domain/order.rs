use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{RobinhoodError, Result};

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Canonical wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = RobinhoodError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Self::Buy),
            "sell" => Ok(Self::Sell),
            _ => Err(RobinhoodError::InvalidInput(format!(
                "invalid order side '{raw}'; expected buy|sell"
            ))),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
    StopLoss,
    StopLimit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
            OrderType::StopLoss => "stop_loss",
            OrderType::StopLimit => "stop_limit",
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, OrderType::StopLoss | OrderType::StopLimit)
    }

    /// Whether the order carries a limit price the exchange will honor
    pub fn requires_price(&self) -> bool {
        matches!(self, OrderType::Limit | OrderType::StopLimit)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = RobinhoodError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "market" => Ok(Self::Market),
            "limit" => Ok(Self::Limit),
            "stop_loss" | "stop" => Ok(Self::StopLoss),
            "stop_limit" => Ok(Self::StopLimit),
            _ => Err(RobinhoodError::InvalidInput(format!(
                "invalid order type '{raw}'; expected market|limit|stop_loss|stop_limit"
            ))),
        }
    }
}

/// Time in force
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    /// Good Till Cancelled
    #[default]
    Gtc,
    /// Good For Day
    Gfd,
    /// Immediate Or Cancel
    Ioc,
    /// Fill Or Kill
    Fok,
    /// At The Opening
    Opg,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "gtc",
            TimeInForce::Gfd => "gfd",
            TimeInForce::Ioc => "ioc",
            TimeInForce::Fok => "fok",
            TimeInForce::Opg => "opg",
        }
    }
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeInForce {
    type Err = RobinhoodError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gtc" => Ok(Self::Gtc),
            "gfd" => Ok(Self::Gfd),
            "ioc" => Ok(Self::Ioc),
            "fok" => Ok(Self::Fok),
            "opg" => Ok(Self::Opg),
            _ => Err(RobinhoodError::InvalidInput(format!(
                "invalid time in force '{raw}'; expected gtc|gfd|ioc|fok|opg"
            ))),
        }
    }
}

/// Order state as last reported by the server
///
/// `submitted -> {confirmed, rejected} -> {partially_filled -> filled} | cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    Unconfirmed,
    Queued,
    Submitted,
    Confirmed,
    PartiallyFilled,
    Filled,
    Rejected,
    #[serde(alias = "canceled")]
    Cancelled,
    Failed,
    /// Any state this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl OrderState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderState::Filled | OrderState::Rejected | OrderState::Cancelled | OrderState::Failed
        )
    }

    pub fn is_active(&self) -> bool {
        matches!(
            self,
            OrderState::Unconfirmed
                | OrderState::Queued
                | OrderState::Submitted
                | OrderState::Confirmed
                | OrderState::PartiallyFilled
        )
    }
}

/// How much of the asset to trade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantitySpec {
    /// Absolute asset quantity
    Quantity(Decimal),
    /// Notional in dollars, converted with the intent's price
    Dollars(Decimal),
}

/// What the caller wants to trade
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: TimeInForce,
    /// Limit price, and the reference price for dollar conversion
    pub price: Decimal,
    pub quantity: Option<Decimal>,
    pub amount_in_dollars: Option<Decimal>,
    pub extended_hours: bool,
    pub stop: bool,
    pub force: bool,
}

impl TradeIntent {
    pub fn new(side: OrderSide, order_type: OrderType, price: Decimal) -> Self {
        Self {
            side,
            order_type,
            time_in_force: TimeInForce::Gtc,
            price,
            quantity: None,
            amount_in_dollars: None,
            extended_hours: false,
            stop: false,
            force: false,
        }
    }

    /// Build from loosely typed strings (e.g. `"BUY"`, `"Market"`, `"GTC"`)
    pub fn parse(side: &str, order_type: &str, time_in_force: &str, price: Decimal) -> Result<Self> {
        Ok(Self::new(side.parse()?, order_type.parse()?, price).time_in_force(time_in_force.parse()?))
    }

    pub fn buy_dollars(amount: Decimal, price: Decimal) -> Self {
        Self::new(OrderSide::Buy, OrderType::Market, price).dollars(amount)
    }

    pub fn sell_quantity(quantity: Decimal, price: Decimal) -> Self {
        Self::new(OrderSide::Sell, OrderType::Market, price).quantity(quantity)
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn dollars(mut self, amount: Decimal) -> Self {
        self.amount_in_dollars = Some(amount);
        self
    }

    pub fn time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = tif;
        self
    }

    pub fn extended_hours(mut self, enabled: bool) -> Self {
        self.extended_hours = enabled;
        self
    }

    pub fn stop(mut self, enabled: bool) -> Self {
        self.stop = enabled;
        self
    }

    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    /// The single quantity specification, or InvalidInput if both or neither are set
    pub fn quantity_spec(&self) -> Result<QuantitySpec> {
        match (self.quantity, self.amount_in_dollars) {
            (Some(_), Some(_)) => Err(RobinhoodError::InvalidInput(
                "quantity and amount_in_dollars are mutually exclusive".to_string(),
            )),
            (None, None) => Err(RobinhoodError::InvalidInput(
                "one of quantity or amount_in_dollars is required".to_string(),
            )),
            (Some(q), None) => Ok(QuantitySpec::Quantity(q)),
            (None, Some(d)) => Ok(QuantitySpec::Dollars(d)),
        }
    }
}

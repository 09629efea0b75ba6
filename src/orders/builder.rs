use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quantity::{calculate_quantity, PrecisionTable};
use crate::domain::{CurrencyPair, QuantitySpec, TradeIntent};
use crate::error::{RobinhoodError, Result};
use crate::wire::{self, decimal_number};

/// Source of order reference ids (the server's idempotency key)
pub trait RefIdGenerator: Send + Sync {
    fn next_ref_id(&self) -> Uuid;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidV4Generator;

impl RefIdGenerator for UuidV4Generator {
    fn next_ref_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Order creation payload
///
/// Every field is omitted from the JSON when empty. Side, type and time in force
/// are carried in their lowercase canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub account_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub currency_pair_id: String,
    #[serde(
        default,
        with = "decimal_number",
        skip_serializing_if = "wire::is_zero"
    )]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Uuid::is_nil")]
    pub ref_id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub side: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time_in_force: String,
    #[serde(
        default,
        with = "decimal_number",
        skip_serializing_if = "wire::is_zero"
    )]
    pub quantity: Decimal,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub order_type: String,
}

/// Turns trade intents into order payloads
///
/// Each call to [`OrderBuilder::build`] draws a new reference id. Building twice
/// for one intended order and submitting both places two orders.
pub struct OrderBuilder<'a> {
    precision: &'a PrecisionTable,
    ref_ids: &'a dyn RefIdGenerator,
}

impl<'a> OrderBuilder<'a> {
    pub fn new(precision: &'a PrecisionTable, ref_ids: &'a dyn RefIdGenerator) -> Self {
        Self { precision, ref_ids }
    }

    pub fn build(
        &self,
        account_id: &str,
        pair: &CurrencyPair,
        intent: &TradeIntent,
    ) -> Result<OrderRequest> {
        if account_id.trim().is_empty() {
            return Err(RobinhoodError::InvalidInput(
                "account id is required".to_string(),
            ));
        }
        if pair.id.trim().is_empty() {
            return Err(RobinhoodError::InvalidInput(
                "currency pair id is required".to_string(),
            ));
        }
        if intent.stop && !intent.order_type.is_stop() {
            return Err(RobinhoodError::InvalidInput(format!(
                "stop flag requires a stop order type, got {}",
                intent.order_type
            )));
        }
        if intent.order_type.requires_price() && intent.price <= Decimal::ZERO {
            return Err(RobinhoodError::InvalidInput(format!(
                "{} orders need a positive price, got {}",
                intent.order_type, intent.price
            )));
        }
        if intent.price < Decimal::ZERO {
            return Err(RobinhoodError::InvalidInput(format!(
                "price cannot be negative: {}",
                intent.price
            )));
        }

        let quantity = match intent.quantity_spec()? {
            QuantitySpec::Quantity(q) => {
                if q <= Decimal::ZERO {
                    return Err(RobinhoodError::InvalidInput(format!(
                        "quantity must be positive, got {q}"
                    )));
                }
                q
            }
            QuantitySpec::Dollars(amount) => {
                calculate_quantity(amount, intent.price, pair.code(), self.precision)?
            }
        };

        Ok(OrderRequest {
            account_id: account_id.to_string(),
            currency_pair_id: pair.id.clone(),
            price: intent.price,
            ref_id: self.ref_ids.next_ref_id(),
            side: intent.side.as_str().to_string(),
            time_in_force: intent.time_in_force.as_str().to_string(),
            quantity,
            order_type: intent.order_type.as_str().to_string(),
        })
    }
}

//! Crypto order records and their lifecycle (cancel, refresh, poll).
//!
//! A record is only ever produced by decoding a complete server response. It
//! keeps a weak handle to the client that fetched it so lifecycle calls can be
//! made on the record itself; the record never keeps the client alive.

use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::adapters::robinhood::ClientInner;
use crate::domain::{OrderSide, OrderState, OrderType, TimeInForce};
use crate::error::{RobinhoodError, Result};
use crate::wire::opt_decimal;

/// Floor for the polling interval
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One fill of an order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Execution {
    pub id: String,
    pub effective_price: Decimal,
    pub quantity: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl Execution {
    pub fn notional(&self) -> Decimal {
        self.effective_price * self.quantity
    }
}

/// Non-owning link from a record back to its client
#[derive(Clone, Default)]
pub struct OrderHandle(Weak<ClientInner>);

impl OrderHandle {
    fn upgrade(&self, order_id: &str) -> Result<Arc<ClientInner>> {
        self.0.upgrade().ok_or_else(|| {
            RobinhoodError::ClientUnavailable(format!(
                "order {} is not bound to a live client",
                order_id
            ))
        })
    }

    pub fn is_bound(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl std::fmt::Debug for OrderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderHandle")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// Crypto order as last reported by the server
#[derive(Debug, Clone, Deserialize)]
pub struct CryptoOrder {
    pub id: String,
    pub account_id: String,
    pub currency_pair_id: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    pub state: OrderState,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub average_price: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub cumulative_quantity: Option<Decimal>,
    #[serde(default, deserialize_with = "opt_decimal::deserialize")]
    pub stop_price: Option<Decimal>,
    #[serde(default)]
    reject_reason: Option<String>,
    /// Present while the order can still be cancelled
    #[serde(default)]
    pub cancel_url: Option<String>,
    #[serde(default)]
    pub executions: Vec<Execution>,
    #[serde(default)]
    pub ref_id: Option<Uuid>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_transaction_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    handle: OrderHandle,
}

impl CryptoOrder {
    /// Decode a full order record. Bodies without an order id are rejected so a
    /// placeholder never passes for a real order.
    pub fn decode(text: &str) -> Result<Self> {
        let order: CryptoOrder = serde_json::from_str(text)?;
        if order.id.trim().is_empty() {
            return Err(RobinhoodError::Decode(
                "order response has an empty id".to_string(),
            ));
        }
        Ok(order)
    }

    pub(crate) fn bind(mut self, inner: &Arc<ClientInner>) -> Self {
        self.handle = OrderHandle(Arc::downgrade(inner));
        self
    }

    pub fn handle(&self) -> &OrderHandle {
        &self.handle
    }

    /// Server rejection reason, ignoring blank values
    pub fn reject_reason(&self) -> Option<&str> {
        self.reject_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Filled quantity: the server's cumulative figure, else the sum of executions
    pub fn filled_quantity(&self) -> Decimal {
        self.cumulative_quantity
            .unwrap_or_else(|| self.executions.iter().map(|e| e.quantity).sum())
    }

    /// Cancel the order.
    ///
    /// Returns the updated record when the server echoes one, `None` for a bare
    /// acknowledgement. A populated reject reason becomes `CancelRejected`, as does
    /// calling this on an order that no longer has a cancel URL.
    #[instrument(skip(self), fields(order_id = %self.id, state = ?self.state))]
    pub async fn cancel(&self) -> Result<Option<CryptoOrder>> {
        let cancel_url = self
            .cancel_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| RobinhoodError::CancelRejected {
                order_id: self.id.clone(),
                reason: format!("order is {:?} and has no cancel url", self.state),
            })?;
        let inner = self.handle.upgrade(&self.id)?;

        let text = inner
            .transport
            .send(Method::POST, cancel_url, None)
            .await
            .map_err(|e| {
                warn!(error = %e, outcome_unknown = e.is_outcome_unknown(), "cancel request failed");
                e
            })?;

        let outcome = parse_cancel_response(&self.id, &text)?.map(|o| o.bind(&inner));
        info!(
            new_state = ?outcome.as_ref().map(|o| o.state),
            "cancel accepted"
        );
        Ok(outcome)
    }

    /// Fetch the latest state of this order
    pub async fn refresh(&self) -> Result<CryptoOrder> {
        let inner = self.handle.upgrade(&self.id)?;
        inner.fetch_crypto_order(&self.id).await
    }

    /// Poll with the client's configured interval and deadline until the order
    /// reaches a terminal state.
    pub async fn wait_until_terminal(&self) -> Result<CryptoOrder> {
        let inner = self.handle.upgrade(&self.id)?;
        let poll = Duration::from_millis(inner.execution.poll_interval_ms);
        let timeout = Duration::from_millis(inner.execution.order_timeout_ms);
        drop(inner);
        self.poll_until_terminal(poll, timeout).await
    }

    /// Refresh every `poll` (at least 10ms) until terminal. Any failed refresh is
    /// returned as-is; running out of `timeout` yields `StillOpen` with the last
    /// state seen.
    #[instrument(skip(self), fields(order_id = %self.id))]
    pub async fn poll_until_terminal(
        &self,
        poll: Duration,
        timeout: Duration,
    ) -> Result<CryptoOrder> {
        if self.is_terminal() {
            return Ok(self.clone());
        }

        let poll = poll.max(MIN_POLL_INTERVAL);
        let deadline = Instant::now() + timeout;
        loop {
            let latest = self.refresh().await?;
            if latest.is_terminal() {
                debug!(state = ?latest.state, "order reached terminal state");
                return Ok(latest);
            }
            if Instant::now() + poll > deadline {
                warn!(state = ?latest.state, ?timeout, "order still open at polling deadline");
                return Err(RobinhoodError::StillOpen {
                    order_id: latest.id,
                    state: latest.state,
                });
            }
            sleep(poll).await;
        }
    }
}

fn parse_cancel_response(order_id: &str, text: &str) -> Result<Option<CryptoOrder>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(text)?;
    if let Some(reason) = value
        .get("reject_reason")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        warn!(order_id, reason, "cancel rejected");
        return Err(RobinhoodError::CancelRejected {
            order_id: order_id.to_string(),
            reason: reason.to_string(),
        });
    }

    // Bare acknowledgement
    if value.is_null() || value.as_object().is_some_and(|m| m.is_empty()) {
        return Ok(None);
    }
    if !value.is_object() {
        return Err(RobinhoodError::Decode(format!(
            "unexpected cancel response: {}",
            value
        )));
    }

    let order: CryptoOrder = serde_json::from_value(value)?;
    if order.id.trim().is_empty() {
        return Err(RobinhoodError::Decode(
            "cancel response has an empty order id".to_string(),
        ));
    }
    Ok(Some(order))
}

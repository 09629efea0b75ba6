//! Robinhood REST client.
//!
//! Reference data (accounts, positions, quotes, currency pairs, historicals) is
//! plain GET-and-decode. Crypto orders go through [`OrderBuilder`] and come back
//! as [`CryptoOrder`] records bound to this client.

use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::transport::{ReqwestTransport, Transport};
use crate::config::{ApiConfig, AppConfig, ExecutionConfig};
use crate::domain::account::Page;
use crate::domain::{
    Account, CryptoAccount, CryptoPosition, CryptoQuote, CurrencyPair, Historical, Position,
    PositionParams, Quote, TradeIntent, UnifiedAccount,
};
use crate::error::{RobinhoodError, Result};
use crate::orders::{
    CryptoOrder, OrderBuilder, OrderRequest, PrecisionTable, RefIdGenerator, UuidV4Generator,
};

/// Resolved endpoint URLs
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub accounts: Url,
    pub positions: Url,
    pub quotes: Url,
    pub market_data: Url,
    pub crypto_accounts: Url,
    pub crypto_holdings: Url,
    pub crypto_orders: Url,
    pub currency_pairs: Url,
    pub unified_account: Url,
}

fn parse_base(field: &str, raw: &str) -> Result<Url> {
    let mut raw = raw.trim().to_string();
    if !raw.ends_with('/') {
        raw.push('/');
    }
    Url::parse(&raw)
        .map_err(|e| RobinhoodError::InvalidInput(format!("{} is not a valid URL: {}", field, e)))
}

fn join(base: &Url, path: &str) -> Result<Url> {
    base.join(path)
        .map_err(|e| RobinhoodError::InvalidInput(format!("cannot join {} onto {}: {}", path, base, e)))
}

/// An id placed into a URL path must be a single, non-dot segment
fn path_segment<'a>(kind: &str, raw: &'a str) -> Result<&'a str> {
    let id = raw.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(RobinhoodError::InvalidInput(format!(
            "invalid {} '{}'",
            kind, raw
        )));
    }
    Ok(id)
}

impl Endpoints {
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        let base = parse_base("api.base_url", &api.base_url)?;
        let crypto = parse_base("api.crypto_base_url", &api.crypto_base_url)?;
        let phoenix = parse_base("api.phoenix_base_url", &api.phoenix_base_url)?;

        Ok(Self {
            accounts: join(&base, "accounts/")?,
            positions: join(&base, "positions/")?,
            quotes: join(&base, "quotes/")?,
            market_data: join(&base, "marketdata/")?,
            crypto_accounts: join(&crypto, "accounts/")?,
            crypto_holdings: join(&crypto, "holdings/")?,
            crypto_orders: join(&crypto, "orders/")?,
            currency_pairs: join(&crypto, "currency_pairs/")?,
            unified_account: join(&phoenix, "accounts/unified")?,
        })
    }

    pub fn crypto_order(&self, order_id: &str) -> Result<Url> {
        let id = path_segment("order id", order_id)?;
        join(&self.crypto_orders, &format!("{}/", id))
    }
}

/// State shared by a client and every order record it produced
pub(crate) struct ClientInner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) endpoints: Endpoints,
    pub(crate) precision: PrecisionTable,
    pub(crate) ref_ids: Arc<dyn RefIdGenerator>,
    pub(crate) execution: ExecutionConfig,
}

impl ClientInner {
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let text = self.transport.send(Method::GET, url, None).await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_results<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
        let page: Page<T> = self.get_json(url).await?;
        Ok(page.results)
    }

    pub(crate) async fn fetch_crypto_order(self: &Arc<Self>, order_id: &str) -> Result<CryptoOrder> {
        let url = self.endpoints.crypto_order(order_id)?;
        let text = self.transport.send(Method::GET, url.as_str(), None).await?;
        let order = CryptoOrder::decode(&text)?.bind(self);
        debug!(order_id = %order.id, state = ?order.state, "fetched crypto order");
        Ok(order)
    }
}

/// Configures a [`RobinhoodClient`]
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    api: ApiConfig,
    precision: PrecisionTable,
    execution: ExecutionConfig,
    ref_ids: Arc<dyn RefIdGenerator>,
}

impl ClientBuilder {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            api: ApiConfig::default(),
            precision: PrecisionTable::default(),
            execution: ExecutionConfig::default(),
            ref_ids: Arc::new(UuidV4Generator),
        }
    }

    pub fn config(mut self, config: &AppConfig) -> Self {
        self.api = config.api.clone();
        self.precision = config.precision.to_table();
        self.execution = config.execution.clone();
        self
    }

    pub fn precision(mut self, precision: PrecisionTable) -> Self {
        self.precision = precision;
        self
    }

    pub fn ref_ids(mut self, ref_ids: Arc<dyn RefIdGenerator>) -> Self {
        self.ref_ids = ref_ids;
        self
    }

    pub fn execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn build(self) -> Result<RobinhoodClient> {
        if self.execution.poll_interval_ms == 0 {
            return Err(RobinhoodError::InvalidInput(
                "execution.poll_interval_ms must be positive".to_string(),
            ));
        }
        let endpoints = Endpoints::from_config(&self.api)?;
        Ok(RobinhoodClient {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                endpoints,
                precision: self.precision,
                ref_ids: self.ref_ids,
                execution: self.execution,
            }),
        })
    }
}

/// Robinhood API client. Cheap to clone; clones share one transport.
#[derive(Clone)]
pub struct RobinhoodClient {
    inner: Arc<ClientInner>,
}

impl RobinhoodClient {
    /// Client over HTTPS using the given configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config.api)?;
        ClientBuilder::new(Arc::new(transport)).config(config).build()
    }

    pub fn builder(transport: Arc<dyn Transport>) -> ClientBuilder {
        ClientBuilder::new(transport)
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.inner.endpoints
    }

    pub fn precision(&self) -> &PrecisionTable {
        &self.inner.precision
    }

    // ==================== Reference data ====================

    pub async fn get_accounts(&self) -> Result<Vec<Account>> {
        self.inner
            .get_results(self.inner.endpoints.accounts.as_str())
            .await
    }

    pub async fn get_crypto_accounts(&self) -> Result<Vec<CryptoAccount>> {
        self.inner
            .get_results(self.inner.endpoints.crypto_accounts.as_str())
            .await
    }

    pub async fn get_unified_account(&self) -> Result<UnifiedAccount> {
        self.inner
            .get_json(self.inner.endpoints.unified_account.as_str())
            .await
    }

    pub async fn get_positions(&self, account: &Account) -> Result<Vec<Position>> {
        self.get_positions_with(account, PositionParams::default())
            .await
    }

    /// Positions for an account, via the account's own positions URL
    pub async fn get_positions_with(
        &self,
        account: &Account,
        params: PositionParams,
    ) -> Result<Vec<Position>> {
        let mut url = match account.positions.as_deref() {
            Some(raw) => Url::parse(raw).map_err(|e| {
                RobinhoodError::InvalidInput(format!("invalid positions URL '{}': {}", raw, e))
            })?,
            None => {
                let mut url = self.inner.endpoints.positions.clone();
                url.query_pairs_mut()
                    .append_pair("account_number", &account.account_number);
                url
            }
        };
        for (key, value) in params.query_pairs() {
            url.query_pairs_mut().append_pair(key, value);
        }
        self.inner.get_results(url.as_str()).await
    }

    pub async fn get_crypto_positions(&self) -> Result<Vec<CryptoPosition>> {
        self.inner
            .get_results(self.inner.endpoints.crypto_holdings.as_str())
            .await
    }

    pub async fn get_quotes(&self, symbols: &[&str]) -> Result<Vec<Quote>> {
        if symbols.is_empty() {
            return Err(RobinhoodError::InvalidInput(
                "at least one symbol is required".to_string(),
            ));
        }
        let mut url = self.inner.endpoints.quotes.clone();
        url.query_pairs_mut()
            .append_pair("symbols", &symbols.join(","));
        self.inner.get_results(url.as_str()).await
    }

    pub async fn get_crypto_quotes(&self, pair_ids: &[&str]) -> Result<Vec<CryptoQuote>> {
        if pair_ids.is_empty() {
            return Err(RobinhoodError::InvalidInput(
                "at least one currency pair id is required".to_string(),
            ));
        }
        let mut url = join(&self.inner.endpoints.market_data, "forex/quotes/")?;
        url.query_pairs_mut().append_pair("ids", &pair_ids.join(","));
        self.inner.get_results(url.as_str()).await
    }

    /// Daily bars for the past week
    pub async fn get_daily_historicals(&self, pair_id: &str) -> Result<Vec<Historical>> {
        let id = path_segment("currency pair id", pair_id)?;
        let mut url = join(
            &self.inner.endpoints.market_data,
            &format!("forex/historicals/{}/", id),
        )?;
        url.query_pairs_mut()
            .append_pair("bounds", "24_7")
            .append_pair("interval", "day")
            .append_pair("span", "week");

        #[derive(serde::Deserialize)]
        struct HistoricalsResponse {
            #[serde(default)]
            data_points: Vec<Historical>,
        }

        let resp: HistoricalsResponse = self.inner.get_json(url.as_str()).await?;
        Ok(resp.data_points)
    }

    pub async fn get_currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        self.inner
            .get_results(self.inner.endpoints.currency_pairs.as_str())
            .await
    }

    /// Look up a pair by symbol ("BTC-USD") or asset code ("BTC")
    pub async fn find_currency_pair(&self, symbol: &str) -> Result<CurrencyPair> {
        let wanted = symbol.trim();
        self.get_currency_pairs()
            .await?
            .into_iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(wanted) || p.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                RobinhoodError::InvalidInput(format!("unknown currency pair '{}'", symbol))
            })
    }

    // ==================== Crypto orders ====================

    pub fn order_builder(&self) -> OrderBuilder<'_> {
        OrderBuilder::new(&self.inner.precision, self.inner.ref_ids.as_ref())
    }

    /// Build the payload for a crypto order without sending it
    pub fn build_crypto_order(
        &self,
        account_id: &str,
        pair: &CurrencyPair,
        intent: &TradeIntent,
    ) -> Result<OrderRequest> {
        self.order_builder().build(account_id, pair, intent)
    }

    /// Build and submit a crypto order in one step
    pub async fn place_crypto_order(
        &self,
        account_id: &str,
        pair: &CurrencyPair,
        intent: &TradeIntent,
    ) -> Result<CryptoOrder> {
        let request = self.build_crypto_order(account_id, pair, intent)?;
        self.submit_order_request(&request).await
    }

    /// Submit an already-built order exactly once.
    ///
    /// To retry after an ambiguous failure, pass the same `request` again so the
    /// server sees the same `ref_id`; building a new request places a new order.
    #[instrument(
        skip(self, request),
        fields(ref_id = %request.ref_id, pair = %request.currency_pair_id, side = %request.side)
    )]
    pub async fn submit_order_request(&self, request: &OrderRequest) -> Result<CryptoOrder> {
        let body = serde_json::to_string(request)?;
        debug!(quantity = %request.quantity, price = %request.price, "submitting crypto order");

        let text = self
            .inner
            .transport
            .send(
                Method::POST,
                self.inner.endpoints.crypto_orders.as_str(),
                Some(body),
            )
            .await
            .map_err(|e| {
                warn!(error = %e, outcome_unknown = e.is_outcome_unknown(), "order submission failed");
                e
            })?;

        let order = CryptoOrder::decode(&text)?.bind(&self.inner);
        if let Some(reason) = order.reject_reason() {
            warn!(order_id = %order.id, reason, "order rejected");
            return Err(RobinhoodError::OrderRejected {
                order_id: order.id.clone(),
                reason: reason.to_string(),
            });
        }

        info!(order_id = %order.id, state = ?order.state, "crypto order submitted");
        Ok(order)
    }

    /// Current state of an order by id
    #[instrument(skip(self))]
    pub async fn get_crypto_order(&self, order_id: &str) -> Result<CryptoOrder> {
        self.inner.fetch_crypto_order(order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::transport::MockTransport;
    use crate::domain::{OrderState, OrderSide, OrderType};
    use crate::orders::builder::tests::{pair, SequentialRefIds};
    use crate::orders::crypto::tests::order_json;
    use mockall::{predicate::eq, Sequence};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    const ORDERS_URL: &str = "https://nummus.robinhood.com/orders/";
    const CANCEL_URL: &str = "https://nummus.robinhood.com/orders/ord-1/cancel/";

    fn client(mock: MockTransport) -> RobinhoodClient {
        RobinhoodClient::builder(Arc::new(mock))
            .ref_ids(Arc::new(SequentialRefIds::default()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_endpoints_tolerate_missing_trailing_slash() {
        let api = ApiConfig {
            crypto_base_url: "https://nummus.robinhood.com".to_string(),
            ..ApiConfig::default()
        };
        let endpoints = Endpoints::from_config(&api).unwrap();
        assert_eq!(endpoints.crypto_orders.as_str(), ORDERS_URL);
        assert_eq!(
            endpoints.unified_account.as_str(),
            "https://phoenix.robinhood.com/accounts/unified"
        );
        assert_eq!(
            endpoints.crypto_order("ord-1").unwrap().as_str(),
            "https://nummus.robinhood.com/orders/ord-1/"
        );
        for bad in ["../accounts", " ", ".", "..", " .. ", "a%2Fb", "a\\b", "x?y", "x#y"] {
            assert!(
                matches!(endpoints.crypto_order(bad), Err(RobinhoodError::InvalidInput(_))),
                "{bad:?} should be refused"
            );
        }
        assert!(endpoints.crypto_order("a.b").is_ok());
    }

    #[tokio::test]
    async fn test_dot_segment_ids_never_reach_transport() {
        let client = client(MockTransport::new());
        for id in [".", ".."] {
            assert!(matches!(
                client.get_crypto_order(id).await,
                Err(RobinhoodError::InvalidInput(_))
            ));
            assert!(matches!(
                client.get_daily_historicals(id).await,
                Err(RobinhoodError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_zero_poll_interval_is_refused_at_build() {
        let result = RobinhoodClient::builder(Arc::new(MockTransport::new()))
            .execution(ExecutionConfig {
                poll_interval_ms: 0,
                ..ExecutionConfig::default()
            })
            .build();
        assert!(matches!(result, Err(RobinhoodError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_place_order_posts_payload_and_binds_record() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();

        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .withf(|method, url, body| {
                *method == Method::POST
                    && url == ORDERS_URL
                    && body.as_deref()
                        == Some(concat!(
                            r#"{"account_id":"acct-1","currency_pair_id":"eth-usd-pair","#,
                            r#""price":2500.00,"ref_id":"00000000-0000-0000-0000-000000000001","#,
                            r#""side":"buy","time_in_force":"gtc","quantity":0.040000,"type":"market"}"#
                        ))
            })
            .returning(|_, _, _| Ok(order_json("unconfirmed", None).to_string()));

        mock.expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .with(eq(Method::POST), eq(CANCEL_URL), eq(None::<String>))
            .returning(|_, _, _| Ok("{}".to_string()));

        let client = client(mock);
        let intent = TradeIntent::buy_dollars(dec!(100.00), dec!(2500.00));
        let order = client
            .place_crypto_order("acct-1", &pair("ETH"), &intent)
            .await
            .unwrap();

        assert_eq!(order.id, "ord-1");
        assert_eq!(order.state, OrderState::Unconfirmed);
        assert!(order.handle().is_bound());
        assert!(order.cancel().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_submit_with_reject_reason_is_order_rejected() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_, _, _| {
                Ok(order_json("rejected", Some("Insufficient buying power.")).to_string())
            });

        let client = client(mock);
        let intent = TradeIntent::buy_dollars(dec!(100), dec!(20));
        match client.place_crypto_order("acct-1", &pair("BTC"), &intent).await {
            Err(RobinhoodError::OrderRejected { order_id, reason }) => {
                assert_eq!(order_id, "ord-1");
                assert_eq!(reason, "Insufficient buying power.");
            }
            other => panic!("expected OrderRejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_submit_failure_is_returned_once_without_retry() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(1)
            .returning(|_, _, _| Err(RobinhoodError::Timeout("POST orders".to_string())));

        let client = client(mock);
        let intent = TradeIntent::buy_dollars(dec!(100), dec!(20));
        let err = client
            .place_crypto_order("acct-1", &pair("BTC"), &intent)
            .await
            .unwrap_err();
        assert!(matches!(err, RobinhoodError::Timeout(_)));
        assert!(err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_resubmitting_a_request_reuses_its_ref_id() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2)
            .withf(|_, _, body| {
                body.as_deref()
                    .is_some_and(|b| b.contains("00000000-0000-0000-0000-000000000001"))
            })
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));

        let client = client(mock);
        let request = client
            .build_crypto_order(
                "acct-1",
                &pair("BTC"),
                &TradeIntent::sell_quantity(dec!(0.5), dec!(40000)),
            )
            .unwrap();
        client.submit_order_request(&request).await.unwrap();
        client.submit_order_request(&request).await.unwrap();
    }

    #[tokio::test]
    async fn test_invalid_intent_never_reaches_transport() {
        let client = client(MockTransport::new());
        let intent = TradeIntent::buy_dollars(dec!(100), Decimal::ZERO);
        let err = client
            .place_crypto_order("acct-1", &pair("BTC"), &intent)
            .await
            .unwrap_err();
        assert!(matches!(err, RobinhoodError::InvalidInput(_)));
        assert!(!err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_cancel_with_empty_reject_reason_succeeds() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(eq(Method::GET), eq("https://nummus.robinhood.com/orders/ord-1/"), eq(None::<String>))
            .times(1)
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));
        mock.expect_send()
            .with(eq(Method::POST), eq(CANCEL_URL), eq(None::<String>))
            .times(1)
            .returning(|_, _, _| {
                let mut v = order_json("canceled", Some(""));
                v["cancel_url"] = Value::Null;
                Ok(v.to_string())
            });

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        let cancelled = order.cancel().await.unwrap().unwrap();
        assert_eq!(cancelled.state, OrderState::Cancelled);
        assert!(cancelled.is_terminal());
        assert!(cancelled.handle().is_bound());
        // The original record is untouched
        assert_eq!(order.state, OrderState::Confirmed);
    }

    #[tokio::test]
    async fn test_cancel_rejected_by_server() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(eq(Method::GET), eq("https://nummus.robinhood.com/orders/ord-1/"), eq(None::<String>))
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));
        mock.expect_send()
            .with(eq(Method::POST), eq(CANCEL_URL), eq(None::<String>))
            .returning(|_, _, _| Ok(json!({"reject_reason": "Order already filled."}).to_string()));

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        let err = order.cancel().await.unwrap_err();
        assert_eq!(err.reject_reason(), Some("Order already filled."));
    }

    #[tokio::test]
    async fn test_get_unknown_order_surfaces_error() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(eq(Method::GET), eq("https://nummus.robinhood.com/orders/missing/"), eq(None::<String>))
            .returning(|_, _, _| {
                Err(RobinhoodError::Http {
                    status: 404,
                    body: r#"{"detail":"Not found."}"#.to_string(),
                })
            });
        mock.expect_send()
            .with(eq(Method::GET), eq("https://nummus.robinhood.com/orders/ghost/"), eq(None::<String>))
            .returning(|_, _, _| Ok(r#"{"detail":"Not found."}"#.to_string()));

        let client = client(mock);
        assert!(matches!(
            client.get_crypto_order("missing").await,
            Err(RobinhoodError::Http { status: 404, .. })
        ));
        assert!(matches!(
            client.get_crypto_order("ghost").await,
            Err(RobinhoodError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_records_do_not_keep_client_alive() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        drop(client);

        assert!(!order.handle().is_bound());
        assert!(matches!(
            order.refresh().await,
            Err(RobinhoodError::ClientUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_poll_until_terminal_stops_on_fill() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        for state in ["confirmed", "partially_filled", "filled"] {
            mock.expect_send()
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_, _, _| Ok(order_json(state, None).to_string()));
        }

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        let done = order
            .poll_until_terminal(
                std::time::Duration::from_millis(1),
                std::time::Duration::from_secs(5),
            )
            .await
            .unwrap();
        assert_eq!(done.state, OrderState::Filled);
    }

    #[tokio::test]
    async fn test_poll_until_terminal_times_out() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        let err = order
            .poll_until_terminal(
                std::time::Duration::from_millis(5),
                std::time::Duration::from_millis(12),
            )
            .await
            .unwrap_err();
        match &err {
            RobinhoodError::StillOpen { order_id, state } => {
                assert_eq!(order_id, "ord-1");
                assert_eq!(*state, OrderState::Confirmed);
            }
            other => panic!("expected StillOpen, got {other:?}"),
        }
        assert!(!err.is_outcome_unknown());
    }

    #[tokio::test]
    async fn test_zero_poll_interval_is_floored() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .times(2..=5)
            .returning(|_, _, _| Ok(order_json("confirmed", None).to_string()));

        let client = client(mock);
        let order = client.get_crypto_order("ord-1").await.unwrap();
        let err = order
            .poll_until_terminal(
                std::time::Duration::ZERO,
                std::time::Duration::from_millis(30),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RobinhoodError::StillOpen { .. }));
    }

    #[tokio::test]
    async fn test_reference_data_urls() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(
                eq(Method::GET),
                eq("https://api.robinhood.com/quotes/?symbols=AAPL%2CMSFT"),
                eq(None::<String>),
            )
            .returning(|_, _, _| {
                Ok(json!({"results": [
                    {"symbol": "AAPL", "last_trade_price": "190.10"},
                    {"symbol": "MSFT", "last_trade_price": "410.00"}
                ]})
                .to_string())
            });
        mock.expect_send()
            .with(
                eq(Method::GET),
                eq("https://api.robinhood.com/positions/?account_number=5QR24141&nonzero=true"),
                eq(None::<String>),
            )
            .returning(|_, _, _| Ok(json!({"results": []}).to_string()));
        mock.expect_send()
            .with(
                eq(Method::GET),
                eq("https://api.robinhood.com/marketdata/forex/historicals/btc-usd-pair/?bounds=24_7&interval=day&span=week"),
                eq(None::<String>),
            )
            .returning(|_, _, _| {
                Ok(json!({"data_points": [{
                    "begins_at": "2024-01-10T00:00:00Z",
                    "open_price": "46000.10",
                    "close_price": "46500.00",
                    "high_price": "47000.00",
                    "low_price": "45500.00",
                    "volume": 0,
                    "session": "reg",
                    "interpolated": false
                }]})
                .to_string())
            });

        let client = client(mock);
        let quotes = client.get_quotes(&["AAPL", "MSFT"]).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(quotes[1].last_trade_price, Some(dec!(410.00)));

        let account: Account = serde_json::from_value(json!({
            "account_number": "5QR24141",
            "positions": null
        }))
        .unwrap();
        let positions = client
            .get_positions_with(&account, PositionParams { nonzero: true })
            .await
            .unwrap();
        assert!(positions.is_empty());

        let bars = client.get_daily_historicals("btc-usd-pair").await.unwrap();
        assert_eq!(bars[0].close_price, dec!(46500.00));

        assert!(client.get_quotes(&[]).await.is_err());
    }

    #[tokio::test]
    async fn test_find_currency_pair_by_symbol_or_code() {
        let mut mock = MockTransport::new();
        mock.expect_send()
            .with(
                eq(Method::GET),
                eq("https://nummus.robinhood.com/currency_pairs/"),
                eq(None::<String>),
            )
            .times(3)
            .returning(|_, _, _| {
                Ok(json!({"results": [
                    serde_json::to_value(pair("BTC")).unwrap(),
                    serde_json::to_value(pair("ETH")).unwrap()
                ]})
                .to_string())
            });

        let client = client(mock);
        assert_eq!(client.find_currency_pair("eth-usd").await.unwrap().code(), "ETH");
        assert_eq!(client.find_currency_pair("BTC").await.unwrap().id, "btc-usd-pair");
        assert!(matches!(
            client.find_currency_pair("XYZ").await,
            Err(RobinhoodError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_enum_helpers_used_by_builder() {
        assert_eq!(OrderSide::Sell.as_str(), "sell");
        assert!(OrderType::StopLimit.requires_price());
    }
}

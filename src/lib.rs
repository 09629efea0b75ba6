//! Async Robinhood client with crypto order support.
//!
//! Dollar amounts are converted to asset quantities with per-currency precision,
//! orders are submitted with a client-generated `ref_id`, and the returned
//! [`CryptoOrder`] records can be cancelled, refreshed or polled to completion.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod market_hours;
pub mod orders;
pub(crate) mod wire;

pub use adapters::{ClientBuilder, ReqwestTransport, RobinhoodClient, Transport};
pub use config::AppConfig;
pub use domain::{
    CurrencyPair, OrderSide, OrderState, OrderType, QuantitySpec, TimeInForce, TradeIntent,
};
pub use error::{Result, RobinhoodError};
pub use logging::init_logging;
pub use orders::{
    calculate_quantity, CryptoOrder, OrderBuilder, OrderRequest, PrecisionTable,
    RefIdGenerator, UuidV4Generator,
};

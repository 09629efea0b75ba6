use thiserror::Error;

use crate::domain::OrderState;

/// Main error type for the Robinhood client
#[derive(Error, Debug)]
pub enum RobinhoodError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Caller input errors (nothing was sent)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Network errors
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Rate limited: {0}")]
    RateLimited(String),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    Decode(String),

    // Order lifecycle errors
    #[error("Order {order_id} rejected: {reason}")]
    OrderRejected { order_id: String, reason: String },

    #[error("Cancel of order {order_id} rejected: {reason}")]
    CancelRejected { order_id: String, reason: String },

    /// Polling deadline passed; the last successful fetch showed the order open
    #[error("Order {order_id} still {state:?} when polling stopped")]
    StillOpen { order_id: String, state: OrderState },

    #[error("Client unavailable: {0}")]
    ClientUnavailable(String),

    // Authentication errors
    #[error("Authentication error: {0}")]
    Auth(String),
}

impl RobinhoodError {
    /// Whether the request may have reached the server and changed state there.
    ///
    /// When this returns `true` after a submit or cancel, the order's fate is
    /// unknown: poll it by id (or resubmit the *same* request, reusing its
    /// `ref_id`) instead of building a new order.
    pub fn is_outcome_unknown(&self) -> bool {
        match self {
            RobinhoodError::Timeout(_) => true,
            RobinhoodError::Transport(e) => !(e.is_connect() || e.is_builder()),
            RobinhoodError::Http { status, .. } => *status >= 500,
            // The server answered but the body did not match; the call went through.
            RobinhoodError::Json(_) | RobinhoodError::Decode(_) => true,
            _ => false,
        }
    }

    /// Rejection reason reported by the server, if this is a rejection.
    pub fn reject_reason(&self) -> Option<&str> {
        match self {
            RobinhoodError::OrderRejected { reason, .. }
            | RobinhoodError::CancelRejected { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Result type alias for RobinhoodError
pub type Result<T> = std::result::Result<T, RobinhoodError>;

pub mod builder;
pub mod crypto;
pub mod quantity;

pub use builder::{OrderBuilder, OrderRequest, RefIdGenerator, UuidV4Generator};
pub use crypto::{CryptoOrder, Execution, OrderHandle};
pub use quantity::{calculate_quantity, PrecisionTable};

pub mod robinhood;
pub mod transport;

pub use robinhood::{ClientBuilder, Endpoints, RobinhoodClient};
pub use transport::{ReqwestTransport, Transport};

//! Typed async client for the Binance margin-trading REST API.
//!
//! Each exported operation is a one-to-one mapping of typed request struct →
//! signed HTTP call → typed result struct, covering the `sapi/v1/margin`
//! namespace: order placement and cancellation, order queries, account and
//! asset metadata, trade history, and borrow/transfer limits.
//!
//! # Features
//!
//! - **Typed boundary**: request and result structs instead of raw JSON
//! - **Injected transport**: the HTTP/signing layer is a [`Transport`] trait
//!   object, so tests and alternative stacks can swap it out
//! - **Error handling**: structured error types with `thiserror`
//! - **Observability**: `tracing` events at request and decode boundaries
//!
//! # Example
//!
//! ```rust,no_run
//! use binance_margin::{MarginClient, NewMarginOrderRequest, OrderSide, OrderType, TransportConfig};
//!
//! # async fn example() -> binance_margin::Result<()> {
//! let client = MarginClient::connect(TransportConfig {
//!     api_key: Some("api-key".into()),
//!     secret: Some("secret".into()),
//!     ..Default::default()
//! })?;
//!
//! let request = NewMarginOrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.5, 42_000.0);
//! let order = client.new_margin_order(&request).await?;
//! println!("placed order {}", order.order_id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod auth;
pub mod client;
pub mod error;
pub mod logging;
mod parser;
pub mod requests;
pub mod time;
pub mod transport;
pub mod types;

pub use auth::MarginAuth;
pub use client::MarginClient;
pub use error::{ContextExt, Error, ExchangeErrorDetails, NetworkError, ParseError, Result};
pub use logging::{init_logging, try_init_logging, LogConfig, LogFormat, LogLevel};
pub use requests::{
    AccountRequest, AllOrdersRequest, CancelOrderRequest, MaxMarginRequest, MyTradesRequest,
    NewMarginOrderRequest, OpenOrdersRequest, QueryOrderRequest,
};
pub use transport::{ApiResponse, HttpTransport, Transport, TransportConfig};
pub use types::{
    Asset, CanceledOrder, ExecutedOrder, MarginAccount, MarginAsset, NewOrderRespType, OrderSide,
    OrderStatus, OrderType, ProcessedOrder, SideEffectType, TimeInForce, Trade,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

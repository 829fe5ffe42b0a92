//! Request structs for margin operations and their query-parameter encoding.
//!
//! Each struct exposes public fields plus a `params()` method that produces
//! the exact key/value set the endpoint expects. Optional fields are
//! `Option` and omitted when `None`; isolated-margin requests send
//! `isIsolated=TRUE` and omit the key entirely otherwise.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::time::{recv_window_millis, unix_millis};
use crate::types::{NewOrderRespType, OrderSide, OrderType, SideEffectType, TimeInForce};

/// Formats a float as its shortest decimal representation that parses back
/// to the same value. `Display` for `f64` already guarantees both the
/// round-trip and the absence of exponent notation.
pub(crate) fn format_float(value: f64) -> String {
    value.to_string()
}

fn insert_recv_window(params: &mut HashMap<String, String>, recv_window: Option<Duration>) {
    if let Some(window) = recv_window {
        params.insert(
            "recvWindow".to_string(),
            recv_window_millis(window).to_string(),
        );
    }
}

fn insert_is_isolated(params: &mut HashMap<String, String>, is_isolated: bool) {
    if is_isolated {
        params.insert("isIsolated".to_string(), "TRUE".to_string());
    }
}

/// Parameters for placing a margin order.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMarginOrderRequest {
    /// Trading pair symbol, e.g. `BTCUSDT`.
    pub symbol: String,
    /// Order side.
    pub side: OrderSide,
    /// Order type.
    pub order_type: OrderType,
    /// Order quantity in the base asset.
    pub quantity: f64,
    /// Limit price. Only sent when positive.
    pub price: Option<f64>,
    /// Stop trigger price. Only sent when nonzero.
    pub stop_price: Option<f64>,
    /// Client-assigned order id.
    pub new_client_order_id: Option<String>,
    /// Iceberg quantity. Only sent when nonzero.
    pub iceberg_qty: Option<f64>,
    /// Borrow/repay side effect.
    pub side_effect_type: Option<SideEffectType>,
    /// Time in force. Required by the exchange for limit orders.
    pub time_in_force: Option<TimeInForce>,
    /// Response detail level.
    pub new_order_resp_type: Option<NewOrderRespType>,
    /// Place the order on the isolated margin account for `symbol`.
    pub is_isolated: bool,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl NewMarginOrderRequest {
    /// Creates a request with only the universally required fields set.
    pub fn new(
        symbol: impl Into<String>,
        side: OrderSide,
        order_type: OrderType,
        quantity: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type,
            quantity,
            price: None,
            stop_price: None,
            new_client_order_id: None,
            iceberg_qty: None,
            side_effect_type: None,
            time_in_force: None,
            new_order_resp_type: None,
            is_isolated: false,
            timestamp: Utc::now(),
        }
    }

    /// Creates a GTC limit order request.
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: f64, price: f64) -> Self {
        let mut request = Self::new(symbol, side, OrderType::Limit, quantity);
        request.price = Some(price);
        request.time_in_force = Some(TimeInForce::GTC);
        request
    }

    /// Creates a market order request.
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self::new(symbol, side, OrderType::Market, quantity)
    }

    /// Marks the order as isolated-margin.
    #[must_use]
    pub fn isolated(mut self) -> Self {
        self.is_isolated = true;
        self
    }

    /// Sets the borrow/repay side effect.
    #[must_use]
    pub fn side_effect(mut self, effect: SideEffectType) -> Self {
        self.side_effect_type = Some(effect);
        self
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert("side".to_string(), self.side.to_string());
        params.insert("type".to_string(), self.order_type.to_string());
        params.insert("quantity".to_string(), format_float(self.quantity));
        if let Some(price) = self.price {
            if price > 0.0 {
                params.insert("price".to_string(), format_float(price));
            }
        }
        if let Some(stop_price) = self.stop_price {
            if stop_price != 0.0 {
                params.insert("stopPrice".to_string(), format_float(stop_price));
            }
        }
        if let Some(ref id) = self.new_client_order_id {
            params.insert("newClientOrderId".to_string(), id.clone());
        }
        if let Some(iceberg_qty) = self.iceberg_qty {
            if iceberg_qty != 0.0 {
                params.insert("icebergQty".to_string(), format_float(iceberg_qty));
            }
        }
        if let Some(effect) = self.side_effect_type {
            params.insert("sideEffectType".to_string(), effect.to_string());
        }
        if let Some(tif) = self.time_in_force {
            params.insert("timeInForce".to_string(), tif.to_string());
        }
        if let Some(resp_type) = self.new_order_resp_type {
            params.insert("newOrderRespType".to_string(), resp_type.to_string());
        }
        insert_is_isolated(&mut params, self.is_isolated);
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        params
    }

    /// Same encoding as [`params`](Self::params) minus `newOrderRespType`,
    /// which the validation-only endpoint does not accept.
    pub(crate) fn test_params(&self) -> HashMap<String, String> {
        let mut params = self.params();
        params.remove("newOrderRespType");
        params
    }
}

/// Parameters for looking up a single order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOrderRequest {
    /// Trading pair symbol.
    pub symbol: String,
    /// Exchange-assigned order id.
    pub order_id: Option<i64>,
    /// Client-assigned order id.
    pub orig_client_order_id: Option<String>,
    /// Look up on the isolated margin account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl QueryOrderRequest {
    /// Creates a query for `order_id` on `symbol`.
    pub fn by_order_id(symbol: impl Into<String>, order_id: i64) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: Some(order_id),
            orig_client_order_id: None,
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates a query by client order id on `symbol`.
    pub fn by_client_order_id(
        symbol: impl Into<String>,
        client_order_id: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: None,
            orig_client_order_id: Some(client_order_id.into()),
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        if let Some(order_id) = self.order_id {
            params.insert("orderId".to_string(), order_id.to_string());
        }
        if let Some(ref id) = self.orig_client_order_id {
            params.insert("origClientOrderId".to_string(), id.clone());
        }
        insert_is_isolated(&mut params, self.is_isolated);
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

/// Parameters for canceling an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelOrderRequest {
    /// Trading pair symbol.
    pub symbol: String,
    /// Exchange-assigned order id.
    pub order_id: Option<i64>,
    /// Client-assigned id of the order to cancel.
    pub orig_client_order_id: Option<String>,
    /// Client-assigned id for the cancel request itself.
    pub new_client_order_id: Option<String>,
    /// Cancel on the isolated margin account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl CancelOrderRequest {
    /// Creates a cancel request for `order_id` on `symbol`.
    pub fn by_order_id(symbol: impl Into<String>, order_id: i64) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: Some(order_id),
            orig_client_order_id: None,
            new_client_order_id: None,
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        if let Some(order_id) = self.order_id {
            params.insert("orderId".to_string(), order_id.to_string());
        }
        if let Some(ref id) = self.orig_client_order_id {
            params.insert("origClientOrderId".to_string(), id.clone());
        }
        if let Some(ref id) = self.new_client_order_id {
            params.insert("newClientOrderId".to_string(), id.clone());
        }
        insert_is_isolated(&mut params, self.is_isolated);
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

/// Parameters for listing open orders on a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOrdersRequest {
    /// Trading pair symbol.
    pub symbol: String,
    /// List orders on the isolated margin account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl OpenOrdersRequest {
    /// Creates a request for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        insert_is_isolated(&mut params, self.is_isolated);
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

/// Parameters for listing historical orders on a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllOrdersRequest {
    /// Trading pair symbol.
    pub symbol: String,
    /// Start listing from this order id.
    pub order_id: Option<i64>,
    /// Maximum number of orders to return.
    pub limit: Option<u32>,
    /// List orders on the isolated margin account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl AllOrdersRequest {
    /// Creates a request for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            order_id: None,
            limit: None,
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        insert_is_isolated(&mut params, self.is_isolated);
        if let Some(order_id) = self.order_id {
            params.insert("orderId".to_string(), order_id.to_string());
        }
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), limit.to_string());
        }
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

/// Parameters for fetching a margin account or the margin asset list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRequest {
    /// Fetch the isolated margin account instead of the cross account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl AccountRequest {
    /// Creates a cross-margin account request.
    pub fn cross() -> Self {
        Self {
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    /// Creates an isolated-margin account request.
    pub fn isolated() -> Self {
        Self {
            is_isolated: true,
            ..Self::cross()
        }
    }

    /// Account requests carry whole-second timestamps.
    pub(crate) fn account_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(
            "timestamp".to_string(),
            (self.timestamp.timestamp() * 1000).to_string(),
        );
        insert_recv_window(&mut params, self.recv_window);
        params
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

impl Default for AccountRequest {
    fn default() -> Self {
        Self::cross()
    }
}

/// Parameters for listing the account's trade fills on a symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MyTradesRequest {
    /// Trading pair symbol.
    pub symbol: String,
    /// Resume listing from this trade id. Encoded under the `orderId` key,
    /// which is what the endpoint reads the cursor from.
    pub from_id: Option<i64>,
    /// Maximum number of trades to return.
    pub limit: Option<u32>,
    /// List trades on the isolated margin account.
    pub is_isolated: bool,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MyTradesRequest {
    /// Creates a request for `symbol`.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            from_id: None,
            limit: None,
            is_isolated: false,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), self.symbol.clone());
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        insert_is_isolated(&mut params, self.is_isolated);
        insert_recv_window(&mut params, self.recv_window);
        if let Some(from_id) = self.from_id {
            params.insert("orderId".to_string(), from_id.to_string());
        }
        if let Some(limit) = self.limit {
            params.insert("limit".to_string(), limit.to_string());
        }
        params
    }
}

/// Parameters for the max-borrowable and max-transferable queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxMarginRequest {
    /// Asset code to query, e.g. `BTC`.
    pub asset: String,
    /// Isolated pair to scope the query to; `None` queries the cross account.
    pub isolated_symbol: Option<String>,
    /// Request validity window.
    pub recv_window: Option<Duration>,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl MaxMarginRequest {
    /// Creates a cross-account query for `asset`.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            isolated_symbol: None,
            recv_window: None,
            timestamp: Utc::now(),
        }
    }

    /// Scopes the query to an isolated pair.
    #[must_use]
    pub fn isolated(mut self, symbol: impl Into<String>) -> Self {
        self.isolated_symbol = Some(symbol.into());
        self
    }

    pub(crate) fn params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("asset".to_string(), self.asset.clone());
        if let Some(ref symbol) = self.isolated_symbol {
            params.insert("isolatedSymbol".to_string(), symbol.clone());
        }
        params.insert(
            "timestamp".to_string(),
            unix_millis(self.timestamp).to_string(),
        );
        insert_recv_window(&mut params, self.recv_window);
        params
    }
}

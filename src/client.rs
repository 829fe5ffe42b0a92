//! The margin client: typed operations over the `sapi/v1/margin` namespace.

use std::sync::Arc;

use reqwest::Method;
use tracing::debug;

use crate::error::{ContextExt, Result};
use crate::parser;
use crate::requests::{
    AccountRequest, AllOrdersRequest, CancelOrderRequest, MaxMarginRequest, MyTradesRequest,
    NewMarginOrderRequest, OpenOrdersRequest, QueryOrderRequest,
};
use crate::transport::{handle_error, ApiResponse, HttpTransport, Transport, TransportConfig};
use crate::types::{
    CanceledOrder, ExecutedOrder, MarginAccount, MarginAsset, ProcessedOrder, Trade,
};

const ORDER_PATH: &str = "sapi/v1/margin/order";
const ORDER_TEST_PATH: &str = "sapi/v1/margin/order/test";
const OPEN_ORDERS_PATH: &str = "sapi/v1/margin/openOrders";
const ALL_ORDERS_PATH: &str = "sapi/v1/margin/allOrders";
const ACCOUNT_PATH: &str = "sapi/v1/margin/account";
const ISOLATED_ACCOUNT_PATH: &str = "sapi/v1/margin/isolated/account";
const MY_TRADES_PATH: &str = "sapi/v1/margin/myTrades";
const ALL_ASSETS_PATH: &str = "sapi/v1/margin/allAssets";
const MAX_BORROWABLE_PATH: &str = "sapi/v1/margin/maxBorrowable";
const MAX_TRANSFERABLE_PATH: &str = "sapi/v1/margin/maxTransferable";

/// Client for the margin REST API.
///
/// All operations go through an injected [`Transport`], so tests can stub
/// the wire and callers can share one client across tasks cheaply via the
/// inner `Arc`.
#[derive(Clone)]
pub struct MarginClient {
    transport: Arc<dyn Transport>,
}

impl MarginClient {
    /// Creates a client over an existing transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Creates a client backed by an [`HttpTransport`] built from `config`.
    pub fn connect(config: TransportConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpTransport::new(config)?)))
    }

    async fn signed(
        &self,
        method: Method,
        path: &str,
        params: std::collections::HashMap<String, String>,
    ) -> Result<ApiResponse> {
        let response = self.transport.request(method, path, params, true, true).await?;
        if !response.is_ok() {
            return Err(handle_error(&response.body));
        }
        Ok(response)
    }

    /// Places a margin order.
    pub async fn new_margin_order(
        &self,
        request: &NewMarginOrderRequest,
    ) -> Result<ProcessedOrder> {
        debug!(symbol = %request.symbol, side = %request.side, "placing margin order");
        let response = self
            .signed(Method::POST, ORDER_PATH, request.params())
            .await?;
        parser::parse_processed_order(&response.body).context("decoding order placement response")
    }

    /// Validates a margin order without sending it to the matching engine.
    pub async fn new_margin_order_test(&self, request: &NewMarginOrderRequest) -> Result<()> {
        self.signed(Method::POST, ORDER_TEST_PATH, request.test_params())
            .await?;
        Ok(())
    }

    /// Looks up a single order by exchange or client order id.
    pub async fn query_margin_order(&self, request: &QueryOrderRequest) -> Result<ExecutedOrder> {
        let response = self.signed(Method::GET, ORDER_PATH, request.params()).await?;
        parser::parse_executed_order(&response.body).context("decoding order query response")
    }

    /// Cancels an order.
    pub async fn cancel_margin_order(
        &self,
        request: &CancelOrderRequest,
    ) -> Result<CanceledOrder> {
        debug!(symbol = %request.symbol, order_id = ?request.order_id, "canceling margin order");
        let response = self
            .signed(Method::DELETE, ORDER_PATH, request.params())
            .await?;
        parser::parse_canceled_order(&response.body).context("decoding cancel response")
    }

    /// Lists currently open orders on a symbol.
    pub async fn open_margin_orders(
        &self,
        request: &OpenOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>> {
        let response = self
            .signed(Method::GET, OPEN_ORDERS_PATH, request.params())
            .await?;
        parser::parse_executed_orders(&response.body).context("decoding open orders response")
    }

    /// Lists historical orders on a symbol.
    pub async fn all_margin_orders(
        &self,
        request: &AllOrdersRequest,
    ) -> Result<Vec<ExecutedOrder>> {
        let response = self
            .signed(Method::GET, ALL_ORDERS_PATH, request.params())
            .await?;
        parser::parse_executed_orders(&response.body).context("decoding order history response")
    }

    /// Fetches the cross or isolated margin account, per
    /// [`AccountRequest::is_isolated`].
    pub async fn margin_account(&self, request: &AccountRequest) -> Result<MarginAccount> {
        let path = if request.is_isolated {
            ISOLATED_ACCOUNT_PATH
        } else {
            ACCOUNT_PATH
        };
        let response = self
            .signed(Method::GET, path, request.account_params())
            .await?;
        if request.is_isolated {
            parser::parse_isolated_margin_account(&response.body)
                .context("decoding isolated account response")
        } else {
            parser::parse_cross_margin_account(&response.body)
                .context("decoding account response")
        }
    }

    /// Lists the account's trade fills on a symbol.
    pub async fn my_margin_trades(&self, request: &MyTradesRequest) -> Result<Vec<Trade>> {
        let response = self
            .signed(Method::GET, MY_TRADES_PATH, request.params())
            .await?;
        parser::parse_trades(&response.body).context("decoding trades response")
    }

    /// Lists all assets available for margin trading.
    pub async fn all_margin_assets(&self, request: &AccountRequest) -> Result<Vec<MarginAsset>> {
        let response = self
            .signed(Method::GET, ALL_ASSETS_PATH, request.params())
            .await?;
        parser::parse_margin_assets(&response.body).context("decoding asset list response")
    }

    /// Returns the maximum borrowable amount of an asset.
    pub async fn max_borrow(&self, request: &MaxMarginRequest) -> Result<f64> {
        let response = self
            .signed(Method::GET, MAX_BORROWABLE_PATH, request.params())
            .await?;
        parser::parse_amount(&response.body).context("decoding max borrowable response")
    }

    /// Returns the maximum transferable amount of an asset.
    pub async fn max_transfer(&self, request: &MaxMarginRequest) -> Result<f64> {
        let response = self
            .signed(Method::GET, MAX_TRANSFERABLE_PATH, request.params())
            .await?;
        parser::parse_amount(&response.body).context("decoding max transferable response")
    }
}

impl std::fmt::Debug for MarginClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarginClient").finish_non_exhaustive()
    }
}

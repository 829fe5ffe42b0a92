//! Response decoding: raw serde shapes for each endpoint and the conversions
//! into the public result types.
//!
//! Numeric fields arrive as JSON strings or numbers depending on endpoint
//! and field. [`RawNumber`] accepts both; a value that fails to parse decodes
//! to `0.0` with a warning rather than failing the whole response. Timestamps
//! and enums are strict: a malformed timestamp or an unknown enum constant is
//! a decode error.

use serde::Deserialize;
use tracing::warn;

use crate::error::{ParseError, Result};
use crate::time::time_from_unix_timestamp_float;
use crate::types::{
    Asset, CanceledOrder, ExecutedOrder, MarginAccount, MarginAsset, OrderSide, OrderStatus,
    OrderType, ProcessedOrder, TimeInForce, Trade,
};

/// A numeric wire value that may be encoded as a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RawNumber {
    Number(f64),
    Text(String),
}

impl Default for RawNumber {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

impl RawNumber {
    /// Parses the value, mapping a malformed string to `0.0`.
    pub(crate) fn float_or_zero(&self, field: &'static str) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => match text.parse() {
                Ok(value) => value,
                Err(_) => {
                    warn!(field, value = %text, "unparseable numeric field, substituting 0");
                    0.0
                }
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawProcessedOrder {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    order_id: i64,
    #[serde(default)]
    client_order_id: String,
    #[serde(default)]
    transact_time: f64,
    #[serde(default)]
    price: RawNumber,
    #[serde(default)]
    orig_qty: RawNumber,
    #[serde(default)]
    executed_qty: RawNumber,
    // the exchange misspells this wire key
    #[serde(default, rename = "cummulativeQuoteQty")]
    cumulative_quote_qty: RawNumber,
    status: OrderStatus,
    time_in_force: TimeInForce,
    #[serde(rename = "type")]
    order_type: OrderType,
    side: OrderSide,
    #[serde(default)]
    is_isolated: bool,
}

pub(crate) fn parse_processed_order(body: &[u8]) -> Result<ProcessedOrder> {
    let raw: RawProcessedOrder =
        serde_json::from_slice(body).map_err(ParseError::from)?;
    let transact_time = time_from_unix_timestamp_float(raw.transact_time)?;
    Ok(ProcessedOrder {
        symbol: raw.symbol,
        order_id: raw.order_id,
        client_order_id: raw.client_order_id,
        transact_time,
        price: raw.price.float_or_zero("price"),
        orig_qty: raw.orig_qty.float_or_zero("origQty"),
        executed_qty: raw.executed_qty.float_or_zero("executedQty"),
        cumulative_quote_qty: raw.cumulative_quote_qty.float_or_zero("cummulativeQuoteQty"),
        status: raw.status,
        time_in_force: raw.time_in_force,
        order_type: raw.order_type,
        side: raw.side,
        is_isolated: raw.is_isolated,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawExecutedOrder {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    order_id: i64,
    #[serde(default)]
    client_order_id: String,
    #[serde(default)]
    price: RawNumber,
    #[serde(default)]
    orig_qty: RawNumber,
    #[serde(default)]
    executed_qty: RawNumber,
    #[serde(default, rename = "cummulativeQuoteQty")]
    cumulative_quote_qty: RawNumber,
    status: OrderStatus,
    time_in_force: TimeInForce,
    #[serde(rename = "type")]
    order_type: OrderType,
    side: OrderSide,
    #[serde(default)]
    stop_price: RawNumber,
    #[serde(default)]
    iceberg_qty: RawNumber,
    #[serde(default)]
    time: f64,
    #[serde(default)]
    update_time: f64,
    #[serde(default)]
    is_working: bool,
    #[serde(default)]
    is_isolated: bool,
}

fn executed_order_from_raw(raw: RawExecutedOrder) -> Result<ExecutedOrder> {
    let time = time_from_unix_timestamp_float(raw.time)?;
    let update_time = time_from_unix_timestamp_float(raw.update_time)?;
    Ok(ExecutedOrder {
        symbol: raw.symbol,
        order_id: raw.order_id,
        client_order_id: raw.client_order_id,
        price: raw.price.float_or_zero("price"),
        orig_qty: raw.orig_qty.float_or_zero("origQty"),
        executed_qty: raw.executed_qty.float_or_zero("executedQty"),
        cumulative_quote_qty: raw.cumulative_quote_qty.float_or_zero("cummulativeQuoteQty"),
        status: raw.status,
        time_in_force: raw.time_in_force,
        order_type: raw.order_type,
        side: raw.side,
        stop_price: raw.stop_price.float_or_zero("stopPrice"),
        iceberg_qty: raw.iceberg_qty.float_or_zero("icebergQty"),
        time,
        update_time,
        is_working: raw.is_working,
        is_isolated: raw.is_isolated,
    })
}

pub(crate) fn parse_executed_order(body: &[u8]) -> Result<ExecutedOrder> {
    let raw: RawExecutedOrder = serde_json::from_slice(body).map_err(ParseError::from)?;
    executed_order_from_raw(raw)
}

pub(crate) fn parse_executed_orders(body: &[u8]) -> Result<Vec<ExecutedOrder>> {
    let raw: Vec<RawExecutedOrder> = serde_json::from_slice(body).map_err(ParseError::from)?;
    raw.into_iter().map(executed_order_from_raw).collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCanceledOrder {
    #[serde(default)]
    symbol: String,
    #[serde(default)]
    orig_client_order_id: String,
    #[serde(default)]
    order_id: i64,
    #[serde(default)]
    client_order_id: String,
}

pub(crate) fn parse_canceled_order(body: &[u8]) -> Result<CanceledOrder> {
    let raw: RawCanceledOrder = serde_json::from_slice(body).map_err(ParseError::from)?;
    Ok(CanceledOrder {
        symbol: raw.symbol,
        orig_client_order_id: raw.orig_client_order_id,
        order_id: raw.order_id,
        client_order_id: raw.client_order_id,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBalance {
    #[serde(default)]
    asset: String,
    #[serde(default)]
    borrowed: RawNumber,
    #[serde(default)]
    free: RawNumber,
    #[serde(default)]
    interest: RawNumber,
    #[serde(default)]
    locked: RawNumber,
    #[serde(default)]
    net_asset: RawNumber,
}

impl RawBalance {
    fn into_asset(self) -> Asset {
        Asset {
            asset: self.asset,
            borrowed: self.borrowed.float_or_zero("borrowed"),
            free: self.free.float_or_zero("free"),
            interest: self.interest.float_or_zero("interest"),
            locked: self.locked.float_or_zero("locked"),
            net_asset: self.net_asset.float_or_zero("netAsset"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIsolatedPair {
    #[serde(default)]
    base_asset: RawBalance,
    #[serde(default)]
    quote_asset: RawBalance,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCrossAccount {
    #[serde(default)]
    borrow_enabled: bool,
    #[serde(default)]
    margin_level: RawNumber,
    #[serde(default)]
    total_asset_of_btc: RawNumber,
    #[serde(default)]
    total_liability_of_btc: RawNumber,
    #[serde(default)]
    total_net_asset_of_btc: RawNumber,
    #[serde(default)]
    trade_enabled: bool,
    #[serde(default)]
    transfer_enabled: bool,
    #[serde(default)]
    user_assets: Vec<RawBalance>,
    #[serde(default)]
    assets: Vec<RawIsolatedPair>,
}

/// Decodes the cross-margin account response. Flat `userAssets` balances come
/// first, then for any pair entries the base balance followed by the quote
/// balance, in response order.
pub(crate) fn parse_cross_margin_account(body: &[u8]) -> Result<MarginAccount> {
    let raw: RawCrossAccount = serde_json::from_slice(body).map_err(ParseError::from)?;
    let mut assets = Vec::with_capacity(raw.user_assets.len() + raw.assets.len() * 2);
    for balance in raw.user_assets {
        assets.push(balance.into_asset());
    }
    for pair in raw.assets {
        assets.push(pair.base_asset.into_asset());
        assets.push(pair.quote_asset.into_asset());
    }
    Ok(MarginAccount {
        borrow_enabled: raw.borrow_enabled,
        margin_level: raw.margin_level.float_or_zero("marginLevel"),
        total_asset_of_btc: raw.total_asset_of_btc.float_or_zero("totalAssetOfBtc"),
        total_liability_of_btc: raw
            .total_liability_of_btc
            .float_or_zero("totalLiabilityOfBtc"),
        total_net_asset_of_btc: raw
            .total_net_asset_of_btc
            .float_or_zero("totalNetAssetOfBtc"),
        trade_enabled: raw.trade_enabled,
        transfer_enabled: raw.transfer_enabled,
        assets,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIsolatedAccount {
    #[serde(default)]
    total_asset_of_btc: RawNumber,
    #[serde(default)]
    total_liability_of_btc: RawNumber,
    #[serde(default)]
    total_net_asset_of_btc: RawNumber,
    #[serde(default)]
    assets: Vec<RawIsolatedPair>,
}

/// Decodes the isolated-margin account response. Account-wide flags and the
/// margin level are not part of this response and stay at their defaults;
/// each pair contributes its base balance then its quote balance.
pub(crate) fn parse_isolated_margin_account(body: &[u8]) -> Result<MarginAccount> {
    let raw: RawIsolatedAccount = serde_json::from_slice(body).map_err(ParseError::from)?;
    let mut assets = Vec::with_capacity(raw.assets.len() * 2);
    for pair in raw.assets {
        assets.push(pair.base_asset.into_asset());
        assets.push(pair.quote_asset.into_asset());
    }
    Ok(MarginAccount {
        total_asset_of_btc: raw.total_asset_of_btc.float_or_zero("totalAssetOfBtc"),
        total_liability_of_btc: raw
            .total_liability_of_btc
            .float_or_zero("totalLiabilityOfBtc"),
        total_net_asset_of_btc: raw
            .total_net_asset_of_btc
            .float_or_zero("totalNetAssetOfBtc"),
        assets,
        ..MarginAccount::default()
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrade {
    #[serde(default)]
    id: i64,
    #[serde(default)]
    price: RawNumber,
    #[serde(default)]
    qty: RawNumber,
    #[serde(default)]
    commission: RawNumber,
    #[serde(default)]
    commission_asset: String,
    #[serde(default)]
    time: f64,
    #[serde(default)]
    is_buyer: bool,
    #[serde(default)]
    is_maker: bool,
    #[serde(default)]
    is_best_match: bool,
    #[serde(default)]
    is_isolated: bool,
}

pub(crate) fn parse_trades(body: &[u8]) -> Result<Vec<Trade>> {
    let raw: Vec<RawTrade> = serde_json::from_slice(body).map_err(ParseError::from)?;
    raw.into_iter()
        .map(|trade| {
            let time = time_from_unix_timestamp_float(trade.time)?;
            Ok(Trade {
                id: trade.id,
                price: trade.price.float_or_zero("price"),
                qty: trade.qty.float_or_zero("qty"),
                commission: trade.commission.float_or_zero("commission"),
                commission_asset: trade.commission_asset,
                time,
                is_buyer: trade.is_buyer,
                is_maker: trade.is_maker,
                is_best_match: trade.is_best_match,
                is_isolated: trade.is_isolated,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMarginAsset {
    #[serde(default)]
    asset_name: String,
    #[serde(default, rename = "isBorrowable")]
    can_borrow: bool,
    #[serde(default, rename = "isMortgageable")]
    can_mortgage: bool,
    #[serde(default)]
    user_min_borrow: RawNumber,
    #[serde(default)]
    user_min_repay: RawNumber,
}

pub(crate) fn parse_margin_assets(body: &[u8]) -> Result<Vec<MarginAsset>> {
    let raw: Vec<RawMarginAsset> = serde_json::from_slice(body).map_err(ParseError::from)?;
    Ok(raw
        .into_iter()
        .map(|asset| MarginAsset {
            asset: asset.asset_name,
            can_borrow: asset.can_borrow,
            can_mortgage: asset.can_mortgage,
            user_min_borrow: asset.user_min_borrow.float_or_zero("userMinBorrow"),
            user_min_repay: asset.user_min_repay.float_or_zero("userMinRepay"),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct RawAmount {
    #[serde(default)]
    amount: RawNumber,
}

/// Decodes the `{"amount": ...}` envelope shared by the max-borrowable and
/// max-transferable endpoints.
pub(crate) fn parse_amount(body: &[u8]) -> Result<f64> {
    let raw: RawAmount = serde_json::from_slice(body).map_err(ParseError::from)?;
    Ok(raw.amount.float_or_zero("amount"))
}

//! Public data types: order enums and the result structs returned by
//! [`MarginClient`](crate::client::MarginClient) operations.
//!
//! Enums are closed sets with serde renames matching the exchange's wire
//! constants; an unrecognized wire value fails decoding rather than passing
//! through silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order status reported by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order accepted and resting.
    New,
    /// Part of the order quantity has been filled.
    PartiallyFilled,
    /// Entire order quantity has been filled.
    Filled,
    /// Order was canceled by the user.
    Canceled,
    /// Cancellation requested but not yet confirmed.
    PendingCancel,
    /// Order was rejected by the matching engine.
    Rejected,
    /// Order expired per its time-in-force.
    Expired,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "NEW",
            Self::PartiallyFilled => "PARTIALLY_FILLED",
            Self::Filled => "FILLED",
            Self::Canceled => "CANCELED",
            Self::PendingCancel => "PENDING_CANCEL",
            Self::Rejected => "REJECTED",
            Self::Expired => "EXPIRED",
        };
        write!(f, "{s}")
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Limit order at a fixed price.
    Limit,
    /// Market order at the best available price.
    Market,
    /// Stop-loss market order.
    StopLoss,
    /// Stop-loss limit order.
    StopLossLimit,
    /// Take-profit market order.
    TakeProfit,
    /// Take-profit limit order.
    TakeProfitLimit,
    /// Limit order that is rejected if it would match immediately.
    LimitMaker,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Limit => "LIMIT",
            Self::Market => "MARKET",
            Self::StopLoss => "STOP_LOSS",
            Self::StopLossLimit => "STOP_LOSS_LIMIT",
            Self::TakeProfit => "TAKE_PROFIT",
            Self::TakeProfitLimit => "TAKE_PROFIT_LIMIT",
            Self::LimitMaker => "LIMIT_MAKER",
        };
        write!(f, "{s}")
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order.
    Buy,
    /// Sell order.
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        };
        write!(f, "{s}")
    }
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till canceled.
    GTC,
    /// Immediate or cancel.
    IOC,
    /// Fill or kill.
    FOK,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::GTC => "GTC",
            Self::IOC => "IOC",
            Self::FOK => "FOK",
        };
        write!(f, "{s}")
    }
}

/// Margin order side effect: what borrowing/repayment the order triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SideEffectType {
    /// Plain margin order, no automatic borrow or repay.
    NoSideEffect,
    /// Borrow the quote/base asset as needed to fill the order.
    MarginBuy,
    /// Use proceeds to repay outstanding loans automatically.
    AutoRepay,
}

impl std::fmt::Display for SideEffectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::NoSideEffect => "NO_SIDE_EFFECT",
            Self::MarginBuy => "MARGIN_BUY",
            Self::AutoRepay => "AUTO_REPAY",
        };
        write!(f, "{s}")
    }
}

/// Response detail level requested for order placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewOrderRespType {
    /// Acknowledgement only.
    Ack,
    /// Acknowledgement plus execution summary.
    Result,
    /// Full response including fills.
    Full,
}

impl std::fmt::Display for NewOrderRespType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ack => "ACK",
            Self::Result => "RESULT",
            Self::Full => "FULL",
        };
        write!(f, "{s}")
    }
}

/// Result of placing a margin order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedOrder {
    /// Trading pair symbol.
    pub symbol: String,
    /// Exchange-assigned order id.
    pub order_id: i64,
    /// Client-assigned order id.
    pub client_order_id: String,
    /// Transaction time.
    pub transact_time: DateTime<Utc>,
    /// Order price.
    pub price: f64,
    /// Original order quantity.
    pub orig_qty: f64,
    /// Executed quantity.
    pub executed_qty: f64,
    /// Cumulative quote asset quantity.
    pub cumulative_quote_qty: f64,
    /// Order status.
    pub status: OrderStatus,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Order type.
    pub order_type: OrderType,
    /// Order side.
    pub side: OrderSide,
    /// Whether the order was placed on an isolated margin pair.
    pub is_isolated: bool,
}

/// An order as returned by order queries and order lists.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedOrder {
    /// Trading pair symbol.
    pub symbol: String,
    /// Exchange-assigned order id.
    pub order_id: i64,
    /// Client-assigned order id.
    pub client_order_id: String,
    /// Order price.
    pub price: f64,
    /// Original order quantity.
    pub orig_qty: f64,
    /// Executed quantity.
    pub executed_qty: f64,
    /// Cumulative quote asset quantity.
    pub cumulative_quote_qty: f64,
    /// Order status.
    pub status: OrderStatus,
    /// Time in force.
    pub time_in_force: TimeInForce,
    /// Order type.
    pub order_type: OrderType,
    /// Order side.
    pub side: OrderSide,
    /// Stop price, zero when unset.
    pub stop_price: f64,
    /// Iceberg quantity, zero when unset.
    pub iceberg_qty: f64,
    /// Order creation time.
    pub time: DateTime<Utc>,
    /// Last update time.
    pub update_time: DateTime<Utc>,
    /// Whether the order is currently working.
    pub is_working: bool,
    /// Whether the order lives on an isolated margin pair.
    pub is_isolated: bool,
}

/// Result of canceling a margin order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanceledOrder {
    /// Trading pair symbol.
    pub symbol: String,
    /// Client order id of the canceled order.
    pub orig_client_order_id: String,
    /// Exchange-assigned order id.
    pub order_id: i64,
    /// Client order id assigned to the cancel request.
    pub client_order_id: String,
}

/// A single asset balance within a margin account.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// Asset code, e.g. `BTC`.
    pub asset: String,
    /// Borrowed amount.
    pub borrowed: f64,
    /// Free amount.
    pub free: f64,
    /// Accrued interest.
    pub interest: f64,
    /// Locked amount.
    pub locked: f64,
    /// Net asset value.
    pub net_asset: f64,
}

/// A margin account: cross-account aggregates plus per-asset balances.
///
/// For isolated accounts the aggregates that the isolated endpoint does not
/// report are zero/false, and `assets` holds base and quote balances for
/// each pair, base first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarginAccount {
    /// Whether borrowing is enabled.
    pub borrow_enabled: bool,
    /// Account margin level.
    pub margin_level: f64,
    /// Total assets valued in BTC.
    pub total_asset_of_btc: f64,
    /// Total liabilities valued in BTC.
    pub total_liability_of_btc: f64,
    /// Total net assets valued in BTC.
    pub total_net_asset_of_btc: f64,
    /// Whether trading is enabled.
    pub trade_enabled: bool,
    /// Whether transfers are enabled.
    pub transfer_enabled: bool,
    /// Per-asset balances.
    pub assets: Vec<Asset>,
}

/// A margin trade fill.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    /// Trade id.
    pub id: i64,
    /// Fill price.
    pub price: f64,
    /// Fill quantity.
    pub qty: f64,
    /// Commission charged.
    pub commission: f64,
    /// Asset the commission was charged in.
    pub commission_asset: String,
    /// Trade time.
    pub time: DateTime<Utc>,
    /// Whether the account was the buyer.
    pub is_buyer: bool,
    /// Whether the account was the maker.
    pub is_maker: bool,
    /// Whether this was the best price match.
    pub is_best_match: bool,
    /// Whether the trade happened on an isolated margin pair.
    pub is_isolated: bool,
}

/// Metadata for an asset available for margin trading.
#[derive(Debug, Clone, PartialEq)]
pub struct MarginAsset {
    /// Asset code.
    pub asset: String,
    /// Whether the asset can be borrowed.
    pub can_borrow: bool,
    /// Whether the asset can be used as collateral.
    pub can_mortgage: bool,
    /// Minimum borrowable amount.
    pub user_min_borrow: f64,
    /// Minimum repayable amount.
    pub user_min_repay: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_wire_names() {
        let status: OrderStatus = serde_json::from_str("\"PARTIALLY_FILLED\"").unwrap();
        assert_eq!(status, OrderStatus::PartiallyFilled);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"PARTIALLY_FILLED\"");
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let result: std::result::Result<OrderStatus, _> =
            serde_json::from_str("\"HALF_FILLED\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_side_effect_wire_names() {
        let effect: SideEffectType = serde_json::from_str("\"AUTO_REPAY\"").unwrap();
        assert_eq!(effect, SideEffectType::AutoRepay);
        assert_eq!(effect.to_string(), "AUTO_REPAY");
    }

    #[test]
    fn test_display_matches_wire() {
        assert_eq!(OrderStatus::New.to_string(), "NEW");
        assert_eq!(OrderType::StopLossLimit.to_string(), "STOP_LOSS_LIMIT");
        assert_eq!(OrderSide::Sell.to_string(), "SELL");
        assert_eq!(TimeInForce::IOC.to_string(), "IOC");
        assert_eq!(NewOrderRespType::Full.to_string(), "FULL");
    }
}

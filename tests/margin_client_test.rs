//! End-to-end client tests against a mock HTTP server.

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use binance_margin::{
    AccountRequest, AllOrdersRequest, CancelOrderRequest, Error, MarginClient, MaxMarginRequest,
    MyTradesRequest, NewMarginOrderRequest, OpenOrdersRequest, OrderSide, OrderStatus,
    QueryOrderRequest, TransportConfig,
};

async fn client_for(server: &MockServer) -> MarginClient {
    MarginClient::connect(TransportConfig {
        api_key: Some("test-key".to_string()),
        secret: Some("test-secret".to_string()),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
        ..Default::default()
    })
    .expect("client")
}

fn order_body() -> serde_json::Value {
    serde_json::json!({
        "symbol": "BTCUSDT",
        "orderId": 28,
        "clientOrderId": "6gCrw2kRUAF9CvJDGP16IP",
        "transactTime": 1_600_000_000_000_i64,
        "price": "0.1",
        "origQty": "1.0",
        "executedQty": "0.0",
        "cummulativeQuoteQty": "0.0",
        "status": "NEW",
        "timeInForce": "GTC",
        "type": "LIMIT",
        "side": "BUY",
        "isIsolated": false
    })
}

#[tokio::test]
async fn new_margin_order_decodes_and_signs() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sapi/v1/margin/order"))
        .and(header("X-MBX-APIKEY", "test-key"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("side", "BUY"))
        .and(query_param("type", "LIMIT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(order_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = NewMarginOrderRequest::limit("BTCUSDT", OrderSide::Buy, 1.0, 0.1);
    let order = client.new_margin_order(&request).await.expect("order");

    assert_eq!(order.order_id, 28);
    assert_eq!(order.price, 0.1);
    assert_eq!(order.orig_qty, 1.0);
    assert_eq!(order.status, OrderStatus::New);
    assert_eq!(order.transact_time.timestamp_millis(), 1_600_000_000_000);

    let requests = server.received_requests().await.expect("requests");
    let query = requests[0].url.query().unwrap_or_default();
    assert!(query.contains("signature="));
    assert!(query.contains("timestamp="));
}

#[tokio::test]
async fn order_test_endpoint_returns_unit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/sapi/v1/margin/order/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let mut request = NewMarginOrderRequest::limit("BTCUSDT", OrderSide::Buy, 1.0, 0.1);
    request.new_order_resp_type = Some(binance_margin::NewOrderRespType::Full);
    client.new_margin_order_test(&request).await.expect("test order");

    let requests = server.received_requests().await.expect("requests");
    let query = requests[0].url.query().unwrap_or_default();
    assert!(!query.contains("newOrderRespType"));
}

#[tokio::test]
async fn error_envelope_maps_to_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/order"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": -2013,
            "msg": "Order does not exist."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = QueryOrderRequest::by_order_id("BTCUSDT", 404);
    let err = client.query_margin_order(&request).await.unwrap_err();
    assert!(matches!(err, Error::OrderNotFound(_)));
}

#[tokio::test]
async fn unknown_error_code_surfaces_exchange_details() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/sapi/v1/margin/order"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": -1121,
            "msg": "Invalid symbol."
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let request = CancelOrderRequest::by_order_id("NOPE", 1);
    let err = client.cancel_margin_order(&request).await.unwrap_err();
    let details = err.as_exchange().expect("exchange details");
    assert_eq!(details.code, "-1121");
    assert_eq!(details.message, "Invalid symbol.");
}

#[tokio::test]
async fn cross_account_merges_balances_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "borrowEnabled": true,
            "marginLevel": "11.64405625",
            "totalAssetOfBtc": "6.82728457",
            "totalLiabilityOfBtc": "0.58633215",
            "totalNetAssetOfBtc": "6.24095242",
            "tradeEnabled": true,
            "transferEnabled": true,
            "userAssets": [{
                "asset": "BNB",
                "borrowed": "0.0",
                "free": "3.0",
                "interest": "0.0",
                "locked": "0.0",
                "netAsset": "3.0"
            }],
            "assets": [{
                "baseAsset": {
                    "asset": "BTC",
                    "borrowed": "0.1",
                    "free": "1.0",
                    "interest": "0.001",
                    "locked": "0.0",
                    "netAsset": "0.9"
                },
                "quoteAsset": {
                    "asset": "USDT",
                    "borrowed": "0.0",
                    "free": "500.0",
                    "interest": "0.0",
                    "locked": "0.0",
                    "netAsset": "500.0"
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let account = client
        .margin_account(&AccountRequest::cross())
        .await
        .expect("account");

    assert!(account.borrow_enabled);
    assert_eq!(account.assets.len(), 3);
    assert_eq!(account.assets[0].asset, "BNB");
    assert_eq!(account.assets[1].asset, "BTC");
    assert_eq!(account.assets[2].asset, "USDT");
}

#[tokio::test]
async fn isolated_account_uses_isolated_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/isolated/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "totalAssetOfBtc": "0.5",
            "totalLiabilityOfBtc": "0.1",
            "totalNetAssetOfBtc": "0.4",
            "assets": [{
                "baseAsset": {
                    "asset": "ETH",
                    "borrowed": "0.0",
                    "free": "2.0",
                    "interest": "0.0",
                    "locked": "0.0",
                    "netAsset": "2.0"
                },
                "quoteAsset": {
                    "asset": "BTC",
                    "borrowed": "0.05",
                    "free": "0.2",
                    "interest": "0.0001",
                    "locked": "0.0",
                    "netAsset": "0.15"
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let account = client
        .margin_account(&AccountRequest::isolated())
        .await
        .expect("isolated account");

    assert_eq!(account.assets.len(), 2);
    assert_eq!(account.assets[0].asset, "ETH");
    assert_eq!(account.assets[1].asset, "BTC");
    assert!(!account.borrow_enabled);
}

#[tokio::test]
async fn trades_decode_time_and_tolerate_bad_numbers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/myTrades"))
        .and(query_param("symbol", "BNBBTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "id": 28457,
            "price": "oops",
            "qty": "12.00000000",
            "commission": "10.10000000",
            "commissionAsset": "BNB",
            "time": 1_600_000_000_000_i64,
            "isBuyer": true,
            "isMaker": false,
            "isBestMatch": true,
            "isIsolated": false
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let trades = client
        .my_margin_trades(&MyTradesRequest::new("BNBBTC"))
        .await
        .expect("trades");

    assert_eq!(trades.len(), 1);
    assert_eq!(trades[0].price, 0.0);
    assert_eq!(trades[0].qty, 12.0);
    assert_eq!(trades[0].time.timestamp_millis(), 1_600_000_000_000);
}

#[tokio::test]
async fn open_and_all_orders_decode_lists() {
    let server = MockServer::start().await;
    let list = serde_json::json!([{
        "symbol": "LTCBTC",
        "orderId": 1,
        "clientOrderId": "a",
        "price": "0.1",
        "origQty": "1.0",
        "executedQty": "0.5",
        "cummulativeQuoteQty": "0.05",
        "status": "PARTIALLY_FILLED",
        "timeInForce": "GTC",
        "type": "LIMIT",
        "side": "SELL",
        "stopPrice": "0.0",
        "icebergQty": "0.0",
        "time": 1_600_000_000_000_i64,
        "updateTime": 1_600_000_001_000_i64,
        "isWorking": true
    }]);
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/openOrders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/allOrders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(list))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let open = client
        .open_margin_orders(&OpenOrdersRequest::new("LTCBTC"))
        .await
        .expect("open orders");
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].status, OrderStatus::PartiallyFilled);

    let mut all_request = AllOrdersRequest::new("LTCBTC");
    all_request.limit = Some(10);
    let all = client.all_margin_orders(&all_request).await.expect("all orders");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].executed_qty, 0.5);
}

#[tokio::test]
async fn max_borrow_reads_amount_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/maxBorrowable"))
        .and(query_param("asset", "BTC"))
        .and(query_param("isolatedSymbol", "BTCUSDT"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"amount": "1.69"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let amount = client
        .max_borrow(&MaxMarginRequest::new("BTC").isolated("BTCUSDT"))
        .await
        .expect("amount");
    assert_eq!(amount, 1.69);
}

#[tokio::test]
async fn max_transfer_reads_amount_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/maxTransferable"))
        .and(query_param("asset", "USDT"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"amount": 2500.0})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let amount = client
        .max_transfer(&MaxMarginRequest::new("USDT"))
        .await
        .expect("amount");
    assert_eq!(amount, 2500.0);
}

#[tokio::test]
async fn all_margin_assets_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sapi/v1/margin/allAssets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "assetFullName": "Binance Coin",
            "assetName": "BNB",
            "isBorrowable": true,
            "isMortgageable": true,
            "userMinBorrow": "0.00000000",
            "userMinRepay": "0.00000000"
        }])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let assets = client
        .all_margin_assets(&AccountRequest::cross())
        .await
        .expect("assets");
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].asset, "BNB");
    assert!(assets[0].can_borrow);
}

#[tokio::test]
async fn missing_credentials_fail_before_sending() {
    let server = MockServer::start().await;
    let client = MarginClient::connect(TransportConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .expect("client");

    let err = client
        .open_margin_orders(&OpenOrdersRequest::new("BTCUSDT"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(server.received_requests().await.expect("requests").is_empty());
}

//! Request signing.
//!
//! Margin endpoints are all SIGNED endpoints: the query string is signed
//! with HMAC-SHA256 and the API key travels in the `X-MBX-APIKEY` header.

use crate::error::{Error, Result};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderValue};
use sha2::Sha256;
use std::collections::HashMap;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// Signs margin API requests.
#[derive(Debug, Clone)]
pub struct MarginAuth {
    api_key: String,
    secret: String,
}

impl MarginAuth {
    /// Creates a new authenticator from an API key and secret.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    /// Returns the API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Signs a query string, returning the HMAC-SHA256 signature as hex.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the secret key is unusable.
    pub fn sign(&self, query_string: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| Error::authentication(format!("Invalid secret key: {e}")))?;
        mac.update(query_string.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    /// Builds the signed query string for a parameter map.
    ///
    /// Parameters are serialized in key order and the signature is appended
    /// as the final `signature` parameter, over exactly the bytes that were
    /// signed.
    pub fn signed_query(&self, params: &HashMap<String, String>) -> Result<String> {
        let query = build_query_string(params);
        let signature = self.sign(&query)?;
        if query.is_empty() {
            Ok(format!("signature={signature}"))
        } else {
            Ok(format!("{query}&signature={signature}"))
        }
    }

    /// Adds the API key header to a request header map.
    pub fn add_auth_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        let value = HeaderValue::from_str(&self.api_key)
            .map_err(|e| Error::authentication(format!("Invalid API key: {e}")))?;
        headers.insert(API_KEY_HEADER, value);
        Ok(())
    }
}

/// Serializes a parameter map as `k=v&k=v`, sorted by key.
///
/// Parameter values are not URL-encoded: margin API values are symbols,
/// enum constants and decimal numbers, all of which are query-safe.
pub fn build_query_string(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<_> = params.iter().collect();
    pairs.sort_by_key(|(k, _)| *k);
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_produces_hex_sha256() {
        let auth = MarginAuth::new("test_key", "test_secret");
        let sig = auth
            .sign("symbol=BTCUSDT&side=BUY&timestamp=1234567890")
            .unwrap();
        assert_eq!(sig.len(), 64);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_sign_is_deterministic() {
        let auth = MarginAuth::new("k", "s");
        let a = auth.sign("symbol=BTCUSDT").unwrap();
        let b = auth.sign("symbol=BTCUSDT").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_known_signature() {
        // Example from the exchange's API documentation.
        let auth = MarginAuth::new(
            "vmPUZE6mv9SD5VNHk4HlWFsOr6aKE2zvsw0MuIgwCIPy6utIco14y7Ju91duEh8A",
            "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j",
        );
        let sig = auth
            .sign("symbol=LTCBTC&side=BUY&type=LIMIT&timeInForce=GTC&quantity=1&price=0.1&recvWindow=5000&timestamp=1499827319559")
            .unwrap();
        assert_eq!(
            sig,
            "c8db56825ae71d6d79447849e617115f4a920fa2acdcab2b053c4b2838bd6b71"
        );
    }

    #[test]
    fn test_build_query_string_sorted() {
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), "BTCUSDT".to_string());
        params.insert("side".to_string(), "BUY".to_string());
        params.insert("quantity".to_string(), "1".to_string());
        assert_eq!(
            build_query_string(&params),
            "quantity=1&side=BUY&symbol=BTCUSDT"
        );
    }

    #[test]
    fn test_signed_query_appends_signature_last() {
        let auth = MarginAuth::new("k", "s");
        let mut params = HashMap::new();
        params.insert("symbol".to_string(), "BTCUSDT".to_string());
        let query = auth.signed_query(&params).unwrap();
        assert!(query.starts_with("symbol=BTCUSDT&signature="));
    }

    #[test]
    fn test_signed_query_empty_params() {
        let auth = MarginAuth::new("k", "s");
        let query = auth.signed_query(&HashMap::new()).unwrap();
        assert!(query.starts_with("signature="));
    }

    #[test]
    fn test_add_auth_headers() {
        let auth = MarginAuth::new("my_api_key", "secret");
        let mut headers = HeaderMap::new();
        auth.add_auth_headers(&mut headers).unwrap();
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "my_api_key");
    }
}

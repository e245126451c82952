//! Per-venue HMAC request signing
//!
//! Isolated in one file per the venue's own signing rule, so a mistake in
//! one venue's canonical-string construction cannot leak into another's.
//! Both venues sign with HMAC-SHA256; they differ only in what gets
//! concatenated and how the digest is encoded.

use crate::error::{ GatewayError, Result };
use base64::{ engine::general_purpose::STANDARD, Engine as _ };
use hmac::{ Hmac, Mac };
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(secret: &[u8], message: &[u8]) -> Result<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret).map_err(|e| GatewayError::signing(format!("invalid secret key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Binance-family signing: `HMAC(secret, sorted_query_string)`, hex-encoded.
/// `canonical_query` is the caller's `k1=v1&k2=v2...` string with the
/// timestamp parameter already appended; this function does not reorder or
/// otherwise touch it, so callers control insertion-vs-alphabetical order.
pub fn sign_binance(secret: &str, canonical_query: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(GatewayError::signing("binance secret key is empty"));
    }
    let digest = hmac_sha256(secret.as_bytes(), canonical_query.as_bytes())?;
    Ok(hex::encode(digest))
}

/// OKX-family signing: `HMAC(secret, timestamp + method + path + body)`,
/// base64-encoded. `method` must already be upper-cased (`GET`/`POST`).
pub fn sign_okx(secret: &str, timestamp: &str, method: &str, path: &str, body: &str) -> Result<String> {
    if secret.is_empty() {
        return Err(GatewayError::signing("okx secret key is empty"));
    }
    let message = format!("{timestamp}{method}{path}{body}");
    let digest = hmac_sha256(secret.as_bytes(), message.as_bytes())?;
    Ok(STANDARD.encode(digest))
}

/// Build a Binance-style canonical query string from ordered `(key, value)`
/// pairs, in the order given (callers are responsible for alphabetical
/// ordering if the venue requires it; Binance accepts insertion order).
pub fn build_query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog"),
    /// a widely-cited fixture vector for the primitive this module wraps.
    const FIXTURE_HEX: &str = "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd";
    const FIXTURE_KEY: &str = "key";
    const FIXTURE_MESSAGE: &str = "The quick brown fox jumps over the lazy dog";

    #[test]
    fn test_raw_hmac_matches_fixture() {
        let digest = hmac_sha256(FIXTURE_KEY.as_bytes(), FIXTURE_MESSAGE.as_bytes()).unwrap();
        assert_eq!(hex::encode(digest), FIXTURE_HEX);
    }

    #[test]
    fn test_binance_signing_matches_fixture_hex() {
        let signature = sign_binance(FIXTURE_KEY, FIXTURE_MESSAGE).unwrap();
        assert_eq!(signature, FIXTURE_HEX);
    }

    #[test]
    fn test_okx_signing_matches_fixture_base64() {
        // timestamp+method+path+body concatenated equals the fixture
        // message when method/path/body are empty and timestamp carries it.
        let signature = sign_okx(FIXTURE_KEY, FIXTURE_MESSAGE, "", "", "").unwrap();
        let expected_bytes = hex::decode(FIXTURE_HEX).unwrap();
        assert_eq!(signature, STANDARD.encode(expected_bytes));
    }

    #[test]
    fn test_binance_empty_secret_is_signing_error() {
        assert!(sign_binance("", "a=1").is_err());
    }

    #[test]
    fn test_okx_empty_secret_is_signing_error() {
        assert!(sign_okx("", "1700000000000", "GET", "/api/v5/account/balance", "").is_err());
    }

    #[test]
    fn test_build_query_string_preserves_order() {
        let query = build_query_string(&[("symbol", "BTCUSDT".to_string()), ("timestamp", "123".to_string())]);
        assert_eq!(query, "symbol=BTCUSDT&timestamp=123");
    }
}

//! Per-endpoint request builders and response parsers.
//!
//! Builders turn a typed query into an [`HttpRequest`]; parsers turn a
//! response body into a [`Table`](skyfeed_core::Table) or
//! [`QueryOutput`](skyfeed_core::QueryOutput). Neither side does I/O.

pub mod apod;
pub mod donki;
pub mod exoplanet;
pub mod neo;
pub mod rover;

use skyfeed_core::{Endpoint, ResponseError};

pub(crate) fn decode_json(endpoint: Endpoint, body: &str) -> Result<serde_json::Value, ResponseError> {
    serde_json::from_str(body).map_err(|e| ResponseError::Decode {
        endpoint: endpoint.as_str().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_json_error_names_endpoint() {
        let err = decode_json(Endpoint::Apod, "<html>").unwrap_err();
        match err {
            ResponseError::Decode { endpoint, .. } => assert_eq!(endpoint, "apod"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

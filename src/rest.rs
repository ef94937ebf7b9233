//! Trading gateway client
//!
//! Submits order placements and cancellations to the gateway's HTTP API.
//! Fire-and-forget relative to book state: a success here only means the
//! gateway accepted the request, and the resulting resting order shows up
//! later as a lifecycle event on the user channel. Failures carry the
//! gateway's human-readable reason for the viewer.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

use crate::error::{FeedError, Result};
use crate::parser::OrderSide;

/// Order placement request body
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrderRequest {
    pub token_id: String,
    pub price: Decimal,
    pub size: Decimal,
    pub side: OrderSide,
}

#[derive(Debug, Clone, Serialize)]
struct CancelOrderRequest<'a> {
    order_id: &'a str,
}

/// HTTP client for the trading gateway
pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
}

impl GatewayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Submit a resting order
    pub async fn place_order(&self, request: &PlaceOrderRequest) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/api/order", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Gateway(Self::failure_detail(response).await));
        }

        info!(
            token_id = %request.token_id,
            price = %request.price,
            size = %request.size,
            side = ?request.side,
            "Order submitted"
        );
        Ok(())
    }

    /// Cancel a resting order by id
    pub async fn cancel_order(&self, order_id: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/api/cancel", self.base_url))
            .json(&CancelOrderRequest { order_id })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FeedError::Gateway(Self::failure_detail(response).await));
        }

        info!(order_id = %order_id, "Order cancellation submitted");
        Ok(())
    }

    /// Extract the gateway's `detail` message from an error response
    async fn failure_detail(response: reqwest::Response) -> String {
        let status = response.status();
        response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| format!("Gateway returned {}", status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_place_order_request_serializes_wire_shape() {
        let request = PlaceOrderRequest {
            token_id: "token-yes".to_string(),
            price: dec!(0.40),
            size: dec!(1000),
            side: OrderSide::Buy,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["token_id"], "token-yes");
        assert_eq!(json["side"], "BUY");
        assert_eq!(json["price"], "0.40");
    }
}

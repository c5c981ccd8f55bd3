//! Payment initiation client methods

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use shopfront_core::types::{PaymentIntentRequest, PaymentResponse};

pub const DEFAULT_CURRENCY: &str = "USD";

impl ApiClient {
    /// Create a payment intent for an order; settlement happens server-side
    pub async fn create_payment_intent(
        &self,
        order_id: i64,
        currency: Option<&str>,
    ) -> Result<PaymentResponse, ClientError> {
        let req = ApiRequest::post("/payments/create-payment-intent").json(&PaymentIntentRequest {
            order_id,
            currency: currency.unwrap_or(DEFAULT_CURRENCY).to_string(),
        })?;
        self.send(req).await
    }
}

//! Shopping cart API client methods

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use shopfront_core::types::{Cart, CartItemRequest};

impl ApiClient {
    /// Get the caller's cart
    pub async fn get_cart(&self) -> Result<Cart, ClientError> {
        self.send(ApiRequest::get("/cart")).await
    }

    /// Add a product to the cart
    pub async fn add_to_cart(&self, product_id: i64, quantity: u32) -> Result<Cart, ClientError> {
        let req = ApiRequest::post("/cart/add").json(&CartItemRequest {
            product_id,
            quantity,
        })?;
        self.send(req).await
    }

    /// Set the quantity of a product already in the cart
    pub async fn update_cart_item(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> Result<Cart, ClientError> {
        let req = ApiRequest::put("/cart/items").json(&CartItemRequest {
            product_id,
            quantity,
        })?;
        self.send(req).await
    }

    /// Remove a product from the cart
    pub async fn remove_cart_item(&self, product_id: i64) -> Result<Cart, ClientError> {
        self.send(ApiRequest::delete(format!("/cart/items/{product_id}")))
            .await
    }

    /// Empty the cart
    pub async fn clear_cart(&self) -> Result<(), ClientError> {
        self.send_empty(ApiRequest::post("/cart/clear"))
            .await
            .map(|_| ())
    }
}

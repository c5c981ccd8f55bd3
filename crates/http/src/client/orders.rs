//! Order history and checkout client methods

use super::request::ApiRequest;
use super::{ApiClient, ClientError};
use shopfront_core::types::{Order, OrdersPage, ShippingInfo};

/// Paging parameters for [`ApiClient::my_orders`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersQuery {
    pub page: u32,
    pub size: u32,
    /// `field,direction`, e.g. `createdAt,desc`
    pub sort: String,
}

impl Default for OrdersQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort: "createdAt,desc".to_string(),
        }
    }
}

impl ApiClient {
    /// List the caller's orders, newest first by default
    pub async fn my_orders(&self, query: &OrdersQuery) -> Result<OrdersPage, ClientError> {
        let req = ApiRequest::get("/orders/my-orders")
            .query("page", query.page)
            .query("size", query.size)
            .query("sort", &query.sort);
        self.send(req).await
    }

    /// Turn the current cart into an order shipped to `shipping`
    pub async fn checkout(&self, shipping: &ShippingInfo) -> Result<Order, ClientError> {
        let req = ApiRequest::post("/orders/checkout").json(shipping)?;
        self.send(req).await
    }
}

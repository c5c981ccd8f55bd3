//! Client-side mirror of the server cart

use shopfront_core::types::{Cart, CartItem};
use shopfront_http::{ApiClient, AuthEvent, ClientError, Subscription};
use std::sync::{Arc, Weak};
use tokio::sync::watch;

/// What views render for the cart
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CartState {
    pub items: Vec<CartItem>,
    pub total: f64,
    pub loading: bool,
}

impl CartState {
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Cart store
///
/// Every mutation goes to the server and the mirror is replaced with the
/// cart it answers with. Failures are logged and returned; the mirror keeps
/// its previous contents.
#[derive(Clone)]
pub struct CartStore {
    client: ApiClient,
    state: Arc<watch::Sender<CartState>>,
    _expiry: Arc<Subscription>,
}

impl CartStore {
    pub fn new(client: ApiClient) -> Self {
        let (state, _) = watch::channel(CartState::default());
        let state = Arc::new(state);

        let weak: Weak<watch::Sender<CartState>> = Arc::downgrade(&state);
        let expiry = client.events().subscribe(move |event| match event {
            AuthEvent::SessionExpired => {
                if let Some(state) = weak.upgrade() {
                    state.send_replace(CartState::default());
                }
            }
        });

        Self {
            client,
            state,
            _expiry: Arc::new(expiry),
        }
    }

    pub fn state(&self) -> CartState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    pub async fn fetch_cart(&self) -> Result<(), ClientError> {
        self.state.send_modify(|state| state.loading = true);
        let result = self.client.get_cart().await;
        self.state.send_modify(|state| state.loading = false);

        self.apply("fetch", result)
    }

    pub async fn add_to_cart(&self, product_id: i64, quantity: u32) -> Result<(), ClientError> {
        let result = self.client.add_to_cart(product_id, quantity).await;
        self.apply("add", result)
    }

    pub async fn update_cart_item(&self, product_id: i64, quantity: u32) -> Result<(), ClientError> {
        let result = self.client.update_cart_item(product_id, quantity).await;
        self.apply("update", result)
    }

    pub async fn remove_from_cart(&self, product_id: i64) -> Result<(), ClientError> {
        let result = self.client.remove_cart_item(product_id).await;
        self.apply("remove", result)
    }

    pub async fn clear_cart(&self) -> Result<(), ClientError> {
        if let Err(err) = self.client.clear_cart().await {
            tracing::error!(error = %err, "Failed to clear cart");
            return Err(err);
        }
        self.state.send_modify(|state| {
            state.items.clear();
            state.total = 0.0;
        });
        Ok(())
    }

    /// Forget the mirrored cart without contacting the server
    pub fn reset(&self) {
        self.state.send_replace(CartState::default());
    }

    fn apply(&self, action: &'static str, result: Result<Cart, ClientError>) -> Result<(), ClientError> {
        match result {
            Ok(cart) => {
                tracing::debug!(action, items = cart.items.len(), total = cart.total, "Cart updated");
                self.state.send_modify(|state| {
                    state.items = cart.items;
                    state.total = cart.total;
                });
                Ok(())
            }
            Err(err) => {
                tracing::error!(action, error = %err, "Cart request failed");
                Err(err)
            }
        }
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i64, quantity: u32) -> CartItem {
        CartItem {
            product_id,
            product_name: format!("Product {product_id}"),
            price: 2.5,
            quantity,
            subtotal: 2.5 * f64::from(quantity),
            image_url: None,
        }
    }

    fn offline_store() -> CartStore {
        CartStore::new(ApiClient::new("http://127.0.0.1:1").unwrap())
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let state = CartState {
            items: vec![item(1, 2), item(2, 3)],
            total: 12.5,
            loading: false,
        };
        assert_eq!(state.item_count(), 5);
    }

    #[test]
    fn test_reset_empties_mirror() {
        let store = offline_store();
        store
            .apply(
                "fetch",
                Ok(Cart {
                    items: vec![item(1, 1)],
                    total: 2.5,
                }),
            )
            .unwrap();
        assert_eq!(store.state().items.len(), 1);

        store.reset();
        assert_eq!(store.state(), CartState::default());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_items() {
        let store = offline_store();
        store
            .apply(
                "fetch",
                Ok(Cart {
                    items: vec![item(7, 1)],
                    total: 2.5,
                }),
            )
            .unwrap();

        assert!(store.fetch_cart().await.is_err());
        let state = store.state();
        assert!(!state.loading);
        assert_eq!(state.items, vec![item(7, 1)]);
    }

    #[test]
    fn test_session_expiry_resets_cart() {
        let store = offline_store();
        store
            .apply(
                "add",
                Ok(Cart {
                    items: vec![item(3, 4)],
                    total: 10.0,
                }),
            )
            .unwrap();

        store.client.events().emit(AuthEvent::SessionExpired);
        assert!(store.state().items.is_empty());
    }

    #[test]
    fn test_dropping_store_releases_listener() {
        let store = offline_store();
        let client = store.client.clone();
        assert_eq!(client.events().listener_count(), 1);

        drop(store);
        assert_eq!(client.events().listener_count(), 0);
    }
}

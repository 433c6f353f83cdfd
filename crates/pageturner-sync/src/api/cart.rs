//! Server-side cart endpoints.

use reqwest::Method;
use tracing::{debug, instrument};

use pageturner_core::{Cart, LineItem};

use crate::api::schema::{CountWire, QuantityUpdate, RemoteCartWire};
use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /cart`, normalized (non-positive quantities dropped, duplicate
    /// ids merged).
    #[instrument(skip(self))]
    pub async fn remote_cart(&self) -> ClientResult<Cart> {
        let wire: RemoteCartWire = self.get(&["cart"]).await?;
        let cart = Cart::from_items(wire.into_items());
        debug!(items = cart.item_count(), "Fetched remote cart");
        Ok(cart)
    }

    /// `GET /cart/count`
    #[instrument(skip(self))]
    pub async fn cart_count(&self) -> ClientResult<u64> {
        let wire: CountWire = self.get(&["cart", "count"]).await?;
        Ok(wire.count())
    }

    /// `GET /cart/:id`
    #[instrument(skip(self))]
    pub async fn cart_item(&self, id: &str) -> ClientResult<LineItem> {
        let item: LineItem = self.get(&["cart", id]).await?;
        debug!(quantity = item.quantity, "Fetched remote cart line");
        Ok(item)
    }

    /// `PUT /cart/:id` with `{quantity}`.
    #[instrument(skip(self))]
    pub async fn update_cart_item(&self, id: &str, quantity: i64) -> ClientResult<()> {
        self.put_ignoring_body(&["cart", id], &QuantityUpdate { quantity })
            .await
    }

    /// `DELETE /cart/:id`
    #[instrument(skip(self))]
    pub async fn remove_cart_item(&self, id: &str) -> ClientResult<()> {
        self.send_ignoring_body(Method::DELETE, &["cart", id]).await
    }
}

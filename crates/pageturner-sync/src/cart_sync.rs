//! # Remote Cart Sync
//!
//! Mirrors cart edits to the server-side cart. The server is asked first;
//! the local projector only changes once the server has accepted the edit,
//! so a failed request leaves both sides as they were.
//!
//! ```text
//!   set_quantity(id, n)
//!        │
//!        ├── n <= 0 ──► DELETE /cart/:id ──ok──► projector.remove_item(id)
//!        │
//!        └── n > 0  ──► PUT /cart/:id {n} ──ok──► projector.set_quantity(id, n)
//!
//!   pull()  GET /cart ──ok──► projector.replace(remote)
//!   push()  PUT each local line, DELETE remote lines missing locally
//! ```

use tracing::{debug, info, instrument};

use pageturner_core::{Cart, CoreError};

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::projector::CartProjector;

/// Couples a projector to the server-side cart.
pub struct CartSync<'a> {
    client: &'a ApiClient,
    projector: &'a CartProjector,
}

impl<'a> CartSync<'a> {
    pub fn new(client: &'a ApiClient, projector: &'a CartProjector) -> Self {
        CartSync { client, projector }
    }

    /// Sets a line's quantity on the server, then locally.
    #[instrument(skip(self))]
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> ClientResult<()> {
        if quantity <= 0 {
            return self.remove(id).await;
        }
        if self.projector.get(id).is_none() {
            return Err(CoreError::NotInCart(id.to_string()).into());
        }

        self.client.update_cart_item(id, quantity).await?;
        self.projector.set_quantity(id, quantity)?;
        Ok(())
    }

    /// One more unit of an existing line.
    pub async fn increment(&self, id: &str) -> ClientResult<i64> {
        let current = self.current_quantity(id)?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| CoreError::QuantityOverflow(id.to_string()))?;
        self.set_quantity(id, next).await?;
        Ok(next)
    }

    /// One unit fewer, never below one. At one this is a no-op.
    pub async fn decrement(&self, id: &str) -> ClientResult<i64> {
        let current = self.current_quantity(id)?;
        if current <= 1 {
            return Ok(current);
        }
        self.set_quantity(id, current - 1).await?;
        Ok(current - 1)
    }

    /// Removes a line on the server, then locally.
    #[instrument(skip(self))]
    pub async fn remove(&self, id: &str) -> ClientResult<()> {
        self.client.remove_cart_item(id).await?;
        self.projector.remove_item(id);
        Ok(())
    }

    /// Replaces the local cart with the server's.
    #[instrument(skip(self))]
    pub async fn pull(&self) -> ClientResult<Cart> {
        let remote = self.client.remote_cart().await?;
        info!(items = remote.item_count(), "Pulled remote cart");
        self.projector.replace(remote.clone());
        Ok(remote)
    }

    /// Makes the server's cart match the local one.
    ///
    /// Stops at the first failed request; lines already sent stay sent.
    #[instrument(skip(self))]
    pub async fn push(&self) -> ClientResult<usize> {
        let local = self.projector.snapshot();
        let remote = self.client.remote_cart().await?;

        for stale in remote.items().iter().filter(|i| !local.contains(&i.id)) {
            debug!(id = %stale.id, "Removing line missing locally");
            self.client.remove_cart_item(&stale.id).await?;
        }

        let mut sent = 0;
        for item in local.items() {
            if remote.get(&item.id).map(|r| r.quantity) == Some(item.quantity) {
                continue;
            }
            self.client.update_cart_item(&item.id, item.quantity).await?;
            sent += 1;
        }

        info!(sent, "Pushed local cart");
        Ok(sent)
    }

    fn current_quantity(&self, id: &str) -> ClientResult<i64> {
        self.projector
            .get(id)
            .map(|item| item.quantity)
            .ok_or_else(|| ClientError::from(CoreError::NotInCart(id.to_string())))
    }
}

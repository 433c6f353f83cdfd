//! Order history.

use tracing::{debug, instrument};

use pageturner_core::Order;

use crate::client::ApiClient;
use crate::error::ClientResult;

impl ApiClient {
    /// `GET /orders`, newest first.
    #[instrument(skip(self))]
    pub async fn orders(&self) -> ClientResult<Vec<Order>> {
        let mut orders: Vec<Order> = self.get(&["orders"]).await?;
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }
}

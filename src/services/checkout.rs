//! Two-step checkout: place the order, then mark the item sold.
//!
//! The steps are not atomic. If marking the item fails, the order stands
//! and the outcome reports `item_marked_sold = false`; nothing is undone.

use std::sync::Arc;

use tracing::warn;

use crate::auth::AuthUser;
use crate::error::OrderError;
use crate::services::item_catalog::ItemCatalog;
use crate::services::order_lifecycle::{IssuedOrder, NewOrder, OrderLifecycle};

#[derive(Debug, Clone)]
pub struct CheckoutOutcome {
    pub issued: IssuedOrder,
    pub item_marked_sold: bool,
}

#[derive(Clone)]
pub struct CheckoutSaga {
    orders: OrderLifecycle,
    items: Arc<dyn ItemCatalog>,
}

impl CheckoutSaga {
    pub fn new(orders: OrderLifecycle, items: Arc<dyn ItemCatalog>) -> Self {
        Self { orders, items }
    }

    pub async fn checkout(
        &self,
        session: &AuthUser,
        new_order: NewOrder,
    ) -> Result<CheckoutOutcome, OrderError> {
        let issued = self.orders.create(session, new_order).await?;

        let item_marked_sold = match self.items.mark_sold(&issued.order.item_id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    order_id = %issued.order.id,
                    item_id = %issued.order.item_id,
                    error = %e,
                    "Order placed but item could not be marked sold"
                );
                false
            }
        };

        Ok(CheckoutOutcome {
            issued,
            item_marked_sold,
        })
    }
}

//! Order lifecycle: create, regenerate OTP, complete, participant views
//!
//! ```text
//! create (buyer) ──► pending ──regenerate (buyer)──► pending
//!                       │
//!                       └──complete (seller, matching OTP)──► completed (terminal)
//! ```
//!
//! The plaintext OTP is returned from `create` and `regenerate_otp` only and
//! is never persisted. Each write is a single-order compare-and-set on the
//! version read at the start of the transition.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::auth::AuthUser;
use crate::error::OrderError;
use crate::models::order::{NewOrderRecord, Order, OrderFilter, OrderId, OrderUpdate};
use crate::services::order_store::OrderStore;
use crate::services::otp::{generate_transaction_id, OtpIssuer, PlaintextCode};

/// Max decimal places an amount may carry (storage is NUMERIC(12, 2))
const MAX_AMOUNT_SCALE: u32 = 2;

/// Largest amount NUMERIC(12, 2) holds: 9_999_999_999.99
const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

/// Party and item ids are stored as varchar(64)
const MAX_ID_LEN: usize = 64;

/// Validated input for `create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub item_id: String,
    pub seller_id: String,
    pub amount: Decimal,
}

impl NewOrder {
    pub fn new(
        item_id: Option<String>,
        seller_id: Option<String>,
        amount: Option<Decimal>,
    ) -> Result<Self, OrderError> {
        let item_id = required_text(item_id, "itemId")?;
        let seller_id = required_text(seller_id, "sellerId")?;
        let amount =
            amount.ok_or_else(|| OrderError::Validation("amount is required".to_string()))?;

        if amount <= Decimal::ZERO {
            return Err(OrderError::Validation(
                "amount must be greater than zero".to_string(),
            ));
        }
        if amount.normalize().scale() > MAX_AMOUNT_SCALE {
            return Err(OrderError::Validation(format!(
                "amount cannot have more than {} decimal places",
                MAX_AMOUNT_SCALE
            )));
        }
        let max_amount = Decimal::new(MAX_AMOUNT_CENTS, MAX_AMOUNT_SCALE);
        if amount > max_amount {
            return Err(OrderError::Validation(format!(
                "amount cannot exceed {}",
                max_amount
            )));
        }

        Ok(Self {
            item_id,
            seller_id,
            amount,
        })
    }
}

fn required_text(value: Option<String>, field: &str) -> Result<String, OrderError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => check_id_len(v, field),
        _ => Err(OrderError::Validation(format!("{} is required", field))),
    }
}

fn check_id_len(value: String, field: &str) -> Result<String, OrderError> {
    if value.chars().count() > MAX_ID_LEN {
        return Err(OrderError::Validation(format!(
            "{} cannot be longer than {} characters",
            field, MAX_ID_LEN
        )));
    }
    Ok(value)
}

/// A freshly placed order and the only copy of its plaintext code
#[derive(Debug, Clone)]
pub struct IssuedOrder {
    pub order: Order,
    pub otp: PlaintextCode,
}

/// Completed orders, split by the caller's role
#[derive(Debug, Clone, Default)]
pub struct CompletedOrders {
    pub bought: Vec<Order>,
    pub sold: Vec<Order>,
}

/// Pending orders, split by the caller's role
#[derive(Debug, Clone, Default)]
pub struct PendingOrders {
    pub as_buyer: Vec<Order>,
    pub as_seller: Vec<Order>,
}

#[derive(Clone)]
pub struct OrderLifecycle {
    store: Arc<dyn OrderStore>,
    otp: OtpIssuer,
}

impl OrderLifecycle {
    pub fn new(store: Arc<dyn OrderStore>, otp: OtpIssuer) -> Self {
        Self { store, otp }
    }

    /// Place an order as `session`. The caller is the buyer by construction.
    pub async fn create(
        &self,
        session: &AuthUser,
        new_order: NewOrder,
    ) -> Result<IssuedOrder, OrderError> {
        let buyer_id = check_id_len(session.user_id.clone(), "userId")?;
        let (otp, hashed_otp) = self.otp.issue().await?;

        let order = self
            .store
            .create(NewOrderRecord {
                transaction_id: generate_transaction_id(),
                buyer_id,
                seller_id: new_order.seller_id,
                item_id: new_order.item_id,
                amount: new_order.amount,
                hashed_otp,
            })
            .await?;

        info!(
            order_id = %order.id,
            transaction_id = %order.transaction_id,
            user_id = %session.user_id,
            "Order placed"
        );

        Ok(IssuedOrder { order, otp })
    }

    /// Replace the outstanding code. Only the buyer may do this, and only
    /// while the order is pending; the previous code stops verifying.
    pub async fn regenerate_otp(
        &self,
        session: &AuthUser,
        order_id: OrderId,
    ) -> Result<PlaintextCode, OrderError> {
        let order = self.load(order_id).await?;

        if !order.is_buyer(&session.user_id) {
            warn!(order_id = %order_id, user_id = %session.user_id, "Non-buyer attempted OTP regeneration");
            return Err(OrderError::Forbidden(
                "Unauthorized to re-generate otp".to_string(),
            ));
        }
        if order.is_completed {
            return Err(OrderError::Conflict("Order is already completed".to_string()));
        }

        let (otp, hashed_otp) = self.otp.issue().await?;
        self.store
            .update_by_id(order.id, OrderUpdate::replace_otp(hashed_otp), order.version)
            .await?;

        info!(order_id = %order_id, user_id = %session.user_id, "OTP regenerated");
        Ok(otp)
    }

    /// Close the sale. Only the seller may submit, and the code must match
    /// the current hash. A mismatch leaves the order pending and may be
    /// retried; a second completion is a conflict.
    pub async fn complete(
        &self,
        session: &AuthUser,
        order_id: OrderId,
        submitted: &str,
    ) -> Result<Order, OrderError> {
        if submitted.trim().is_empty() {
            return Err(OrderError::Validation("otp is required".to_string()));
        }

        let order = self.load(order_id).await?;

        if !order.is_seller(&session.user_id) {
            warn!(order_id = %order_id, user_id = %session.user_id, "Non-seller attempted completion");
            return Err(OrderError::Forbidden(
                "Unauthorized to complete this transaction".to_string(),
            ));
        }
        if order.is_completed {
            return Err(OrderError::Conflict("Order is already completed".to_string()));
        }

        let matched = self
            .otp
            .verify_blocking(submitted.trim().to_string(), order.hashed_otp.clone())
            .await;
        if !matched {
            info!(order_id = %order_id, user_id = %session.user_id, "OTP mismatch on completion");
            return Err(OrderError::InvalidCode);
        }

        let completed = self
            .store
            .update_by_id(order.id, OrderUpdate::complete(), order.version)
            .await?;

        info!(
            order_id = %order_id,
            transaction_id = %completed.transaction_id,
            user_id = %session.user_id,
            status = %completed.status(),
            "Order completed"
        );
        Ok(completed)
    }

    pub async fn list_for_user(&self, session: &AuthUser) -> Result<CompletedOrders, OrderError> {
        let bought = self
            .store
            .find_by_filter(OrderFilter::bought_by(&session.user_id, true))
            .await?;
        let sold = self
            .store
            .find_by_filter(OrderFilter::sold_by(&session.user_id, true))
            .await?;

        Ok(CompletedOrders { bought, sold })
    }

    pub async fn list_pending(&self, session: &AuthUser) -> Result<PendingOrders, OrderError> {
        let as_buyer = self
            .store
            .find_by_filter(OrderFilter::bought_by(&session.user_id, false))
            .await?;
        let as_seller = self
            .store
            .find_by_filter(OrderFilter::sold_by(&session.user_id, false))
            .await?;

        Ok(PendingOrders { as_buyer, as_seller })
    }

    async fn load(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.store
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }
}

//! Order records and the request/response models for the /api/orders endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::orders;

/// Storage-assigned order key, used as `{orderId}` in paths
pub type OrderId = Uuid;

/// Lifecycle state of an order
///
/// Status progresses: pending → completed (terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Placed by the buyer, OTP outstanding
    Pending,
    /// Seller submitted the matching OTP
    Completed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Completed => write!(f, "completed"),
        }
    }
}

/// An order as seen by the lifecycle and returned to callers.
///
/// `hashed_otp` never leaves the process: it is skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub transaction_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub item_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    #[serde(skip_serializing)]
    pub hashed_otp: String,
    pub is_completed: bool,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn status(&self) -> OrderStatus {
        if self.is_completed {
            OrderStatus::Completed
        } else {
            OrderStatus::Pending
        }
    }

    pub fn is_buyer(&self, user_id: &str) -> bool {
        self.buyer_id == user_id
    }

    pub fn is_seller(&self, user_id: &str) -> bool {
        self.seller_id == user_id
    }
}

impl From<orders::Model> for Order {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            buyer_id: model.buyer_id,
            seller_id: model.seller_id,
            item_id: model.item_id,
            amount: model.amount,
            hashed_otp: model.hashed_otp,
            is_completed: model.is_completed,
            version: model.version,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

/// Everything the store needs to persist a freshly placed order
#[derive(Debug, Clone)]
pub struct NewOrderRecord {
    pub transaction_id: String,
    pub buyer_id: String,
    pub seller_id: String,
    pub item_id: String,
    pub amount: Decimal,
    pub hashed_otp: String,
}

/// Mutable fields of an order. Item and amount are fixed at creation,
/// so they have no place here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderUpdate {
    pub hashed_otp: Option<String>,
    pub is_completed: Option<bool>,
}

impl OrderUpdate {
    pub fn replace_otp(hashed_otp: String) -> Self {
        Self {
            hashed_otp: Some(hashed_otp),
            is_completed: None,
        }
    }

    pub fn complete() -> Self {
        Self {
            hashed_otp: None,
            is_completed: Some(true),
        }
    }
}

/// Conjunctive filter for participant views; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
    pub buyer_id: Option<String>,
    pub seller_id: Option<String>,
    pub is_completed: Option<bool>,
}

impl OrderFilter {
    pub fn bought_by(user_id: &str, is_completed: bool) -> Self {
        Self {
            buyer_id: Some(user_id.to_string()),
            seller_id: None,
            is_completed: Some(is_completed),
        }
    }

    pub fn sold_by(user_id: &str, is_completed: bool) -> Self {
        Self {
            buyer_id: None,
            seller_id: Some(user_id.to_string()),
            is_completed: Some(is_completed),
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.buyer_id.as_deref().is_none_or(|b| order.buyer_id == b)
            && self.seller_id.as_deref().is_none_or(|s| order.seller_id == s)
            && self.is_completed.is_none_or(|c| order.is_completed == c)
    }
}

/// Request body for POST /api/orders and POST /api/checkout
///
/// Fields are optional so that a missing one surfaces as a validation error
/// instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub amount: Option<Decimal>,
    #[serde(default)]
    pub seller_id: Option<String>,
}

/// Response for POST /api/orders (201)
#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderResponse {
    pub order: Order,
    pub otp: String,
}

/// Response for PUT /api/orders/{orderId}/regenerate-otp
#[derive(Debug, Clone, Serialize)]
pub struct RegenerateOtpResponse {
    pub otp: String,
}

/// Request body for PUT /api/orders/{orderId}/complete
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteOrderRequest {
    #[serde(default)]
    pub otp: Option<String>,
}

/// Response for PUT /api/orders/{orderId}/complete
#[derive(Debug, Clone, Serialize)]
pub struct CompleteOrderResponse {
    pub order: Order,
}

/// Response for GET /api/orders/user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserOrdersResponse {
    pub bought_orders: Vec<Order>,
    pub sold_orders: Vec<Order>,
}

/// Response for GET /api/orders/pending
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingOrdersResponse {
    pub pending_buyer_orders: Vec<Order>,
    pub pending_seller_orders: Vec<Order>,
}

/// Response for POST /api/checkout (201)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub order: Order,
    pub otp: String,
    pub item_marked_sold: bool,
}

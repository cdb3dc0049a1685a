//! Order endpoints
//!
//! POST /api/orders                            place an order (caller is buyer)
//! PUT  /api/orders/{orderId}/regenerate-otp   buyer replaces the OTP
//! PUT  /api/orders/{orderId}/complete         seller submits the OTP
//! GET  /api/orders/user                       completed orders, bought/sold
//! GET  /api/orders/pending                    pending orders, bought/sold

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, OrderError};
use crate::models::order::{
    CompleteOrderRequest, CompleteOrderResponse, CreateOrderRequest, CreateOrderResponse,
    OrderId, PendingOrdersResponse, RegenerateOtpResponse, UserOrdersResponse,
};
use crate::services::order_lifecycle::NewOrder;
use crate::AppState;

/// Turn a body that failed to parse into a validation error
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, OrderError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| OrderError::Validation(rejection.body_text()))
}

fn order_id(path: Result<Path<Uuid>, PathRejection>) -> Result<OrderId, OrderError> {
    path.map(|Path(id)| id)
        .map_err(|_| OrderError::Validation("orderId must be a valid UUID".to_string()))
}

pub async fn create_order(
    State(state): State<AppState>,
    session: AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), ApiError> {
    let request = json_body(payload)?;
    let new_order = NewOrder::new(request.item_id, request.seller_id, request.amount)?;

    let issued = state.orders.create(&session, new_order).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            order: issued.order,
            otp: issued.otp.into_string(),
        }),
    ))
}

pub async fn regenerate_otp(
    State(state): State<AppState>,
    session: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<RegenerateOtpResponse>, ApiError> {
    let order_id = order_id(path)?;
    let otp = state.orders.regenerate_otp(&session, order_id).await?;

    Ok(Json(RegenerateOtpResponse {
        otp: otp.into_string(),
    }))
}

pub async fn complete_order(
    State(state): State<AppState>,
    session: AuthUser,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CompleteOrderRequest>, JsonRejection>,
) -> Result<Json<CompleteOrderResponse>, ApiError> {
    let order_id = order_id(path)?;
    let request = json_body(payload)?;
    let otp = request.otp.unwrap_or_default();

    let order = state.orders.complete(&session, order_id, &otp).await?;

    Ok(Json(CompleteOrderResponse { order }))
}

pub async fn get_user_orders(
    State(state): State<AppState>,
    session: AuthUser,
) -> Result<Json<UserOrdersResponse>, ApiError> {
    let history = state.orders.list_for_user(&session).await?;

    Ok(Json(UserOrdersResponse {
        bought_orders: history.bought,
        sold_orders: history.sold,
    }))
}

pub async fn get_pending_orders(
    State(state): State<AppState>,
    session: AuthUser,
) -> Result<Json<PendingOrdersResponse>, ApiError> {
    let pending = state.orders.list_pending(&session).await?;

    Ok(Json(PendingOrdersResponse {
        pending_buyer_orders: pending.as_buyer,
        pending_seller_orders: pending.as_seller,
    }))
}

//! POST /api/checkout: place an order and mark its item sold

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::handlers::orders::json_body;
use crate::models::order::{CheckoutResponse, CreateOrderRequest};
use crate::services::order_lifecycle::NewOrder;
use crate::AppState;

pub async fn checkout(
    State(state): State<AppState>,
    session: AuthUser,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let request = json_body(payload)?;
    let new_order = NewOrder::new(request.item_id, request.seller_id, request.amount)?;

    let outcome = state.checkout.checkout(&session, new_order).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order: outcome.issued.order,
            otp: outcome.issued.otp.into_string(),
            item_marked_sold: outcome.item_marked_sold,
        }),
    ))
}

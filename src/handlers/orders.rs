use super::common::{created_response, success_response, validate_input};
use crate::{
    auth::CurrentUser,
    errors::{ApiError, ServiceError},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Buy a product: decrements stock and appends a sale row atomically
async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let sale_id = state
        .services
        .orders
        .create_order(payload.product_id, payload.quantity, user.id)
        .await?;

    Ok(created_response(serde_json::json!({ "id": sale_id })))
}

/// Receipt for a completed sale, visible to its buyer and to administrators
async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let receipt = state.services.orders.get_order(sale_id).await?;

    if receipt.buyer_id != user.id && !user.is_admin() {
        return Err(ServiceError::Forbidden("not your receipt".to_string()).into());
    }

    Ok(success_response(receipt))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order))
        .route("/:id", get(get_order))
}

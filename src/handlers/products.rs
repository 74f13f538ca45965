use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::{require_admin, CurrentUser},
    errors::ApiError,
    services::products::{CreateProductInput, RestockInput, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[serde(default)]
    pub stock_quantity: i32,
    pub price: Decimal,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 64))]
    pub color: Option<String>,
    /// Opaque filename; extension must be png, jpg, jpeg, or gif
    #[validate(length(max = 255))]
    pub image: Option<String>,
    pub supplier_id: Uuid,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub stock_quantity: Option<i32>,
    pub price: Option<Decimal>,
    #[validate(length(max = 255))]
    pub location: Option<String>,
    #[validate(length(max = 64))]
    pub color: Option<String>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RestockRequest {
    pub supplier_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default = "default_vat")]
    pub vat: Decimal,
}

fn default_vat() -> Decimal {
    dec!(21.00)
}

/// Create a product
async fn create_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .create_product(CreateProductInput {
            name: payload.name,
            description: payload.description,
            stock_quantity: payload.stock_quantity,
            price: payload.price,
            location: payload.location,
            color: payload.color,
            image: payload.image,
            supplier_id: payload.supplier_id,
        })
        .await?;

    Ok(created_response(product))
}

/// List the catalog (any authenticated user)
async fn list_products(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let products = state.services.products.list_products().await?;
    Ok(success_response(products))
}

/// Get a single product (any authenticated user)
async fn get_product(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state.services.products.get_product(product_id).await?;
    Ok(success_response(product))
}

/// Update a product
async fn update_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .update_product(
            product_id,
            UpdateProductInput {
                name: payload.name,
                description: payload.description,
                stock_quantity: payload.stock_quantity,
                price: payload.price,
                location: payload.location,
                color: payload.color,
                image: payload.image,
            },
        )
        .await?;

    Ok(success_response(product))
}

/// Delete a product; historical sales keep their snapshot with a nulled
/// product reference
async fn delete_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    state.services.products.delete_product(product_id).await?;
    Ok(no_content_response())
}

/// Record an inbound purchase from a supplier and add it to stock
async fn restock_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<RestockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let entry = state
        .services
        .products
        .restock(RestockInput {
            product_id,
            supplier_id: payload.supplier_id,
            quantity: payload.quantity,
            unit_price: payload.unit_price,
            discount: payload.discount,
            vat: payload.vat,
        })
        .await?;

    Ok(created_response(entry))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_product))
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/:id", put(update_product))
        .route("/:id", delete(delete_product))
        .route("/:id/restock", post(restock_product))
}

use super::common::{created_response, no_content_response, success_response, validate_input};
use crate::{
    auth::{require_admin, CurrentUser},
    errors::ApiError,
    services::suppliers::{CreateSupplierInput, UpdateSupplierInput},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub company_name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub tax_id: String,
    pub discount_pct: Option<Decimal>,
    pub vat_pct: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 255))]
    pub company_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 512))]
    pub address: Option<String>,
    pub discount_pct: Option<Decimal>,
    pub vat_pct: Option<Decimal>,
}

/// Create a new supplier
async fn create_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .create_supplier(CreateSupplierInput {
            company_name: payload.company_name,
            phone: payload.phone,
            address: payload.address,
            tax_id: payload.tax_id,
            discount_pct: payload.discount_pct,
            vat_pct: payload.vat_pct,
        })
        .await?;

    Ok(created_response(supplier))
}

/// Get a supplier by id
async fn get_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    let supplier = state.services.suppliers.get_supplier(supplier_id).await?;
    Ok(success_response(supplier))
}

/// List all suppliers
async fn list_suppliers(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    let suppliers = state.services.suppliers.list_suppliers().await?;
    Ok(success_response(suppliers))
}

/// Update a supplier
async fn update_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
    Json(payload): Json<UpdateSupplierRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;
    validate_input(&payload)?;

    let supplier = state
        .services
        .suppliers
        .update_supplier(
            supplier_id,
            UpdateSupplierInput {
                company_name: payload.company_name,
                phone: payload.phone,
                address: payload.address,
                discount_pct: payload.discount_pct,
                vat_pct: payload.vat_pct,
            },
        )
        .await?;

    Ok(success_response(supplier))
}

/// Delete a supplier
async fn delete_supplier(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(supplier_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    state.services.suppliers.delete_supplier(supplier_id).await?;
    Ok(no_content_response())
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_supplier))
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier))
        .route("/:id", put(update_supplier))
        .route("/:id", delete(delete_supplier))
}

use super::common::success_response;
use crate::{
    auth::{require_admin, CurrentUser},
    errors::ApiError,
    AppState,
};
use axum::{extract::State, response::IntoResponse, routing::get, Router};

/// Aggregate sales figures across all users
async fn admin_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&user)?;

    let dashboard = state.services.reports.admin_dashboard().await?;
    Ok(success_response(dashboard))
}

/// The calling user's own purchase history
async fn client_dashboard(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let dashboard = state.services.reports.client_dashboard(user.id).await?;
    Ok(success_response(dashboard))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/me", get(client_dashboard))
}

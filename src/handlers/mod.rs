pub mod auth;
pub mod common;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod suppliers;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::{
    orders::OrderService, products::ProductService, reports::ReportService,
    suppliers::SupplierService, users::UserService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub users: Arc<UserService>,
    pub suppliers: Arc<SupplierService>,
    pub products: Arc<ProductService>,
    pub orders: Arc<OrderService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, config: &AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(
            config.jwt_secret.clone(),
            Duration::from_secs(config.jwt_expiration),
        ));
        let users = Arc::new(UserService::new(
            db.clone(),
            auth.clone(),
            config.bootstrap_admin_email.clone(),
        ));
        let suppliers = Arc::new(SupplierService::new(db.clone()));
        let products = Arc::new(ProductService::new(db.clone()));
        let orders = Arc::new(OrderService::new(db.clone()));
        let reports = Arc::new(ReportService::new(db));

        Self {
            auth,
            users,
            suppliers,
            products,
            orders,
            reports,
        }
    }
}

/// Full v1 API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::routes())
        .nest("/suppliers", suppliers::routes())
        .nest("/products", products::routes())
        .nest("/orders", orders::routes())
        .nest("/dashboard", dashboard::routes())
}

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

use stockroom_api::{
    config::AppConfig,
    db,
    entities::{product, sale, supplier},
    services::products::CreateProductInput,
    services::suppliers::CreateSupplierInput,
    AppServices, AppState,
};

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes_only_32chars";
pub const BOOTSTRAP_ADMIN_EMAIL: &str = "admin@stockroom.test";

/// Fresh application state backed by an in-memory SQLite database.
///
/// The pool is capped at one connection so every operation shares the same
/// in-memory database.
pub async fn test_state() -> AppState {
    let mut cfg = AppConfig::new("sqlite::memory:", TEST_JWT_SECRET);
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg.bootstrap_admin_email = Some(BOOTSTRAP_ADMIN_EMAIL.to_string());

    let pool = db::establish_connection(&cfg).await.expect("db connect");
    db::run_migrations(&pool).await.expect("migrations");

    let db = Arc::new(pool);
    let services = AppServices::new(db.clone(), &cfg);

    AppState {
        db,
        config: cfg,
        services,
    }
}

pub async fn seed_supplier(state: &AppState) -> supplier::Model {
    state
        .services
        .suppliers
        .create_supplier(CreateSupplierInput {
            company_name: "Acme Supplies".to_string(),
            phone: Some("555-0100".to_string()),
            address: Some("1 Warehouse Way".to_string()),
            tax_id: format!("TAX-{}", Uuid::new_v4()),
            discount_pct: Some(dec!(5.00)),
            vat_pct: Some(dec!(21.00)),
        })
        .await
        .expect("seed supplier")
}

pub async fn seed_product(
    state: &AppState,
    supplier_id: Uuid,
    stock: i32,
    price: Decimal,
) -> product::Model {
    state
        .services
        .products
        .create_product(CreateProductInput {
            name: format!("Widget {}", Uuid::new_v4()),
            description: None,
            stock_quantity: stock,
            price,
            location: Some("A-3".to_string()),
            color: None,
            image: Some("widget.png".to_string()),
            supplier_id,
        })
        .await
        .expect("seed product")
}

pub async fn seed_user(state: &AppState, email: &str) -> Uuid {
    state
        .services
        .users
        .register("Test User".to_string(), email.to_string(), "s3cret-pass")
        .await
        .expect("seed user")
}

/// Appends a sale row directly to the ledger, bypassing the purchase path.
/// Used by report tests that need sales at specific timestamps.
pub async fn insert_sale(
    state: &AppState,
    user_id: Uuid,
    product_id: Option<Uuid>,
    supplier_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    sold_at: DateTime<Utc>,
) -> Uuid {
    let entry = sale::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        product_id: Set(product_id),
        supplier_id: Set(supplier_id),
        quantity: Set(quantity),
        unit_price: Set(unit_price),
        sold_at: Set(sold_at),
    };

    entry.insert(&*state.db).await.expect("insert sale").id
}

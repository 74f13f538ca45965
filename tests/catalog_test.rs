mod common;

use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use stockroom_api::entities::{purchase, sale};
use stockroom_api::errors::ServiceError;
use stockroom_api::services::products::{CreateProductInput, RestockInput, UpdateProductInput};
use stockroom_api::services::suppliers::CreateSupplierInput;

fn product_input(supplier_id: Uuid) -> CreateProductInput {
    CreateProductInput {
        name: "Widget".to_string(),
        description: None,
        stock_quantity: 10,
        price: dec!(4.00),
        location: None,
        color: None,
        image: None,
        supplier_id,
    }
}

#[tokio::test]
async fn duplicate_tax_id_is_a_conflict() {
    let state = common::test_state().await;

    let input = CreateSupplierInput {
        company_name: "Acme".to_string(),
        phone: None,
        address: None,
        tax_id: "TAX-0001".to_string(),
        discount_pct: None,
        vat_pct: None,
    };
    state
        .services
        .suppliers
        .create_supplier(input.clone())
        .await
        .unwrap();

    let err = state
        .services
        .suppliers
        .create_supplier(CreateSupplierInput {
            company_name: "Different Name".to_string(),
            ..input
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Duplicate(_)));
}

#[tokio::test]
async fn image_extension_is_enforced_case_insensitively() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;

    let err = state
        .services
        .products
        .create_product(CreateProductInput {
            image: Some("bitmap.bmp".to_string()),
            ..product_input(supplier.id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let created = state
        .services
        .products
        .create_product(CreateProductInput {
            image: Some("PHOTO.PNG".to_string()),
            ..product_input(supplier.id)
        })
        .await
        .unwrap();
    assert_eq!(created.image.as_deref(), Some("PHOTO.PNG"));

    // Updates go through the same check.
    let err = state
        .services
        .products
        .update_product(
            created.id,
            UpdateProductInput {
                image: Some("photo.pdf".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn product_requires_an_existing_supplier() {
    let state = common::test_state().await;

    let err = state
        .services
        .products
        .create_product(product_input(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn negative_stock_is_rejected() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;

    let err = state
        .services
        .products
        .create_product(CreateProductInput {
            stock_quantity: -1,
            ..product_input(supplier.id)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let product = common::seed_product(&state, supplier.id, 5, dec!(1.00)).await;
    let err = state
        .services
        .products
        .update_product(
            product.id,
            UpdateProductInput {
                stock_quantity: Some(-5),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn restock_increments_stock_and_records_the_purchase() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;
    let product = common::seed_product(&state, supplier.id, 10, dec!(4.00)).await;

    let entry = state
        .services
        .products
        .restock(RestockInput {
            product_id: product.id,
            supplier_id: None,
            quantity: 25,
            unit_price: dec!(2.10),
            discount: dec!(0),
            vat: dec!(21.00),
        })
        .await
        .unwrap();

    assert_eq!(entry.product_id, product.id);
    assert_eq!(entry.supplier_id, supplier.id);
    assert_eq!(entry.quantity, 25);
    assert_eq!(entry.unit_price, dec!(2.10));

    let after = state
        .services
        .products
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(after.stock_quantity, 35);

    let rows = purchase::Entity::find()
        .filter(purchase::Column::ProductId.eq(product.id))
        .all(&*state.db)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn restock_rejects_non_positive_quantity() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;
    let product = common::seed_product(&state, supplier.id, 10, dec!(4.00)).await;

    for quantity in [0, -4] {
        let err = state
            .services
            .products
            .restock(RestockInput {
                product_id: product.id,
                supplier_id: None,
                quantity,
                unit_price: dec!(1.00),
                discount: dec!(0),
                vat: dec!(21.00),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    let after = state
        .services
        .products
        .get_product(product.id)
        .await
        .unwrap();
    assert_eq!(after.stock_quantity, 10);
}

#[tokio::test]
async fn deleting_a_product_detaches_history_but_keeps_the_ledger() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;
    let product = common::seed_product(&state, supplier.id, 10, dec!(6.00)).await;
    let buyer = common::seed_user(&state, "history@example.com").await;

    let sale_id = state
        .services
        .orders
        .create_order(product.id, 3, buyer)
        .await
        .unwrap();

    state
        .services
        .products
        .restock(RestockInput {
            product_id: product.id,
            supplier_id: None,
            quantity: 5,
            unit_price: dec!(3.00),
            discount: dec!(0),
            vat: dec!(21.00),
        })
        .await
        .unwrap();

    state.services.products.delete_product(product.id).await.unwrap();

    let err = state
        .services
        .products
        .get_product(product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    // The sale row survives with its snapshot; only the reference is gone.
    let row = sale::Entity::find_by_id(sale_id)
        .one(&*state.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.product_id, None);
    assert_eq!(row.quantity, 3);
    assert_eq!(row.unit_price, dec!(6.00));

    let receipt = state.services.orders.get_order(sale_id).await.unwrap();
    assert_eq!(receipt.product_id, None);
    assert_eq!(receipt.product_name, None);
    assert_eq!(receipt.total, dec!(18.00));

    // Inbound purchase records for the product are removed outright.
    let purchases = purchase::Entity::find()
        .filter(purchase::Column::ProductId.eq(product.id))
        .all(&*state.db)
        .await
        .unwrap();
    assert!(purchases.is_empty());

    // Dashboards still aggregate the orphaned sale's revenue.
    let dashboard = state.services.reports.admin_dashboard().await.unwrap();
    assert_eq!(dashboard.total_sales, 1);
    assert_eq!(dashboard.total_revenue, dec!(18.00));
    assert!(dashboard.top_products.is_empty());
}

#[tokio::test]
async fn supplier_with_products_cannot_be_deleted() {
    let state = common::test_state().await;
    let supplier = common::seed_supplier(&state).await;
    common::seed_product(&state, supplier.id, 1, dec!(1.00)).await;

    let err = state
        .services
        .suppliers
        .delete_supplier(supplier.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Still present.
    assert!(state
        .services
        .suppliers
        .get_supplier(supplier.id)
        .await
        .is_ok());

    let unused = common::seed_supplier(&state).await;
    state
        .services
        .suppliers
        .delete_supplier(unused.id)
        .await
        .unwrap();
    let err = state
        .services
        .suppliers
        .get_supplier(unused.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

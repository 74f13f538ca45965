use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{product, purchase, sale, supplier};
use crate::errors::ServiceError;

/// Image filenames are opaque strings; only the extension is checked, no
/// content sniffing.
const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

fn image_extension_allowed(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

fn validate_image(filename: &str) -> Result<(), ServiceError> {
    if image_extension_allowed(filename) {
        Ok(())
    } else {
        Err(ServiceError::Validation(format!(
            "image {filename:?} must end in one of: {}",
            ALLOWED_IMAGE_EXTENSIONS.join(", ")
        )))
    }
}

/// Product catalog management, including inbound restocks.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub stock_quantity: i32,
    pub price: Decimal,
    pub location: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
    pub supplier_id: Uuid,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub stock_quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub color: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RestockInput {
    pub product_id: Uuid,
    /// Defaults to the product's current supplier when omitted.
    pub supplier_id: Option<Uuid>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub vat: Decimal,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if input.stock_quantity < 0 {
            return Err(ServiceError::Validation(
                "stock quantity cannot be negative".to_string(),
            ));
        }
        if let Some(image) = &input.image {
            validate_image(image)?;
        }

        supplier::Entity::find_by_id(input.supplier_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {}", input.supplier_id)))?;

        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            description: Set(input.description),
            stock_quantity: Set(input.stock_quantity),
            price: Set(input.price),
            location: Set(input.location),
            color: Set(input.color),
            image: Set(input.image),
            supplier_id: Set(input.supplier_id),
            created_at: Set(chrono::Utc::now()),
            updated_at: Set(None),
        };

        let created = model.insert(&*self.db).await?;
        info!(product_id = %created.id, "product created");
        Ok(created)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {id}")))
    }

    pub async fn list_products(&self) -> Result<Vec<product::Model>, ServiceError> {
        product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        if let Some(image) = &input.image {
            validate_image(image)?;
        }
        if let Some(stock) = input.stock_quantity {
            if stock < 0 {
                return Err(ServiceError::Validation(
                    "stock quantity cannot be negative".to_string(),
                ));
            }
        }

        let existing = self.get_product(id).await?;
        let mut active: product::ActiveModel = existing.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(stock_quantity) = input.stock_quantity {
            active.stock_quantity = Set(stock_quantity);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(location) = input.location {
            active.location = Set(Some(location));
        }
        if let Some(color) = input.color {
            active.color = Set(Some(color));
        }
        if let Some(image) = input.image {
            active.image = Set(Some(image));
        }

        let updated = active.update(&*self.db).await?;
        info!(product_id = %id, "product updated");
        Ok(updated)
    }

    /// Deletes a product. Historical sale rows keep their snapshot but drop
    /// the product reference; the sale ledger itself is never touched.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_product(id).await?;

        let txn = self.db.begin().await?;

        // Explicit SET NULL so the behavior holds even where the engine's
        // referential actions are disabled (SQLite without the pragma).
        sale::Entity::update_many()
            .col_expr(sale::Column::ProductId, Expr::value(Option::<Uuid>::None))
            .filter(sale::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;

        purchase::Entity::delete_many()
            .filter(purchase::Column::ProductId.eq(id))
            .exec(&txn)
            .await?;

        product::Entity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    /// Records an inbound purchase from a supplier and increments the
    /// product's stock. Row insert and stock increment commit together.
    #[instrument(skip(self, input))]
    pub async fn restock(&self, input: RestockInput) -> Result<purchase::Model, ServiceError> {
        if input.quantity <= 0 {
            return Err(ServiceError::Validation(
                "restock quantity must be positive".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let product = product::Entity::find_by_id(input.product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {}", input.product_id)))?;

        let supplier_id = input.supplier_id.unwrap_or(product.supplier_id);
        supplier::Entity::find_by_id(supplier_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {supplier_id}")))?;

        let entry = purchase::ActiveModel {
            id: Set(Uuid::new_v4()),
            supplier_id: Set(supplier_id),
            product_id: Set(product.id),
            quantity: Set(input.quantity),
            unit_price: Set(input.unit_price),
            discount: Set(input.discount),
            vat: Set(input.vat),
            purchased_at: Set(chrono::Utc::now()),
        };
        let entry = entry.insert(&txn).await?;

        product::Entity::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).add(input.quantity),
            )
            .filter(product::Column::Id.eq(product.id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        info!(
            purchase_id = %entry.id,
            product_id = %entry.product_id,
            quantity = entry.quantity,
            "restock recorded"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_allow_list() {
        assert!(image_extension_allowed("photo.png"));
        assert!(image_extension_allowed("photo.jpg"));
        assert!(image_extension_allowed("photo.jpeg"));
        assert!(image_extension_allowed("animated.gif"));
        assert!(image_extension_allowed("UPPER.PNG"));
        assert!(image_extension_allowed("many.dots.in.name.jpg"));

        assert!(!image_extension_allowed("document.pdf"));
        assert!(!image_extension_allowed("bitmap.bmp"));
        assert!(!image_extension_allowed("no_extension"));
        assert!(!image_extension_allowed("trailing.dot."));
        assert!(!image_extension_allowed("archive.png.zip"));
    }
}

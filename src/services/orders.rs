use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{product, sale, user};
use crate::errors::ServiceError;

/// Purchase transactions against the sale ledger.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
}

/// Receipt view of a completed sale.
#[derive(Debug, Serialize)]
pub struct OrderReceipt {
    pub sale_id: Uuid,
    pub buyer_id: Uuid,
    pub buyer_name: String,
    /// None when the product was deleted after the sale.
    pub product_id: Option<Uuid>,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
    pub sold_at: DateTime<Utc>,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Executes a purchase: decrements stock and appends a sale row, together
    /// or not at all.
    ///
    /// The decrement is a single conditional update
    /// (`stock = stock - qty WHERE id = ? AND stock >= qty`), so two
    /// concurrent purchases of the last unit serialize at the data layer:
    /// exactly one affects a row, the other fails with `InsufficientStock`
    /// and stock never goes negative. Supplier id and unit price are read
    /// back inside the same transaction and stored on the sale row as a
    /// point-in-time snapshot.
    #[instrument(skip(self))]
    pub async fn create_order(
        &self,
        product_id: Uuid,
        quantity: i32,
        user_id: Uuid,
    ) -> Result<Uuid, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidQuantity(quantity));
        }

        let txn = self.db.begin().await?;

        let result = product::Entity::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).sub(quantity),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Some(Utc::now())))
            .filter(product::Column::Id.eq(product_id))
            .filter(product::Column::StockQuantity.gte(quantity))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;

            // Distinguish a missing product from short stock.
            return match product::Entity::find_by_id(product_id).one(&*self.db).await? {
                None => Err(ServiceError::NotFound(format!("product {product_id}"))),
                Some(p) => Err(ServiceError::InsufficientStock(format!(
                    "requested {quantity}, only {} in stock",
                    p.stock_quantity
                ))),
            };
        }

        let product = product::Entity::find_by_id(product_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("product {product_id}")))?;

        let entry = sale::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            product_id: Set(Some(product.id)),
            supplier_id: Set(product.supplier_id),
            quantity: Set(quantity),
            unit_price: Set(product.price),
            sold_at: Set(Utc::now()),
        };
        let entry = entry.insert(&txn).await?;

        txn.commit().await?;

        info!(
            sale_id = %entry.id,
            product_id = %product_id,
            quantity,
            "purchase completed"
        );
        Ok(entry.id)
    }

    /// Loads the receipt for a completed sale.
    pub async fn get_order(&self, sale_id: Uuid) -> Result<OrderReceipt, ServiceError> {
        let entry = sale::Entity::find_by_id(sale_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("sale {sale_id}")))?;

        let buyer = user::Entity::find_by_id(entry.user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("user {}", entry.user_id)))?;

        let product = match entry.product_id {
            Some(pid) => product::Entity::find_by_id(pid).one(&*self.db).await?,
            None => None,
        };

        Ok(OrderReceipt {
            sale_id: entry.id,
            buyer_id: buyer.id,
            buyer_name: buyer.name,
            product_id: entry.product_id,
            product_name: product.map(|p| p.name),
            quantity: entry.quantity,
            unit_price: entry.unit_price,
            total: entry.total(),
            sold_at: entry.sold_at,
        })
    }
}

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::supplier;
use crate::errors::{map_insert_error, ServiceError};

/// Supplier catalog management.
#[derive(Clone)]
pub struct SupplierService {
    db: Arc<DbPool>,
}

#[derive(Debug, Clone)]
pub struct CreateSupplierInput {
    pub company_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub tax_id: String,
    pub discount_pct: Option<Decimal>,
    pub vat_pct: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSupplierInput {
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub discount_pct: Option<Decimal>,
    pub vat_pct: Option<Decimal>,
}

impl SupplierService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, input))]
    pub async fn create_supplier(
        &self,
        input: CreateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let tax_id = input.tax_id.trim().to_string();

        let model = supplier::ActiveModel {
            id: Set(Uuid::new_v4()),
            company_name: Set(input.company_name),
            phone: Set(input.phone),
            address: Set(input.address),
            tax_id: Set(tax_id.clone()),
            discount_pct: Set(input.discount_pct),
            vat_pct: Set(input.vat_pct),
            created_at: Set(chrono::Utc::now()),
        };

        let created = model
            .insert(&*self.db)
            .await
            .map_err(|e| map_insert_error(e, &format!("tax id {tax_id} is already registered")))?;

        info!(supplier_id = %created.id, "supplier created");
        Ok(created)
    }

    pub async fn get_supplier(&self, id: Uuid) -> Result<supplier::Model, ServiceError> {
        supplier::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("supplier {id}")))
    }

    pub async fn list_suppliers(&self) -> Result<Vec<supplier::Model>, ServiceError> {
        supplier::Entity::find()
            .order_by_asc(supplier::Column::CompanyName)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self, input))]
    pub async fn update_supplier(
        &self,
        id: Uuid,
        input: UpdateSupplierInput,
    ) -> Result<supplier::Model, ServiceError> {
        let existing = self.get_supplier(id).await?;
        let mut active: supplier::ActiveModel = existing.into();

        if let Some(company_name) = input.company_name {
            active.company_name = Set(company_name);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = input.address {
            active.address = Set(Some(address));
        }
        if let Some(discount_pct) = input.discount_pct {
            active.discount_pct = Set(Some(discount_pct));
        }
        if let Some(vat_pct) = input.vat_pct {
            active.vat_pct = Set(Some(vat_pct));
        }

        let updated = active.update(&*self.db).await?;
        info!(supplier_id = %id, "supplier updated");
        Ok(updated)
    }

    /// Deletes a supplier. Fails with a validation error while products,
    /// purchases, or sales still reference it (the schema restricts those
    /// foreign keys rather than cascading).
    #[instrument(skip(self))]
    pub async fn delete_supplier(&self, id: Uuid) -> Result<(), ServiceError> {
        self.get_supplier(id).await?;

        supplier::Entity::delete_by_id(id)
            .exec(&*self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_)) => {
                    ServiceError::Validation(
                        "supplier is still referenced by products or transactions".to_string(),
                    )
                }
                _ => ServiceError::Database(e),
            })?;

        info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Month, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::{product, sale};
use crate::errors::ServiceError;

/// Dashboard aggregation over the sale ledger.
///
/// All figures are derived by linear scans over fetched rows; nothing here is
/// cached between requests. The derivations depend on the ledger being
/// append-only: removing sale rows would silently corrupt both revenue and
/// the reconstructed initial stock.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DbPool>,
}

/// Revenue (or spend) for one calendar month that had at least one sale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyBucket {
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub sale_count: u64,
}

#[derive(Debug, Serialize)]
pub struct LowStockProduct {
    pub product_id: Uuid,
    pub name: String,
    pub stock_quantity: i32,
    /// Current stock plus total units ever sold.
    pub initial_stock: i64,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_sales: u64,
    pub total_revenue: Decimal,
    pub monthly_revenue: Vec<MonthlyBucket>,
    pub top_products: Vec<TopProduct>,
    pub low_stock_products: Vec<LowStockProduct>,
}

#[derive(Debug, Serialize)]
pub struct RecentProduct {
    pub product_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub purchased_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ClientDashboard {
    pub purchase_count: u64,
    pub total_spent: Decimal,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub recent_products: Vec<RecentProduct>,
    pub monthly_spend: Vec<MonthlyBucket>,
}

const TOP_PRODUCT_LIMIT: usize = 5;
const RECENT_PRODUCT_LIMIT: usize = 5;

/// Bucket sales by the calendar month of their stored timestamp. Only months
/// with at least one sale appear, ordered January through December regardless
/// of first occurrence in the input.
fn monthly_buckets(sales: &[sale::Model]) -> Vec<MonthlyBucket> {
    let mut totals: HashMap<u32, Decimal> = HashMap::new();
    for s in sales {
        *totals.entry(s.sold_at.month()).or_default() += s.total();
    }

    (1u32..=12)
        .filter_map(|m| {
            let total = totals.get(&m)?;
            let name = Month::try_from(m as u8).ok()?.name().to_string();
            Some(MonthlyBucket {
                month: name,
                total: total.round_dp(2),
            })
        })
        .collect()
}

impl ReportService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn admin_dashboard(&self) -> Result<AdminDashboard, ServiceError> {
        let sales = sale::Entity::find().all(&*self.db).await?;
        let products = product::Entity::find().all(&*self.db).await?;

        let total_sales = sales.len() as u64;
        let total_revenue: Decimal = sales.iter().map(sale::Model::total).sum();
        let monthly_revenue = monthly_buckets(&sales);

        // Top products by number of sale rows. Sales whose product was
        // deleted carry no product id and drop out of the ranking.
        let mut sale_counts: HashMap<Uuid, u64> = HashMap::new();
        for s in &sales {
            if let Some(pid) = s.product_id {
                *sale_counts.entry(pid).or_default() += 1;
            }
        }
        let mut ranked: Vec<(Uuid, u64)> = sale_counts.into_iter().collect();
        // Ties break by product id so the ranking is deterministic.
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(TOP_PRODUCT_LIMIT);

        let by_id: HashMap<Uuid, &product::Model> =
            products.iter().map(|p| (p.id, p)).collect();
        let top_products = ranked
            .into_iter()
            .filter_map(|(pid, count)| {
                by_id.get(&pid).map(|p| TopProduct {
                    product_id: p.id,
                    name: p.name.clone(),
                    image: p.image.clone(),
                    sale_count: count,
                })
            })
            .collect();

        // Initial stock is not persisted: reconstruct it from the ledger as
        // current stock + total units ever sold. Depleted products (stock 0)
        // are excluded, as is a reconstructed initial of zero.
        let mut units_sold: HashMap<Uuid, i64> = HashMap::new();
        for s in &sales {
            if let Some(pid) = s.product_id {
                *units_sold.entry(pid).or_default() += i64::from(s.quantity);
            }
        }
        let mut low_stock_products = Vec::new();
        for p in &products {
            if p.stock_quantity <= 0 {
                continue;
            }
            let sold = units_sold.get(&p.id).copied().unwrap_or(0);
            let initial = i64::from(p.stock_quantity) + sold;
            if initial == 0 {
                continue;
            }
            // current / initial <= 0.10, kept in integer arithmetic
            if i64::from(p.stock_quantity) * 10 <= initial {
                low_stock_products.push(LowStockProduct {
                    product_id: p.id,
                    name: p.name.clone(),
                    stock_quantity: p.stock_quantity,
                    initial_stock: initial,
                });
            }
        }

        Ok(AdminDashboard {
            total_sales,
            total_revenue,
            monthly_revenue,
            top_products,
            low_stock_products,
        })
    }

    #[instrument(skip(self))]
    pub async fn client_dashboard(&self, user_id: Uuid) -> Result<ClientDashboard, ServiceError> {
        let sales = sale::Entity::find()
            .filter(sale::Column::UserId.eq(user_id))
            .all(&*self.db)
            .await?;

        let purchase_count = sales.len() as u64;
        let total_spent: Decimal = sales.iter().map(sale::Model::total).sum();
        let last_purchase_date = sales.iter().map(|s| s.sold_at).max();
        let monthly_spend = monthly_buckets(&sales);

        // Most recently purchased products, newest first.
        let mut recent_sales: Vec<&sale::Model> =
            sales.iter().filter(|s| s.product_id.is_some()).collect();
        recent_sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        recent_sales.truncate(RECENT_PRODUCT_LIMIT);

        let product_ids: Vec<Uuid> = recent_sales.iter().filter_map(|s| s.product_id).collect();
        let product_rows = product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(&*self.db)
            .await?;
        let by_id: HashMap<Uuid, &product::Model> =
            product_rows.iter().map(|p| (p.id, p)).collect();

        let recent_products = recent_sales
            .into_iter()
            .filter_map(|s| {
                let p = by_id.get(&s.product_id?)?;
                Some(RecentProduct {
                    product_id: p.id,
                    name: p.name.clone(),
                    image: p.image.clone(),
                    price: p.price,
                    purchased_at: s.sold_at,
                })
            })
            .collect();

        Ok(ClientDashboard {
            purchase_count,
            total_spent,
            last_purchase_date,
            recent_products,
            monthly_spend,
        })
    }
}

//! Postgres-backed variant store.
//!
//! Schema: `migrations/0001_product_variants.sql`. The `attributes` column is a
//! JSONB object with one string value per attribute group; `price` and `stock` are
//! non-negative BIGINTs.
//!
//! ## Referential guard
//!
//! `order_items.variant_id` has a foreign key to `product_variants.id`, so a delete
//! that slips past the planner's guard fails with `StoreError::Referenced`
//! instead of orphaning order history.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use storefront_catalog::{NewVariant, StoredVariant, VariantAttributeMap, VariantUpdate};
use storefront_core::{ProductId, VariantId};

use super::r#trait::VariantStore;
use crate::error::{StoreError, map_sqlx_error};

/// Postgres-backed variant store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresVariantStore {
    pool: Arc<PgPool>,
}

impl PostgresVariantStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }
}

fn to_i64(field: &str, value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::OutOfRange(format!("{field} {value} exceeds BIGINT")))
}

fn to_u64(field: &str, value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Decode(format!("negative {field}: {value}")))
}

fn to_json(attributes: &VariantAttributeMap) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(attributes).map_err(|e| StoreError::Decode(e.to_string()))
}

fn row_to_variant(row: &PgRow) -> Result<StoredVariant, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Decode(e.to_string());

    let id: Uuid = row.try_get("id").map_err(decode)?;
    let attributes: serde_json::Value = row.try_get("attributes").map_err(decode)?;
    let price: i64 = row.try_get("price").map_err(decode)?;
    let stock: i64 = row.try_get("stock").map_err(decode)?;
    let sku: String = row.try_get("sku").map_err(decode)?;

    Ok(StoredVariant {
        id: VariantId::from_uuid(id),
        attributes: serde_json::from_value(attributes)
            .map_err(|e| StoreError::Decode(format!("attributes of {id}: {e}")))?,
        price: to_u64("price", price)?,
        stock: to_u64("stock", stock)?,
        sku,
    })
}

fn uuids(ids: &[VariantId]) -> Vec<Uuid> {
    ids.iter().map(|id| *id.as_uuid()).collect()
}

#[async_trait]
impl VariantStore for PostgresVariantStore {
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn fetch_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StoredVariant>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, attributes, price, stock, sku
            FROM product_variants
            WHERE product_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(product_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_variants", e))?;

        rows.iter().map(row_to_variant).collect()
    }

    #[instrument(skip(self, variant_ids), fields(count = variant_ids.len()))]
    async fn fetch_order_item_variant_refs(
        &self,
        variant_ids: &[VariantId],
    ) -> Result<HashSet<VariantId>, StoreError> {
        if variant_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT DISTINCT variant_id
            FROM order_items
            WHERE variant_id = ANY($1)
            "#,
        )
        .bind(uuids(variant_ids))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("fetch_order_item_variant_refs", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<Uuid, _>("variant_id")
                    .map(VariantId::from_uuid)
                    .map_err(|e| StoreError::Decode(e.to_string()))
            })
            .collect()
    }

    #[instrument(skip(self, update), fields(variant_id = %update.id))]
    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE product_variants
            SET attributes = $2, price = $3, stock = $4, sku = $5, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(update.id.as_uuid())
        .bind(to_json(&update.attributes)?)
        .bind(to_i64("price", update.fields.price)?)
        .bind(to_i64("stock", update.fields.stock)?)
        .bind(&update.fields.sku)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_variant", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(update.id));
        }
        Ok(())
    }

    #[instrument(skip(self, rows), fields(product_id = %product_id, count = rows.len()))]
    async fn insert_variants(
        &self,
        product_id: ProductId,
        rows: &[NewVariant],
    ) -> Result<Vec<VariantId>, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_insert_variants", e))?;

        let mut ids = Vec::with_capacity(rows.len());
        for new in rows {
            let id = VariantId::new();
            sqlx::query(
                r#"
                INSERT INTO product_variants (id, product_id, attributes, price, stock, sku)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(id.as_uuid())
            .bind(product_id.as_uuid())
            .bind(to_json(&new.attributes)?)
            .bind(to_i64("price", new.fields.price)?)
            .bind(to_i64("stock", new.fields.stock)?)
            .bind(&new.fields.sku)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_variants", e))?;
            ids.push(id);
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_insert_variants", e))?;
        Ok(ids)
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_variants(&self, ids: &[VariantId]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }

        sqlx::query("DELETE FROM product_variants WHERE id = ANY($1)")
            .bind(uuids(ids))
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_variants", e))?;
        Ok(())
    }
}

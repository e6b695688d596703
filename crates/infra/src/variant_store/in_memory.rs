use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;

use storefront_catalog::{NewVariant, StoredVariant, VariantUpdate};
use storefront_core::{OrderItemId, ProductId, VariantId};

use super::r#trait::VariantStore;
use crate::error::StoreError;

/// In-memory variant store.
///
/// Intended for tests/dev. Rows keep insertion order, and deleting a row that an
/// order item references fails the same way the Postgres foreign key does.
#[derive(Debug, Default)]
pub struct InMemoryVariantStore {
    rows: RwLock<Vec<(ProductId, StoredVariant)>>,
    order_items: RwLock<HashMap<OrderItemId, VariantId>>,
}

impl InMemoryVariantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows as-is, keeping their ids (fixtures, legacy data).
    pub fn seed(&self, product_id: ProductId, rows: Vec<StoredVariant>) -> Result<(), StoreError> {
        let mut map = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        map.extend(rows.into_iter().map(|row| (product_id, row)));
        Ok(())
    }

    /// Record an order line item pointing at `variant_id`.
    pub fn record_order_item(&self, variant_id: VariantId) -> Result<OrderItemId, StoreError> {
        let mut items = self.order_items.write().map_err(|_| StoreError::LockPoisoned)?;
        let id = OrderItemId::new();
        items.insert(id, variant_id);
        Ok(id)
    }
}

#[async_trait]
impl VariantStore for InMemoryVariantStore {
    async fn fetch_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StoredVariant>, StoreError> {
        let map = self.rows.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map
            .iter()
            .filter(|(p, _)| *p == product_id)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn fetch_order_item_variant_refs(
        &self,
        variant_ids: &[VariantId],
    ) -> Result<HashSet<VariantId>, StoreError> {
        let items = self.order_items.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(items
            .values()
            .filter(|id| variant_ids.contains(id))
            .copied()
            .collect())
    }

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), StoreError> {
        let mut map = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let (_, row) = map
            .iter_mut()
            .find(|(_, row)| row.id == update.id)
            .ok_or(StoreError::NotFound(update.id))?;

        row.attributes = update.attributes.clone();
        row.price = update.fields.price;
        row.stock = update.fields.stock;
        row.sku = update.fields.sku.clone();
        Ok(())
    }

    async fn insert_variants(
        &self,
        product_id: ProductId,
        rows: &[NewVariant],
    ) -> Result<Vec<VariantId>, StoreError> {
        let mut map = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        let mut ids = Vec::with_capacity(rows.len());
        for new in rows {
            let id = VariantId::new();
            map.push((
                product_id,
                StoredVariant {
                    id,
                    attributes: new.attributes.clone(),
                    price: new.fields.price,
                    stock: new.fields.stock,
                    sku: new.fields.sku.clone(),
                },
            ));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn delete_variants(&self, ids: &[VariantId]) -> Result<(), StoreError> {
        {
            let items = self.order_items.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(id) = items.values().find(|id| ids.contains(id)) {
                return Err(StoreError::Referenced {
                    operation: "delete_variants",
                    message: format!("order item references variant {id}"),
                });
            }
        }

        let mut map = self.rows.write().map_err(|_| StoreError::LockPoisoned)?;
        map.retain(|(_, row)| !ids.contains(&row.id));
        Ok(())
    }
}

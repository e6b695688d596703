use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use storefront_catalog::{NewVariant, StoredVariant, VariantUpdate};
use storefront_core::{ProductId, VariantId};

use crate::error::StoreError;

/// Storage for product variant rows and the order-item references that pin them.
///
/// Each call is an individual statement from the caller's point of view; the save
/// workflow does not assume transactions across calls.
#[async_trait]
pub trait VariantStore: Send + Sync {
    /// All rows for a product, in a stable order.
    async fn fetch_variants(&self, product_id: ProductId) -> Result<Vec<StoredVariant>, StoreError>;

    /// Subset of `variant_ids` referenced by at least one order line item.
    async fn fetch_order_item_variant_refs(
        &self,
        variant_ids: &[VariantId],
    ) -> Result<HashSet<VariantId>, StoreError>;

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), StoreError>;

    /// Insert rows, returning the assigned ids in input order.
    async fn insert_variants(
        &self,
        product_id: ProductId,
        rows: &[NewVariant],
    ) -> Result<Vec<VariantId>, StoreError>;

    async fn delete_variants(&self, ids: &[VariantId]) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> VariantStore for Arc<S>
where
    S: VariantStore + ?Sized,
{
    async fn fetch_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<StoredVariant>, StoreError> {
        (**self).fetch_variants(product_id).await
    }

    async fn fetch_order_item_variant_refs(
        &self,
        variant_ids: &[VariantId],
    ) -> Result<HashSet<VariantId>, StoreError> {
        (**self).fetch_order_item_variant_refs(variant_ids).await
    }

    async fn update_variant(&self, update: &VariantUpdate) -> Result<(), StoreError> {
        (**self).update_variant(update).await
    }

    async fn insert_variants(
        &self,
        product_id: ProductId,
        rows: &[NewVariant],
    ) -> Result<Vec<VariantId>, StoreError> {
        (**self).insert_variants(product_id, rows).await
    }

    async fn delete_variants(&self, ids: &[VariantId]) -> Result<(), StoreError> {
        (**self).delete_variants(ids).await
    }
}

//! Save workflow for an edited product's variants.
//!
//! Order of operations:
//! 1. reject edited lists that repeat a combination
//! 2. fetch stored rows and pair them with edited variants by attribute map
//! 3. look up order-item references for rows that lost their counterpart
//! 4. update matched rows, insert new ones
//! 5. delete unreferenced orphans only; referenced ones are kept and reported
//!
//! The delete is never issued before the reference check has completed. Any store
//! failure aborts the save; there is no retry and no partial-success report.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::instrument;

use storefront_catalog::{
    RetainedVariant, Variant, ensure_unique_attributes, match_variants, plan_persistence_diff,
};
use storefront_core::{DomainError, ProductId, VariantId};

use crate::error::StoreError;
use crate::variant_store::VariantStore;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a successful save did.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SaveReport {
    pub updated: usize,
    /// Ids assigned to newly inserted rows, in the order of the edited list.
    pub inserted: Vec<VariantId>,
    pub deleted: Vec<VariantId>,
    pub retained: Vec<RetainedVariant>,
    /// Non-fatal warning for the operator when rows had to be retained.
    pub warning: Option<String>,
}

#[instrument(skip(store, variants), fields(product_id = %product_id, variants = variants.len()))]
pub async fn save_product_variants<S>(
    store: &S,
    product_id: ProductId,
    variants: &[Variant],
) -> Result<SaveReport, SaveError>
where
    S: VariantStore + ?Sized,
{
    ensure_unique_attributes(variants)?;

    let stored = store.fetch_variants(product_id).await?;

    let orphaned = match_variants(variants, &stored).orphaned_ids();
    let referenced = if orphaned.is_empty() {
        HashSet::new()
    } else {
        store.fetch_order_item_variant_refs(&orphaned).await?
    };

    let plan = plan_persistence_diff(variants, &stored, &referenced);
    if !plan.duplicate_server_rows.is_empty() {
        tracing::warn!(
            duplicates = plan.duplicate_server_rows.len(),
            "stored variants repeat a combination; first match used"
        );
    }

    for update in &plan.to_update {
        store.update_variant(update).await?;
    }

    let inserted = if plan.to_insert.is_empty() {
        Vec::new()
    } else {
        store.insert_variants(product_id, &plan.to_insert).await?
    };

    if !plan.to_delete.is_empty() {
        store.delete_variants(&plan.to_delete).await?;
    }

    let warning = plan.retention_warning();
    if let Some(message) = &warning {
        tracing::warn!(retained = plan.to_retain_with_warning.len(), "{message}");
    }

    tracing::info!(
        updated = plan.to_update.len(),
        inserted = inserted.len(),
        deleted = plan.to_delete.len(),
        "product variants saved"
    );

    Ok(SaveReport {
        updated: plan.to_update.len(),
        inserted,
        deleted: plan.to_delete,
        retained: plan.to_retain_with_warning,
        warning,
    })
}

//! Persistence diff: reconcile edited variants with stored rows.
//!
//! Pure planning only. The store adapter fetches rows and order-item references,
//! calls [`plan_persistence_diff`], then executes the plan. Rows referenced by an
//! order line are never planned for deletion; they are retained and reported so the
//! operator can be warned.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, Entity, VariantId};

use crate::attribute::VariantAttributeMap;
use crate::variant::{Variant, VariantFields};

/// A variant row as held by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredVariant {
    pub id: VariantId,
    pub attributes: VariantAttributeMap,
    pub price: u64,
    pub stock: u64,
    pub sku: String,
}

impl Entity for StoredVariant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl From<StoredVariant> for Variant {
    fn from(row: StoredVariant) -> Self {
        Self {
            id: Some(row.id),
            attributes: row.attributes,
            price: row.price,
            stock: row.stock,
            sku: row.sku,
        }
    }
}

/// Update of an existing row, matched by attribute map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub id: VariantId,
    pub attributes: VariantAttributeMap,
    pub fields: VariantFields,
}

/// Row to insert for a combination the store does not have yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub attributes: VariantAttributeMap,
    pub fields: VariantFields,
}

/// A stored row the operator removed but which an order line still references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetainedVariant {
    pub id: VariantId,
    pub attributes: VariantAttributeMap,
}

/// Outcome of greedy first-match pairing between edited and stored variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantMatching<'a> {
    pub matched: Vec<(&'a Variant, &'a StoredVariant)>,
    pub unmatched_client: Vec<&'a Variant>,
    /// Stored rows with no edited counterpart.
    pub orphaned: Vec<&'a StoredVariant>,
}

impl VariantMatching<'_> {
    pub fn orphaned_ids(&self) -> Vec<VariantId> {
        self.orphaned.iter().map(|row| row.id).collect()
    }
}

/// Pair each edited variant with the first unused stored row having an equal map.
pub fn match_variants<'a>(
    client: &'a [Variant],
    server: &'a [StoredVariant],
) -> VariantMatching<'a> {
    let mut used = vec![false; server.len()];
    let mut matched = Vec::with_capacity(client.len());
    let mut unmatched_client = Vec::new();

    for variant in client {
        let hit = server
            .iter()
            .enumerate()
            .position(|(i, row)| !used[i] && row.attributes == variant.attributes);
        match hit {
            Some(i) => {
                used[i] = true;
                matched.push((variant, &server[i]));
            }
            None => unmatched_client.push(variant),
        }
    }

    let orphaned = server
        .iter()
        .zip(used)
        .filter_map(|(row, used)| (!used).then_some(row))
        .collect();

    VariantMatching {
        matched,
        unmatched_client,
        orphaned,
    }
}

/// Work required to bring the stored rows in line with the edited variants.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistencePlan {
    pub to_update: Vec<VariantUpdate>,
    pub to_insert: Vec<NewVariant>,
    pub to_delete: Vec<VariantId>,
    pub to_retain_with_warning: Vec<RetainedVariant>,
    /// Stored rows repeating an earlier row's attribute map. Flagged only.
    pub duplicate_server_rows: Vec<VariantId>,
}

impl PersistencePlan {
    pub fn is_empty(&self) -> bool {
        self.to_update.is_empty() && self.to_insert.is_empty() && self.to_delete.is_empty()
    }

    /// Operator-facing warning naming the combinations kept for existing orders.
    pub fn retention_warning(&self) -> Option<String> {
        if self.to_retain_with_warning.is_empty() {
            return None;
        }
        let names: Vec<String> = self
            .to_retain_with_warning
            .iter()
            .map(|r| format!("[{}]", r.attributes))
            .collect();
        Some(format!(
            "{} variant(s) kept because existing orders reference them: {}",
            names.len(),
            names.join(", ")
        ))
    }
}

/// Plan updates, inserts and guarded deletes.
///
/// `referenced` holds the ids of stored rows used by at least one order line item.
pub fn plan_persistence_diff(
    client: &[Variant],
    server: &[StoredVariant],
    referenced: &HashSet<VariantId>,
) -> PersistencePlan {
    let matching = match_variants(client, server);
    let mut plan = PersistencePlan::default();

    for (variant, row) in &matching.matched {
        plan.to_update.push(VariantUpdate {
            id: row.id,
            attributes: variant.attributes.clone(),
            fields: variant.fields(),
        });
    }

    for variant in &matching.unmatched_client {
        plan.to_insert.push(NewVariant {
            attributes: variant.attributes.clone(),
            fields: variant.fields(),
        });
    }

    for row in &matching.orphaned {
        if referenced.contains(&row.id) {
            plan.to_retain_with_warning.push(RetainedVariant {
                id: row.id,
                attributes: row.attributes.clone(),
            });
        } else {
            plan.to_delete.push(row.id);
        }
    }

    let mut seen: HashSet<&VariantAttributeMap> = HashSet::with_capacity(server.len());
    for row in server {
        if !seen.insert(&row.attributes) {
            tracing::warn!(
                variant_id = %row.id,
                attributes = %row.attributes,
                "duplicate stored variant combination"
            );
            plan.duplicate_server_rows.push(row.id);
        }
    }

    plan
}

/// Reject an edited list that repeats an attribute map.
pub fn ensure_unique_attributes(variants: &[Variant]) -> DomainResult<()> {
    let mut seen: HashSet<&VariantAttributeMap> = HashSet::with_capacity(variants.len());
    for variant in variants {
        if !seen.insert(&variant.attributes) {
            return Err(DomainError::invariant(format!(
                "duplicate variant combination [{}]",
                variant.attributes
            )));
        }
    }
    Ok(())
}

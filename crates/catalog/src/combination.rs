//! Combination generator: Cartesian product of attribute groups.
//!
//! Only valid groups participate (non-blank name, at least one non-blank value).
//! Invalid groups are skipped silently; they are work in progress in the form, not
//! errors. Output order is stable: the first valid group varies slowest and the last
//! valid group varies fastest.
//!
//! Duplicate values inside a group are passed through, so they yield duplicate maps.
//! Duplicates are rejected at the editing boundary (`AttributeGroup::add_value`).

use std::collections::HashSet;

use storefront_core::{DomainError, DomainResult};

use crate::attribute::{AttributeGroup, VariantAttributeMap};

/// Upper bound on generated combinations used by editing sessions by default.
pub const DEFAULT_COMBINATION_LIMIT: usize = 500;

struct ValidGroup<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

fn valid_groups(groups: &[AttributeGroup]) -> Vec<ValidGroup<'_>> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut valid = Vec::with_capacity(groups.len());

    for group in groups.iter().filter(|g| g.is_valid()) {
        let key = group.key();
        // A repeated name would collapse two groups into one map key.
        if !seen.insert(key) {
            tracing::warn!(attribute = key, "duplicate attribute group name skipped");
            continue;
        }
        valid.push(ValidGroup {
            key,
            values: group.participating_values().collect(),
        });
    }

    valid
}

fn count_of(valid: &[ValidGroup<'_>]) -> Option<usize> {
    if valid.is_empty() {
        return Some(0);
    }
    valid
        .iter()
        .try_fold(1usize, |acc, g| acc.checked_mul(g.values.len()))
}

fn product_of(valid: &[ValidGroup<'_>]) -> Vec<VariantAttributeMap> {
    if valid.is_empty() {
        return Vec::new();
    }

    let mut acc = vec![VariantAttributeMap::new()];
    for group in valid {
        let mut next = Vec::with_capacity(acc.len() * group.values.len());
        for partial in &acc {
            for value in &group.values {
                next.push(partial.clone().with(group.key, *value));
            }
        }
        acc = next;
    }
    acc
}

/// Number of combinations `generate_combinations` would produce.
///
/// Returns `None` if the count overflows `usize`.
pub fn combination_count(groups: &[AttributeGroup]) -> Option<usize> {
    count_of(&valid_groups(groups))
}

/// Full Cartesian product of the valid groups.
pub fn generate_combinations(groups: &[AttributeGroup]) -> Vec<VariantAttributeMap> {
    product_of(&valid_groups(groups))
}

/// Like [`generate_combinations`], but refuses to build more than `limit` maps.
pub fn generate_combinations_bounded(
    groups: &[AttributeGroup],
    limit: usize,
) -> DomainResult<Vec<VariantAttributeMap>> {
    let valid = valid_groups(groups);
    match count_of(&valid) {
        Some(count) if count <= limit => Ok(product_of(&valid)),
        Some(count) => Err(DomainError::validation(format!(
            "{count} variant combinations exceed the limit of {limit}"
        ))),
        None => Err(DomainError::validation(format!(
            "variant combinations exceed the limit of {limit}"
        ))),
    }
}

//! Variant editing session.
//!
//! One instance per product form. Holds the attribute groups, the working variant
//! list and the deleted-combination set, and re-runs generate + reconcile after every
//! structural edit. Field edits (`update_variant`) never regenerate.
//!
//! Structural edits are all-or-nothing: if regeneration fails (too many
//! combinations) the session is left exactly as it was.

use serde::Serialize;

use storefront_core::{DomainError, DomainResult};

use crate::attribute::{AttributeGroup, VariantAttributeMap};
use crate::combination::{DEFAULT_COMBINATION_LIMIT, generate_combinations_bounded};
use crate::reconcile::{DeletedCombinationSet, reconcile_variants};
use crate::variant::{Variant, VariantFields};

/// Serializable for display; build one through `new` or `load`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantEditingSession {
    groups: Vec<AttributeGroup>,
    variants: Vec<Variant>,
    deleted: DeletedCombinationSet,
    limit: usize,
}

impl Default for VariantEditingSession {
    fn default() -> Self {
        Self::new(DEFAULT_COMBINATION_LIMIT)
    }
}

impl VariantEditingSession {
    /// Empty session for "create" mode.
    pub fn new(limit: usize) -> Self {
        Self {
            groups: Vec::new(),
            variants: Vec::new(),
            deleted: DeletedCombinationSet::new(),
            limit,
        }
    }

    /// Session for "edit" mode, seeded from persisted groups and variant rows.
    ///
    /// Persisted rows keep their data through the initial regeneration; rows whose
    /// combination no longer exists drop out of the working list.
    pub fn load(
        groups: Vec<AttributeGroup>,
        variants: Vec<Variant>,
        limit: usize,
    ) -> DomainResult<Self> {
        let mut session = Self {
            groups: Vec::new(),
            variants,
            deleted: DeletedCombinationSet::new(),
            limit,
        };
        session.commit(groups, DeletedCombinationSet::new())?;
        Ok(session)
    }

    pub fn groups(&self) -> &[AttributeGroup] {
        &self.groups
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn deleted(&self) -> &DeletedCombinationSet {
        &self.deleted
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Back to create mode: no groups, no variants, nothing deleted.
    pub fn reset(&mut self) {
        self.groups.clear();
        self.variants.clear();
        self.deleted.clear();
    }

    /// Re-run generation against the current groups and deleted set.
    pub fn regenerate(&mut self) -> DomainResult<()> {
        self.commit(self.groups.clone(), self.deleted.clone())
    }

    pub fn add_group(&mut self, group: AttributeGroup) -> DomainResult<()> {
        self.ensure_name_free(group.key(), None)?;
        let mut groups = self.groups.clone();
        groups.push(group);
        self.commit(groups, self.deleted.clone())
    }

    pub fn remove_group(&mut self, index: usize) -> DomainResult<AttributeGroup> {
        let mut groups = self.groups.clone();
        if index >= groups.len() {
            return Err(DomainError::not_found());
        }
        let removed = groups.remove(index);
        self.commit(groups, self.deleted.clone())?;
        Ok(removed)
    }

    pub fn rename_group(&mut self, index: usize, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        self.ensure_name_free(name.trim(), Some(index))?;
        let mut groups = self.groups.clone();
        groups
            .get_mut(index)
            .ok_or_else(DomainError::not_found)?
            .rename(name)?;
        self.commit(groups, self.deleted.clone())
    }

    pub fn add_value(&mut self, index: usize, value: impl Into<String>) -> DomainResult<()> {
        let mut groups = self.groups.clone();
        groups
            .get_mut(index)
            .ok_or_else(DomainError::not_found)?
            .add_value(value)?;
        self.commit(groups, self.deleted.clone())
    }

    /// Returns whether the value existed.
    pub fn remove_value(&mut self, index: usize, value: &str) -> DomainResult<bool> {
        let mut groups = self.groups.clone();
        let removed = groups
            .get_mut(index)
            .ok_or_else(DomainError::not_found)?
            .remove_value(value);
        if removed {
            self.commit(groups, self.deleted.clone())?;
        }
        Ok(removed)
    }

    /// Remove a row from the working table and keep it from being regenerated.
    pub fn remove_variant(&mut self, attributes: &VariantAttributeMap) -> DomainResult<()> {
        if !self.variants.iter().any(|v| &v.attributes == attributes) {
            return Err(DomainError::not_found());
        }
        let mut deleted = self.deleted.clone();
        deleted.insert(attributes.clone());
        self.commit(self.groups.clone(), deleted)
    }

    /// Undo a `remove_variant`. Returns whether the combination had been deleted.
    pub fn restore_variant(&mut self, attributes: &VariantAttributeMap) -> DomainResult<bool> {
        let mut deleted = self.deleted.clone();
        if !deleted.remove(attributes) {
            return Ok(false);
        }
        self.commit(self.groups.clone(), deleted)?;
        Ok(true)
    }

    /// Edit price/stock/SKU of one row. Does not regenerate.
    pub fn update_variant(
        &mut self,
        attributes: &VariantAttributeMap,
        fields: VariantFields,
    ) -> DomainResult<()> {
        let variant = self
            .variants
            .iter_mut()
            .find(|v| &v.attributes == attributes)
            .ok_or_else(DomainError::not_found)?;
        variant.set_fields(fields);
        Ok(())
    }

    fn ensure_name_free(&self, key: &str, skip: Option<usize>) -> DomainResult<()> {
        if key.is_empty() {
            return Ok(());
        }
        let taken = self
            .groups
            .iter()
            .enumerate()
            .any(|(i, g)| Some(i) != skip && g.key() == key);
        if taken {
            return Err(DomainError::conflict(format!("attribute '{key}' already exists")));
        }
        Ok(())
    }

    fn commit(
        &mut self,
        groups: Vec<AttributeGroup>,
        deleted: DeletedCombinationSet,
    ) -> DomainResult<()> {
        let generated = generate_combinations_bounded(&groups, self.limit)?;
        let variants = reconcile_variants(&generated, &self.variants, &deleted);

        tracing::debug!(
            groups = groups.len(),
            generated = generated.len(),
            variants = variants.len(),
            deleted = deleted.len(),
            "variants regenerated"
        );

        self.groups = groups;
        self.variants = variants;
        self.deleted = deleted;
        Ok(())
    }
}

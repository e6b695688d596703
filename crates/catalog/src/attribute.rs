//! Attribute groups and variant attribute maps.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ValueObject};

/// A named product attribute with its ordered list of values.
///
/// `AttributeGroup::new` keeps its input exactly as given; the generator decides what
/// participates. The editing operations (`rename`, `add_value`) are the validation
/// boundary used by the admin form.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttributeGroup {
    name: String,
    values: Vec<String>,
}

impl AttributeGroup {
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// A group with a name and no values yet.
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, Vec::<String>::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Trimmed name, used as the key in generated attribute maps.
    pub fn key(&self) -> &str {
        self.name.trim()
    }

    /// Whether this group takes part in combination generation.
    pub fn is_valid(&self) -> bool {
        !self.key().is_empty() && self.participating_values().next().is_some()
    }

    /// Trimmed, non-blank values in their original order.
    pub fn participating_values(&self) -> impl Iterator<Item = &str> {
        self.values
            .iter()
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("attribute name cannot be empty"));
        }
        self.name = name.trim().to_string();
        Ok(())
    }

    /// Append a value, rejecting blanks and duplicates (compared after trimming).
    pub fn add_value(&mut self, value: impl Into<String>) -> DomainResult<()> {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            return Err(DomainError::validation("attribute value cannot be empty"));
        }
        if self.values.iter().any(|v| v.trim() == value) {
            return Err(DomainError::validation(format!(
                "value '{value}' already exists in attribute '{}'",
                self.key()
            )));
        }
        self.values.push(value.to_string());
        Ok(())
    }

    /// Remove a value by exact match. Returns whether anything was removed.
    pub fn remove_value(&mut self, value: &str) -> bool {
        let before = self.values.len();
        self.values.retain(|v| v != value);
        self.values.len() != before
    }
}

/// One selected value per attribute group, e.g. `{Color: "Red", Size: "M"}`.
///
/// Backed by an ordered map, so equality and hashing do not depend on the order in
/// which entries were inserted. Serializes as a flat JSON object, the same shape as
/// the stored `attributes` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantAttributeMap(BTreeMap<String, String>);

impl ValueObject for VariantAttributeMap {}

impl VariantAttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every entry of `self` appears in `other`, and `other` has more keys.
    pub fn is_strict_subset_of(&self, other: &VariantAttributeMap) -> bool {
        !self.is_empty()
            && self.len() < other.len()
            && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }

    /// Values joined in attribute-group order, e.g. `"Đỏ / M"`.
    ///
    /// Keys without a matching group are appended in key order.
    pub fn label_for(&self, groups: &[AttributeGroup]) -> String {
        let mut seen: Vec<&str> = Vec::with_capacity(self.0.len());
        let mut parts: Vec<&str> = Vec::with_capacity(self.0.len());
        for group in groups {
            let key = group.key();
            if seen.contains(&key) {
                continue;
            }
            if let Some(value) = self.get(key) {
                seen.push(key);
                parts.push(value);
            }
        }
        for (key, value) in self.iter() {
            if !seen.contains(&key) {
                parts.push(value);
            }
        }
        parts.join(" / ")
    }
}

impl<K, V> FromIterator<(K, V)> for VariantAttributeMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl core::fmt::Display for VariantAttributeMap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (key, value) in self.iter() {
            if !first {
                f.write_str(", ")?;
            }
            write!(f, "{key}: {value}")?;
            first = false;
        }
        Ok(())
    }
}

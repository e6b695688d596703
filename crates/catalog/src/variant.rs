use serde::{Deserialize, Serialize};

use storefront_core::VariantId;

use crate::attribute::VariantAttributeMap;

/// Operator-editable fields of a variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VariantFields {
    pub price: u64, // Price in smallest currency unit (đồng for VND)
    pub stock: u64,
    pub sku: String, // Empty when not set
}

/// A sellable combination of attribute values, as held by the editing session.
///
/// `id` is only present once the row has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Option<VariantId>,
    pub attributes: VariantAttributeMap,
    pub price: u64,
    pub stock: u64,
    pub sku: String,
}

impl Variant {
    /// A freshly generated, unsaved variant with zeroed fields.
    pub fn new(attributes: VariantAttributeMap) -> Self {
        Self {
            id: None,
            attributes,
            price: 0,
            stock: 0,
            sku: String::new(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn fields(&self) -> VariantFields {
        VariantFields {
            price: self.price,
            stock: self.stock,
            sku: self.sku.clone(),
        }
    }

    pub fn set_fields(&mut self, fields: VariantFields) {
        self.price = fields.price;
        self.stock = fields.stock;
        self.sku = fields.sku;
    }
}

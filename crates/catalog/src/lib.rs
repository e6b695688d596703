//! Catalog variant domain module.
//!
//! Business rules for product variants in the admin product form, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - [`attribute`]: attribute groups (`Color: [Red, Blue]`) and variant attribute maps
//! - [`combination`]: Cartesian product of attribute groups
//! - [`reconcile`]: merge regenerated combinations with operator-entered data
//! - [`session`]: the explicit editing session holding groups, variants and deletions
//! - [`persistence`]: diff the edited variants against stored rows

pub mod attribute;
pub mod combination;
pub mod persistence;
pub mod reconcile;
pub mod session;
pub mod variant;

pub use attribute::{AttributeGroup, VariantAttributeMap};
pub use combination::{
    DEFAULT_COMBINATION_LIMIT, combination_count, generate_combinations,
    generate_combinations_bounded,
};
pub use persistence::{
    NewVariant, PersistencePlan, RetainedVariant, StoredVariant, VariantMatching, VariantUpdate,
    ensure_unique_attributes, match_variants, plan_persistence_diff,
};
pub use reconcile::{DeletedCombinationSet, reconcile_variants};
pub use session::VariantEditingSession;
pub use variant::{Variant, VariantFields};

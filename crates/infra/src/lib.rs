//! Infrastructure layer: variant persistence, the save workflow, config.

pub mod config;
pub mod error;
pub mod save;
pub mod variant_store;


pub use config::StorefrontConfig;
pub use error::StoreError;
pub use save::{SaveError, SaveReport, save_product_variants};
pub use variant_store::{InMemoryVariantStore, PostgresVariantStore, VariantStore};

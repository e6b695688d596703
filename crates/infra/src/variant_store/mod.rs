//! Variant persistence adapters.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryVariantStore;
pub use postgres::PostgresVariantStore;
pub use r#trait::VariantStore;

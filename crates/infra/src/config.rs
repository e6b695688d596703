//! Configuration loading and representation.

use storefront_catalog::{DEFAULT_COMBINATION_LIMIT, VariantEditingSession};

use crate::error::StoreError;
use crate::variant_store::PostgresVariantStore;

const DATABASE_URL: &str = "DATABASE_URL";
const COMBINATION_LIMIT: &str = "VARIANT_COMBINATION_LIMIT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Postgres connection string. Absent in dev/test, where the in-memory store is used.
    pub database_url: Option<String>,
    /// Maximum variant combinations an editing session may generate.
    pub combination_limit: usize,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            combination_limit: DEFAULT_COMBINATION_LIMIT,
        }
    }
}

impl StorefrontConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test fixtures).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup(DATABASE_URL).filter(|v| !v.trim().is_empty());
        if database_url.is_none() {
            tracing::warn!("{DATABASE_URL} not set; only the in-memory variant store is available");
        }

        let combination_limit = match lookup(COMBINATION_LIMIT) {
            None => DEFAULT_COMBINATION_LIMIT,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        default = DEFAULT_COMBINATION_LIMIT,
                        "invalid {COMBINATION_LIMIT}; using default"
                    );
                    DEFAULT_COMBINATION_LIMIT
                }
            },
        };

        Self {
            database_url,
            combination_limit,
        }
    }

    /// Fresh editing session honouring the configured limit.
    pub fn editing_session(&self) -> VariantEditingSession {
        VariantEditingSession::new(self.combination_limit)
    }

    /// Connect the Postgres store if a database URL is configured.
    pub async fn connect_postgres(&self) -> Result<Option<PostgresVariantStore>, StoreError> {
        match &self.database_url {
            Some(url) => PostgresVariantStore::connect(url).await.map(Some),
            None => Ok(None),
        }
    }
}

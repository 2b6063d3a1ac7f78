use super::ProviderResult;
use async_trait::async_trait;
use std::hash::Hash;

/// Create/fetch/update/delete over one model type.
///
/// Implemented by the live SQLite clients and by the in-memory double, so
/// callers can be tested without a store.
#[async_trait]
pub trait DatabaseProvider: Send + Sync {
    type Model: Send + Sync + 'static;

    /// Every model, in the order the store returns them.
    async fn fetch(&self) -> ProviderResult<Vec<Self::Model>>;

    async fn create(&self, model: &Self::Model) -> ProviderResult<()>;

    /// Fails with `Delete` when no record has the model's identifier.
    async fn delete(&self, model: &Self::Model) -> ProviderResult<()>;

    /// Fails with `Update` when no record has the model's identifier.
    async fn update(&self, model: &Self::Model) -> ProviderResult<()>;
}

/// Optional capability: lookups keyed on a secondary value.
#[async_trait]
pub trait ValueFetchedDatabaseProvider: DatabaseProvider {
    type Value: Hash + Eq + Send + Sync + 'static;

    async fn fetch_all_by_value(&self, value: &Self::Value) -> ProviderResult<Vec<Self::Model>>;

    /// First match; fails with `Fetch` when nothing matches.
    async fn fetch_for_value(&self, value: &Self::Value) -> ProviderResult<Self::Model>;
}

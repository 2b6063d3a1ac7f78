//! In-memory providers for tests of code that depends on `DatabaseProvider`.
//!
//! Models are kept whole in insertion order; `update` replaces the stored
//! model, it does not apply a field mapping.

use super::{
    DatabaseProvider, DatabaseProviderError, ProviderResult, ValueFetchedDatabaseProvider,
};
use crate::convert::StoreConvertible;
use crate::db::DbError;
use async_trait::async_trait;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// `DatabaseProvider` double backed by a shared `Vec`.
///
/// Clones share storage.
pub struct InMemoryDatabaseClient<M> {
    models: Arc<RwLock<Vec<M>>>,
}

impl<M> Clone for InMemoryDatabaseClient<M> {
    fn clone(&self) -> Self {
        Self {
            models: Arc::clone(&self.models),
        }
    }
}

impl<M: StoreConvertible> Default for InMemoryDatabaseClient<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: StoreConvertible> InMemoryDatabaseClient<M> {
    pub fn new() -> Self {
        Self::with_models(Vec::new())
    }

    pub fn with_models(models: Vec<M>) -> Self {
        Self {
            models: Arc::new(RwLock::new(models)),
        }
    }

    /// Copy of the stored models, in insertion order.
    pub fn snapshot(&self) -> ProviderResult<Vec<M>> {
        Ok(self.read()?.clone())
    }

    /// Adds a value-indexed capability keyed by `key` over the same storage.
    pub fn with_value_index<V>(
        &self,
        key: impl Fn(&M) -> V + Send + Sync + 'static,
    ) -> InMemoryValueFetchedClient<M, V> {
        InMemoryValueFetchedClient {
            inner: self.clone(),
            key: Arc::new(key),
        }
    }

    fn read(&self) -> ProviderResult<RwLockReadGuard<'_, Vec<M>>> {
        self.models
            .read()
            .map_err(|_| DatabaseProviderError::Db(DbError::LockPoisoned))
    }

    fn write(&self) -> ProviderResult<RwLockWriteGuard<'_, Vec<M>>> {
        self.models
            .write()
            .map_err(|_| DatabaseProviderError::Db(DbError::LockPoisoned))
    }
}

#[async_trait]
impl<M: StoreConvertible> DatabaseProvider for InMemoryDatabaseClient<M> {
    type Model = M;

    async fn fetch(&self) -> ProviderResult<Vec<M>> {
        self.snapshot()
    }

    async fn create(&self, model: &M) -> ProviderResult<()> {
        let mut models = self.write()?;
        let id = model.id();
        if models.iter().any(|stored| stored.id() == id) {
            return Err(DatabaseProviderError::Create {
                message: "a model with the same identifier already exists".to_string(),
            });
        }
        models.push(model.clone());
        Ok(())
    }

    async fn delete(&self, model: &M) -> ProviderResult<()> {
        let mut models = self.write()?;
        let id = model.id();
        match models.iter().position(|stored| stored.id() == id) {
            Some(index) => {
                models.remove(index);
                Ok(())
            }
            None => Err(DatabaseProviderError::Delete {
                message: "no matching model found".to_string(),
            }),
        }
    }

    async fn update(&self, model: &M) -> ProviderResult<()> {
        let mut models = self.write()?;
        let id = model.id();
        match models.iter_mut().find(|stored| stored.id() == id) {
            Some(stored) => {
                *stored = model.clone();
                Ok(())
            }
            None => Err(DatabaseProviderError::Update {
                message: "no matching model found".to_string(),
            }),
        }
    }
}

/// Value-indexed double; matches models whose `key` equals the value.
pub struct InMemoryValueFetchedClient<M, V> {
    inner: InMemoryDatabaseClient<M>,
    key: Arc<dyn Fn(&M) -> V + Send + Sync>,
}

impl<M, V> Clone for InMemoryValueFetchedClient<M, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            key: Arc::clone(&self.key),
        }
    }
}

#[async_trait]
impl<M, V> DatabaseProvider for InMemoryValueFetchedClient<M, V>
where
    M: StoreConvertible,
    V: Send + Sync + 'static,
{
    type Model = M;

    async fn fetch(&self) -> ProviderResult<Vec<M>> {
        self.inner.fetch().await
    }

    async fn create(&self, model: &M) -> ProviderResult<()> {
        self.inner.create(model).await
    }

    async fn delete(&self, model: &M) -> ProviderResult<()> {
        self.inner.delete(model).await
    }

    async fn update(&self, model: &M) -> ProviderResult<()> {
        self.inner.update(model).await
    }
}

#[async_trait]
impl<M, V> ValueFetchedDatabaseProvider for InMemoryValueFetchedClient<M, V>
where
    M: StoreConvertible,
    V: Hash + Eq + Send + Sync + 'static,
{
    type Value = V;

    async fn fetch_all_by_value(&self, value: &V) -> ProviderResult<Vec<M>> {
        let models = self.inner.read()?;
        Ok(models
            .iter()
            .filter(|model| (self.key)(model) == *value)
            .cloned()
            .collect())
    }

    async fn fetch_for_value(&self, value: &V) -> ProviderResult<M> {
        let models = self.inner.read()?;
        models
            .iter()
            .find(|model| (self.key)(model) == *value)
            .cloned()
            .ok_or_else(|| DatabaseProviderError::Fetch {
                message: "no model found for value".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryDatabaseClient;
    use crate::client::{DatabaseProvider, DatabaseProviderError, ValueFetchedDatabaseProvider};
    use crate::context::Context;
    use crate::convert::{EntityDescription, ModelConvertible, StoreConvertible};
    use crate::db::DbResult;
    use rusqlite::types::Value;
    use rusqlite::Row;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: u32,
        label: String,
    }

    struct TagRecord;

    impl ModelConvertible for TagRecord {
        type Model = Tag;
        type Id = u32;

        const ENTITY: EntityDescription = EntityDescription::new("tags", "id", &["id"]);

        fn id(&self) -> u32 {
            0
        }

        fn convert(&self) -> Tag {
            Tag {
                id: 0,
                label: String::new(),
            }
        }

        fn from_row(_row: &Row<'_>) -> DbResult<Self> {
            Ok(Self)
        }

        fn values(&self) -> Vec<(&'static str, Value)> {
            Vec::new()
        }
    }

    impl StoreConvertible for Tag {
        type Id = u32;
        type Record = TagRecord;

        fn id(&self) -> u32 {
            self.id
        }

        fn convert(&self, context: &mut Context<'_>) -> TagRecord {
            context.insert(&TagRecord);
            TagRecord
        }
    }

    fn tag(id: u32, label: &str) -> Tag {
        Tag {
            id,
            label: label.to_string(),
        }
    }

    #[tokio::test]
    async fn crud_follows_provider_contract() {
        let client = InMemoryDatabaseClient::<Tag>::new();
        client.create(&tag(1, "a")).await.unwrap();
        client.update(&tag(1, "b")).await.unwrap();
        assert_eq!(client.fetch().await.unwrap(), vec![tag(1, "b")]);

        client.delete(&tag(1, "b")).await.unwrap();
        assert!(client.fetch().await.unwrap().is_empty());

        assert!(matches!(
            client.delete(&tag(1, "b")).await,
            Err(DatabaseProviderError::Delete { .. })
        ));
        assert!(matches!(
            client.update(&tag(9, "x")).await,
            Err(DatabaseProviderError::Update { .. })
        ));
    }

    #[tokio::test]
    async fn duplicate_identifier_is_rejected() {
        let client = InMemoryDatabaseClient::with_models(vec![tag(1, "a")]);
        assert!(matches!(
            client.create(&tag(1, "again")).await,
            Err(DatabaseProviderError::Create { .. })
        ));
    }

    #[tokio::test]
    async fn value_index_shares_storage() {
        let client =
            InMemoryDatabaseClient::with_models(vec![tag(1, "a"), tag(2, "b"), tag(3, "a")]);
        let by_label = client.with_value_index(|tag: &Tag| tag.label.clone());

        let matches = by_label.fetch_all_by_value(&"a".to_string()).await.unwrap();
        assert_eq!(matches, vec![tag(1, "a"), tag(3, "a")]);

        client.delete(&tag(1, "a")).await.unwrap();
        assert_eq!(
            by_label.fetch_for_value(&"a".to_string()).await.unwrap(),
            tag(3, "a")
        );
        assert!(by_label.fetch_for_value(&"z".to_string()).await.is_err());
    }
}

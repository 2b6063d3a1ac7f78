use super::{
    DatabaseClient, DatabaseProvider, DatabaseProviderError, ProviderResult,
    ValueFetchedDatabaseProvider,
};
use crate::context::PersistentContainer;
use crate::convert::{ModelConvertible, StoreConvertible};
use crate::mapping::{FieldMapping, FieldValue, MappingError};
use crate::query::{FetchRequest, Filter};
use async_trait::async_trait;
use std::hash::Hash;
use std::sync::Arc;

type ValueQuery<V, R> = Arc<dyn Fn(&V) -> FetchRequest<R> + Send + Sync>;

/// Secondary-key query of a value-fetched client.
pub struct ValueIndex<V, R> {
    attribute: Option<&'static str>,
    query: ValueQuery<V, R>,
}

impl<V, R> Clone for ValueIndex<V, R> {
    fn clone(&self) -> Self {
        Self {
            attribute: self.attribute,
            query: Arc::clone(&self.query),
        }
    }
}

impl<V, R> ValueIndex<V, R>
where
    V: FieldValue + 'static,
    R: ModelConvertible,
{
    /// Matches records whose `attribute` equals the looked-up value.
    pub fn attribute(attribute: &'static str) -> Self {
        Self {
            attribute: Some(attribute),
            query: Arc::new(move |value: &V| {
                FetchRequest::<R>::new().with_predicate(Filter::equals(attribute, value))
            }),
        }
    }
}

impl<V, R: ModelConvertible> ValueIndex<V, R> {
    /// Uses an arbitrary request per looked-up value.
    pub fn custom(query: impl Fn(&V) -> FetchRequest<R> + Send + Sync + 'static) -> Self {
        Self {
            attribute: None,
            query: Arc::new(query),
        }
    }

    pub fn request(&self, value: &V) -> FetchRequest<R> {
        (self.query)(value)
    }

    fn validate(&self) -> Result<(), MappingError> {
        match self.attribute {
            Some(attribute) if !R::ENTITY.has_attribute(attribute) => {
                Err(MappingError::UnknownAttribute {
                    entity: R::ENTITY.name,
                    attribute: attribute.to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Live client adding lookups by a secondary value `V`.
pub struct ValueFetchedDatabaseClient<M: StoreConvertible, V> {
    client: DatabaseClient<M>,
    index: ValueIndex<V, M::Record>,
}

impl<M: StoreConvertible, V> Clone for ValueFetchedDatabaseClient<M, V> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            index: self.index.clone(),
        }
    }
}

impl<M, V> ValueFetchedDatabaseClient<M, V>
where
    M: StoreConvertible,
    M::Record: ModelConvertible<Id = M::Id>,
{
    /// Builds the client; the secondary-key query is required up front.
    pub fn live(
        container: PersistentContainer,
        mapping: FieldMapping<M>,
        index: ValueIndex<V, M::Record>,
    ) -> Result<Self, MappingError> {
        index.validate()?;
        Ok(Self {
            client: DatabaseClient::live(container, mapping)?,
            index,
        })
    }

    /// Plain CRUD client sharing this client's container and mapping.
    pub fn client(&self) -> &DatabaseClient<M> {
        &self.client
    }
}

#[async_trait]
impl<M, V> DatabaseProvider for ValueFetchedDatabaseClient<M, V>
where
    M: StoreConvertible,
    M::Record: ModelConvertible<Id = M::Id>,
    V: Send + Sync + 'static,
{
    type Model = M;

    async fn fetch(&self) -> ProviderResult<Vec<M>> {
        self.client.fetch().await
    }

    async fn create(&self, model: &M) -> ProviderResult<()> {
        self.client.create(model).await
    }

    async fn delete(&self, model: &M) -> ProviderResult<()> {
        self.client.delete(model).await
    }

    async fn update(&self, model: &M) -> ProviderResult<()> {
        self.client.update(model).await
    }
}

#[async_trait]
impl<M, V> ValueFetchedDatabaseProvider for ValueFetchedDatabaseClient<M, V>
where
    M: StoreConvertible,
    M::Record: ModelConvertible<Id = M::Id>,
    V: Hash + Eq + Send + Sync + 'static,
{
    type Value = V;

    async fn fetch_all_by_value(&self, value: &V) -> ProviderResult<Vec<M>> {
        self.client.fetch_matching(self.index.request(value)).await
    }

    async fn fetch_for_value(&self, value: &V) -> ProviderResult<M> {
        let request = self.index.request(value).with_limit(1);
        let models = self.client.fetch_matching(request).await?;
        models
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseProviderError::Fetch {
                message: format!(
                    "no {} record found for value",
                    <M::Record as ModelConvertible>::ENTITY.name
                ),
            })
    }
}

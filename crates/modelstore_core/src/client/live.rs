use super::{DatabaseProvider, DatabaseProviderError, ProviderResult};
use crate::context::{Context, PersistentContainer};
use crate::convert::{ModelConvertible, StoreConvertible};
use crate::db::DbError;
use crate::mapping::{FieldMapping, MappingError};
use crate::query::FetchRequest;
use async_trait::async_trait;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Instant;

/// Live client for model `M`, bound to one container.
///
/// Every operation runs as a background task on the container.
pub struct DatabaseClient<M: StoreConvertible> {
    container: PersistentContainer,
    mapping: Arc<FieldMapping<M>>,
}

impl<M: StoreConvertible> Clone for DatabaseClient<M> {
    fn clone(&self) -> Self {
        Self {
            container: self.container.clone(),
            mapping: Arc::clone(&self.mapping),
        }
    }
}

impl<M> DatabaseClient<M>
where
    M: StoreConvertible,
    M::Record: ModelConvertible<Id = M::Id>,
{
    /// Builds a client whose `update` writes the attributes in `mapping`.
    ///
    /// # Errors
    /// - Returns `MappingError` when the record entity description is
    ///   invalid or `mapping` names an attribute the entity cannot take.
    pub fn live(
        container: PersistentContainer,
        mapping: FieldMapping<M>,
    ) -> Result<Self, MappingError> {
        let entity = <M::Record as ModelConvertible>::ENTITY;
        entity.validate()?;
        mapping.validate(&entity)?;

        Ok(Self {
            container,
            mapping: Arc::new(mapping),
        })
    }

    pub fn container(&self) -> &PersistentContainer {
        &self.container
    }

    /// Runs `request` and converts every record, in engine order.
    pub async fn fetch_matching(&self, request: FetchRequest<M::Record>) -> ProviderResult<Vec<M>> {
        let entity = entity_name::<M>();
        let started_at = Instant::now();

        let result = self
            .container
            .perform_background_task(move |context| context.fetch(&request))
            .await;

        match result {
            Ok(records) => {
                let models = records
                    .iter()
                    .map(ModelConvertible::convert)
                    .collect::<Vec<M>>();
                debug!(
                    "event=client_fetch module=client status=ok entity={entity} count={} duration_ms={}",
                    models.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(models)
            }
            Err(err) => {
                error!(
                    "event=client_fetch module=client status=error entity={entity} duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(DatabaseProviderError::Fetch {
                    message: format!("unable to fetch {entity}: {err}"),
                })
            }
        }
    }
}

#[async_trait]
impl<M> DatabaseProvider for DatabaseClient<M>
where
    M: StoreConvertible,
    M::Record: ModelConvertible<Id = M::Id>,
{
    type Model = M;

    async fn fetch(&self) -> ProviderResult<Vec<M>> {
        self.fetch_matching(<M::Record as ModelConvertible>::fetch_request()).await
    }

    async fn create(&self, model: &M) -> ProviderResult<()> {
        let entity = entity_name::<M>();
        let started_at = Instant::now();
        let model = model.clone();

        let result = self
            .container
            .perform_background_task(move |context| {
                model.convert(context);
                context.save()
            })
            .await;

        log_outcome("client_create", entity, started_at, &result);
        result.map_err(|err| DatabaseProviderError::Create {
            message: format!("unable to create {entity}: {err}"),
        })
    }

    async fn delete(&self, model: &M) -> ProviderResult<()> {
        let entity = entity_name::<M>();
        let started_at = Instant::now();
        let id = model.id();

        let result = self
            .container
            .perform_background_task(move |context| -> ProviderResult<()> {
                let request =
                    <M::Record as ModelConvertible>::fetch_request_for_id(&id).with_limit(1);
                let records = context.fetch(&request)?;
                let Some(record) = records.first() else {
                    return Err(missing_record(entity, delete_failure));
                };

                context.delete(record);
                save_located(context, entity, delete_failure)
            })
            .await;

        log_outcome("client_delete", entity, started_at, &result);
        result
    }

    async fn update(&self, model: &M) -> ProviderResult<()> {
        let entity = entity_name::<M>();
        let started_at = Instant::now();
        let model = model.clone();
        let mapping = Arc::clone(&self.mapping);

        let result = self
            .container
            .perform_background_task(move |context| -> ProviderResult<()> {
                let request = <M::Record as ModelConvertible>::fetch_request_for_id(&model.id())
                    .with_limit(1);
                let records = context.fetch(&request)?;
                let Some(record) = records.first() else {
                    return Err(missing_record(entity, update_failure));
                };

                let assignments = mapping.assignments(&model).map_err(DbError::from)?;
                let skipped = mapping.len() - assignments.len();
                let assigned = assignments.len();
                for (attribute, value) in assignments {
                    context.set_value(record, attribute, value)?;
                }
                save_located(context, entity, update_failure)?;

                debug!(
                    "event=client_update_fields module=client entity={entity} assigned={assigned} skipped={skipped}"
                );
                Ok(())
            })
            .await;

        log_outcome("client_update", entity, started_at, &result);
        result
    }
}

type Failure = fn(String) -> DatabaseProviderError;

fn delete_failure(message: String) -> DatabaseProviderError {
    DatabaseProviderError::Delete { message }
}

fn update_failure(message: String) -> DatabaseProviderError {
    DatabaseProviderError::Update { message }
}

fn missing_record(entity: &str, failure: Failure) -> DatabaseProviderError {
    failure(format!("no matching {entity} record found"))
}

/// Saves changes aimed at a looked-up record; the row may vanish between
/// lookup and save when another connection deletes it.
fn save_located(context: &mut Context<'_>, entity: &str, failure: Failure) -> ProviderResult<()> {
    context.save().map_err(|err| match err {
        DbError::RecordNotFound { .. } => missing_record(entity, failure),
        other => other.into(),
    })
}

fn entity_name<M: StoreConvertible>() -> &'static str {
    <M::Record as ModelConvertible>::ENTITY.name
}

fn log_outcome<T, E: std::fmt::Display>(
    event: &str,
    entity: &str,
    started_at: Instant,
    result: &Result<T, E>,
) {
    match result {
        Ok(_) => info!(
            "event={event} module=client status=ok entity={entity} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event={event} module=client status=error entity={entity} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

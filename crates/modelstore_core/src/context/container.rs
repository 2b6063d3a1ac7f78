use super::Context;
use crate::config::{ContextMode, StoreConfig};
use crate::db::{open_store, DbError, DbResult};
use log::{info, warn};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

struct ContainerInner {
    config: StoreConfig,
    shared: Option<Mutex<Connection>>,
}

/// Owns the store configuration and hands out contexts.
///
/// Cloning is cheap; clones share the same store and shared connection.
#[derive(Clone)]
pub struct PersistentContainer {
    inner: Arc<ContainerInner>,
}

impl PersistentContainer {
    /// Opens the store and applies its migrations.
    ///
    /// In `ContextMode::Background` the bootstrap connection is closed
    /// again once migrations succeed; every task opens its own.
    pub fn open(config: StoreConfig) -> DbResult<Self> {
        let conn = open_store(&config)?;
        let mode = config.effective_mode();
        let shared = match mode {
            ContextMode::Shared => Some(Mutex::new(conn)),
            ContextMode::Background => None,
        };

        info!(
            "event=container_open module=context status=ok mode={}",
            mode_label(mode)
        );

        Ok(Self {
            inner: Arc::new(ContainerInner { config, shared }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    pub fn mode(&self) -> ContextMode {
        self.inner.config.effective_mode()
    }

    /// Runs `work` on a context on the calling thread.
    ///
    /// Blocks until the shared connection is free (shared mode) or a new
    /// connection is open (background mode).
    pub fn with_context<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut Context<'_>) -> Result<T, E>,
        E: From<DbError>,
    {
        match &self.inner.shared {
            Some(shared) => {
                let mut conn = shared.lock().unwrap_or_else(|poisoned| {
                    // An unwinding task drops its transaction, which rolls back.
                    warn!("event=context_lock module=context status=recovered reason=poisoned");
                    poisoned.into_inner()
                });
                let mut context = Context::new(&mut *conn);
                finish(work(&mut context), &context)
            }
            None => {
                let mut conn = open_store(&self.inner.config)?;
                let mut context = Context::new(&mut conn);
                finish(work(&mut context), &context)
            }
        }
    }

    /// Runs `work` on a context from the blocking pool and awaits it.
    ///
    /// Must be called from within a tokio runtime. Dropping the returned
    /// future does not stop a task that already started.
    pub async fn perform_background_task<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut Context<'_>) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let container = self.clone();
        match tokio::task::spawn_blocking(move || container.with_context(work)).await {
            Ok(result) => result,
            Err(err) => Err(DbError::TaskFailed(err.to_string()).into()),
        }
    }
}

fn finish<T, E>(result: Result<T, E>, context: &Context<'_>) -> Result<T, E> {
    if context.has_changes() {
        warn!(
            "event=context_discard module=context status=ok unsaved_changes={}",
            context.pending_count()
        );
    }
    result
}

fn mode_label(mode: ContextMode) -> &'static str {
    match mode {
        ContextMode::Shared => "shared",
        ContextMode::Background => "background",
    }
}

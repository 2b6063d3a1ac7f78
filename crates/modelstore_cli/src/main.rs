//! CLI smoke entry point.
//!
//! # Responsibility
//! - Run one create/fetch/update/delete pass against a fresh file store.
//! - Keep output deterministic apart from generated identifiers and paths.
//!
//! The store and its `logs/` directory are left in place for inspection.

use log::info;
use modelstore_core::convert::{bool_column, uuid_column, EntityDescription};
use modelstore_core::db::DbResult;
use modelstore_core::{
    core_version, default_log_level, init_logging, Context, ContextMode, DatabaseClient,
    DatabaseProvider, FieldMapping, Migration, ModelConvertible, PersistentContainer,
    StoreConfig, StoreConvertible,
};
use rusqlite::types::Value;
use rusqlite::Row;
use std::error::Error;
use uuid::Uuid;

const MIGRATIONS: &[Migration] = &[Migration::new(
    1,
    "CREATE TABLE notes (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        body TEXT,
        pinned INTEGER NOT NULL DEFAULT 0
    );",
)];

#[derive(Debug, Clone, PartialEq)]
struct Note {
    id: Uuid,
    title: String,
    body: Option<String>,
    pinned: bool,
}

struct NoteRecord {
    id: Uuid,
    title: String,
    body: Option<String>,
    pinned: bool,
}

impl ModelConvertible for NoteRecord {
    type Model = Note;
    type Id = Uuid;

    const ENTITY: EntityDescription =
        EntityDescription::new("notes", "id", &["id", "title", "body", "pinned"]);

    fn id(&self) -> Uuid {
        self.id
    }

    fn convert(&self) -> Note {
        Note {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            pinned: self.pinned,
        }
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        Ok(Self {
            id: uuid_column(row, "id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            pinned: bool_column(row, "pinned")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Text(self.id.hyphenated().to_string())),
            ("title", Value::Text(self.title.clone())),
            ("body", self.body.clone().map_or(Value::Null, Value::Text)),
            ("pinned", Value::Integer(i64::from(self.pinned))),
        ]
    }
}

impl StoreConvertible for Note {
    type Id = Uuid;
    type Record = NoteRecord;

    fn id(&self) -> Uuid {
        self.id
    }

    fn convert(&self, context: &mut Context<'_>) -> NoteRecord {
        let record = NoteRecord {
            id: self.id,
            title: self.title.clone(),
            body: self.body.clone(),
            pinned: self.pinned,
        };
        context.insert(&record);
        record
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let work_dir = std::env::temp_dir().join(format!("modelstore-smoke-{}", Uuid::new_v4()));
    let log_dir = work_dir.join("logs");
    init_logging(default_log_level(), &log_dir.to_string_lossy())?;

    println!("modelstore_core version={}", core_version());

    let container = PersistentContainer::open(
        StoreConfig::file(work_dir.join("smoke.sqlite3"))
            .with_mode(ContextMode::Background)
            .with_migrations(MIGRATIONS),
    )?;
    let mapping = FieldMapping::new()
        .field("title", |note: &Note| note.title.clone())
        .field("body", |note: &Note| note.body.clone())
        .field("pinned", |note: &Note| note.pinned);
    let client = DatabaseClient::live(container, mapping)?;

    let mut note = Note {
        id: Uuid::new_v4(),
        title: "first".to_string(),
        body: Some("draft".to_string()),
        pinned: false,
    };
    client.create(&note).await?;
    println!("create ok count={}", client.fetch().await?.len());

    note.title = "renamed".to_string();
    note.body = None;
    note.pinned = true;
    client.update(&note).await?;
    let stored = client.fetch().await?;
    println!(
        "update ok title={} body_kept={} pinned={}",
        stored.first().map_or("", |note| note.title.as_str()),
        stored.first().and_then(|note| note.body.as_deref()) == Some("draft"),
        stored.first().is_some_and(|note| note.pinned)
    );

    client.delete(&note).await?;
    println!("delete ok count={}", client.fetch().await?.len());

    match client.delete(&note).await {
        Ok(()) => println!("repeat delete unexpectedly succeeded"),
        Err(err) => println!("repeat delete rejected error={err}"),
    }

    info!("event=smoke_run module=cli status=ok");
    println!("store and logs kept at {}", work_dir.display());
    Ok(())
}

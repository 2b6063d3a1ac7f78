#![allow(dead_code)]

use modelstore_core::convert::{uuid_column, EntityDescription, ModelConvertible, StoreConvertible};
use modelstore_core::db::{DbResult, Migration};
use modelstore_core::{
    Context, ContextMode, DatabaseClient, FieldMapping, Json, PersistentContainer, StoreConfig,
};
use rusqlite::types::Value;
use rusqlite::Row;
use std::path::Path;
use uuid::Uuid;

pub const MIGRATIONS: &[Migration] = &[
    Migration::new(
        1,
        "CREATE TABLE people (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            nickname TEXT,
            tags TEXT NOT NULL DEFAULT '[]'
        );",
    ),
    Migration::new(2, "ALTER TABLE people ADD COLUMN age INTEGER NOT NULL DEFAULT 0;"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub tags: Vec<String>,
    pub age: i64,
}

impl Person {
    pub fn new(name: &str, email: &str, age: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            nickname: None,
            tags: Vec::new(),
            age,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersonRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub tags: String,
    pub age: i64,
}

impl ModelConvertible for PersonRecord {
    type Model = Person;
    type Id = Uuid;

    const ENTITY: EntityDescription = EntityDescription::new(
        "people",
        "id",
        &["id", "name", "email", "nickname", "tags", "age"],
    );

    fn id(&self) -> Uuid {
        self.id
    }

    fn convert(&self) -> Person {
        Person {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            tags: Json::<Vec<String>>::from_stored(&self.tags)
                .map(Json::into_inner)
                .unwrap_or_default(),
            age: self.age,
        }
    }

    fn from_row(row: &Row<'_>) -> DbResult<Self> {
        Ok(Self {
            id: uuid_column(row, "id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            nickname: row.get("nickname")?,
            tags: row.get("tags")?,
            age: row.get("age")?,
        })
    }

    fn values(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("id", Value::Text(self.id.hyphenated().to_string())),
            ("name", Value::Text(self.name.clone())),
            ("email", Value::Text(self.email.clone())),
            (
                "nickname",
                self.nickname.clone().map_or(Value::Null, Value::Text),
            ),
            ("tags", Value::Text(self.tags.clone())),
            ("age", Value::Integer(self.age)),
        ]
    }
}

impl StoreConvertible for Person {
    type Id = Uuid;
    type Record = PersonRecord;

    fn id(&self) -> Uuid {
        self.id
    }

    fn convert(&self, context: &mut Context<'_>) -> PersonRecord {
        let record = PersonRecord {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            nickname: self.nickname.clone(),
            tags: serde_json::to_string(&self.tags).unwrap(),
            age: self.age,
        };
        context.insert(&record);
        record
    }
}

/// Every mutable attribute of `people`.
pub fn people_mapping() -> FieldMapping<Person> {
    FieldMapping::new()
        .field("name", |person: &Person| person.name.clone())
        .field("email", |person: &Person| person.email.clone())
        .field("nickname", |person: &Person| person.nickname.clone())
        .transformed("tags", |person: &Person| Json(person.tags.clone()))
        .field("age", |person: &Person| person.age)
}

pub fn memory_container() -> PersistentContainer {
    PersistentContainer::open(StoreConfig::in_memory().with_migrations(MIGRATIONS)).unwrap()
}

pub fn file_container(path: &Path, mode: ContextMode) -> PersistentContainer {
    PersistentContainer::open(
        StoreConfig::file(path)
            .with_mode(mode)
            .with_migrations(MIGRATIONS),
    )
    .unwrap()
}

pub fn people_client(container: &PersistentContainer) -> DatabaseClient<Person> {
    DatabaseClient::live(container.clone(), people_mapping()).expect("people mapping is valid")
}

pub fn sorted_names(people: &[Person]) -> Vec<String> {
    let mut names = people
        .iter()
        .map(|person| person.name.clone())
        .collect::<Vec<_>>();
    names.sort();
    names
}

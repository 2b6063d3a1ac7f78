use crate::db::DbError;
use crate::mapping::MappingError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, DatabaseProviderError>;

/// Error surfaced by every `DatabaseProvider` operation.
#[derive(Debug)]
pub enum DatabaseProviderError {
    Fetch { message: String },
    Create { message: String },
    Delete { message: String },
    Update { message: String },
    /// Store failure during delete/update lookups or saves.
    Db(DbError),
    Mapping(MappingError),
}

impl DatabaseProviderError {
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Fetch { message }
            | Self::Create { message }
            | Self::Delete { message }
            | Self::Update { message } => Some(message),
            Self::Db(_) | Self::Mapping(_) => None,
        }
    }
}

impl Display for DatabaseProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch { message } => write!(f, "fetch failed: {message}"),
            Self::Create { message } => write!(f, "create failed: {message}"),
            Self::Delete { message } => write!(f, "delete failed: {message}"),
            Self::Update { message } => write!(f, "update failed: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Mapping(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DatabaseProviderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Mapping(err) => Some(err),
            Self::Fetch { .. } | Self::Create { .. } | Self::Delete { .. } | Self::Update { .. } => {
                None
            }
        }
    }
}

impl From<DbError> for DatabaseProviderError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<MappingError> for DatabaseProviderError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

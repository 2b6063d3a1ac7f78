use super::{FieldValue, TransformError, Transformable};
use crate::convert::EntityDescription;
use rusqlite::types::Value;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

type Getter<M> = Box<dyn Fn(&M) -> Result<Value, TransformError> + Send + Sync>;

struct MappedField<M> {
    attribute: &'static str,
    getter: Getter<M>,
}

/// Explicit table of record attributes written by `update` for model `M`.
///
/// Attributes not listed are never touched by `update`.
pub struct FieldMapping<M> {
    fields: Vec<MappedField<M>>,
}

impl<M> Default for FieldMapping<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> FieldMapping<M> {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Maps `attribute` to a plain value read from the model.
    pub fn field<V, F>(mut self, attribute: &'static str, getter: F) -> Self
    where
        V: FieldValue,
        F: Fn(&M) -> V + Send + Sync + 'static,
    {
        self.fields.push(MappedField {
            attribute,
            getter: Box::new(move |model| Ok(getter(model).to_value())),
        });
        self
    }

    /// Maps `attribute` to a value passed through its transform step.
    pub fn transformed<T, F>(mut self, attribute: &'static str, getter: F) -> Self
    where
        T: Transformable,
        F: Fn(&M) -> T + Send + Sync + 'static,
    {
        self.fields.push(MappedField {
            attribute,
            getter: Box::new(move |model| getter(model).transform()),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.attribute)
    }

    /// Checks every mapped attribute against `entity`.
    ///
    /// # Errors
    /// - `UnknownAttribute` when the entity does not declare it.
    /// - `IdentifierAttribute` when it names the identifier attribute.
    /// - `DuplicateAttribute` when it is mapped twice.
    pub fn validate(&self, entity: &EntityDescription) -> Result<(), MappingError> {
        let mut seen = HashSet::new();
        for attribute in self.attributes() {
            if attribute == entity.id_attribute {
                return Err(MappingError::IdentifierAttribute {
                    entity: entity.name,
                    attribute: attribute.to_string(),
                });
            }
            if !entity.has_attribute(attribute) {
                return Err(MappingError::UnknownAttribute {
                    entity: entity.name,
                    attribute: attribute.to_string(),
                });
            }
            if !seen.insert(attribute) {
                return Err(MappingError::DuplicateAttribute {
                    entity: entity.name,
                    attribute: attribute.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Returns the non-null `(attribute, value)` pairs for `model`, in
    /// declaration order.
    pub fn assignments(&self, model: &M) -> Result<Vec<(&'static str, Value)>, TransformError> {
        let mut assignments = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = (field.getter)(model)?;
            if value != Value::Null {
                assignments.push((field.attribute, value));
            }
        }
        Ok(assignments)
    }
}

/// Construction-time error for field mappings, value indexes and entity
/// descriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    InvalidEntity {
        entity: &'static str,
        reason: String,
    },
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },
    IdentifierAttribute {
        entity: &'static str,
        attribute: String,
    },
    DuplicateAttribute {
        entity: &'static str,
        attribute: String,
    },
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEntity { entity, reason } => {
                write!(f, "invalid entity description `{entity}`: {reason}")
            }
            Self::UnknownAttribute { entity, attribute } => {
                write!(f, "entity `{entity}` does not declare attribute `{attribute}`")
            }
            Self::IdentifierAttribute { entity, attribute } => write!(
                f,
                "attribute `{attribute}` is the identifier of `{entity}` and cannot be mapped"
            ),
            Self::DuplicateAttribute { entity, attribute } => {
                write!(f, "attribute `{attribute}` of `{entity}` is mapped twice")
            }
        }
    }
}

impl Error for MappingError {}

#[cfg(test)]
mod tests {
    use super::{FieldMapping, MappingError};
    use crate::convert::EntityDescription;
    use crate::mapping::Json;
    use rusqlite::types::Value;

    const PROFILE: EntityDescription =
        EntityDescription::new("profiles", "id", &["id", "name", "nickname", "tags"]);

    struct Profile {
        name: String,
        nickname: Option<String>,
        tags: Vec<String>,
    }

    fn mapping() -> FieldMapping<Profile> {
        FieldMapping::new()
            .field("name", |p: &Profile| p.name.clone())
            .field("nickname", |p: &Profile| p.nickname.clone())
            .transformed("tags", |p: &Profile| Json(p.tags.clone()))
    }

    #[test]
    fn assignments_skip_null_values_and_transform() {
        let profile = Profile {
            name: "ada".to_string(),
            nickname: None,
            tags: vec!["x".to_string()],
        };

        let assignments = mapping().assignments(&profile).unwrap();
        assert_eq!(
            assignments,
            vec![
                ("name", Value::Text("ada".to_string())),
                ("tags", Value::Text(r#"["x"]"#.to_string())),
            ]
        );
    }

    #[test]
    fn validate_accepts_declared_attributes() {
        mapping().validate(&PROFILE).unwrap();
    }

    #[test]
    fn validate_rejects_unknown_identifier_and_duplicate_attributes() {
        let unknown = FieldMapping::new().field("email", |p: &Profile| p.name.clone());
        assert!(matches!(
            unknown.validate(&PROFILE),
            Err(MappingError::UnknownAttribute { .. })
        ));

        let identifier = FieldMapping::new().field("id", |p: &Profile| p.name.clone());
        assert!(matches!(
            identifier.validate(&PROFILE),
            Err(MappingError::IdentifierAttribute { .. })
        ));

        let duplicate = FieldMapping::new()
            .field("name", |p: &Profile| p.name.clone())
            .field("name", |p: &Profile| p.name.clone());
        assert!(matches!(
            duplicate.validate(&PROFILE),
            Err(MappingError::DuplicateAttribute { .. })
        ));
    }
}

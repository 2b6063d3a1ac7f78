use crate::mapping::MappingError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Static description of a record entity (its table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescription {
    pub name: &'static str,
    pub id_attribute: &'static str,
    /// Every column selected and inserted for the entity, identifier included.
    pub attributes: &'static [&'static str],
}

impl EntityDescription {
    pub const fn new(
        name: &'static str,
        id_attribute: &'static str,
        attributes: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            id_attribute,
            attributes,
        }
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.iter().any(|declared| *declared == attribute)
    }

    /// Checks names are plain identifiers, unique, and include the id.
    pub fn validate(&self) -> Result<(), MappingError> {
        let invalid = |reason: String| MappingError::InvalidEntity {
            entity: self.name,
            reason,
        };

        if !IDENTIFIER_RE.is_match(self.name) {
            return Err(invalid("entity name is not a plain identifier".to_string()));
        }

        let mut seen = HashSet::new();
        for attribute in self.attributes {
            if !IDENTIFIER_RE.is_match(attribute) {
                return Err(invalid(format!(
                    "attribute `{attribute}` is not a plain identifier"
                )));
            }
            if !seen.insert(*attribute) {
                return Err(invalid(format!("attribute `{attribute}` is declared twice")));
            }
        }

        if !self.has_attribute(self.id_attribute) {
            return Err(invalid(format!(
                "identifier `{}` is not a declared attribute",
                self.id_attribute
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::EntityDescription;
    use crate::mapping::MappingError;

    #[test]
    fn validate_accepts_plain_description() {
        EntityDescription::new("people", "id", &["id", "name"])
            .validate()
            .unwrap();
    }

    #[test]
    fn validate_rejects_missing_identifier() {
        let err = EntityDescription::new("people", "uuid", &["id", "name"])
            .validate()
            .unwrap_err();
        assert!(matches!(err, MappingError::InvalidEntity { .. }));
    }

    #[test]
    fn validate_rejects_non_identifier_names() {
        assert!(EntityDescription::new("peo ple", "id", &["id"])
            .validate()
            .is_err());
        assert!(EntityDescription::new("people", "id", &["id", "na\"me"])
            .validate()
            .is_err());
        assert!(EntityDescription::new("people", "id", &["id", "id"])
            .validate()
            .is_err());
    }
}

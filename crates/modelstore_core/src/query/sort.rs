use super::quote_identifier;

/// Attribute plus direction, rendered as one `ORDER BY` term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortDescriptor {
    Ascending(String),
    Descending(String),
}

impl SortDescriptor {
    pub fn ascending(attribute: impl Into<String>) -> Self {
        Self::Ascending(attribute.into())
    }

    pub fn descending(attribute: impl Into<String>) -> Self {
        Self::Descending(attribute.into())
    }

    pub fn attribute(&self) -> &str {
        match self {
            Self::Ascending(attribute) | Self::Descending(attribute) => attribute,
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Ascending(_))
    }

    pub fn order_term(&self) -> String {
        let direction = if self.is_ascending() { "ASC" } else { "DESC" };
        format!("{} {direction}", quote_identifier(self.attribute()))
    }
}

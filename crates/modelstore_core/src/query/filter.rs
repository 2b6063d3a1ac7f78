use super::quote_identifier;
use crate::mapping::FieldValue;
use rusqlite::types::Value;
use std::ops::Not;

/// Closed filter expression over record attributes.
///
/// String matches are case-sensitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Equals(String, Value),
    NotEquals(String, Value),
    GreaterThan(String, Value),
    GreaterThanOrEqual(String, Value),
    LessThan(String, Value),
    LessThanOrEqual(String, Value),
    BeginsWith(String, String),
    EndsWith(String, String),
    Contains(String, String),
    In(String, Vec<Value>),
    /// Inclusive on both ends.
    Between(String, Value, Value),
    IsNull(String),
    IsNotNull(String),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

/// Native predicate: an SQL boolean expression with positional `?` params.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    sql: String,
    params: Vec<Value>,
}

impl Predicate {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

impl Filter {
    pub fn equals(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::Equals(attribute.into(), value.to_value())
    }

    pub fn not_equals(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::NotEquals(attribute.into(), value.to_value())
    }

    pub fn greater_than(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::GreaterThan(attribute.into(), value.to_value())
    }

    pub fn greater_than_or_equal(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::GreaterThanOrEqual(attribute.into(), value.to_value())
    }

    pub fn less_than(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::LessThan(attribute.into(), value.to_value())
    }

    pub fn less_than_or_equal(attribute: impl Into<String>, value: impl FieldValue) -> Self {
        Self::LessThanOrEqual(attribute.into(), value.to_value())
    }

    pub fn begins_with(attribute: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::BeginsWith(attribute.into(), prefix.into())
    }

    pub fn ends_with(attribute: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self::EndsWith(attribute.into(), suffix.into())
    }

    pub fn contains(attribute: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains(attribute.into(), needle.into())
    }

    pub fn is_in<V: FieldValue>(
        attribute: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In(
            attribute.into(),
            values.into_iter().map(|value| value.to_value()).collect(),
        )
    }

    pub fn between(
        attribute: impl Into<String>,
        low: impl FieldValue,
        high: impl FieldValue,
    ) -> Self {
        Self::Between(attribute.into(), low.to_value(), high.to_value())
    }

    pub fn is_null(attribute: impl Into<String>) -> Self {
        Self::IsNull(attribute.into())
    }

    pub fn is_not_null(attribute: impl Into<String>) -> Self {
        Self::IsNotNull(attribute.into())
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Self::Or(filters.into_iter().collect())
    }

    /// Translates this expression into a native predicate.
    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate {
            sql: String::new(),
            params: Vec::new(),
        };
        self.write(&mut predicate);
        predicate
    }

    fn write(&self, out: &mut Predicate) {
        match self {
            Self::Equals(attribute, Value::Null) => write_unary(out, attribute, "IS NULL"),
            Self::NotEquals(attribute, Value::Null) => {
                write_unary(out, attribute, "IS NOT NULL")
            }
            Self::Equals(attribute, value) => write_comparison(out, attribute, "=", value),
            Self::NotEquals(attribute, value) => write_comparison(out, attribute, "<>", value),
            Self::GreaterThan(attribute, value) => write_comparison(out, attribute, ">", value),
            Self::GreaterThanOrEqual(attribute, value) => {
                write_comparison(out, attribute, ">=", value)
            }
            Self::LessThan(attribute, value) => write_comparison(out, attribute, "<", value),
            Self::LessThanOrEqual(attribute, value) => {
                write_comparison(out, attribute, "<=", value)
            }
            Self::BeginsWith(attribute, prefix) => {
                write_glob(out, attribute, format!("{}*", escape_glob(prefix)))
            }
            Self::EndsWith(attribute, suffix) => {
                write_glob(out, attribute, format!("*{}", escape_glob(suffix)))
            }
            Self::Contains(attribute, needle) => {
                write_glob(out, attribute, format!("*{}*", escape_glob(needle)))
            }
            Self::In(_, values) if values.is_empty() => out.sql.push('0'),
            Self::In(attribute, values) => {
                let placeholders = vec!["?"; values.len()].join(", ");
                out.sql.push_str(&format!(
                    "{} IN ({placeholders})",
                    quote_identifier(attribute)
                ));
                out.params.extend(values.iter().cloned());
            }
            Self::Between(attribute, low, high) => {
                out.sql
                    .push_str(&format!("{} BETWEEN ? AND ?", quote_identifier(attribute)));
                out.params.push(low.clone());
                out.params.push(high.clone());
            }
            Self::IsNull(attribute) => write_unary(out, attribute, "IS NULL"),
            Self::IsNotNull(attribute) => write_unary(out, attribute, "IS NOT NULL"),
            Self::And(filters) => write_combinator(out, filters, " AND ", '1'),
            Self::Or(filters) => write_combinator(out, filters, " OR ", '0'),
            Self::Not(filter) => {
                out.sql.push_str("NOT (");
                filter.write(out);
                out.sql.push(')');
            }
        }
    }
}

impl Not for Filter {
    type Output = Filter;

    fn not(self) -> Self::Output {
        Filter::Not(Box::new(self))
    }
}

fn write_unary(out: &mut Predicate, attribute: &str, operator: &str) {
    out.sql
        .push_str(&format!("{} {operator}", quote_identifier(attribute)));
}

fn write_comparison(out: &mut Predicate, attribute: &str, operator: &str, value: &Value) {
    out.sql
        .push_str(&format!("{} {operator} ?", quote_identifier(attribute)));
    out.params.push(value.clone());
}

fn write_glob(out: &mut Predicate, attribute: &str, pattern: String) {
    out.sql
        .push_str(&format!("{} GLOB ?", quote_identifier(attribute)));
    out.params.push(Value::Text(pattern));
}

fn write_combinator(out: &mut Predicate, filters: &[Filter], joiner: &str, identity: char) {
    if filters.is_empty() {
        out.sql.push(identity);
        return;
    }

    for (index, filter) in filters.iter().enumerate() {
        if index > 0 {
            out.sql.push_str(joiner);
        }
        out.sql.push('(');
        filter.write(out);
        out.sql.push(')');
    }
}

/// Escapes GLOB metacharacters so `text` matches literally.
fn escape_glob(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '*' => escaped.push_str("[*]"),
            '?' => escaped.push_str("[?]"),
            '[' => escaped.push_str("[[]"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_glob, Filter};
    use rusqlite::types::Value;

    #[test]
    fn conjunction_of_equals_binds_both_values() {
        let predicate = Filter::and([Filter::equals("x", 1), Filter::equals("y", 2)]).predicate();
        assert_eq!(predicate.sql(), "(\"x\" = ?) AND (\"y\" = ?)");
        assert_eq!(predicate.params(), &[Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let missing: Option<i64> = None;
        assert_eq!(
            Filter::equals("deleted_at", missing).predicate().sql(),
            "\"deleted_at\" IS NULL"
        );
        assert_eq!(
            Filter::not_equals("deleted_at", missing).predicate().sql(),
            "\"deleted_at\" IS NOT NULL"
        );
    }

    #[test]
    fn empty_combinators_and_sets_are_constants() {
        assert_eq!(Filter::and(Vec::<Filter>::new()).predicate().sql(), "1");
        assert_eq!(Filter::or(Vec::<Filter>::new()).predicate().sql(), "0");
        assert_eq!(
            Filter::is_in("id", Vec::<i64>::new()).predicate().sql(),
            "0"
        );
    }

    #[test]
    fn nested_negation_and_membership() {
        let filter = !Filter::or([
            Filter::is_in("id", [1_i64, 2, 3]),
            Filter::between("age", 18, 30),
        ]);
        let predicate = filter.predicate();
        assert_eq!(
            predicate.sql(),
            "NOT ((\"id\" IN (?, ?, ?)) OR (\"age\" BETWEEN ? AND ?))"
        );
        assert_eq!(predicate.params().len(), 5);
    }

    #[test]
    fn string_matches_use_escaped_glob_patterns() {
        let predicate = Filter::contains("name", "a*b").predicate();
        assert_eq!(predicate.sql(), "\"name\" GLOB ?");
        assert_eq!(predicate.params(), &[Value::Text("*a[*]b*".to_string())]);

        let prefix = Filter::begins_with("name", "An").predicate();
        assert_eq!(prefix.params(), &[Value::Text("An*".to_string())]);

        let suffix = Filter::ends_with("name", "[x]").predicate();
        assert_eq!(suffix.params(), &[Value::Text("*[[]x]".to_string())]);
    }

    #[test]
    fn escape_glob_leaves_plain_text_alone() {
        assert_eq!(escape_glob("plain text"), "plain text");
        assert_eq!(escape_glob("?"), "[?]");
    }
}

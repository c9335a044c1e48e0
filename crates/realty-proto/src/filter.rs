//! Subscription filter vocabulary.
//!
//! Filters arrive from clients as loosely shaped JSON. Parsing never fails:
//! anything that cannot be understood is dropped, so a malformed filter
//! widens delivery instead of silencing it.
//!
//! | JSON                          | constraint                               |
//! |-------------------------------|------------------------------------------|
//! | `"field": "x"` / number / bool| equality                                 |
//! | `"field": null`               | field must be absent                     |
//! | `"field": {"present": bool}`  | presence check                           |
//! | `"field": [a, b]`             | one-of (scalars) / contains-all (lists)  |
//! | `"createdAtBefore": n`        | `createdAt < n`                          |
//! | `"updatedAtAfter": n`         | `updatedAt > n`                          |

use serde_json::{Map, Value};

/// Timestamp fields that accept `Before`/`After` range keys.
const TIMESTAMP_FIELDS: [&str; 2] = ["createdAt", "updatedAt"];

/// A single field constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equals(Value),
    OneOf(Vec<Value>),
    Present(bool),
    Before(i64),
    After(i64),
}

/// A constraint bound to a wire field name.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConstraint {
    /// camelCase field name.
    pub field: String,
    /// What the field must satisfy.
    pub constraint: Constraint,
}

/// A per-stream interest filter. The empty filter matches every entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    constraints: Vec<FieldConstraint>,
}

impl Filter {
    /// The subscribe-to-everything filter.
    pub fn all() -> Self {
        Self::default()
    }

    /// Parse a client-supplied filter. Non-objects yield [`Filter::all`].
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::all(),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let constraints = map
            .iter()
            .filter_map(|(key, value)| parse_constraint(key, value))
            .collect();
        Self { constraints }
    }

    /// Add a constraint.
    pub fn with(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.constraints.push(FieldConstraint {
            field: field.into(),
            constraint,
        });
        self
    }

    /// Parsed constraints, all of which must hold.
    pub fn constraints(&self) -> &[FieldConstraint] {
        &self.constraints
    }

    /// Whether this filter matches everything.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

fn parse_constraint(key: &str, value: &Value) -> Option<FieldConstraint> {
    if let Some((field, before)) = split_range_key(key) {
        let bound = value.as_i64()?;
        let constraint = if before {
            Constraint::Before(bound)
        } else {
            Constraint::After(bound)
        };
        return Some(FieldConstraint {
            field: field.to_string(),
            constraint,
        });
    }

    let constraint = match value {
        Value::Null => Constraint::Present(false),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => Constraint::Equals(value.clone()),
        Value::Array(items) => {
            let wanted: Vec<Value> = items
                .iter()
                .filter(|item| !item.is_array() && !item.is_object() && !item.is_null())
                .cloned()
                .collect();
            // An empty candidate set would match nothing; drop it instead.
            if wanted.is_empty() {
                return None;
            }
            Constraint::OneOf(wanted)
        }
        Value::Object(obj) => Constraint::Present(obj.get("present")?.as_bool()?),
    };

    Some(FieldConstraint {
        field: key.to_string(),
        constraint,
    })
}

/// `createdAtBefore` -> `("createdAt", true)`.
fn split_range_key(key: &str) -> Option<(&str, bool)> {
    TIMESTAMP_FIELDS.iter().find_map(|field| {
        let suffix = key.strip_prefix(field)?;
        match suffix {
            "Before" => Some((*field, true)),
            "After" => Some((*field, false)),
            _ => None,
        }
    })
}

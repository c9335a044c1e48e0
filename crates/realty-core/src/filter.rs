//! Filter predicate evaluation.

use serde_json::{Number, Value};

use realty_proto::{Constraint, Entity, Field, Filter};

/// Largest magnitude below which every integral `f64` is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Decide whether `entity` is of interest under `filter`.
///
/// `None` means the connection is not subscribed to the entity's stream.
/// Constraints on fields the stream does not have are ignored.
pub fn matches(entity: &Entity, filter: Option<&Filter>) -> bool {
    let Some(filter) = filter else {
        return false;
    };

    filter
        .constraints()
        .iter()
        .all(|c| satisfies(entity.field(&c.field), &c.constraint))
}

fn satisfies(field: Field<'_>, constraint: &Constraint) -> bool {
    match (field, constraint) {
        (Field::Unknown, _) => true,
        (field, Constraint::Present(expected)) => field.is_present() == *expected,
        (Field::Absent, _) => false,
        (Field::Timestamp(ts), Constraint::Before(bound)) => ts < *bound,
        (Field::Timestamp(ts), Constraint::After(bound)) => ts > *bound,
        // Range bounds on non-timestamp fields carry no meaning.
        (_, Constraint::Before(_) | Constraint::After(_)) => true,
        (Field::TextList(items), Constraint::Equals(wanted)) => {
            items.iter().any(|item| text_equals(item, wanted))
        }
        (Field::TextList(items), Constraint::OneOf(wanted)) => wanted
            .iter()
            .all(|w| items.iter().any(|item| text_equals(item, w))),
        (field, Constraint::Equals(wanted)) => scalar_equals(field, wanted),
        (field, Constraint::OneOf(wanted)) => wanted.iter().any(|w| scalar_equals(field, w)),
    }
}

fn scalar_equals(field: Field<'_>, wanted: &Value) -> bool {
    match (field, wanted) {
        (Field::Text(text), wanted) => text_equals(text, wanted),
        (Field::Timestamp(ts), Value::Number(n)) => n.as_i64() == Some(ts),
        (Field::Flag(flag), Value::Bool(b)) => flag == *b,
        _ => false,
    }
}

/// Ids are text on snapshots but clients may send them as numbers.
fn text_equals(text: &str, wanted: &Value) -> bool {
    match wanted {
        Value::String(s) => text == s,
        Value::Number(n) => text == render_number(n),
        _ => false,
    }
}

/// Decimal rendering with integral floats shown without a fraction.
fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < MAX_EXACT_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use realty_proto::Stream;
    use serde_json::json;

    fn property(kind: &str) -> Entity {
        Entity::from_row(
            Stream::Properties,
            json!({
                "id": "p1",
                "createdBy": "u1",
                "createdAt": 100,
                "address": "1 Main St",
                "coordinates": {"lat": 1.0, "lng": 2.0},
                "type": kind,
                "state": "available",
                "ownerId": "42",
                "relatedRealtorIds": ["r1", "r2"],
                "deleted": false
            }),
        )
        .unwrap()
    }

    fn filter(value: serde_json::Value) -> Filter {
        Filter::from_json(&value)
    }

    #[test]
    fn test_absent_filter_never_matches() {
        assert!(!matches(&property("house"), None));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(matches(&property("house"), Some(&Filter::all())));
        assert!(matches(&property("apartment"), Some(&Filter::all())));
    }

    #[test]
    fn test_equality() {
        let f = filter(json!({"type": "house"}));
        assert!(matches(&property("house"), Some(&f)));
        assert!(!matches(&property("apartment"), Some(&f)));
    }

    #[test]
    fn test_all_constraints_must_hold() {
        let f = filter(json!({"type": "house", "state": "rented"}));
        assert!(!matches(&property("house"), Some(&f)));
    }

    #[test]
    fn test_numeric_id_matches_text() {
        assert!(matches(&property("house"), Some(&filter(json!({"ownerId": 42})))));
        assert!(!matches(&property("house"), Some(&filter(json!({"ownerId": 7})))));
    }

    #[test]
    fn test_timestamp_ranges() {
        let entity = property("house");
        assert!(matches(&entity, Some(&filter(json!({"createdAtAfter": 99})))));
        assert!(!matches(&entity, Some(&filter(json!({"createdAtAfter": 100})))));
        assert!(matches(&entity, Some(&filter(json!({"createdAtBefore": 101})))));
        assert!(!matches(&entity, Some(&filter(json!({"createdAtBefore": 100})))));
        // No updatedAt on the snapshot.
        assert!(!matches(&entity, Some(&filter(json!({"updatedAtAfter": 0})))));
    }

    #[test]
    fn test_presence() {
        let entity = property("house");
        assert!(matches(&entity, Some(&filter(json!({"updatedBy": null})))));
        assert!(!matches(&entity, Some(&filter(json!({"ownerId": null})))));
        assert!(matches(&entity, Some(&filter(json!({"ownerId": {"present": true}})))));
        assert!(!matches(&entity, Some(&filter(json!({"description": {"present": true}})))));
    }

    #[test]
    fn test_lists() {
        let entity = property("house");
        assert!(matches(&entity, Some(&filter(json!({"relatedRealtorIds": ["r2"]})))));
        assert!(matches(&entity, Some(&filter(json!({"relatedRealtorIds": ["r1", "r2"]})))));
        assert!(!matches(&entity, Some(&filter(json!({"relatedRealtorIds": ["r1", "r3"]})))));
        assert!(matches(&entity, Some(&filter(json!({"relatedRealtorIds": "r1"})))));
        assert!(matches(&entity, Some(&filter(json!({"state": ["rented", "available"]})))));
        assert!(!matches(&entity, Some(&filter(json!({"state": ["rented"]})))));
    }

    #[test]
    fn test_flags() {
        let entity = property("house");
        assert!(matches(&entity, Some(&filter(json!({"deleted": false})))));
        assert!(!matches(&entity, Some(&filter(json!({"deleted": true})))));
    }

    #[test]
    fn test_fresh_entity_is_not_deleted() {
        let entity = Entity::from_row(
            Stream::Realtors,
            json!({"id": "r1", "createdBy": "u1", "createdAt": 1, "name": "Acme"}),
        )
        .unwrap();
        assert!(matches(&entity, Some(&filter(json!({"deleted": false})))));
        assert!(matches(&entity, Some(&filter(json!({"deleted": [false, null]})))));
        assert!(!matches(&entity, Some(&filter(json!({"deleted": true})))));
    }

    #[test]
    fn test_empty_array_constraint_matches_everything() {
        for raw in [json!({"type": []}), json!({"type": [{"x": 1}]})] {
            let f = filter(raw);
            assert!(matches(&property("house"), Some(&f)));
            assert!(matches(&property("apartment"), Some(&f)));
        }
    }

    #[test]
    fn test_integral_float_matches_text_id() {
        let entity = property("house");
        assert!(matches(&entity, Some(&filter(json!({"ownerId": 42.0})))));
        assert!(!matches(&entity, Some(&filter(json!({"ownerId": 42.5})))));
        assert!(matches(&entity, Some(&filter(json!({"ownerId": [7, 42.0]})))));
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let f = filter(json!({"type": "house", "bedrooms": 3, "name": null}));
        assert!(matches(&property("house"), Some(&f)));
    }
}

//! Create and update payloads.
//!
//! Create payloads carry everything except the generated id and the update
//! audit fields. Update payloads carry any subset of the mutable fields.
//! Both reject unknown keys.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{Coordinates, PropertyState, PropertyType};
use crate::error::ValidationError;
use crate::stream::Stream;

/// Largest integer a JSON client can represent exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Field-level rules applied after deserialization.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Create payload for `properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewProperty {
    pub created_by: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PropertyState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_realtor_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_realtor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for NewProperty {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timestamp("createdAt", self.created_at)?;
        check_coordinates(&self.coordinates)
    }
}

/// Partial update for `properties`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PropertyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<PropertyState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_realtor_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_realtor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Validate for PropertyPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(updated_at) = self.updated_at {
            check_timestamp("updatedAt", updated_at)?;
        }
        if let Some(coordinates) = &self.coordinates {
            check_coordinates(coordinates)?;
        }
        Ok(())
    }
}

/// Create payload for `realtors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewRealtor {
    pub created_by: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    pub name: String,
}

impl Validate for NewRealtor {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timestamp("createdAt", self.created_at)
    }
}

/// Partial update for `realtors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RealtorPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Validate for RealtorPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.updated_at {
            Some(updated_at) => check_timestamp("updatedAt", updated_at),
            None => Ok(()),
        }
    }
}

/// Create payload for `persons`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewPerson {
    pub created_by: String,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Validate for NewPerson {
    fn validate(&self) -> Result<(), ValidationError> {
        check_timestamp("createdAt", self.created_at)?;
        match &self.email {
            Some(email) => check_email(email),
            None => Ok(()),
        }
    }
}

/// Partial update for `persons`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PersonPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Validate for PersonPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(updated_at) = self.updated_at {
            check_timestamp("updatedAt", updated_at)?;
        }
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        Ok(())
    }
}

/// Validate a create payload and return its normalized JSON.
pub fn validate_create(stream: Stream, payload: Value) -> Result<Value, ValidationError> {
    match stream {
        Stream::Properties => normalize::<NewProperty>(payload),
        Stream::Realtors => normalize::<NewRealtor>(payload),
        Stream::Persons => normalize::<NewPerson>(payload),
    }
}

/// Validate an update payload and return its normalized JSON.
pub fn validate_update(stream: Stream, payload: Value) -> Result<Value, ValidationError> {
    match stream {
        Stream::Properties => normalize::<PropertyPatch>(payload),
        Stream::Realtors => normalize::<RealtorPatch>(payload),
        Stream::Persons => normalize::<PersonPatch>(payload),
    }
}

fn normalize<T>(payload: Value) -> Result<Value, ValidationError>
where
    T: DeserializeOwned + Serialize + Validate,
{
    let parsed: T =
        serde_json::from_value(payload).map_err(|e| ValidationError::Malformed(e.to_string()))?;
    parsed.validate()?;
    serde_json::to_value(&parsed).map_err(|e| ValidationError::Malformed(e.to_string()))
}

fn check_timestamp(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::invalid(field, "must be a positive integer"));
    }
    Ok(())
}

fn check_coordinates(coordinates: &Coordinates) -> Result<(), ValidationError> {
    for (field, value) in [("coordinates.lat", coordinates.lat), ("coordinates.lng", coordinates.lng)] {
        if !value.is_finite() || value.abs() > MAX_SAFE_INTEGER {
            return Err(ValidationError::invalid(field, "must be a finite number"));
        }
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::invalid("email", "must be an e-mail address"))
    }
}

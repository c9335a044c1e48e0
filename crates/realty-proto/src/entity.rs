//! Entity snapshots.
//!
//! A snapshot is the complete state of an entity as returned by the data
//! layer after a read, create or update. Snapshots are never partial.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::stream::Stream;

/// Audit fields carried by every entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Audit {
    /// Row id assigned by the data layer.
    pub id: String,
    pub created_by: String,
    /// Creation time, milliseconds since the epoch by convention.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Soft-delete flag. A missing flag reads as `false`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl Audit {
    fn field(&self, name: &str) -> Field<'_> {
        match name {
            "id" => Field::Text(&self.id),
            "createdBy" => Field::Text(&self.created_by),
            "createdAt" => Field::Timestamp(self.created_at),
            "updatedBy" => Field::text(&self.updated_by),
            "updatedAt" => self.updated_at.map_or(Field::Absent, Field::Timestamp),
            // Rows without the soft-delete flag are live.
            "deleted" => Field::Flag(self.deleted.unwrap_or(false)),
            _ => Field::Unknown,
        }
    }
}

/// Geographic position of a property.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(deserialize_with = "coerce_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "coerce_f64")]
    pub lng: f64,
}

/// Accepts numbers and numeric strings.
fn coerce_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom),
    }
}

/// Kind of dwelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
}

impl PropertyType {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
        }
    }
}

/// Rental status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyState {
    Rented,
    Available,
    Reserved,
}

impl PropertyState {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyState::Rented => "rented",
            PropertyState::Available => "available",
            PropertyState::Reserved => "reserved",
        }
    }
}

/// A listed property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(flatten)]
    pub audit: Audit,
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

impl Property {
    fn field(&self, name: &str) -> Field<'_> {
        match name {
            "address" => Field::Text(&self.address),
            "type" => Field::Text(self.kind.as_str()),
            "state" => self.state.map_or(Field::Absent, |s| Field::Text(s.as_str())),
            "ownerId" => Field::text(&self.owner_id),
            "relatedRealtorIds" => self
                .related_realtor_ids
                .as_deref()
                .map_or(Field::Absent, Field::TextList),
            "exclusiveRealtorId" => Field::text(&self.exclusive_realtor_id),
            "description" => Field::text(&self.description),
            _ => self.audit.field(name),
        }
    }
}

/// A realtor agency or agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Realtor {
    #[serde(flatten)]
    pub audit: Audit,
    pub name: String,
}

impl Realtor {
    fn field(&self, name: &str) -> Field<'_> {
        match name {
            "name" => Field::Text(&self.name),
            _ => self.audit.field(name),
        }
    }
}

/// An owner, client or contact person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    #[serde(flatten)]
    pub audit: Audit,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Person {
    fn field(&self, name: &str) -> Field<'_> {
        match name {
            "name" => Field::Text(&self.name),
            "mobile" => Field::text(&self.mobile),
            "email" => Field::text(&self.email),
            _ => self.audit.field(name),
        }
    }
}

/// A snapshot from any stream.
///
/// Serializes as the bare snapshot object; the stream is carried
/// out-of-band (route, event name).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Property(Property),
    Realtor(Realtor),
    Person(Person),
}

impl Entity {
    /// Decode a data-layer row for the given stream.
    pub fn from_row(stream: Stream, row: Value) -> Result<Self, Error> {
        let decoded = match stream {
            Stream::Properties => serde_json::from_value(row).map(Entity::Property),
            Stream::Realtors => serde_json::from_value(row).map(Entity::Realtor),
            Stream::Persons => serde_json::from_value(row).map(Entity::Person),
        };

        decoded.map_err(|e| Error::InvalidSnapshot {
            stream,
            message: e.to_string(),
        })
    }

    /// Stream this snapshot belongs to.
    pub fn stream(&self) -> Stream {
        match self {
            Entity::Property(_) => Stream::Properties,
            Entity::Realtor(_) => Stream::Realtors,
            Entity::Person(_) => Stream::Persons,
        }
    }

    /// Shared audit fields.
    pub fn audit(&self) -> &Audit {
        match self {
            Entity::Property(p) => &p.audit,
            Entity::Realtor(r) => &r.audit,
            Entity::Person(p) => &p.audit,
        }
    }

    /// Row id.
    pub fn id(&self) -> &str {
        &self.audit().id
    }

    /// Look up a field by its wire (camelCase) name.
    pub fn field(&self, name: &str) -> Field<'_> {
        match self {
            Entity::Property(p) => p.field(name),
            Entity::Realtor(r) => r.field(name),
            Entity::Person(p) => p.field(name),
        }
    }
}

/// Result of a field lookup on a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// The stream has no field with this name.
    Unknown,
    /// The field exists for the stream but is unset on this snapshot.
    Absent,
    Text(&'a str),
    Timestamp(i64),
    Flag(bool),
    TextList(&'a [String]),
}

impl<'a> Field<'a> {
    fn text(value: &'a Option<String>) -> Self {
        value.as_deref().map_or(Field::Absent, Field::Text)
    }

    /// Whether the field exists and holds a value.
    pub fn is_present(&self) -> bool {
        !matches!(self, Field::Unknown | Field::Absent)
    }
}

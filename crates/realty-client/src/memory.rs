//! In-process store.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use uuid::Uuid;

use realty_proto::{Entity, Stream};

use crate::error::Error;
use crate::store::DataStore;

/// Store that keeps snapshots in memory, in insertion order per stream.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Stream, Vec<Entity>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows held for `stream`.
    pub fn len(&self, stream: Stream) -> usize {
        self.tables.read().get(&stream).map_or(0, Vec::len)
    }

    /// Whether `stream` holds no rows.
    pub fn is_empty(&self, stream: Stream) -> bool {
        self.len(stream) == 0
    }
}

fn into_object(payload: Value) -> Result<Map<String, Value>, Error> {
    match payload {
        Value::Object(map) => Ok(map),
        _ => Err(Error::InvalidPayload("expected a JSON object".to_string())),
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn list(&self, stream: Stream) -> Result<Vec<Entity>, Error> {
        Ok(self.tables.read().get(&stream).cloned().unwrap_or_default())
    }

    async fn get(&self, stream: Stream, id: &str) -> Result<Entity, Error> {
        self.tables
            .read()
            .get(&stream)
            .and_then(|rows| rows.iter().find(|e| e.id() == id).cloned())
            .ok_or_else(|| Error::not_found(stream, id))
    }

    async fn create(&self, stream: Stream, payload: Value) -> Result<Entity, Error> {
        let mut row = into_object(payload)?;
        let id = Uuid::new_v4().to_string();
        row.insert("id".to_string(), Value::String(id.clone()));

        let entity = Entity::from_row(stream, Value::Object(row))?;
        self.tables
            .write()
            .entry(stream)
            .or_default()
            .push(entity.clone());

        tracing::debug!(stream = %stream, id = %id, "row inserted");
        Ok(entity)
    }

    async fn update(&self, stream: Stream, id: &str, payload: Value) -> Result<Entity, Error> {
        let patch = into_object(payload)?;

        let mut tables = self.tables.write();
        let slot = tables
            .get_mut(&stream)
            .and_then(|rows| rows.iter_mut().find(|e| e.id() == id))
            .ok_or_else(|| Error::not_found(stream, id))?;

        let Value::Object(mut row) = serde_json::to_value(&*slot)
            .map_err(|e| Error::InvalidPayload(e.to_string()))?
        else {
            return Err(Error::InvalidPayload("snapshot is not an object".to_string()));
        };
        for (key, value) in patch {
            if key != "id" {
                row.insert(key, value);
            }
        }

        // Decode before replacing so a bad patch leaves the row untouched.
        let updated = Entity::from_row(stream, Value::Object(row))?;
        *slot = updated.clone();
        drop(tables);

        tracing::debug!(stream = %stream, id, "row updated");
        Ok(updated)
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

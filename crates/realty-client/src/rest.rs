//! Hosted PostgREST-compatible store.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use realty_proto::{Entity, Stream};

use crate::config::RestConfig;
use crate::error::Error;
use crate::store::DataStore;

const PREFER_REPRESENTATION: &str = "return=representation";

/// Store backed by a hosted database's REST interface.
///
/// Each stream maps to one table at `{project}/rest/v1/{table}`.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Client,
    rest_url: String,
}

impl RestStore {
    /// Build the HTTP client with auth headers and timeout from `config`.
    pub fn new(config: RestConfig) -> Result<Self, Error> {
        config.validate()?;

        let mut headers = HeaderMap::new();
        let mut apikey = header_value(&config.anon_key)?;
        apikey.set_sensitive(true);
        let mut bearer = header_value(&format!("Bearer {}", config.anon_key))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            rest_url: config.rest_url(),
        })
    }

    /// Endpoint for a stream's table.
    pub fn table_url(&self, stream: Stream) -> String {
        format!("{}/{}", self.rest_url, stream.table())
    }

    fn by_id(builder: RequestBuilder, id: &str) -> RequestBuilder {
        builder.query(&[("id", format!("eq.{id}"))])
    }

    async fn rows(stream: Stream, request: RequestBuilder) -> Result<Vec<Entity>, Error> {
        let response = check(request.send().await?).await?;
        let rows: Vec<Value> = response.json().await?;
        rows.into_iter()
            .map(|row| Entity::from_row(stream, row).map_err(Error::from))
            .collect()
    }
}

fn header_value(value: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(value).map_err(|e| Error::Config(format!("invalid header value: {e}")))
}

async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

fn object(payload: Value) -> Result<Value, Error> {
    if payload.is_object() {
        Ok(payload)
    } else {
        Err(Error::InvalidPayload("expected a JSON object".to_string()))
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn list(&self, stream: Stream) -> Result<Vec<Entity>, Error> {
        let request = self
            .client
            .get(self.table_url(stream))
            .query(&[("select", "*")]);
        Self::rows(stream, request).await
    }

    async fn get(&self, stream: Stream, id: &str) -> Result<Entity, Error> {
        let request = Self::by_id(self.client.get(self.table_url(stream)), id).query(&[("select", "*")]);
        Self::rows(stream, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(stream, id))
    }

    async fn create(&self, stream: Stream, payload: Value) -> Result<Entity, Error> {
        let request = self
            .client
            .post(self.table_url(stream))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&object(payload)?);

        let entity = Self::rows(stream, request)
            .await?
            .into_iter()
            .next()
            .ok_or(Error::EmptyResponse(stream))?;

        tracing::debug!(stream = %stream, id = %entity.id(), "row inserted");
        Ok(entity)
    }

    async fn update(&self, stream: Stream, id: &str, payload: Value) -> Result<Entity, Error> {
        let request = Self::by_id(self.client.patch(self.table_url(stream)), id)
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&object(payload)?);

        // PostgREST answers an update matching no row with an empty array.
        let entity = Self::rows(stream, request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::not_found(stream, id))?;

        tracing::debug!(stream = %stream, id, "row updated");
        Ok(entity)
    }

    fn kind(&self) -> &'static str {
        "rest"
    }
}

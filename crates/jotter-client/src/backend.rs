//! Data API backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument, warn};

use jotter_core::defaults::{HEALTH_TIMEOUT_SECS, SLOW_REQUEST_MS};
use jotter_core::{
    CollectionFilter, Error, ItemKind, NoteBackend, PageQuery, RawPage, Result,
};

use crate::config::DataApiConfig;
use crate::status::{to_error, ApiErrorCode};
use crate::types::{error_message, PageEnvelope};

/// Notes Data API backend.
pub struct DataApiBackend {
    client: Client,
    base_url: Url,
    config: DataApiConfig,
}

impl DataApiBackend {
    /// Create a new backend with the given configuration.
    pub fn new(config: DataApiConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("Invalid API URL '{}': {}", config.base_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Initializing Data API backend: url={}, token={}, page_limit={}",
            config.base_url,
            if config.token.is_some() { "set" } else { "unset" },
            config.page_limit
        );

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(DataApiConfig::from_env()?)
    }

    /// Get the current configuration.
    pub fn config(&self) -> &DataApiConfig {
        &self.config
    }

    /// Build an endpoint URL from path segments; segments are percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Config(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attach the token, if configured.
    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => req.query(&[("token", token.as_str())]),
            None => req,
        }
    }

    async fn send(&self, req: RequestBuilder, op: &'static str) -> Result<Response> {
        let start = Instant::now();
        let response = self.authorize(req).send().await?;

        let elapsed = start.elapsed().as_millis() as u64;
        debug!(
            op,
            status = response.status().as_u16(),
            duration_ms = elapsed,
            "Data API request complete"
        );
        if elapsed > SLOW_REQUEST_MS {
            warn!(op, duration_ms = elapsed, slow = true, "Slow Data API request");
        }
        Ok(response)
    }

    /// Fail on non-success statuses, mapping 404 to `NotFound` for `target`.
    async fn check(response: Response, target: Option<(ItemKind, &str)>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        debug!(
            status = status.as_u16(),
            retryable = ApiErrorCode::from_status(status.as_u16()).is_retryable(),
            error = %message,
            "Data API request rejected"
        );
        Err(to_error(status.as_u16(), target, &message))
    }

    async fn read_json(response: Response) -> Result<JsonValue> {
        response
            .json::<JsonValue>()
            .await
            .map_err(|e| Error::UnexpectedResponse(format!("Failed to parse response: {}", e)))
    }

    /// Check that the service answers (`GET /ping`).
    pub async fn health_check(&self) -> Result<bool> {
        let response = self
            .client
            .get(self.url(&["ping"])?)
            .timeout(Duration::from_secs(HEALTH_TIMEOUT_SECS))
            .send()
            .await;

        match response {
            Ok(resp) => {
                if resp.status().is_success() {
                    info!("Data API health check passed");
                    Ok(true)
                } else {
                    warn!("Data API health check failed: {}", resp.status());
                    Ok(false)
                }
            }
            Err(e) => {
                warn!("Data API health check error: {}", e);
                Ok(false)
            }
        }
    }
}

fn projection(fields: &[&str]) -> Option<String> {
    if fields.is_empty() {
        None
    } else {
        Some(fields.join(","))
    }
}

#[async_trait]
impl NoteBackend for DataApiBackend {
    #[instrument(skip(self, fields), fields(subsystem = "client", component = "data_api", op = "fetch_one", kind = %kind, id = %id))]
    async fn fetch_one(&self, kind: ItemKind, id: &str, fields: &[&str]) -> Result<JsonValue> {
        let mut req = self.client.get(self.url(&[kind.endpoint(), id])?);
        if let Some(fields) = projection(fields) {
            req = req.query(&[("fields", fields)]);
        }

        let response = self.send(req, "fetch_one").await?;
        let response = Self::check(response, Some((kind, id))).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, query), fields(subsystem = "client", component = "data_api", op = "fetch_page", kind = %kind, page = query.page))]
    async fn fetch_page(&self, kind: ItemKind, query: &PageQuery) -> Result<RawPage> {
        let (url, target) = match &query.filter {
            CollectionFilter::All => (self.url(&[kind.endpoint()])?, None),
            CollectionFilter::InFolder(folder_id) => (
                self.url(&["folders", folder_id, kind.endpoint()])?,
                Some((ItemKind::Folder, folder_id.as_str())),
            ),
            CollectionFilter::Search(_) => (self.url(&["search"])?, None),
        };

        let mut params: Vec<(&str, String)> = vec![
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        if let CollectionFilter::Search(text) = &query.filter {
            params.push(("query", text.clone()));
            params.push(("type", kind.search_type().to_string()));
        }
        if !query.fields.is_empty() {
            params.push(("fields", query.fields.join(",")));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("order_by", order_by.clone()));
        }
        if let Some(dir) = query.order_dir {
            params.push(("order_dir", dir.as_str().to_string()));
        }

        let req = self.client.get(url).query(&params);
        let response = self.send(req, "fetch_page").await?;
        let response = Self::check(response, target).await?;

        let envelope: PageEnvelope = serde_json::from_value(Self::read_json(response).await?)
            .map_err(|e| Error::UnexpectedResponse(format!("Malformed page envelope: {}", e)))?;

        debug!(
            item_count = envelope.items.len(),
            has_more = envelope.has_more,
            "Fetched page"
        );
        Ok(envelope.into())
    }

    #[instrument(skip(self, body), fields(subsystem = "client", component = "data_api", op = "create", kind = %kind))]
    async fn create(&self, kind: ItemKind, body: JsonValue) -> Result<JsonValue> {
        let req = self.client.post(self.url(&[kind.endpoint()])?).json(&body);
        let response = self.send(req, "create").await?;
        let response = Self::check(response, None).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, body), fields(subsystem = "client", component = "data_api", op = "update", kind = %kind, id = %id))]
    async fn update(&self, kind: ItemKind, id: &str, body: JsonValue) -> Result<JsonValue> {
        let req = self.client.put(self.url(&[kind.endpoint(), id])?).json(&body);
        let response = self.send(req, "update").await?;
        let response = Self::check(response, Some((kind, id))).await?;
        Self::read_json(response).await
    }

    #[instrument(skip(self), fields(subsystem = "client", component = "data_api", op = "delete", kind = %kind, id = %id))]
    async fn delete(&self, kind: ItemKind, id: &str) -> Result<()> {
        let req = self.client.delete(self.url(&[kind.endpoint(), id])?);
        let response = self.send(req, "delete").await?;
        Self::check(response, Some((kind, id))).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base_url: &str) -> DataApiBackend {
        DataApiBackend::new(DataApiConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_url_joins_segments() {
        let backend = backend("http://localhost:41184");
        let url = backend.url(&["folders", "abc", "notes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:41184/folders/abc/notes");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let backend = backend("http://localhost:8080/api/");
        let url = backend.url(&["notes"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/notes");
    }

    #[test]
    fn test_url_encodes_segments() {
        let backend = backend("http://localhost:41184");
        let url = backend.url(&["notes", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:41184/notes/a%2Fb");
    }

    #[test]
    fn test_projection() {
        assert_eq!(projection(&[]), None);
        assert_eq!(projection(&["id", "title"]), Some("id,title".to_string()));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = DataApiBackend::new(DataApiConfig {
            page_limit: 0,
            ..Default::default()
        });
        assert!(result.is_err());
    }
}

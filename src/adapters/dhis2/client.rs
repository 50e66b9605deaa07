//! Target REST API client
//!
//! [`MetadataApi`] is the seam between the bootstrap orchestrator and the
//! target instance. [`Dhis2Client`] implements it over reqwest with basic
//! authentication; tests substitute an in-memory implementation.

use super::models::{CurrentUser, ImportOptions, ImportSummary, SchemaProperty, TaskStatus};
use crate::config::TargetConfig;
use crate::core::payload::Payload;
use crate::domain::{ApiError, Result, SeedError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Operations the bootstrap needs from the target
#[async_trait]
pub trait MetadataApi: Send + Sync {
    /// `GET /api/me`
    async fn me(&self) -> Result<CurrentUser>;

    /// `POST /api/metadata` with the payload's content type
    async fn import_metadata(&self, payload: &Payload, options: ImportOptions)
        -> Result<ImportSummary>;

    /// `GET /api/<resource>?fields=<fields>&paging=false[&filter=<filter>]`
    ///
    /// Returns the objects listed under the `<resource>` key.
    async fn list(&self, resource: &str, fields: &str, filter: Option<&str>) -> Result<Vec<Value>>;

    /// `GET /api/schemas/<object_type>/<property>`
    async fn schema_property(&self, object_type: &str, property: &str) -> Result<SchemaProperty>;

    /// `POST /api/dataValueSets?preheatCache=true&skipExistingCheck=true`
    async fn import_data_values(&self, payload: &Payload) -> Result<ImportSummary>;

    /// `POST /api/resourceTables/analytics`
    async fn trigger_analytics(&self) -> Result<()>;

    /// `GET /api/system/tasks/<task_type>`
    async fn task_status(&self, task_type: &str) -> Result<TaskStatus>;
}

/// reqwest-backed [`MetadataApi`]
///
/// # Example
///
/// ```no_run
/// use hisseed::adapters::dhis2::{Dhis2Client, MetadataApi};
/// use hisseed::config::{secret_string, TargetConfig};
///
/// # async fn example() -> hisseed::domain::Result<()> {
/// let config = TargetConfig {
///     base_url: "http://localhost:8080".to_string(),
///     username: "admin".to_string(),
///     password: secret_string("district".to_string()),
///     timeout_seconds: 120,
///     tls_verify: true,
/// };
///
/// let client = Dhis2Client::new(&config)?;
/// let me = client.me().await?;
/// println!("Authenticated as {}", me.id);
/// # Ok(())
/// # }
/// ```
pub struct Dhis2Client {
    /// Base URL, always ending in `/`
    base_url: Url,

    client: Client,

    /// Precomputed `Authorization` header value
    auth_header: String,
}

impl Dhis2Client {
    /// Builds a client from the target configuration
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Configuration`] for an unparseable base URL or if
    /// the HTTP client cannot be built
    pub fn new(config: &TargetConfig) -> Result<Self> {
        let mut base = config.base_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base).map_err(|e| {
            SeedError::Configuration(format!("Invalid target.base_url '{}': {e}", config.base_url))
        })?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification disabled for target");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder
            .build()
            .map_err(|e| SeedError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let credentials = format!(
            "{}:{}",
            config.username,
            config.password.expose_secret().as_ref()
        );
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        );

        Ok(Self {
            base_url,
            client,
            auth_header,
        })
    }

    /// Absolute URL of `api/<path>` with query parameters
    fn endpoint(&self, path: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("api/{}", path.trim_start_matches('/')))
            .map_err(|e| SeedError::Configuration(format!("Invalid endpoint '{path}': {e}")))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    /// Sends a request and decodes a JSON body
    ///
    /// A 409 Conflict with a parseable body is returned as the body, since
    /// import endpoints report rejected objects that way.
    async fn send_json(&self, request: RequestBuilder, accept_conflict: bool) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(e.to_string())
            } else {
                ApiError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

        if status.is_success() || (accept_conflict && status == StatusCode::CONFLICT) {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                if status.is_success() {
                    SeedError::from(ApiError::InvalidResponse(format!("{e}: {}", snippet(&text))))
                } else {
                    SeedError::from(ApiError::from_status(status.as_u16(), snippet(&text)))
                }
            });
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(SeedError::Authentication(format!(
                "target rejected credentials ({status})"
            )));
        }

        Err(ApiError::from_status(status.as_u16(), snippet(&text)).into())
    }

    async fn post_import(&self, url: Url, payload: &Payload) -> Result<ImportSummary> {
        let request = self
            .request(Method::POST, url)
            .header("Content-Type", payload.content_type())
            .body(payload.to_body()?);

        let body = self.send_json(request, true).await?;
        ImportSummary::from_response(&body)
    }
}

fn snippet(text: &str) -> String {
    const MAX: usize = 500;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[async_trait]
impl MetadataApi for Dhis2Client {
    async fn me(&self) -> Result<CurrentUser> {
        let url = self.endpoint("me", &[("fields", "id,username,displayName")])?;
        // Any failure of the login check is an authentication failure
        let body = self
            .send_json(self.request(Method::GET, url), false)
            .await
            .map_err(|e| match e {
                SeedError::Api(api) => SeedError::Authentication(format!("login check failed: {api}")),
                other => other,
            })?;
        serde_json::from_value(body).map_err(|e| {
            SeedError::Authentication(format!("unexpected /api/me response: {e}"))
        })
    }

    async fn import_metadata(
        &self,
        payload: &Payload,
        options: ImportOptions,
    ) -> Result<ImportSummary> {
        let url = self.endpoint(
            "metadata",
            &[
                ("importStrategy", options.strategy.as_str()),
                ("atomicMode", options.atomic_mode.as_str()),
            ],
        )?;

        tracing::debug!(
            url = %url,
            content_type = payload.content_type(),
            "Posting metadata"
        );
        self.post_import(url, payload).await
    }

    async fn list(&self, resource: &str, fields: &str, filter: Option<&str>) -> Result<Vec<Value>> {
        let mut query = vec![("fields", fields), ("paging", "false")];
        if let Some(filter) = filter {
            query.push(("filter", filter));
        }
        let url = self.endpoint(resource, &query)?;

        let body = self.send_json(self.request(Method::GET, url), false).await?;
        match body.get(resource) {
            Some(Value::Array(items)) => Ok(items.clone()),
            _ => Err(ApiError::InvalidResponse(format!(
                "list response has no '{resource}' array"
            ))
            .into()),
        }
    }

    async fn schema_property(&self, object_type: &str, property: &str) -> Result<SchemaProperty> {
        let url = self.endpoint(&format!("schemas/{object_type}/{property}"), &[])?;
        let body = self.send_json(self.request(Method::GET, url), false).await?;
        serde_json::from_value(body).map_err(|e| {
            SeedError::from(ApiError::InvalidResponse(format!(
                "schema {object_type}.{property}: {e}"
            )))
        })
    }

    async fn import_data_values(&self, payload: &Payload) -> Result<ImportSummary> {
        let url = self.endpoint(
            "dataValueSets",
            &[("preheatCache", "true"), ("skipExistingCheck", "true")],
        )?;
        self.post_import(url, payload).await
    }

    async fn trigger_analytics(&self) -> Result<()> {
        let url = self.endpoint("resourceTables/analytics", &[])?;
        self.send_json(self.request(Method::POST, url), false).await?;
        Ok(())
    }

    async fn task_status(&self, task_type: &str) -> Result<TaskStatus> {
        let url = self.endpoint(&format!("system/tasks/{task_type}"), &[])?;
        let body = self.send_json(self.request(Method::GET, url), false).await?;
        Ok(TaskStatus::from_response(&body))
    }
}

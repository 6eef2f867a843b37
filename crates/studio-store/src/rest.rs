//! PostgREST-style HTTP asset store
//!
//! Maps the store port onto a hosted Postgres table exposed through PostgREST:
//!
//! | Operation | Request |
//! |---|---|
//! | `list_by_owner` | `GET /rest/v1/{table}?select=*&user_id=eq.{owner}&order=created_at.desc` |
//! | `insert` | `POST /rest/v1/{table}` with `Prefer: return=representation` |
//! | `update_field` | `PATCH /rest/v1/{table}?id=eq.{id}` |
//! | `delete_by_id` | `DELETE /rest/v1/{table}?id=eq.{id}` |
//!
//! Every request carries the `apikey` header and a bearer token (the user's
//! access token when configured, the API key otherwise). Row-level security
//! on the server is what actually confines a user to their own rows.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use studio_core::{
    AssetFieldUpdate, AssetId, AssetStore, ImageAsset, NewAsset, StoreConfig, StoreError, UserId,
};
use url::Url;

/// Error body returned by PostgREST
#[derive(Debug, Default, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

/// HTTP asset store
#[derive(Debug, Clone)]
pub struct RestAssetStore {
    client: reqwest::Client,
    table_url: Url,
    headers: HeaderMap,
}

impl RestAssetStore {
    /// Build from configuration
    ///
    /// # Errors
    /// `StoreError::Config` when the URL or key is missing or malformed.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let base_url = config
            .base_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| StoreError::Config("base_url is required".to_string()))?;
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| StoreError::Config("api_key is required".to_string()))?;
        let bearer = config.access_token.as_deref().unwrap_or(api_key);

        let mut table_url = Url::parse(base_url)
            .map_err(|e| StoreError::Config(format!("invalid base_url '{base_url}': {e}")))?;
        table_url
            .path_segments_mut()
            .map_err(|()| StoreError::Config(format!("base_url '{base_url}' cannot be a base")))?
            .pop_if_empty()
            .extend(["rest", "v1", config.table.as_str()]);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(api_key)?);
        headers.insert(AUTHORIZATION, header_value(&format!("Bearer {bearer}"))?);

        Ok(Self {
            client: reqwest::Client::new(),
            table_url,
            headers,
        })
    }

    /// Use a preconfigured HTTP client (timeouts, proxies)
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Table endpoint
    #[inline]
    #[must_use]
    pub fn table_url(&self) -> &Url {
        &self.table_url
    }

    fn list_url(&self, owner: &UserId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("user_id", &format!("eq.{owner}"))
            .append_pair("order", "created_at.desc");
        url
    }

    fn row_url(&self, id: &AssetId) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.headers.clone())
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(rejection(status.as_u16(), &body))
    }
}

#[async_trait]
impl AssetStore for RestAssetStore {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ImageAsset>, StoreError> {
        let url = self.list_url(owner);
        tracing::debug!(url = %url, "listing assets");
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    async fn insert(&self, asset: NewAsset) -> Result<ImageAsset, StoreError> {
        let request = self
            .request(Method::POST, self.table_url.clone())
            .header("Prefer", "return=representation")
            .json(&asset);
        let response = self.send(request).await?;
        let rows: Vec<ImageAsset> = decode(response).await?;
        rows.into_iter().next().ok_or(StoreError::EmptyInsert)
    }

    async fn update_field(&self, id: &AssetId, update: AssetFieldUpdate) -> Result<(), StoreError> {
        tracing::debug!(asset = %id, column = update.column(), "updating asset");
        let request = self
            .request(Method::PATCH, self.row_url(id))
            .header("Prefer", "return=minimal")
            .json(&update.to_json());
        self.send(request).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &AssetId) -> Result<(), StoreError> {
        tracing::debug!(asset = %id, "deleting asset");
        self.send(self.request(Method::DELETE, self.row_url(id)))
            .await?;
        Ok(())
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StoreError> {
    HeaderValue::from_str(value)
        .map_err(|e| StoreError::Config(format!("invalid header value: {e}")))
}

fn transport(error: reqwest::Error) -> StoreError {
    StoreError::Network(error.to_string())
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

/// Map an error response to `StoreError::Rejected`
fn rejection(status: u16, body: &str) -> StoreError {
    let parsed: PostgrestError = serde_json::from_str(body).unwrap_or_default();
    let mut message = parsed
        .message
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                format!("request failed with status {status}")
            } else {
                body.trim().to_string()
            }
        });
    if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
        message = format!("{message} ({details})");
    }
    tracing::debug!(status, code = ?parsed.code, hint = ?parsed.hint, "store rejected request");
    StoreError::Rejected { status, message }
}

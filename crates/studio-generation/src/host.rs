//! Upload hosting
//!
//! - `ImgbbHost`: multipart upload to ImgBB, returns the hosted URL
//! - `EphemeralHost`: no network, returns a process-local placeholder
//!
//! Ephemeral references do not resolve anywhere else; they only keep the
//! upload flow usable when no hosting key is configured.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::sync::Arc;
use studio_core::{GenerationError, HostingConfig, ImageHost, SelectedFile};
use url::Url;

/// Scheme prefix of ephemeral references
pub const EPHEMERAL_PREFIX: &str = "blob:studio/";

#[derive(Debug, Deserialize)]
struct ImgbbResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ImgbbData>,
    #[serde(default)]
    error: Option<ImgbbFailure>,
}

#[derive(Debug, Deserialize)]
struct ImgbbData {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImgbbFailure {
    #[serde(default)]
    message: Option<String>,
}

/// ImgBB upload host
#[derive(Debug, Clone)]
pub struct ImgbbHost {
    client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    expiration_secs: Option<u32>,
}

impl ImgbbHost {
    /// Build with an API key and the configured endpoint
    ///
    /// # Errors
    /// `GenerationError::InvalidEndpoint` when the endpoint does not parse.
    pub fn new(api_key: impl Into<String>, config: &HostingConfig) -> Result<Self, GenerationError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| GenerationError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key: api_key.into(),
            expiration_secs: config.expiration_secs,
        })
    }

    /// Use a preconfigured HTTP client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn form(&self, file: &SelectedFile) -> Result<Form, GenerationError> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(file.media_type)
            .map_err(|e| GenerationError::UploadRejected(e.to_string()))?;
        let mut form = Form::new()
            .part("image", part)
            .text("key", self.api_key.clone());
        if let Some(secs) = self.expiration_secs {
            form = form.text("expiration", secs.to_string());
        }
        Ok(form)
    }
}

#[async_trait]
impl ImageHost for ImgbbHost {
    async fn host_upload(&self, file: &SelectedFile) -> Result<String, GenerationError> {
        tracing::debug!(file = %file.name, bytes = file.len(), "uploading to imgbb");

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(self.form(file)?)
            .send()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Network(e.to_string()))?;

        parse_response(status.as_u16(), &body)
    }
}

fn parse_response(status: u16, body: &str) -> Result<String, GenerationError> {
    let parsed: ImgbbResponse = serde_json::from_str(body).map_err(|_| {
        GenerationError::UploadRejected(format!("unexpected response (status {status})"))
    })?;
    match parsed {
        ImgbbResponse {
            success: true,
            data: Some(data),
            ..
        } => Ok(data.url),
        ImgbbResponse { error, .. } => Err(GenerationError::UploadRejected(
            error
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("status {status}")),
        )),
    }
}

/// Placeholder host used when no hosting key is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct EphemeralHost;

#[async_trait]
impl ImageHost for EphemeralHost {
    async fn host_upload(&self, file: &SelectedFile) -> Result<String, GenerationError> {
        let reference = format!("{EPHEMERAL_PREFIX}{}", uuid::Uuid::new_v4());
        tracing::debug!(file = %file.name, reference = %reference, "ephemeral reference issued");
        Ok(reference)
    }

    fn is_durable(&self) -> bool {
        false
    }
}

/// ImgBB when a key is configured, ephemeral otherwise
///
/// # Errors
/// See [`ImgbbHost::new`].
pub fn build_host(config: &HostingConfig) -> Result<Arc<dyn ImageHost>, GenerationError> {
    match config.imgbb_api_key.as_deref().filter(|k| !k.is_empty()) {
        Some(key) => {
            tracing::info!(endpoint = %config.endpoint, "using imgbb upload host");
            Ok(Arc::new(ImgbbHost::new(key, config)?))
        }
        None => {
            tracing::warn!("no imgbb key configured, uploads get ephemeral references");
            Ok(Arc::new(EphemeralHost))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file() -> SelectedFile {
        SelectedFile::new("cat.png", vec![0x89u8, b'P', b'N', b'G']).unwrap()
    }

    #[test]
    fn parses_success_url() {
        let body = r#"{"data":{"id":"2ndCYJK","url":"https://i.ibb.co/w04Prt6/c1f64245afb2.gif"},"success":true,"status":200}"#;
        assert_eq!(
            parse_response(200, body).unwrap(),
            "https://i.ibb.co/w04Prt6/c1f64245afb2.gif"
        );
    }

    #[test]
    fn failure_carries_service_message() {
        let body = r#"{"status_code":400,"error":{"message":"Invalid API v1 key.","code":100},"status_txt":"Bad Request"}"#;
        let err = parse_response(400, body).unwrap_err();
        assert_eq!(
            err,
            GenerationError::UploadRejected("Invalid API v1 key.".to_string())
        );
        assert_eq!(err.to_string(), "Failed to upload image: Invalid API v1 key.");
    }

    #[test]
    fn non_json_body_rejected() {
        assert!(matches!(
            parse_response(502, "<html>bad gateway</html>"),
            Err(GenerationError::UploadRejected(_))
        ));
    }

    #[tokio::test]
    async fn ephemeral_references_are_unique_and_not_durable() {
        let host = EphemeralHost;
        let a = host.host_upload(&file()).await.unwrap();
        let b = host.host_upload(&file()).await.unwrap();
        assert!(a.starts_with(EPHEMERAL_PREFIX));
        assert_ne!(a, b);
        assert!(!host.is_durable());
    }

    #[test]
    fn build_host_picks_by_key() {
        let ephemeral = build_host(&HostingConfig::default()).unwrap();
        assert!(!ephemeral.is_durable());

        let imgbb = build_host(&HostingConfig {
            imgbb_api_key: Some("key".to_string()),
            ..HostingConfig::default()
        })
        .unwrap();
        assert!(imgbb.is_durable());
    }
}

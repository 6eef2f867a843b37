//! Prompt synthesizer backed by the Pollinations image endpoint
//!
//! The endpoint renders on first fetch, so synthesis is pure URL construction:
//! `{endpoint}/{percent-encoded prompt}?width=W&height=H&seed=S`.

use async_trait::async_trait;
use studio_core::{GenerationConfig, GenerationError, ImageSynthesizer, SynthesisRequest};
use url::Url;

/// URL-constructing synthesizer
#[derive(Debug, Clone)]
pub struct PollinationsSynthesizer {
    endpoint: Url,
}

impl PollinationsSynthesizer {
    /// Build from configuration
    ///
    /// # Errors
    /// See [`PollinationsSynthesizer::with_endpoint`].
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        Self::with_endpoint(&config.endpoint)
    }

    /// Build for an explicit endpoint
    ///
    /// # Errors
    /// `GenerationError::InvalidEndpoint` when the endpoint does not parse or
    /// cannot carry path segments.
    pub fn with_endpoint(endpoint: &str) -> Result<Self, GenerationError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| GenerationError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(GenerationError::InvalidEndpoint(endpoint.to_string()));
        }
        Ok(Self { endpoint })
    }

    /// Image URL for a request
    ///
    /// # Errors
    /// `GenerationError::InvalidDimensions` when either side is zero.
    pub fn image_url(&self, request: &SynthesisRequest) -> Result<Url, GenerationError> {
        if request.width == 0 || request.height == 0 {
            return Err(GenerationError::InvalidDimensions {
                width: request.width,
                height: request.height,
            });
        }

        let mut url = self.endpoint.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| GenerationError::InvalidEndpoint(self.endpoint.to_string()))?
            .pop_if_empty()
            .push(&request.prompt);
        url.query_pairs_mut()
            .append_pair("width", &request.width.to_string())
            .append_pair("height", &request.height.to_string())
            .append_pair("seed", &request.seed.to_string());
        Ok(url)
    }
}

#[async_trait]
impl ImageSynthesizer for PollinationsSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, GenerationError> {
        let url = self.image_url(request)?;
        tracing::debug!(url = %url, "synthesis url built");
        Ok(url.into())
    }
}

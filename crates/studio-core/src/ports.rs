//! Collaborator traits
//!
//! The manager talks to the outside world only through these seams. Adapters
//! live in `studio-store` and `studio-generation`; tests substitute fakes.

use crate::error::{GenerationError, StoreError};
use crate::types::{AssetFieldUpdate, AssetId, ImageAsset, NewAsset, SelectedFile, UserId};
use async_trait::async_trait;

/// Remote asset record collection
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// All assets owned by `owner`, newest first
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ImageAsset>, StoreError>;

    /// Insert a record, returning it with store-assigned fields
    async fn insert(&self, asset: NewAsset) -> Result<ImageAsset, StoreError>;

    /// Update one field of one record
    async fn update_field(&self, id: &AssetId, update: AssetFieldUpdate) -> Result<(), StoreError>;

    /// Delete one record
    async fn delete_by_id(&self, id: &AssetId) -> Result<(), StoreError>;
}

/// Parameters of a synthesis request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    /// Prompt text (sent as entered)
    pub prompt: String,
    /// Target width in pixels
    pub width: u32,
    /// Target height in pixels
    pub height: u32,
    /// Seed for the synthesis service
    pub seed: u32,
}

/// Turns a prompt into a resolvable image reference
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    /// Produce an image URL for the request
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, GenerationError>;
}

/// Turns uploaded bytes into a resolvable image reference
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Host the file and return its URL
    async fn host_upload(&self, file: &SelectedFile) -> Result<String, GenerationError>;

    /// Whether references survive beyond the current process
    fn is_durable(&self) -> bool {
        true
    }
}

//! Core types for the image studio
//!
//! Defines the record model shared by the manager and every adapter:
//! - Owner and asset identifiers
//! - The signed-in user
//! - Image assets and their provenance
//! - Insert and update payloads for the remote store
//! - Files selected for upload

use crate::error::SelectionError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Identifier of an authenticated user (the tenancy key)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Create user ID
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque store-assigned asset identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(pub String);

impl AssetId {
    /// Create asset ID
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user as exposed by the session gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier
    pub id: UserId,
    /// Account email
    pub email: String,
    /// Account creation time (shown as join date)
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create user
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: UserId::new(id),
            email: email.into(),
            created_at,
        }
    }
}

/// How an asset came into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Produced from a text prompt
    Generate,
    /// Uploaded from a local file
    Upload,
}

impl OperationType {
    /// Wire name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Generate => "generate",
            OperationType::Upload => "upload",
        }
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image record, as stored remotely and held in memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAsset {
    /// Store-assigned identifier
    pub id: AssetId,
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    /// Resolvable image reference
    pub image_url: String,
    /// Display label
    #[serde(default)]
    pub title: Option<String>,
    /// Prompt used for generation (absent for uploads)
    #[serde(default)]
    pub prompt: Option<String>,
    /// Provenance tag
    pub operation_type: OperationType,
    /// Favorite flag (the only mutable field)
    #[serde(default)]
    pub is_favorite: bool,
    /// Store-assigned creation time, the gallery sort key
    pub created_at: DateTime<Utc>,
}

/// Fields sent to the store when creating an asset
///
/// `id`, `is_favorite` and `created_at` are left to the store defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAsset {
    /// Owning user
    #[serde(rename = "user_id")]
    pub owner_id: UserId,
    /// Resolvable image reference
    pub image_url: String,
    /// Display label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Generation prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Provenance tag
    pub operation_type: OperationType,
}

impl NewAsset {
    /// Asset produced from a prompt
    #[must_use]
    pub fn generated(owner_id: UserId, image_url: String, prompt: &str) -> Self {
        Self {
            owner_id,
            image_url,
            title: Some(generated_title(prompt)),
            prompt: Some(prompt.to_string()),
            operation_type: OperationType::Generate,
        }
    }

    /// Asset produced from an uploaded file
    #[must_use]
    pub fn uploaded(owner_id: UserId, image_url: String, file_name: &str) -> Self {
        Self {
            owner_id,
            image_url,
            title: Some(file_name.to_string()),
            prompt: None,
            operation_type: OperationType::Upload,
        }
    }
}

/// Label placed in front of generated titles
pub const GENERATED_TITLE_PREFIX: &str = "Generated: ";

/// Number of prompt characters kept in a generated title
pub const GENERATED_TITLE_PROMPT_CHARS: usize = 50;

/// Derive the display title of a generated asset
#[must_use]
pub fn generated_title(prompt: &str) -> String {
    let head: String = prompt.chars().take(GENERATED_TITLE_PROMPT_CHARS).collect();
    format!("{GENERATED_TITLE_PREFIX}{head}...")
}

/// Single-field update accepted by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetFieldUpdate {
    /// Set `is_favorite`
    Favorite(bool),
}

impl AssetFieldUpdate {
    /// Remote column name
    #[inline]
    #[must_use]
    pub fn column(&self) -> &'static str {
        match self {
            AssetFieldUpdate::Favorite(_) => "is_favorite",
        }
    }

    /// JSON body for a partial update
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            AssetFieldUpdate::Favorite(value) => serde_json::json!({ "is_favorite": value }),
        }
    }

    /// Apply to an in-memory record
    pub fn apply(&self, asset: &mut ImageAsset) {
        match self {
            AssetFieldUpdate::Favorite(value) => asset.is_favorite = *value,
        }
    }
}

/// Extensions accepted by the upload drop target
pub const ACCEPTED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "webp"];

/// File chosen for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// File name shown to the user and used as title
    pub name: String,
    /// Media type derived from the extension
    pub media_type: &'static str,
    /// File content
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    /// Validate and wrap file content
    ///
    /// # Errors
    /// - `SelectionError::UnsupportedType` for non-image extensions
    /// - `SelectionError::Empty` for zero-length content
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Result<Self, SelectionError> {
        let name = name.into();
        let media_type = media_type_for(&name)?;
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SelectionError::Empty(name));
        }
        Ok(Self {
            name,
            media_type,
            bytes,
        })
    }

    /// Read a file from disk
    ///
    /// # Errors
    /// Same as [`SelectedFile::new`], plus `SelectionError::Io` when the file
    /// cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Reject by extension before touching the disk
        media_type_for(&name)?;
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SelectionError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::new(name, bytes)
    }

    /// Content length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file has no content
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn media_type_for(name: &str) -> Result<&'static str, SelectionError> {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpeg" | "jpg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        _ => Err(SelectionError::UnsupportedType(name.to_string())),
    }
}

//! View models derived from the manager snapshot
//!
//! Pure data for whatever renders the studio. Nothing here talks to a
//! collaborator.

use crate::lifecycle::StudioSnapshot;
use crate::router::UploadMode;
use crate::types::{AssetId, ImageAsset, OperationType, User};
use chrono::NaiveDate;

/// Alt text used when an asset has no title
pub const UNTITLED_ALT: &str = "Generated image";

/// Rendered view of the active section
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    /// Prompt-to-image form
    Generate(PromptFormView),
    /// Upload-and-describe form (edit / fill / expand)
    Upload(UploadView),
    /// Full gallery
    History(GalleryView),
    /// Favorites gallery
    Favorites(GalleryView),
    /// Account panel
    Account(AccountView),
}

/// Prompt form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptFormView {
    /// Heading
    pub heading: &'static str,
    /// Current prompt text
    pub prompt: String,
    /// Whether the generate button is enabled
    pub submit_enabled: bool,
    /// Whether a spinner is shown
    pub loading: bool,
}

impl PromptFormView {
    pub(crate) fn from_snapshot(snapshot: &StudioSnapshot) -> Self {
        Self {
            heading: "Generate images with text prompts",
            prompt: snapshot.prompt_text.clone(),
            submit_enabled: !snapshot.prompt_text.trim().is_empty() && !snapshot.loading,
            loading: snapshot.loading,
        }
    }
}

/// Upload form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadView {
    /// Which creation section is showing it
    pub mode: UploadMode,
    /// Heading
    pub heading: &'static str,
    /// Drop target caption (file name once selected)
    pub dropzone_caption: String,
    /// Whether the description field and button are shown
    pub file_selected: bool,
    /// Current description text
    pub prompt: String,
    /// Whether the upload button is enabled
    pub submit_enabled: bool,
    /// Whether a spinner is shown
    pub loading: bool,
}

impl UploadView {
    pub(crate) fn from_snapshot(mode: UploadMode, snapshot: &StudioSnapshot) -> Self {
        let file_selected = snapshot.selected_file_name.is_some();
        Self {
            mode,
            heading: mode.heading(),
            dropzone_caption: snapshot
                .selected_file_name
                .clone()
                .unwrap_or_else(|| "Drag and drop an image".to_string()),
            file_selected,
            prompt: snapshot.prompt_text.clone(),
            submit_enabled: file_selected && !snapshot.loading,
            loading: snapshot.loading,
        }
    }
}

/// One gallery card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetCard {
    /// Asset ID (target of favorite/delete)
    pub id: AssetId,
    /// Image reference
    pub image_url: String,
    /// Display title (empty when the asset has none)
    pub title: String,
    /// Alt text for the image
    pub alt: String,
    /// Prompt line, generated assets only
    pub prompt: Option<String>,
    /// Creation date
    pub created_on: NaiveDate,
    /// Favorite flag
    pub is_favorite: bool,
    /// Provenance
    pub operation_type: OperationType,
}

impl From<&ImageAsset> for AssetCard {
    fn from(asset: &ImageAsset) -> Self {
        Self {
            id: asset.id.clone(),
            image_url: asset.image_url.clone(),
            title: asset.title.clone().unwrap_or_default(),
            alt: asset
                .title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED_ALT.to_string()),
            prompt: asset.prompt.clone(),
            created_on: asset.created_at.date_naive(),
            is_favorite: asset.is_favorite,
            operation_type: asset.operation_type,
        }
    }
}

/// Gallery grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    /// Heading
    pub heading: &'static str,
    /// Cards in snapshot order (newest first)
    pub cards: Vec<AssetCard>,
    /// Whether favorite/delete controls are shown
    pub show_actions: bool,
}

impl GalleryView {
    /// Every asset, with controls
    #[must_use]
    pub fn history(images: &[ImageAsset]) -> Self {
        Self {
            heading: "Your Images",
            cards: images.iter().map(AssetCard::from).collect(),
            show_actions: true,
        }
    }

    /// Favorite assets only, without controls
    #[must_use]
    pub fn favorites(images: &[ImageAsset]) -> Self {
        Self {
            heading: "Favorite Images",
            cards: images
                .iter()
                .filter(|a| a.is_favorite)
                .map(AssetCard::from)
                .collect(),
            show_actions: false,
        }
    }

    /// Asset IDs in display order
    #[must_use]
    pub fn ids(&self) -> Vec<&AssetId> {
        self.cards.iter().map(|c| &c.id).collect()
    }
}

/// Account panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    /// Heading
    pub heading: &'static str,
    /// Account email
    pub email: Option<String>,
    /// Join date
    pub member_since: Option<NaiveDate>,
}

impl AccountView {
    pub(crate) fn from_user(user: Option<&User>) -> Self {
        Self {
            heading: "Account Settings",
            email: user.map(|u| u.email.clone()),
            member_since: user.map(|u| u.created_at.date_naive()),
        }
    }
}

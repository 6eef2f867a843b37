//! View router
//!
//! Owns the single active section and maps each section to the affordance
//! the presentation layer shows. Switching sections has no side effects.

use crate::lifecycle::StudioSnapshot;
use crate::types::User;
use crate::view::{AccountView, GalleryView, PromptFormView, UploadView, View};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One of the seven mutually exclusive views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// Prompt-to-image form
    Generate,
    /// Upload-and-describe (default)
    #[default]
    Edit,
    /// Upload-and-describe, fill flavour
    Fill,
    /// Upload-and-describe, expand flavour
    Expand,
    /// Full gallery
    History,
    /// Favorites-only gallery
    Favorites,
    /// Account details
    Account,
}

impl Section {
    /// All sections in sidebar order
    pub const ALL: [Section; 7] = [
        Section::Generate,
        Section::Edit,
        Section::Fill,
        Section::Expand,
        Section::History,
        Section::Favorites,
        Section::Account,
    ];

    /// Wire / config name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Generate => "generate",
            Section::Edit => "edit",
            Section::Fill => "fill",
            Section::Expand => "expand",
            Section::History => "history",
            Section::Favorites => "favorites",
            Section::Account => "account",
        }
    }

    /// Sidebar label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Section::Generate => "Generate",
            Section::Edit => "Edit",
            Section::Fill => "Fill",
            Section::Expand => "Expand",
            Section::History => "History",
            Section::Favorites => "Favorites",
            Section::Account => "My account",
        }
    }

    /// Sidebar group the entry lives in
    #[must_use]
    pub fn group(&self) -> SectionGroup {
        match self {
            Section::Generate | Section::Edit | Section::Fill | Section::Expand => {
                SectionGroup::Image
            }
            Section::History | Section::Favorites => SectionGroup::Library,
            Section::Account => SectionGroup::Account,
        }
    }

    /// Affordance bound to this section
    #[must_use]
    pub fn affordance(&self) -> Affordance {
        match self {
            Section::Generate => Affordance::PromptForm,
            Section::Edit => Affordance::UploadDropzone(UploadMode::Edit),
            Section::Fill => Affordance::UploadDropzone(UploadMode::Fill),
            Section::Expand => Affordance::UploadDropzone(UploadMode::Expand),
            Section::History => Affordance::Gallery,
            Section::Favorites => Affordance::FavoritesGallery,
            Section::Account => Affordance::AccountPanel,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown section name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section: '{0}'")]
pub struct UnknownSection(pub String);

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// Sidebar grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionGroup {
    /// Collapsible "Image" group with the creation sections
    Image,
    /// Gallery sections
    Library,
    /// Bottom account entry
    Account,
}

/// Flavour of the upload affordance
///
/// All three share one create-by-upload path today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadMode {
    /// Edit with text instructions
    Edit,
    /// Fill a region
    Fill,
    /// Expand the canvas
    Expand,
}

impl UploadMode {
    /// Heading of the upload affordance
    #[must_use]
    pub fn heading(&self) -> &'static str {
        match self {
            UploadMode::Edit | UploadMode::Fill | UploadMode::Expand => {
                "Edit images with text instructions"
            }
        }
    }
}

/// What the presentation layer should offer for a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    /// Prompt text field and generate button
    PromptForm,
    /// File drop target, description field and upload button
    UploadDropzone(UploadMode),
    /// Full gallery with favorite/delete controls
    Gallery,
    /// Favorites-only gallery
    FavoritesGallery,
    /// Read-only identity panel
    AccountPanel,
}

/// Sidebar entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// Target section
    pub section: Section,
    /// Display label
    pub label: &'static str,
    /// Whether this is the active section
    pub active: bool,
}

/// Holds the active section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRouter {
    active: Section,
    image_group_expanded: bool,
}

impl ViewRouter {
    /// Router starting at the default section
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Section::default())
    }

    /// Router starting at `section`
    #[inline]
    #[must_use]
    pub fn starting_at(section: Section) -> Self {
        Self {
            active: section,
            image_group_expanded: true,
        }
    }

    /// Active section
    #[inline]
    #[must_use]
    pub fn active(&self) -> Section {
        self.active
    }

    /// Affordance of the active section
    #[inline]
    #[must_use]
    pub fn affordance(&self) -> Affordance {
        self.active.affordance()
    }

    /// Switch section (any section is reachable from any other)
    pub fn select(&mut self, section: Section) {
        if self.active != section {
            tracing::debug!(from = %self.active, to = %section, "section changed");
        }
        self.active = section;
    }

    /// Collapse or expand the "Image" sidebar group
    pub fn toggle_image_group(&mut self) {
        self.image_group_expanded = !self.image_group_expanded;
    }

    /// Whether the "Image" group is expanded
    #[inline]
    #[must_use]
    pub fn image_group_expanded(&self) -> bool {
        self.image_group_expanded
    }

    /// Visible sidebar entries
    ///
    /// A collapsed group hides its entries but the active section stays put.
    #[must_use]
    pub fn navigation(&self) -> Vec<NavEntry> {
        Section::ALL
            .into_iter()
            .filter(|s| self.image_group_expanded || s.group() != SectionGroup::Image)
            .map(|section| NavEntry {
                section,
                label: section.label(),
                active: section == self.active,
            })
            .collect()
    }

    /// Derive the view model for the active section
    #[must_use]
    pub fn render(&self, snapshot: &StudioSnapshot, user: Option<&User>) -> View {
        match self.active.affordance() {
            Affordance::PromptForm => View::Generate(PromptFormView::from_snapshot(snapshot)),
            Affordance::UploadDropzone(mode) => {
                View::Upload(UploadView::from_snapshot(mode, snapshot))
            }
            Affordance::Gallery => View::History(GalleryView::history(&snapshot.images)),
            Affordance::FavoritesGallery => {
                View::Favorites(GalleryView::favorites(&snapshot.images))
            }
            Affordance::AccountPanel => View::Account(AccountView::from_user(user)),
        }
    }
}

impl Default for ViewRouter {
    fn default() -> Self {
        Self::new()
    }
}

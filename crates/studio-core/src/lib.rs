//! Studio Core - asset lifecycle and view routing
//!
//! The headless core of the image studio:
//! - Owns the signed-in user's image collection
//! - Creates assets from prompts and uploads
//! - Toggles favorites and deletes assets
//! - Reloads from the remote store after every mutation
//! - Routes between the seven studio sections
//!
//! All I/O goes through injected collaborators (`ports`), so hosts wire real
//! adapters and tests wire fakes.
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_core::prelude::*;
//!
//! # async fn example(collaborators: Collaborators) {
//! let manager = AssetLifecycleManager::new(collaborators, LifecycleSettings::default());
//! manager.mount().await;
//!
//! let outcome = manager.generate("a red fox in the snow").await;
//! assert!(outcome.is_completed());
//!
//! let router = ViewRouter::starting_at(Section::History);
//! let view = manager.render(&router);
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod ports;
pub mod router;
pub mod session;
pub mod types;
pub mod view;

// Re-exports for convenience
pub use config::{
    GenerationConfig, HostingConfig, SeedPolicy, StoreBackend, StoreConfig, StudioConfig,
    SEED_RANGE,
};
pub use error::{
    ConfigError, GenerationError, SelectionError, SessionError, StoreError, StudioError,
};
pub use lifecycle::{
    AssetLifecycleManager, Collaborators, LifecycleSettings, OperationOutcome, SkipReason,
    StudioSnapshot,
};
pub use notify::{
    titles, ChannelNotifier, FanoutNotifier, Notification, NotificationKind, NotificationReceiver,
    Notifier, TracingNotifier,
};
pub use ports::{AssetStore, ImageHost, ImageSynthesizer, SynthesisRequest};
pub use router::{
    Affordance, NavEntry, Section, SectionGroup, UnknownSection, UploadMode, ViewRouter,
};
pub use session::{GateState, SessionGate, SessionHandle};
pub use types::{
    generated_title, AssetFieldUpdate, AssetId, ImageAsset, NewAsset, OperationType,
    SelectedFile, User, UserId, ACCEPTED_EXTENSIONS,
};
pub use view::{AccountView, AssetCard, GalleryView, PromptFormView, UploadView, View};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Studio Core
    pub use crate::{
        AssetId, AssetLifecycleManager, AssetStore, Collaborators, ImageAsset, ImageHost,
        ImageSynthesizer, LifecycleSettings, Notifier, OperationOutcome, Section, SessionGate,
        SessionHandle, StudioConfig, User, UserId, View, ViewRouter,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

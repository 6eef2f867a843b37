//! Asset lifecycle manager
//!
//! Owns the signed-in user's image collection and mediates every mutation:
//! - create by generation (prompt → synthesized URL → insert)
//! - create by upload (file → hosted URL → insert)
//! - favorite toggle (single field update)
//! - delete
//!
//! Every successful mutation is followed by a full reload from the store; the
//! in-memory collection is never patched locally. Reloads carry an epoch so a
//! slow reload resolving after a newer one cannot overwrite it.
//!
//! Operations never return errors to the caller. Failures become
//! notifications and are reported back as `OperationOutcome::Failed`.

use crate::config::{GenerationConfig, SeedPolicy};
use crate::error::StudioError;
use crate::notify::{titles, Notification, Notifier};
use crate::ports::{AssetStore, ImageHost, ImageSynthesizer, SynthesisRequest};
use crate::router::ViewRouter;
use crate::session::{GateState, SessionGate};
use crate::types::{AssetFieldUpdate, AssetId, ImageAsset, NewAsset, SelectedFile, User, UserId};
use crate::view::View;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Injected collaborators
#[derive(Clone)]
pub struct Collaborators {
    /// Session gate (identity source)
    pub session: Arc<dyn SessionGate>,
    /// Remote asset store
    pub store: Arc<dyn AssetStore>,
    /// Prompt synthesizer
    pub synthesizer: Arc<dyn ImageSynthesizer>,
    /// Upload host
    pub host: Arc<dyn ImageHost>,
    /// Notification sink
    pub notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// Generation parameters used by the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleSettings {
    /// Target width
    pub width: u32,
    /// Target height
    pub height: u32,
    /// Seed policy
    pub seed: SeedPolicy,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for LifecycleSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            seed: config.seed,
        }
    }
}

/// Why an operation did not start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No signed-in user
    NotSignedIn,
    /// Session still resolving
    AuthLoading,
    /// Prompt empty after trimming
    EmptyPrompt,
    /// No file selected
    NoFileSelected,
    /// Another create operation is in flight
    Busy,
}

/// What an operation did
#[derive(Debug)]
pub enum OperationOutcome {
    /// Ran to completion
    Completed,
    /// Did not start
    Skipped(SkipReason),
    /// Failed; the user has been notified
    Failed(StudioError),
    /// Reload resolved after a newer one and was discarded
    Superseded,
}

impl OperationOutcome {
    /// Whether the operation completed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Whether the operation failed
    #[inline]
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Skip reason, if skipped
    #[inline]
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }

    /// Failure, if failed
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&StudioError> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Point-in-time copy of the manager's observable state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StudioSnapshot {
    /// Asset collection, newest first
    pub images: Arc<Vec<ImageAsset>>,
    /// Whether a create operation is in flight
    pub loading: bool,
    /// Prompt field content
    pub prompt_text: String,
    /// Name of the selected upload file
    pub selected_file_name: Option<String>,
}

#[derive(Debug, Default)]
struct StudioState {
    images: Arc<Vec<ImageAsset>>,
    applied_epoch: u64,
    loading: bool,
    prompt_text: String,
    selected_file: Option<SelectedFile>,
}

/// Clears `loading` when dropped
struct LoadingGuard<'a> {
    state: &'a Mutex<StudioState>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.lock().loading = false;
    }
}

/// Owner of the signed-in user's asset collection
pub struct AssetLifecycleManager {
    session: Arc<dyn SessionGate>,
    store: Arc<dyn AssetStore>,
    synthesizer: Arc<dyn ImageSynthesizer>,
    host: Arc<dyn ImageHost>,
    notifier: Arc<dyn Notifier>,
    settings: LifecycleSettings,
    state: Mutex<StudioState>,
    /// Last reload epoch handed out
    reload_epoch: AtomicU64,
}

impl std::fmt::Debug for AssetLifecycleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLifecycleManager")
            .field("settings", &self.settings)
            .field("state", &*self.state.lock())
            .field("reload_epoch", &self.reload_epoch.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl AssetLifecycleManager {
    /// Create manager with injected collaborators
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: LifecycleSettings) -> Self {
        let Collaborators {
            session,
            store,
            synthesizer,
            host,
            notifier,
        } = collaborators;
        Self {
            session,
            store,
            synthesizer,
            host,
            notifier,
            settings,
            state: Mutex::new(StudioState::default()),
            reload_epoch: AtomicU64::new(0),
        }
    }

    /// Generation parameters
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    // ---------------------------------------------------------------
    // Observable state
    // ---------------------------------------------------------------

    /// Current asset collection, newest first
    #[must_use]
    pub fn images(&self) -> Arc<Vec<ImageAsset>> {
        Arc::clone(&self.state.lock().images)
    }

    /// Favorite assets in collection order
    #[must_use]
    pub fn favorites(&self) -> Vec<ImageAsset> {
        self.images()
            .iter()
            .filter(|a| a.is_favorite)
            .cloned()
            .collect()
    }

    /// Whether a create operation is in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Prompt field content
    #[must_use]
    pub fn prompt_text(&self) -> String {
        self.state.lock().prompt_text.clone()
    }

    /// Replace prompt field content
    pub fn set_prompt_text(&self, text: impl Into<String>) {
        self.state.lock().prompt_text = text.into();
    }

    /// Selected upload file
    #[must_use]
    pub fn selected_file(&self) -> Option<SelectedFile> {
        self.state.lock().selected_file.clone()
    }

    /// Select the file to upload (replaces any previous selection)
    pub fn select_file(&self, file: SelectedFile) {
        tracing::debug!(file = %file.name, bytes = file.len(), "file selected");
        self.state.lock().selected_file = Some(file);
    }

    /// Drop the current selection
    pub fn clear_selected_file(&self) {
        self.state.lock().selected_file = None;
    }

    /// Signed-in user according to the session gate
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.session.current_user()
    }

    /// Copy of the observable state
    #[must_use]
    pub fn snapshot(&self) -> StudioSnapshot {
        let state = self.state.lock();
        StudioSnapshot {
            images: Arc::clone(&state.images),
            loading: state.loading,
            prompt_text: state.prompt_text.clone(),
            selected_file_name: state.selected_file.as_ref().map(|f| f.name.clone()),
        }
    }

    /// Render the router's active section against the current state
    #[must_use]
    pub fn render(&self, router: &ViewRouter) -> View {
        let user = self.current_user();
        router.render(&self.snapshot(), user.as_ref())
    }

    // ---------------------------------------------------------------
    // Session
    // ---------------------------------------------------------------

    /// Initial load once the session has resolved
    pub async fn mount(&self) -> OperationOutcome {
        if self.session.auth_loading() {
            return OperationOutcome::Skipped(SkipReason::AuthLoading);
        }
        self.load().await
    }

    /// Reload whenever the signed-in user changes; clear on sign-out
    ///
    /// Runs until the session sender is dropped.
    pub async fn follow_session(&self, mut rx: watch::Receiver<GateState>) {
        let mut current: Option<UserId> = None;
        loop {
            let next = rx.borrow_and_update().user().map(|u| u.id.clone());
            if next != current {
                match &next {
                    Some(owner) => {
                        tracing::debug!(owner = %owner, "session user changed, reloading");
                        self.load().await;
                    }
                    None => self.reset(),
                }
                current = next;
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    /// Sign out through the session collaborator, then drop local state
    pub async fn sign_out(&self) -> OperationOutcome {
        match self.session.sign_out().await {
            Ok(()) => {
                self.reset();
                OperationOutcome::Completed
            }
            Err(e) => {
                let err = StudioError::from(e);
                tracing::warn!(error = %err, "sign out failed");
                self.notifier.notify(Notification::failure(titles::ERROR, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    /// Forget the collection and transient input
    ///
    /// Any reload still in flight is discarded when it resolves.
    pub fn reset(&self) {
        let epoch = self.next_epoch();
        let mut state = self.state.lock();
        state.images = Arc::new(Vec::new());
        state.applied_epoch = epoch;
        state.prompt_text.clear();
        state.selected_file = None;
        tracing::debug!(epoch, "studio state reset");
    }

    // ---------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------

    /// Replace the collection with the owner's assets from the store
    pub async fn load(&self) -> OperationOutcome {
        let Some(user) = self.session.current_user() else {
            return OperationOutcome::Skipped(SkipReason::NotSignedIn);
        };

        let epoch = self.next_epoch();
        tracing::debug!(owner = %user.id, epoch, "loading assets");

        let result = self.store.list_by_owner(&user.id).await;

        let mut state = self.state.lock();
        if epoch <= state.applied_epoch {
            tracing::debug!(epoch, applied = state.applied_epoch, "reload superseded");
            return OperationOutcome::Superseded;
        }

        match result {
            Ok(images) => {
                tracing::debug!(owner = %user.id, epoch, count = images.len(), "assets loaded");
                state.applied_epoch = epoch;
                state.images = Arc::new(images);
                OperationOutcome::Completed
            }
            Err(e) => {
                drop(state);
                let err = StudioError::from(e);
                tracing::warn!(owner = %user.id, error = %err, "failed to load assets");
                self.notifier
                    .notify(Notification::failure(titles::LOAD_FAILED, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    /// Generate from the prompt field content
    pub async fn submit_prompt(&self) -> OperationOutcome {
        let prompt = self.prompt_text();
        self.generate(&prompt).await
    }

    /// Create an asset from a text prompt
    pub async fn generate(&self, prompt: &str) -> OperationOutcome {
        if prompt.trim().is_empty() {
            return OperationOutcome::Skipped(SkipReason::EmptyPrompt);
        }
        let Some(user) = self.session.current_user() else {
            return OperationOutcome::Skipped(SkipReason::NotSignedIn);
        };
        let Some(guard) = self.begin_loading() else {
            return OperationOutcome::Skipped(SkipReason::Busy);
        };

        let request = SynthesisRequest {
            prompt: prompt.to_string(),
            width: self.settings.width,
            height: self.settings.height,
            seed: self.settings.seed.pick(),
        };
        tracing::info!(owner = %user.id, seed = request.seed, "generating image");

        let result = async {
            let image_url = self.synthesizer.synthesize(&request).await?;
            let asset = self
                .store
                .insert(NewAsset::generated(user.id.clone(), image_url, prompt))
                .await?;
            Ok::<_, StudioError>(asset)
        }
        .await;

        match result {
            Ok(asset) => {
                tracing::info!(owner = %user.id, asset = %asset.id, "image generated");
                self.state.lock().prompt_text.clear();
                self.notifier.notify(Notification::success(
                    titles::GENERATED,
                    "Your AI-generated image is ready.",
                ));
                drop(guard);
                self.load().await;
                OperationOutcome::Completed
            }
            Err(err) => {
                tracing::warn!(owner = %user.id, error = %err, "generation failed");
                self.notifier
                    .notify(Notification::failure(titles::GENERATION_FAILED, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    /// Create an asset from the selected file
    pub async fn upload_and_create(&self) -> OperationOutcome {
        let Some(file) = self.selected_file() else {
            return OperationOutcome::Skipped(SkipReason::NoFileSelected);
        };
        let Some(user) = self.session.current_user() else {
            return OperationOutcome::Skipped(SkipReason::NotSignedIn);
        };
        let Some(guard) = self.begin_loading() else {
            return OperationOutcome::Skipped(SkipReason::Busy);
        };

        tracing::info!(owner = %user.id, file = %file.name, bytes = file.len(), "uploading image");

        let result = async {
            let image_url = self.host.host_upload(&file).await?;
            if !self.host.is_durable() {
                tracing::warn!(file = %file.name, "stored a non-durable image reference");
            }
            let asset = self
                .store
                .insert(NewAsset::uploaded(user.id.clone(), image_url, &file.name))
                .await?;
            Ok::<_, StudioError>(asset)
        }
        .await;

        match result {
            Ok(asset) => {
                tracing::info!(owner = %user.id, asset = %asset.id, "image uploaded");
                self.state.lock().selected_file = None;
                self.notifier.notify(Notification::success(
                    titles::UPLOADED,
                    "Your image has been saved to the gallery.",
                ));
                drop(guard);
                self.load().await;
                OperationOutcome::Completed
            }
            Err(err) => {
                tracing::warn!(owner = %user.id, error = %err, "upload failed");
                self.notifier
                    .notify(Notification::failure(titles::UPLOAD_FAILED, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    /// Flip the favorite flag of one asset
    ///
    /// No optimistic update: the collection changes only through the reload.
    pub async fn toggle_favorite(&self, id: &AssetId, current: bool) -> OperationOutcome {
        if self.session.current_user().is_none() {
            return OperationOutcome::Skipped(SkipReason::NotSignedIn);
        }

        let update = AssetFieldUpdate::Favorite(!current);
        tracing::debug!(asset = %id, favorite = !current, "toggling favorite");

        match self.store.update_field(id, update).await {
            Ok(()) => {
                self.load().await;
                OperationOutcome::Completed
            }
            Err(e) => {
                let err = StudioError::from(e);
                tracing::warn!(asset = %id, error = %err, "favorite toggle failed");
                self.notifier.notify(Notification::failure(titles::ERROR, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    /// Remove one asset
    pub async fn delete_asset(&self, id: &AssetId) -> OperationOutcome {
        if self.session.current_user().is_none() {
            return OperationOutcome::Skipped(SkipReason::NotSignedIn);
        }

        tracing::debug!(asset = %id, "deleting asset");

        match self.store.delete_by_id(id).await {
            Ok(()) => {
                tracing::info!(asset = %id, "asset deleted");
                self.notifier.notify(Notification::success(
                    titles::DELETED,
                    "Image removed from your gallery.",
                ));
                self.load().await;
                OperationOutcome::Completed
            }
            Err(e) => {
                let err = StudioError::from(e);
                tracing::warn!(asset = %id, error = %err, "delete failed");
                self.notifier.notify(Notification::failure(titles::ERROR, &err));
                OperationOutcome::Failed(err)
            }
        }
    }

    // ---------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------

    fn next_epoch(&self) -> u64 {
        self.reload_epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn begin_loading(&self) -> Option<LoadingGuard<'_>> {
        let mut state = self.state.lock();
        if state.loading {
            return None;
        }
        state.loading = true;
        Some(LoadingGuard { state: &self.state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, StoreError};
    use crate::notify::{ChannelNotifier, NotificationReceiver};
    use crate::session::SessionHandle;
    use crate::types::OperationType;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use mockall::{mock, predicate::eq};

    mock! {
        Store {}
        #[async_trait]
        impl AssetStore for Store {
            async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ImageAsset>, StoreError>;
            async fn insert(&self, asset: NewAsset) -> Result<ImageAsset, StoreError>;
            async fn update_field(&self, id: &AssetId, update: AssetFieldUpdate) -> Result<(), StoreError>;
            async fn delete_by_id(&self, id: &AssetId) -> Result<(), StoreError>;
        }
    }

    mock! {
        Synth {}
        #[async_trait]
        impl ImageSynthesizer for Synth {
            async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, GenerationError>;
        }
    }

    mock! {
        Host {}
        #[async_trait]
        impl ImageHost for Host {
            async fn host_upload(&self, file: &SelectedFile) -> Result<String, GenerationError>;
            fn is_durable(&self) -> bool;
        }
    }

    fn user() -> User {
        User::new(
            "U1",
            "u1@example.com",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    fn asset(id: &str, favorite: bool) -> ImageAsset {
        ImageAsset {
            id: AssetId::new(id),
            owner_id: UserId::new("U1"),
            image_url: format!("https://img/{id}"),
            title: None,
            prompt: None,
            operation_type: OperationType::Upload,
            is_favorite: favorite,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        }
    }

    fn manager(
        session: SessionHandle,
        store: MockStore,
        synth: MockSynth,
        host: MockHost,
    ) -> (AssetLifecycleManager, NotificationReceiver) {
        let (notifier, rx) = ChannelNotifier::new();
        let manager = AssetLifecycleManager::new(
            Collaborators {
                session: Arc::new(session),
                store: Arc::new(store),
                synthesizer: Arc::new(synth),
                host: Arc::new(host),
                notifier: Arc::new(notifier),
            },
            LifecycleSettings {
                seed: SeedPolicy::Fixed(42),
                ..LifecycleSettings::default()
            },
        );
        (manager, rx)
    }

    #[tokio::test]
    async fn blank_prompt_never_reaches_collaborators() {
        let mut store = MockStore::new();
        store.expect_insert().never();
        store.expect_list_by_owner().never();
        let mut synth = MockSynth::new();
        synth.expect_synthesize().never();

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, synth, MockHost::new());

        for prompt in ["", "   ", "\n\t"] {
            let outcome = manager.generate(prompt).await;
            assert_eq!(outcome.skip_reason(), Some(SkipReason::EmptyPrompt));
        }
        assert!(rx.drain().is_empty());
        assert!(!manager.is_loading());
    }

    #[tokio::test]
    async fn generate_inserts_then_reloads() {
        let mut synth = MockSynth::new();
        synth
            .expect_synthesize()
            .withf(|r| r.prompt == "a red fox" && r.width == 1024 && r.height == 1024 && r.seed == 42)
            .times(1)
            .returning(|_| Ok("https://img/fox".to_string()));

        let mut store = MockStore::new();
        store
            .expect_insert()
            .withf(|a| {
                a.owner_id == UserId::new("U1")
                    && a.operation_type == OperationType::Generate
                    && a.prompt.as_deref() == Some("a red fox")
                    && a.title.as_deref() == Some("Generated: a red fox...")
                    && a.image_url == "https://img/fox"
            })
            .times(1)
            .returning(|_| Ok(asset("A1", false)));
        store
            .expect_list_by_owner()
            .with(eq(UserId::new("U1")))
            .times(1)
            .returning(|_| Ok(vec![asset("A1", false)]));

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, synth, MockHost::new());
        manager.set_prompt_text("a red fox");

        let outcome = manager.submit_prompt().await;
        assert!(outcome.is_completed());
        assert_eq!(manager.images().len(), 1);
        assert!(manager.prompt_text().is_empty());
        assert!(!manager.is_loading());

        let notes = rx.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, titles::GENERATED);
    }

    #[tokio::test]
    async fn generate_failure_notifies_and_keeps_state() {
        let mut synth = MockSynth::new();
        synth
            .expect_synthesize()
            .returning(|_| Ok("https://img/fox".to_string()));
        let mut store = MockStore::new();
        store.expect_insert().returning(|_| {
            Err(StoreError::Rejected {
                status: 403,
                message: "new row violates row-level security policy".to_string(),
            })
        });
        store.expect_list_by_owner().never();

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, synth, MockHost::new());
        manager.set_prompt_text("a red fox");

        let outcome = manager.generate("a red fox").await;
        assert!(outcome.is_failed());
        assert_eq!(manager.prompt_text(), "a red fox");
        assert!(manager.images().is_empty());
        assert!(!manager.is_loading());

        let notes = rx.drain();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, titles::GENERATION_FAILED);
        assert_eq!(
            notes[0].description,
            "new row violates row-level security policy"
        );
    }

    #[tokio::test]
    async fn upload_without_file_is_skipped() {
        let mut store = MockStore::new();
        store.expect_insert().never();
        let mut host = MockHost::new();
        host.expect_host_upload().never();

        let (manager, _rx) =
            manager(SessionHandle::signed_in(user()), store, MockSynth::new(), host);
        let outcome = manager.upload_and_create().await;
        assert_eq!(outcome.skip_reason(), Some(SkipReason::NoFileSelected));
    }

    #[tokio::test]
    async fn upload_uses_file_name_as_title() {
        let mut host = MockHost::new();
        host.expect_host_upload()
            .times(1)
            .returning(|f| Ok(format!("blob:studio/{}", f.name)));
        host.expect_is_durable().return_const(false);

        let mut store = MockStore::new();
        store
            .expect_insert()
            .withf(|a| {
                a.operation_type == OperationType::Upload
                    && a.title.as_deref() == Some("cat.png")
                    && a.prompt.is_none()
                    && a.image_url == "blob:studio/cat.png"
            })
            .times(1)
            .returning(|_| Ok(asset("A9", false)));
        store
            .expect_list_by_owner()
            .times(1)
            .returning(|_| Ok(vec![asset("A9", false)]));

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, MockSynth::new(), host);
        manager.select_file(SelectedFile::new("cat.png", vec![1u8, 2, 3]).unwrap());

        assert!(manager.upload_and_create().await.is_completed());
        assert!(manager.selected_file().is_none());
        assert_eq!(rx.drain()[0].title, titles::UPLOADED);
    }

    #[tokio::test]
    async fn toggle_updates_only_favorite_field() {
        let mut store = MockStore::new();
        store
            .expect_update_field()
            .with(eq(AssetId::new("A1")), eq(AssetFieldUpdate::Favorite(true)))
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_list_by_owner()
            .times(1)
            .returning(|_| Ok(vec![asset("A1", true)]));

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, MockSynth::new(), MockHost::new());

        let outcome = manager.toggle_favorite(&AssetId::new("A1"), false).await;
        assert!(outcome.is_completed());
        assert_eq!(manager.favorites().len(), 1);
        assert!(rx.drain().is_empty());
    }

    #[tokio::test]
    async fn delete_failure_keeps_asset() {
        let mut store = MockStore::new();
        store
            .expect_list_by_owner()
            .times(1)
            .returning(|_| Ok(vec![asset("A1", false)]));
        store
            .expect_delete_by_id()
            .returning(|_| Err(StoreError::Network("connection reset".to_string())));

        let (manager, mut rx) =
            manager(SessionHandle::signed_in(user()), store, MockSynth::new(), MockHost::new());
        assert!(manager.load().await.is_completed());

        let outcome = manager.delete_asset(&AssetId::new("A1")).await;
        assert!(outcome.is_failed());
        assert_eq!(manager.images().len(), 1);

        let notes = rx.drain();
        assert_eq!(notes[0].title, titles::ERROR);
        assert_eq!(notes[0].description, "connection reset");
    }

    #[tokio::test]
    async fn signed_out_operations_are_silent_noops() {
        let mut store = MockStore::new();
        store.expect_list_by_owner().never();
        store.expect_insert().never();
        store.expect_update_field().never();
        store.expect_delete_by_id().never();

        let (manager, mut rx) = manager(
            SessionHandle::signed_out(),
            store,
            MockSynth::new(),
            MockHost::new(),
        );
        manager.select_file(SelectedFile::new("cat.png", vec![1u8]).unwrap());

        let id = AssetId::new("A1");
        for outcome in [
            manager.load().await,
            manager.generate("a red fox").await,
            manager.upload_and_create().await,
            manager.toggle_favorite(&id, false).await,
            manager.delete_asset(&id).await,
        ] {
            assert_eq!(outcome.skip_reason(), Some(SkipReason::NotSignedIn));
        }
        assert!(rx.drain().is_empty());
    }

    #[tokio::test]
    async fn mount_waits_for_auth() {
        let mut store = MockStore::new();
        store.expect_list_by_owner().never();
        let (manager, _rx) =
            manager(SessionHandle::new(), store, MockSynth::new(), MockHost::new());
        assert_eq!(
            manager.mount().await.skip_reason(),
            Some(SkipReason::AuthLoading)
        );
    }

    #[tokio::test]
    async fn sign_out_clears_local_state() {
        let mut store = MockStore::new();
        store
            .expect_list_by_owner()
            .returning(|_| Ok(vec![asset("A1", false)]));
        let session = SessionHandle::signed_in(user());
        let (manager, _rx) =
            manager(session.clone(), store, MockSynth::new(), MockHost::new());

        assert!(manager.mount().await.is_completed());
        manager.set_prompt_text("draft");
        assert!(manager.sign_out().await.is_completed());

        assert!(session.current_user().is_none());
        assert!(manager.images().is_empty());
        assert!(manager.prompt_text().is_empty());
    }
}

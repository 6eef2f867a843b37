//! Testing utilities for the image studio workspace
//!
//! Shared fakes, fixtures, and a wired-up studio for integration tests.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use studio_core::{
    AssetFieldUpdate, AssetId, AssetLifecycleManager, AssetStore, Collaborators, GenerationError,
    ImageAsset, ImageHost, ImageSynthesizer, LifecycleSettings, NewAsset, Notification, Notifier,
    OperationType, SeedPolicy, SelectedFile, SessionHandle, StoreError, SynthesisRequest, User,
    UserId,
};
use studio_store::MemoryAssetStore;
use tokio::sync::oneshot;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Fixed reference time for fixtures
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
}

pub fn user(id: &str) -> User {
    User::new(id, format!("{}@example.com", id.to_lowercase()), epoch())
}

/// Stored asset created `minutes` after the fixture epoch
pub fn asset(id: &str, owner: &str, minutes: i64, favorite: bool) -> ImageAsset {
    ImageAsset {
        id: AssetId::new(id),
        owner_id: UserId::new(owner),
        image_url: format!("https://img.test/{id}"),
        title: Some(format!("{id}.png")),
        prompt: None,
        operation_type: OperationType::Upload,
        is_favorite: favorite,
        created_at: epoch() + Duration::minutes(minutes),
    }
}

pub fn png(name: &str) -> SelectedFile {
    SelectedFile::new(name, vec![0x89u8, b'P', b'N', b'G']).unwrap()
}

// ---------------------------------------------------------------------------
// ScriptedStore
// ---------------------------------------------------------------------------

/// One call observed by `ScriptedStore`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    List(UserId),
    Insert(NewAsset),
    Update(AssetId, AssetFieldUpdate),
    Delete(AssetId),
}

#[derive(Default)]
struct Script {
    calls: Vec<StoreCall>,
    list_failures: VecDeque<StoreError>,
    insert_failures: VecDeque<StoreError>,
    update_failures: VecDeque<StoreError>,
    delete_failures: VecDeque<StoreError>,
    list_holds: VecDeque<oneshot::Receiver<()>>,
}

/// Memory store with failure injection, call recording and held reloads
pub struct ScriptedStore {
    inner: MemoryAssetStore,
    script: Mutex<Script>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::with_assets([])
    }

    pub fn with_assets(assets: impl IntoIterator<Item = ImageAsset>) -> Self {
        Self {
            inner: MemoryAssetStore::with_assets(assets),
            script: Mutex::new(Script::default()),
        }
    }

    /// Underlying store, bypassing the script
    pub fn inner(&self) -> &MemoryAssetStore {
        &self.inner
    }

    pub fn fail_next_list(&self, error: StoreError) {
        self.script.lock().list_failures.push_back(error);
    }

    pub fn fail_next_insert(&self, error: StoreError) {
        self.script.lock().insert_failures.push_back(error);
    }

    pub fn fail_next_update(&self, error: StoreError) {
        self.script.lock().update_failures.push_back(error);
    }

    pub fn fail_next_delete(&self, error: StoreError) {
        self.script.lock().delete_failures.push_back(error);
    }

    /// Hold the next `list_by_owner` response until the sender fires
    ///
    /// The listing is taken when the call arrives; only the response is
    /// delayed.
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.script.lock().list_holds.push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.script.lock().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, StoreCall::List(_)))
            .count()
    }

    pub fn inserts(&self) -> Vec<NewAsset> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                StoreCall::Insert(a) => Some(a),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.script.lock().calls.clear();
    }
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetStore for ScriptedStore {
    async fn list_by_owner(&self, owner: &UserId) -> Result<Vec<ImageAsset>, StoreError> {
        let (failure, hold) = {
            let mut script = self.script.lock();
            script.calls.push(StoreCall::List(owner.clone()));
            (script.list_failures.pop_front(), script.list_holds.pop_front())
        };
        let result = match failure {
            Some(e) => Err(e),
            None => self.inner.list_by_owner(owner).await,
        };
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        result
    }

    async fn insert(&self, asset: NewAsset) -> Result<ImageAsset, StoreError> {
        let failure = {
            let mut script = self.script.lock();
            script.calls.push(StoreCall::Insert(asset.clone()));
            script.insert_failures.pop_front()
        };
        match failure {
            Some(e) => Err(e),
            None => self.inner.insert(asset).await,
        }
    }

    async fn update_field(&self, id: &AssetId, update: AssetFieldUpdate) -> Result<(), StoreError> {
        let failure = {
            let mut script = self.script.lock();
            script.calls.push(StoreCall::Update(id.clone(), update));
            script.update_failures.pop_front()
        };
        match failure {
            Some(e) => Err(e),
            None => self.inner.update_field(id, update).await,
        }
    }

    async fn delete_by_id(&self, id: &AssetId) -> Result<(), StoreError> {
        let failure = {
            let mut script = self.script.lock();
            script.calls.push(StoreCall::Delete(id.clone()));
            script.delete_failures.pop_front()
        };
        match failure {
            Some(e) => Err(e),
            None => self.inner.delete_by_id(id).await,
        }
    }
}

// ---------------------------------------------------------------------------
// Synthesizer / host
// ---------------------------------------------------------------------------

/// Synthesizer returning `https://synth.test/{n}` and recording requests
#[derive(Default)]
pub struct RecordingSynthesizer {
    requests: Mutex<Vec<SynthesisRequest>>,
    failures: Mutex<VecDeque<GenerationError>>,
    holds: Mutex<VecDeque<oneshot::Receiver<()>>>,
}

impl RecordingSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: GenerationError) {
        self.failures.lock().push_back(error);
    }

    /// Hold the next synthesis until the sender fires
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().push_back(rx);
        tx
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl ImageSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<String, GenerationError> {
        let n = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };
        let hold = self.holds.lock().pop_front();
        if let Some(hold) = hold {
            let _ = hold.await;
        }
        match self.failures.lock().pop_front() {
            Some(e) => Err(e),
            None => Ok(format!("https://synth.test/{n}")),
        }
    }
}

/// Host returning `https://host.test/{file name}` and recording uploads
#[derive(Default)]
pub struct RecordingHost {
    uploads: Mutex<Vec<String>>,
    failures: Mutex<VecDeque<GenerationError>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, error: GenerationError) {
        self.failures.lock().push_back(error);
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl ImageHost for RecordingHost {
    async fn host_upload(&self, file: &SelectedFile) -> Result<String, GenerationError> {
        self.uploads.lock().push(file.name.clone());
        match self.failures.lock().pop_front() {
            Some(e) => Err(e),
            None => Ok(format!("https://host.test/{}", file.name)),
        }
    }
}

// ---------------------------------------------------------------------------
// Notifier
// ---------------------------------------------------------------------------

/// Notifier keeping everything it receives
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.seen.lock().iter().map(|n| n.title.clone()).collect()
    }

    pub fn failures(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .iter()
            .filter(|n| n.is_failure())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.seen.lock().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().push(notification);
    }
}

// ---------------------------------------------------------------------------
// TestStudio
// ---------------------------------------------------------------------------

/// Manager wired to recording fakes
pub struct TestStudio {
    pub session: SessionHandle,
    pub store: Arc<ScriptedStore>,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub host: Arc<RecordingHost>,
    pub notifier: Arc<RecordingNotifier>,
    pub manager: Arc<AssetLifecycleManager>,
}

impl TestStudio {
    /// Studio signed in as `U1` over an empty store
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestStudioBuilder {
        TestStudioBuilder::default()
    }
}

impl Default for TestStudio {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestStudioBuilder {
    session: SessionHandle,
    store: ScriptedStore,
    seed: u32,
}

impl Default for TestStudioBuilder {
    fn default() -> Self {
        Self {
            session: SessionHandle::signed_in(user("U1")),
            store: ScriptedStore::new(),
            seed: 42,
        }
    }
}

impl TestStudioBuilder {
    pub fn session(mut self, session: SessionHandle) -> Self {
        self.session = session;
        self
    }

    pub fn signed_out(self) -> Self {
        self.session(SessionHandle::signed_out())
    }

    pub fn assets(mut self, assets: impl IntoIterator<Item = ImageAsset>) -> Self {
        self.store = ScriptedStore::with_assets(assets);
        self
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    pub fn build(self) -> TestStudio {
        let store = Arc::new(self.store);
        let synthesizer = Arc::new(RecordingSynthesizer::new());
        let host = Arc::new(RecordingHost::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let manager = Arc::new(AssetLifecycleManager::new(
            Collaborators {
                session: Arc::new(self.session.clone()),
                store: store.clone(),
                synthesizer: synthesizer.clone(),
                host: host.clone(),
                notifier: notifier.clone(),
            },
            LifecycleSettings {
                seed: SeedPolicy::Fixed(self.seed),
                ..LifecycleSettings::default()
            },
        ));
        TestStudio {
            session: self.session,
            store,
            synthesizer,
            host,
            notifier,
            manager,
        }
    }
}

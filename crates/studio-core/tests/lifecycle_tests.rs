//! Lifecycle manager behaviour against the shared fakes

use pretty_assertions::assert_eq;
use studio_core::{
    titles, AssetFieldUpdate, AssetId, GenerationError, OperationType, Section, SkipReason,
    StoreError, UserId, View, ViewRouter,
};
use studio_test_utils::{asset, png, StoreCall, TestStudio};

fn ids(studio: &TestStudio) -> Vec<String> {
    studio
        .manager
        .images()
        .iter()
        .map(|a| a.id.as_str().to_string())
        .collect()
}

#[tokio::test]
async fn red_fox_scenario() {
    let studio = TestStudio::new();
    assert!(studio.manager.mount().await.is_completed());
    assert!(studio.manager.images().is_empty());

    let outcome = studio.manager.generate("a red fox").await;
    assert!(outcome.is_completed());

    let inserts = studio.store.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].owner_id, UserId::new("U1"));
    assert_eq!(inserts[0].operation_type, OperationType::Generate);
    assert_eq!(inserts[0].prompt.as_deref(), Some("a red fox"));
    assert!(inserts[0]
        .title
        .as_deref()
        .unwrap()
        .starts_with("Generated: a red fox"));

    let images = studio.manager.images();
    assert_eq!(images.len(), 1);
    assert!(!images[0].is_favorite);
    assert!(studio.manager.favorites().is_empty());

    let requests = studio.synthesizer.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!((requests[0].width, requests[0].height, requests[0].seed), (1024, 1024, 42));

    assert_eq!(studio.notifier.titles(), vec![titles::GENERATED.to_string()]);
}

#[tokio::test]
async fn generate_reload_follows_insert() {
    let studio = TestStudio::new();
    studio.manager.generate("a red fox").await;

    let calls = studio.store.calls();
    assert!(matches!(calls[0], StoreCall::Insert(_)));
    assert_eq!(calls[1], StoreCall::List(UserId::new("U1")));
    assert_eq!(calls.len(), 2);
}

#[tokio::test]
async fn blank_prompts_skip_everything() {
    let studio = TestStudio::new();
    for prompt in ["", "   "] {
        let outcome = studio.manager.generate(prompt).await;
        assert_eq!(outcome.skip_reason(), Some(SkipReason::EmptyPrompt));
    }
    assert!(studio.store.calls().is_empty());
    assert!(studio.synthesizer.requests().is_empty());
    assert!(studio.notifier.all().is_empty());
}

#[tokio::test]
async fn synthesis_failure_reports_and_leaves_images() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false)])
        .build();
    studio.manager.mount().await;
    studio.manager.set_prompt_text("a red fox");
    studio
        .synthesizer
        .fail_next(GenerationError::Network("dns lookup failed".to_string()));

    let outcome = studio.manager.submit_prompt().await;
    assert!(outcome.is_failed());
    assert_eq!(ids(&studio), vec!["A1"]);
    assert_eq!(studio.manager.prompt_text(), "a red fox");
    assert!(!studio.manager.is_loading());
    assert!(studio.store.inserts().is_empty());

    let failures = studio.notifier.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, titles::GENERATION_FAILED);
    assert!(failures[0].description.contains("dns lookup failed"));
    assert!(outcome.error().is_some_and(|e| e.is_network()));
}

#[tokio::test]
async fn seed_reaches_synthesizer() {
    let studio = TestStudio::builder().seed(7).build();
    assert!(studio.manager.generate("a red fox").await.is_completed());
    assert_eq!(studio.synthesizer.requests()[0].seed, 7);
}

#[tokio::test]
async fn upload_scenario() {
    let studio = TestStudio::new();
    studio.manager.select_file(png("cat.png"));

    let outcome = studio.manager.upload_and_create().await;
    assert!(outcome.is_completed());

    let inserts = studio.store.inserts();
    assert_eq!(inserts.len(), 1);
    assert_eq!(inserts[0].operation_type, OperationType::Upload);
    assert_eq!(inserts[0].title.as_deref(), Some("cat.png"));
    assert_eq!(inserts[0].image_url, "https://host.test/cat.png");
    assert!(inserts[0].prompt.is_none());

    assert!(studio.manager.selected_file().is_none());
    assert_eq!(studio.manager.images().len(), 1);
    assert_eq!(studio.notifier.titles(), vec![titles::UPLOADED.to_string()]);
}

#[tokio::test]
async fn upload_without_file_never_inserts() {
    let studio = TestStudio::new();
    let outcome = studio.manager.upload_and_create().await;
    assert_eq!(outcome.skip_reason(), Some(SkipReason::NoFileSelected));
    assert!(studio.store.inserts().is_empty());
    assert!(studio.host.uploads().is_empty());
}

#[tokio::test]
async fn upload_failure_keeps_selection() {
    let studio = TestStudio::new();
    studio.manager.select_file(png("cat.png"));
    studio.store.fail_next_insert(StoreError::Rejected {
        status: 413,
        message: "payload too large".to_string(),
    });

    let outcome = studio.manager.upload_and_create().await;
    assert!(outcome.is_failed());
    assert_eq!(
        studio.manager.selected_file().map(|f| f.name),
        Some("cat.png".to_string())
    );
    assert!(!studio.manager.is_loading());
    assert_eq!(studio.notifier.failures()[0].title, titles::UPLOAD_FAILED);
    assert_eq!(studio.notifier.failures()[0].description, "payload too large");
}

#[tokio::test]
async fn upload_host_failure_skips_insert() {
    let studio = TestStudio::new();
    studio.manager.select_file(png("cat.png"));
    studio
        .host
        .fail_next(GenerationError::UploadRejected("Invalid API v1 key.".to_string()));

    let outcome = studio.manager.upload_and_create().await;
    assert!(outcome.is_failed());
    assert!(!outcome.error().is_some_and(|e| e.is_network()));
    assert_eq!(studio.host.uploads(), vec!["cat.png".to_string()]);
    assert!(studio.store.inserts().is_empty());
    assert!(studio.store.calls().is_empty());

    let failures = studio.notifier.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, titles::UPLOAD_FAILED);
    assert!(failures[0]
        .description
        .starts_with("Failed to upload image: "));
    assert_eq!(
        studio.manager.selected_file().map(|f| f.name),
        Some("cat.png".to_string())
    );
    assert!(!studio.manager.is_loading());
}

#[tokio::test]
async fn toggle_scenario() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false), asset("A2", "U1", 2, false)])
        .build();
    studio.manager.mount().await;
    studio.store.clear_calls();

    let outcome = studio
        .manager
        .toggle_favorite(&AssetId::new("A1"), false)
        .await;
    assert!(outcome.is_completed());

    assert_eq!(
        studio.store.calls()[0],
        StoreCall::Update(AssetId::new("A1"), AssetFieldUpdate::Favorite(true))
    );
    let favorites = studio.manager.favorites();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id, AssetId::new("A1"));
    assert!(studio.notifier.all().is_empty());
}

#[tokio::test]
async fn toggle_failure_changes_nothing() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false)])
        .build();
    studio.manager.mount().await;
    studio
        .store
        .fail_next_update(StoreError::Network("timeout".to_string()));

    let outcome = studio
        .manager
        .toggle_favorite(&AssetId::new("A1"), false)
        .await;
    assert!(outcome.is_failed());
    assert!(studio.manager.favorites().is_empty());
    assert_eq!(studio.notifier.titles(), vec![titles::ERROR.to_string()]);
}

#[tokio::test]
async fn delete_removes_only_target() {
    let studio = TestStudio::builder()
        .assets([
            asset("A1", "U1", 1, false),
            asset("A2", "U1", 2, true),
            asset("A3", "U1", 3, false),
        ])
        .build();
    studio.manager.mount().await;
    assert_eq!(ids(&studio), vec!["A3", "A2", "A1"]);

    let outcome = studio.manager.delete_asset(&AssetId::new("A2")).await;
    assert!(outcome.is_completed());
    assert_eq!(ids(&studio), vec!["A3", "A1"]);
    assert_eq!(studio.notifier.titles(), vec![titles::DELETED.to_string()]);
}

#[tokio::test]
async fn delete_failure_keeps_asset() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false), asset("A2", "U1", 2, false)])
        .build();
    studio.manager.mount().await;
    studio.manager.delete_asset(&AssetId::new("A1")).await;
    assert_eq!(ids(&studio), vec!["A2"]);
    studio.notifier.clear();
    studio.store.clear_calls();

    studio
        .store
        .fail_next_delete(StoreError::Rejected {
            status: 403,
            message: "permission denied for table images".to_string(),
        });
    let outcome = studio.manager.delete_asset(&AssetId::new("A2")).await;

    assert!(outcome.is_failed());
    assert_eq!(ids(&studio), vec!["A2"]);
    assert_eq!(studio.store.calls(), vec![StoreCall::Delete(AssetId::new("A2"))]);
    let failures = studio.notifier.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, titles::ERROR);
    assert_eq!(failures[0].description, "permission denied for table images");
}

#[tokio::test]
async fn list_failure_scenario() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false)])
        .build();
    studio.manager.mount().await;

    studio
        .store
        .fail_next_list(StoreError::Network("connection refused".to_string()));
    let outcome = studio.manager.load().await;

    assert!(outcome.is_failed());
    assert_eq!(ids(&studio), vec!["A1"]);
    let failures = studio.notifier.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].title, titles::LOAD_FAILED);
    assert_eq!(failures[0].description, "connection refused");
}

#[tokio::test]
async fn successive_loads_are_stable() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, true), asset("A2", "U1", 2, false)])
        .build();
    studio.manager.load().await;
    let first = studio.manager.images();
    studio.manager.load().await;
    let second = studio.manager.images();
    assert_eq!(*first, *second);
}

#[tokio::test]
async fn load_only_sees_own_assets() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, false), asset("B1", "U2", 2, false)])
        .build();
    studio.manager.load().await;
    assert_eq!(ids(&studio), vec!["A1"]);
    assert_eq!(studio.store.calls(), vec![StoreCall::List(UserId::new("U1"))]);
}

#[tokio::test]
async fn signed_out_studio_is_inert() {
    let studio = TestStudio::builder()
        .signed_out()
        .assets([asset("A1", "U1", 1, false)])
        .build();
    studio.manager.select_file(png("cat.png"));

    assert_eq!(
        studio.manager.mount().await.skip_reason(),
        Some(SkipReason::NotSignedIn)
    );
    assert_eq!(
        studio.manager.generate("a red fox").await.skip_reason(),
        Some(SkipReason::NotSignedIn)
    );
    assert_eq!(
        studio.manager.upload_and_create().await.skip_reason(),
        Some(SkipReason::NotSignedIn)
    );
    assert_eq!(
        studio
            .manager
            .delete_asset(&AssetId::new("A1"))
            .await
            .skip_reason(),
        Some(SkipReason::NotSignedIn)
    );
    assert!(studio.store.calls().is_empty());
    assert!(studio.notifier.all().is_empty());
}

#[tokio::test]
async fn render_tracks_manager_state() {
    let studio = TestStudio::builder()
        .assets([asset("A1", "U1", 1, true), asset("A2", "U1", 2, false)])
        .build();
    studio.manager.mount().await;

    let mut router = ViewRouter::new();
    assert!(matches!(studio.manager.render(&router), View::Upload(_)));

    router.select(Section::Favorites);
    let View::Favorites(gallery) = studio.manager.render(&router) else {
        panic!("expected favorites view");
    };
    assert_eq!(gallery.ids(), vec![&AssetId::new("A1")]);

    router.select(Section::Account);
    let View::Account(account) = studio.manager.render(&router) else {
        panic!("expected account view");
    };
    assert_eq!(account.email.as_deref(), Some("u1@example.com"));
}

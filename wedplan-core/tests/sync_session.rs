use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, sleep};

use wedplan_core::model::Task;
use wedplan_core::mutation::TaskPatch;
use wedplan_core::store::{Delivery, DocumentStore, MemoryStore, Snapshot, Subscription};
use wedplan_core::{
    Mutation, SyncEvent, SyncSession, SyncState, WeddingDocument, WeddingError, WeddingResult,
};

const DEBOUNCE: Duration = Duration::from_millis(1000);

async fn loaded_session() -> (Arc<MemoryStore>, SyncSession) {
    let store = Arc::new(MemoryStore::with_document(&WeddingDocument::default()).unwrap());
    let session = SyncSession::start(store.clone(), DEBOUNCE);
    session.ready().await.unwrap();
    (store, session)
}

fn drain(events: &mut broadcast::Receiver<SyncEvent>) -> Vec<SyncEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn theme(value: &str) -> Mutation {
    Mutation::SetWeddingTheme(value.to_string())
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_is_saved_once() {
    let (store, session) = loaded_session().await;
    assert_eq!(session.state(), SyncState::Synced);

    for i in 0..5 {
        session
            .apply(Mutation::AddTask(Task::titled(&format!("Tarea {i}"))))
            .await
            .unwrap();
        sleep(Duration::from_millis(200)).await;
    }
    assert_eq!(session.state(), SyncState::Dirty);

    sleep(Duration::from_millis(500)).await;
    assert_eq!(store.save_count(), 0);

    sleep(DEBOUNCE).await;
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.saves()[0].tasks.len(), 7);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(store.save_count(), 1);
    assert_eq!(session.state(), SyncState::Synced);
}

#[tokio::test(start_paused = true)]
async fn own_echo_does_not_trigger_another_save() {
    let (store, session) = loaded_session().await;
    let mut events = session.events();

    session.apply(theme("Boho")).await.unwrap();
    sleep(DEBOUNCE * 2).await;

    let seen = drain(&mut events);
    assert!(matches!(seen.as_slice(), [SyncEvent::Saved { .. }, SyncEvent::EchoSkipped]));

    // Duplicate deliveries of the same snapshot are absorbed too.
    store.redeliver();
    store.redeliver();
    sleep(DEBOUNCE * 3).await;

    assert_eq!(store.save_count(), 1);
    assert_eq!(session.document().wedding_theme, "Boho");
    assert_eq!(
        drain(&mut events),
        vec![SyncEvent::EchoSkipped, SyncEvent::EchoSkipped]
    );
}

#[tokio::test(start_paused = true)]
async fn external_change_replaces_local_document() {
    let (store, session) = loaded_session().await;
    let mut events = session.events();

    let mut remote = WeddingDocument::default();
    remote.wedding_theme = "Vintage".into();
    remote.updated_at = 42;
    store.write_external(&remote).unwrap();
    sleep(Duration::from_millis(10)).await;

    assert_eq!(session.document().wedding_theme, "Vintage");
    assert_eq!(drain(&mut events), vec![SyncEvent::RemoteApplied]);

    sleep(DEBOUNCE * 3).await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn edit_during_slow_save_gets_exactly_one_follow_up() {
    let (store, session) = loaded_session().await;
    store.set_latency(Duration::from_millis(500));

    session.apply(theme("Primera")).await.unwrap();
    sleep(DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(session.state(), SyncState::Saving);

    session.apply(theme("Segunda")).await.unwrap();
    sleep(DEBOUNCE * 5).await;

    let saves = store.saves();
    assert_eq!(saves.len(), 2);
    assert_eq!(saves[0].wedding_theme, "Primera");
    assert_eq!(saves[1].wedding_theme, "Segunda");
    assert!(saves[1].updated_at > saves[0].updated_at);
    assert_eq!(session.state(), SyncState::Synced);
    assert_eq!(session.document().wedding_theme, "Segunda");
}

#[tokio::test(start_paused = true)]
async fn saved_event_reports_the_version_written() {
    let (store, session) = loaded_session().await;
    let mut events = session.events();
    store.set_latency(Duration::from_millis(500));

    session.apply(theme("Boho")).await.unwrap();
    sleep(DEBOUNCE + Duration::from_millis(100)).await;
    assert_eq!(session.state(), SyncState::Saving);

    let mut remote = WeddingDocument::default();
    remote.wedding_theme = "Vintage".into();
    remote.updated_at = 42;
    store.write_external(&remote).unwrap();
    sleep(DEBOUNCE * 2).await;

    let written = store.saves()[0].updated_at;
    assert_ne!(written, 42);

    let saved: Vec<i64> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            SyncEvent::Saved { updated_at } => Some(updated_at),
            _ => None,
        })
        .collect();
    assert_eq!(saved, vec![written]);
}

#[tokio::test(start_paused = true)]
async fn failed_save_keeps_local_edits() {
    let (store, session) = loaded_session().await;
    let mut events = session.events();
    store.set_failure(Some("sin conexión"));

    session.apply(theme("Boho")).await.unwrap();
    sleep(DEBOUNCE * 2).await;

    assert!(matches!(drain(&mut events).as_slice(), [SyncEvent::SaveFailed(_)]));
    assert_eq!(session.document().wedding_theme, "Boho");
    assert_ne!(store.current().unwrap().wedding_theme, "Boho");

    store.set_failure(None);
    session.apply(Mutation::SetVows("Siempre".into())).await.unwrap();
    sleep(DEBOUNCE * 2).await;

    let remote = store.current().unwrap();
    assert_eq!(remote.wedding_theme, "Boho");
    assert_eq!(remote.vows, "Siempre");
}

#[tokio::test(start_paused = true)]
async fn shutdown_discards_pending_save() {
    let (store, session) = loaded_session().await;

    session.apply(theme("Boho")).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    session.shutdown().await.unwrap();

    sleep(DEBOUNCE * 5).await;
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn flush_saves_without_waiting_for_debounce() {
    let (store, session) = loaded_session().await;
    let started = Instant::now();

    session.apply(theme("Boho")).await.unwrap();
    session.flush().await.unwrap();

    assert!(started.elapsed() < DEBOUNCE);
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.current().unwrap().wedding_theme, "Boho");
    assert_eq!(session.state(), SyncState::Synced);
}

#[tokio::test(start_paused = true)]
async fn flush_reports_save_failure() {
    let (store, session) = loaded_session().await;
    store.set_failure(Some("sin conexión"));

    session.apply(theme("Boho")).await.unwrap();
    assert!(session.flush().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn rejected_edit_changes_nothing() {
    let (store, session) = loaded_session().await;
    let before = session.document();

    let result = session
        .apply(Mutation::UpdateTask(
            "no-existe".into(),
            TaskPatch {
                title: Some("x".into()),
                ..Default::default()
            },
        ))
        .await;

    assert!(result.is_err());
    assert_eq!(session.document(), before);
    assert_eq!(session.state(), SyncState::Synced);
    sleep(DEBOUNCE * 2).await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_remote_document_is_created() {
    let store = Arc::new(MemoryStore::new());
    let session = SyncSession::start(store.clone(), DEBOUNCE);
    let mut events = session.events();
    session.ready().await.unwrap();

    sleep(DEBOUNCE * 2).await;

    let created = store.current().unwrap();
    assert_eq!(created.wedding_theme, "Jardín Romántico Moderno");
    assert_eq!(created.tasks.len(), 2);
    assert_eq!(store.save_count(), 1);
    assert!(matches!(
        drain(&mut events).first(),
        Some(SyncEvent::Loaded { created: true }) | Some(SyncEvent::Saved { .. })
    ));
}

/// Store whose snapshots are pushed by hand.
#[derive(Default)]
struct ManualStore {
    feed: Mutex<Option<mpsc::UnboundedSender<Delivery>>>,
    saves: Mutex<Vec<WeddingDocument>>,
}

impl ManualStore {
    fn push(&self, snapshot: Snapshot) {
        self.deliver(Ok(snapshot));
    }

    fn fail(&self, reason: &str) {
        self.deliver(Err(WeddingError::Store(reason.to_string())));
    }

    fn deliver(&self, delivery: Delivery) {
        if let Some(tx) = self.feed.lock().unwrap().as_ref() {
            tx.send(delivery).unwrap();
        }
    }

    fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentStore for ManualStore {
    async fn save(&self, document: &WeddingDocument) -> WeddingResult<()> {
        self.saves.lock().unwrap().push(document.clone());
        Ok(())
    }

    fn subscribe(&self) -> Subscription {
        let (tx, subscription) = Subscription::channel();
        *self.feed.lock().unwrap() = Some(tx);
        subscription
    }
}

#[tokio::test(start_paused = true)]
async fn edits_before_first_snapshot_are_not_saved() {
    let store = Arc::new(ManualStore::default());
    let session = SyncSession::start(store.clone(), DEBOUNCE);

    session.apply(theme("Local")).await.unwrap();
    sleep(DEBOUNCE * 3).await;
    assert_eq!(session.state(), SyncState::Uninitialized);
    assert_eq!(store.save_count(), 0);

    let mut remote = WeddingDocument::default();
    remote.wedding_theme = "Remoto".into();
    remote.updated_at = 7;
    store.push(Some(remote));
    session.ready().await.unwrap();

    assert_eq!(session.document().wedding_theme, "Remoto");
    sleep(DEBOUNCE * 3).await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn remote_deletion_after_load_keeps_local_state() {
    let store = Arc::new(ManualStore::default());
    let session = SyncSession::start(store.clone(), DEBOUNCE);

    let mut remote = WeddingDocument::default();
    remote.vows = "Para siempre".into();
    store.push(Some(remote));
    session.ready().await.unwrap();

    store.push(None);
    sleep(Duration::from_millis(10)).await;

    assert_eq!(session.document().vows, "Para siempre");
    assert_eq!(session.state(), SyncState::Synced);
}

#[tokio::test(start_paused = true)]
async fn unreadable_document_fails_ready() {
    let store = Arc::new(ManualStore::default());
    let session = SyncSession::start(store.clone(), DEBOUNCE);
    let mut events = session.events();
    sleep(Duration::from_millis(10)).await;

    store.fail("documento ilegible");
    let result = tokio::time::timeout(Duration::from_millis(100), session.ready())
        .await
        .expect("ready should not wait for a good snapshot");

    assert!(matches!(result, Err(WeddingError::Store(message)) if message.contains("ilegible")));
    assert_eq!(session.state(), SyncState::Uninitialized);
    assert!(matches!(drain(&mut events).as_slice(), [SyncEvent::RemoteError(_)]));

    sleep(DEBOUNCE * 2).await;
    assert_eq!(store.save_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn store_error_after_load_keeps_local_state() {
    let store = Arc::new(ManualStore::default());
    let session = SyncSession::start(store.clone(), DEBOUNCE);
    store.push(Some(WeddingDocument::default()));
    session.ready().await.unwrap();

    session.apply(theme("Boho")).await.unwrap();
    store.fail("sin conexión");
    sleep(Duration::from_millis(10)).await;

    assert_eq!(session.document().wedding_theme, "Boho");
    assert_eq!(session.state(), SyncState::Dirty);

    sleep(DEBOUNCE * 2).await;
    assert_eq!(store.save_count(), 1);
    assert!(session.ready().await.is_ok());
}

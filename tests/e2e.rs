//! Integration tests driving the console core against an in-process
//! instance of the announcement service, over real HTTP and WebSocket
//! connections.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::mpsc;
use tokio::time::timeout;

use noticeboard::client::notifier::ChangeNotifier;
use noticeboard::client::refresh::AnnouncementFeed;
use noticeboard::client::session::StaticSession;
use noticeboard::client::store::{AnnouncementStore, HttpStore, StoreError};
use noticeboard::config::Config;
use noticeboard::error::ReasonCode;
use noticeboard::models::announcement::{AnnouncementDraft, Severity};
use noticeboard::{router, AppState};

const TOKEN: &str = "test-operator-token";
const WAIT: Duration = Duration::from_secs(5);

/// Bind the service on an ephemeral port; returns its `host:port`.
async fn spawn_service() -> String {
    let config = Arc::new(Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        operator_token: TOKEN.to_string(),
        app_base_url: "http://localhost".to_string(),
    });
    let state = AppState::new(config);
    let app = router(&state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr.to_string()
}

fn store_for(addr: &str) -> HttpStore {
    HttpStore::new(
        format!("http://{addr}"),
        Arc::new(StaticSession::new(TOKEN)),
    )
}

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, hour, minute, 0).unwrap()
}

fn draft(message: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> AnnouncementDraft {
    AnnouncementDraft {
        message: message.to_string(),
        start_date: start,
        end_date: end,
        severity: Severity::Warn,
    }
}

#[tokio::test]
async fn create_list_delete_round_trip() {
    let addr = spawn_service().await;
    let store = store_for(&addr);

    let created = store
        .create(&draft("Maintenance window", at(10, 0), at(12, 0)))
        .await
        .unwrap();

    let listed = store.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].message, "Maintenance window");
    assert_eq!(listed[0].severity, Severity::Warn);

    store.delete(created.id).await.unwrap();
    assert!(store.list().await.unwrap().is_empty());

    // Deleting again is a no-op, not an error.
    store.delete(created.id).await.unwrap();
}

#[tokio::test]
async fn overlapping_window_is_rejected_with_a_reason_code() {
    let addr = spawn_service().await;
    let store = store_for(&addr);

    store
        .create(&draft("first", at(10, 0), at(12, 0)))
        .await
        .unwrap();

    let err = store
        .create(&draft("second", at(11, 0), at(13, 0)))
        .await
        .unwrap_err();
    match err {
        StoreError::Rejected(rejection) => {
            assert_eq!(rejection.status, 409);
            assert_eq!(rejection.reason, Some(ReasonCode::OverlappingWindow));
        }
        other => panic!("expected rejection, got {other:?}"),
    }

    // A window that merely touches the first one is fine.
    store
        .create(&draft("adjacent", at(12, 0), at(13, 0)))
        .await
        .unwrap();
    assert_eq!(store.list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_drafts_never_reach_the_network() {
    // Nothing listens here; a network attempt would fail loudly.
    let store = HttpStore::new(
        "http://127.0.0.1:9".to_string(),
        Arc::new(StaticSession::new(TOKEN)),
    );

    let err = store
        .create(&draft(&"a".repeat(201), at(10, 0), at(12, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));

    let err = store
        .create(&draft("backwards", at(12, 0), at(10, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
}

#[tokio::test]
async fn wrong_token_is_rejected_without_a_reason_code() {
    let addr = spawn_service().await;
    let store = HttpStore::new(
        format!("http://{addr}"),
        Arc::new(StaticSession::new("wrong-token")),
    );

    let err = store.list().await.unwrap_err();
    match err {
        StoreError::Rejected(rejection) => {
            assert_eq!(rejection.status, 401);
            assert_eq!(rejection.reason, None);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn notifier_signals_on_open_and_on_every_change() {
    let addr = spawn_service().await;
    let store = store_for(&addr);

    let (signals_tx, mut signals) = mpsc::channel(8);
    let notifier = ChangeNotifier::connect(
        format!("ws://{addr}/announcements/ws"),
        Arc::new(StaticSession::new(TOKEN)),
        signals_tx,
    );

    // Opening the channel counts as a change.
    timeout(WAIT, signals.recv()).await.unwrap().unwrap();

    let created = store
        .create(&draft("push me", at(10, 0), at(12, 0)))
        .await
        .unwrap();
    timeout(WAIT, signals.recv()).await.unwrap().unwrap();

    store.delete(created.id).await.unwrap();
    timeout(WAIT, signals.recv()).await.unwrap().unwrap();

    // Teardown drops the sender: the signal stream ends rather than
    // firing again later.
    notifier.close();
    assert!(timeout(WAIT, async {
        while signals.recv().await.is_some() {}
    })
    .await
    .is_ok());
}

#[tokio::test]
async fn feed_converges_after_remote_changes() {
    let addr = spawn_service().await;
    let feed = Arc::new(AnnouncementFeed::new(store_for(&addr)));

    let (signals_tx, signals) = mpsc::channel(8);
    let notifier = ChangeNotifier::connect(
        format!("ws://{addr}/announcements/ws"),
        Arc::new(StaticSession::new(TOKEN)),
        signals_tx,
    );
    let driver = tokio::spawn({
        let feed = feed.clone();
        async move { feed.run(signals).await }
    });

    // A second operator creates an announcement; this console only hears
    // about it through the change channel.
    let other_console = store_for(&addr);
    other_console
        .create(&draft("from elsewhere", at(10, 0), at(12, 0)))
        .await
        .unwrap();

    timeout(WAIT, async {
        loop {
            let snapshot = feed.snapshot().await;
            if snapshot.iter().any(|a| a.message == "from elsewhere") {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("snapshot never picked up the remote create");

    feed.close();
    notifier.close();
    driver.await.unwrap();
}

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use vitalis_domain::core::config::NotificationEngineConfig;
use vitalis_domain::notifications::{
    InMemoryKeyValueStore, ManualClock, NotificationCategory, NotificationEngine, NotificationEvent,
    NotificationPriority, NotificationRequest, SortMode, ToastRequest,
};

// 2024-03-06 is a Wednesday.
fn wednesday(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 6).unwrap().and_hms_opt(hour, minute, 0).unwrap()
}

async fn engine_at(start: NaiveDateTime) -> (NotificationEngine, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start));
    let engine = NotificationEngine::new(
        &NotificationEngineConfig::default(),
        Arc::new(InMemoryKeyValueStore::new()),
        clock.clone(),
    )
    .await;
    (engine, clock)
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn urgent_vital_during_quiet_hours_is_admitted_and_its_toast_persists() {
    let (engine, _clock) = engine_at(wednesday(23, 30)).await;
    assert!(engine.is_quiet_hours_active().await);

    let reading = NotificationRequest::new(
        NotificationCategory::Vital,
        NotificationPriority::Urgent,
        "Heart rate 148",
        "Resting heart rate above range",
    )
    .with_metadata("reading", serde_json::json!(148))
    .with_metadata("normalRange", serde_json::json!([60, 100]));
    assert!(engine.add_notification(reading).await.is_some());
    assert_eq!(engine.unread_count().await, 1);

    let alert = ToastRequest::new(
        NotificationCategory::Vital,
        NotificationPriority::Urgent,
        "Heart rate 148",
        "Check in now",
    )
    .persistent();
    let toast_id = engine.show_toast(alert).await.unwrap();

    tokio::time::advance(Duration::from_secs(3600)).await;
    settle().await;
    let visible: Vec<_> = engine.toasts().into_iter().map(|t| t.id).collect();
    assert_eq!(visible, vec![toast_id.clone()]);

    assert!(engine.dismiss_toast(&toast_id));
    assert!(engine.toasts().is_empty());
    assert!(!engine.dismiss_toast(&toast_id));
}

#[tokio::test]
async fn low_priority_tip_during_quiet_hours_is_denied() {
    let (engine, _clock) = engine_at(wednesday(23, 30)).await;
    let mut events = engine.subscribe();
    let prefs = engine.preferences().await;
    assert!(prefs.quiet_hours.allow_urgent);

    let id = engine
        .add_notification(NotificationRequest::new(
            NotificationCategory::Tip,
            NotificationPriority::Low,
            "Hydration",
            "Drink a glass of water",
        ))
        .await;
    assert_eq!(id, None);
    assert!(engine.notifications().await.is_empty());
    assert_eq!(engine.unread_count().await, 0);
    assert_eq!(
        events.recv().await.unwrap(),
        NotificationEvent::Suppressed {
            category: NotificationCategory::Tip,
            priority: NotificationPriority::Low
        }
    );
}

#[tokio::test]
async fn priority_and_timestamp_ordering() {
    let (engine, clock) = engine_at(wednesday(12, 0)).await;
    let mut created = Vec::new();
    for priority in [
        NotificationPriority::Low,
        NotificationPriority::Urgent,
        NotificationPriority::High,
        NotificationPriority::Medium,
    ] {
        let request =
            NotificationRequest::new(NotificationCategory::Medication, priority, "Dose", "Due");
        let id = engine.add_notification(request).await.unwrap();
        created.push(id);
        clock.advance(chrono::Duration::seconds(1));
    }

    engine.set_sort_by(SortMode::Priority).await;
    let by_priority: Vec<_> =
        engine.filtered_notifications().await.iter().map(|n| n.priority).collect();
    assert_eq!(
        by_priority,
        vec![
            NotificationPriority::Urgent,
            NotificationPriority::High,
            NotificationPriority::Medium,
            NotificationPriority::Low
        ]
    );

    engine.set_sort_by(SortMode::Timestamp).await;
    let by_time: Vec<_> = engine.filtered_notifications().await.into_iter().map(|n| n.id).collect();
    created.reverse();
    assert_eq!(by_time, created);
}

#[tokio::test(start_paused = true)]
async fn sweeper_removes_expired_entries_only_after_their_deadline() {
    let (engine, clock) = engine_at(wednesday(12, 0)).await;
    let deadline = chrono::DateTime::from_naive_utc_and_offset(wednesday(12, 5), chrono::Utc);
    let check_up = NotificationRequest::new(
        NotificationCategory::Appointment,
        NotificationPriority::Medium,
        "Check-up",
        "In 5 minutes",
    )
    .expires_at(deadline);
    let expiring = engine.add_notification(check_up).await.unwrap();
    let permanent = engine
        .add_notification(NotificationRequest::new(
            NotificationCategory::Health,
            NotificationPriority::Medium,
            "Weekly summary",
            "Ready",
        ))
        .await
        .unwrap();

    engine.start_sweeper();
    let mut events = engine.subscribe();

    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert!(engine.get_notification(&expiring).await.is_some());

    clock.set(wednesday(12, 5));
    tokio::time::advance(Duration::from_secs(60)).await;
    settle().await;
    assert!(engine.get_notification(&expiring).await.is_none());
    assert!(engine.get_notification(&permanent).await.is_some());
    assert_eq!(engine.unread_count().await, 1);
    assert_eq!(events.recv().await.unwrap(), NotificationEvent::Expired { ids: vec![expiring] });

    clock.set(wednesday(12, 0) + chrono::Duration::days(3650));
    assert!(engine.clear_expired().await.is_empty());
    engine.shutdown();
}

#[tokio::test]
async fn unread_count_matches_a_recount_throughout() {
    let (engine, _clock) = engine_at(wednesday(12, 0)).await;
    let mut ids = Vec::new();
    for category in [
        NotificationCategory::Health,
        NotificationCategory::Quiz,
        NotificationCategory::Symptom,
    ] {
        let request = NotificationRequest::new(category, NotificationPriority::Medium, "t", "m");
        ids.push(engine.add_notification(request).await.unwrap());
    }

    async fn check(engine: &NotificationEngine) {
        let notifications = engine.notifications().await;
        let recount = notifications.iter().filter(|n| !n.read && !n.dismissed).count();
        assert_eq!(engine.unread_count().await, recount);
    }

    engine.mark_as_read(&ids[0]).await;
    check(&engine).await;
    engine.dismiss(&ids[0]).await;
    check(&engine).await;
    engine.dismiss(&ids[1]).await;
    engine.dismiss(&ids[1]).await;
    check(&engine).await;
    engine.remove(&ids[2]).await;
    check(&engine).await;
    assert_eq!(engine.unread_count().await, 0);
}

#[tokio::test]
async fn filesystem_backed_engine_rehydrates() {
    let dir = TempDir::new().unwrap();
    let config = NotificationEngineConfig {
        storage_dir: Some(dir.path().join("notifications")),
        ..NotificationEngineConfig::default()
    };

    let engine = NotificationEngine::open_default(&config).await.unwrap();
    let prefs = engine.preferences().await;
    assert_eq!(prefs.categories.len(), NotificationCategory::ALL.len());

    engine.toggle_category(NotificationCategory::Education, false).await;
    // Quiet hours depend on the wall clock here, so only urgent requests are certain to pass.
    let id = engine
        .add_notification(NotificationRequest::new(
            NotificationCategory::Medication,
            NotificationPriority::Urgent,
            "Insulin",
            "10 units now",
        ))
        .await
        .unwrap();
    drop(engine);

    assert!(dir.path().join("notifications").join("notifications.json").is_file());
    assert!(dir.path().join("notifications").join("preferences.json").is_file());

    let reopened = NotificationEngine::open_default(&config).await.unwrap();
    let title = reopened.get_notification(&id).await.map(|n| n.title);
    assert_eq!(title, Some("Insulin".to_string()));
    assert!(!reopened.preferences().await.category(NotificationCategory::Education).enabled);
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use uuid::Uuid;

// --- Identifiers ---

/// Opaque identifier of a notification or toast.
///
/// Ids minted here are UUID v4 strings, but any non-empty string read back
/// from storage is accepted as-is.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    /// Mints a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NotificationId").field(&self.0).finish()
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NotificationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for NotificationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// --- Enums ---

/// Visual severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl NotificationKind {
    /// Kind used when a producer does not pick one.
    pub fn for_priority(priority: NotificationPriority) -> Self {
        match priority {
            NotificationPriority::Urgent => NotificationKind::Error,
            NotificationPriority::High => NotificationKind::Warning,
            NotificationPriority::Medium | NotificationPriority::Low => NotificationKind::Info,
        }
    }
}

/// Producer domain of a notification. The set is closed: preferences hold an
/// entry for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    Health,
    Medication,
    Appointment,
    Vital,
    Symptom,
    Education,
    Quiz,
    Tip,
    System,
    Sync,
    Update,
}

impl NotificationCategory {
    pub const ALL: [NotificationCategory; 11] = [
        NotificationCategory::Health,
        NotificationCategory::Medication,
        NotificationCategory::Appointment,
        NotificationCategory::Vital,
        NotificationCategory::Symptom,
        NotificationCategory::Education,
        NotificationCategory::Quiz,
        NotificationCategory::Tip,
        NotificationCategory::System,
        NotificationCategory::Sync,
        NotificationCategory::Update,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::Health => "health",
            NotificationCategory::Medication => "medication",
            NotificationCategory::Appointment => "appointment",
            NotificationCategory::Vital => "vital",
            NotificationCategory::Symptom => "symptom",
            NotificationCategory::Education => "education",
            NotificationCategory::Quiz => "quiz",
            NotificationCategory::Tip => "tip",
            NotificationCategory::System => "system",
            NotificationCategory::Sync => "sync",
            NotificationCategory::Update => "update",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl NotificationPriority {
    /// Sort rank; lower sorts first (urgent=0 .. low=3).
    pub fn rank(&self) -> u8 {
        match self {
            NotificationPriority::Urgent => 0,
            NotificationPriority::High => 1,
            NotificationPriority::Medium => 2,
            NotificationPriority::Low => 3,
        }
    }
}

// --- Notification ---

/// A persisted notification-center entry.
///
/// `read` and `dismissed` only ever go from `false` to `true`, and a dismissed
/// entry is always read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub dismissed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_label: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Notification {
    pub fn new(request: NotificationRequest, id: NotificationId, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: request.kind.unwrap_or_else(|| NotificationKind::for_priority(request.priority)),
            category: request.category,
            priority: request.priority,
            title: request.title,
            message: request.message,
            timestamp,
            read: false,
            dismissed: false,
            expires_at: request.expires_at,
            action_url: request.action_url,
            action_label: request.action_label,
            metadata: request.metadata,
        }
    }

    /// Counts toward the unread badge.
    pub fn is_unread(&self) -> bool {
        !self.read && !self.dismissed
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |expires_at| expires_at <= now)
    }

    pub fn mark_as_read(&mut self) {
        self.read = true;
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
        self.read = true;
    }
}

/// What a producer passes to `add_notification`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationRequest {
    pub category: NotificationCategory,
    pub priority: NotificationPriority,
    pub title: String,
    pub message: String,
    pub kind: Option<NotificationKind>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub action_label: Option<String>,
    pub action_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    pub fn new(
        category: NotificationCategory,
        priority: NotificationPriority,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            priority,
            title: title.into(),
            message: message.into(),
            kind: None,
            metadata: HashMap::new(),
            action_label: None,
            action_url: None,
            expires_at: None,
        }
    }

    pub fn with_kind(mut self, kind: NotificationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_action(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.action_label = Some(label.into());
        self.action_url = Some(url.into());
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

// --- View state ---

/// Category filter applied by `filtered_notifications`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(NotificationCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: NotificationCategory) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl From<NotificationCategory> for CategoryFilter {
    fn from(category: NotificationCategory) -> Self {
        CategoryFilter::Only(category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Timestamp,
    Priority,
    Category,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct NotificationStats {
    pub total: usize,
    pub unread: usize,
    pub dismissed: usize,
    pub by_category: BTreeMap<NotificationCategory, usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use static_assertions::assert_impl_all;

    assert_impl_all!(
        NotificationCategory: Send,
        Sync,
        Copy,
        Ord,
        std::hash::Hash,
        Serialize,
        Deserialize<'static>
    );
    assert_impl_all!(Notification: Send, Sync, Clone, PartialEq, Serialize, Deserialize<'static>);

    fn sample(priority: NotificationPriority) -> Notification {
        Notification::new(
            NotificationRequest::new(
                NotificationCategory::Medication,
                priority,
                "Dose due",
                "Take 5 mg",
            ),
            NotificationId::generate(),
            Utc::now(),
        )
    }

    #[test]
    fn priority_rank_orders_urgent_first() {
        let mut priorities = vec![
            NotificationPriority::Low,
            NotificationPriority::Urgent,
            NotificationPriority::High,
            NotificationPriority::Medium,
        ];
        priorities.sort_by_key(|p| p.rank());
        assert_eq!(
            priorities,
            vec![
                NotificationPriority::Urgent,
                NotificationPriority::High,
                NotificationPriority::Medium,
                NotificationPriority::Low
            ]
        );
    }

    #[test]
    fn category_serde_uses_lowercase_names() {
        for category in NotificationCategory::ALL {
            let serialized = serde_json::to_string(&category).unwrap();
            assert_eq!(serialized, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn notification_new_derives_kind_from_priority() {
        assert_eq!(sample(NotificationPriority::Urgent).kind, NotificationKind::Error);
        assert_eq!(sample(NotificationPriority::High).kind, NotificationKind::Warning);
        assert_eq!(sample(NotificationPriority::Low).kind, NotificationKind::Info);

        let explicit = Notification::new(
            NotificationRequest::new(
                NotificationCategory::Sync,
                NotificationPriority::Low,
                "Synced",
                "All good",
            )
            .with_kind(NotificationKind::Success),
            NotificationId::generate(),
            Utc::now(),
        );
        assert_eq!(explicit.kind, NotificationKind::Success);
    }

    #[test]
    fn dismiss_implies_read() {
        let mut notif = sample(NotificationPriority::Medium);
        assert!(notif.is_unread());
        notif.dismiss();
        assert!(notif.read && notif.dismissed);
        assert!(!notif.is_unread());
    }

    #[test]
    fn expiry_is_inclusive_of_the_deadline() {
        let now = Utc::now();
        let mut notif = sample(NotificationPriority::Low);
        assert!(!notif.is_expired_at(now));
        notif.expires_at = Some(now);
        assert!(notif.is_expired_at(now));
        assert!(!notif.is_expired_at(now - chrono::Duration::seconds(1)));
    }

    #[test]
    fn notification_serializes_with_storage_field_names() {
        let expires = Utc::now() + chrono::Duration::hours(1);
        let notif = Notification::new(
            NotificationRequest::new(
                NotificationCategory::Vital,
                NotificationPriority::Urgent,
                "SpO2 low",
                "88%",
            )
            .with_metadata("reading", json!(88))
            .with_action("Open vitals", "/vitals")
            .expires_at(expires),
            NotificationId::generate(),
            Utc::now(),
        );
        let value = serde_json::to_value(&notif).unwrap();
        assert_eq!(value["type"], json!("error"));
        assert_eq!(value["category"], json!("vital"));
        assert_eq!(value["actionLabel"], json!("Open vitals"));
        assert_eq!(value["metadata"]["reading"], json!(88));
        assert!(value["expiresAt"].is_string());
        assert!(value["timestamp"].as_str().unwrap().contains('T'));

        let restored: Notification = serde_json::from_value(value).unwrap();
        assert_eq!(restored, notif);
    }

    #[test]
    fn generated_ids_are_unique_uuid_strings() {
        let a = NotificationId::generate();
        let b = NotificationId::generate();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn stored_records_keep_non_uuid_ids() {
        let raw = json!({
            "id": "notif-1709726400000-abc12",
            "type": "info",
            "category": "medication",
            "priority": "medium",
            "title": "Dose due",
            "message": "Take 5 mg",
            "timestamp": "2024-03-06T12:00:00Z",
            "read": false,
            "dismissed": false
        });
        let notif: Notification = serde_json::from_value(raw).unwrap();
        assert_eq!(notif.id, NotificationId::from("notif-1709726400000-abc12"));
        assert_eq!(serde_json::to_value(&notif).unwrap()["id"], json!("notif-1709726400000-abc12"));
    }

    #[test]
    fn category_filter_matches() {
        assert!(CategoryFilter::All.matches(NotificationCategory::Tip));
        let only_vitals: CategoryFilter = NotificationCategory::Vital.into();
        assert!(only_vitals.matches(NotificationCategory::Vital));
        assert!(!only_vitals.matches(NotificationCategory::Tip));
    }
}

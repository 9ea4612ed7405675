//! Admission control: decides from the user's preferences whether a requested
//! notification or toast is shown at all.

use chrono::NaiveDateTime;

use super::preferences::NotificationPreferences;
use super::types::{NotificationCategory, NotificationPriority};

/// Outcome of an admission check. Deny variants name the first rule that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    Allow,
    DenyGloballyDisabled,
    DenyCategoryDisabled,
    DenyQuietHours,
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allow)
    }
}

/// A pluggable admission policy. Implementations must be pure: the same
/// preferences, request and instant always yield the same decision.
pub trait AdmissionPolicy: Send + Sync {
    fn evaluate(
        &self,
        preferences: &NotificationPreferences,
        category: NotificationCategory,
        priority: NotificationPriority,
        now: NaiveDateTime,
    ) -> AdmissionDecision;
}

/// The default policy, driven entirely by [`NotificationPreferences`].
///
/// Rules are applied in order:
/// 1. globally disabled denies;
/// 2. a disabled category denies;
/// 3. during quiet hours only urgent notifications pass, and only when
///    `allow_urgent` is set;
/// 4. anything else is allowed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceAdmissionGate;

impl AdmissionPolicy for PreferenceAdmissionGate {
    fn evaluate(
        &self,
        preferences: &NotificationPreferences,
        category: NotificationCategory,
        priority: NotificationPriority,
        now: NaiveDateTime,
    ) -> AdmissionDecision {
        if !preferences.enabled {
            return AdmissionDecision::DenyGloballyDisabled;
        }
        if !preferences.category(category).enabled {
            return AdmissionDecision::DenyCategoryDisabled;
        }
        if preferences.is_quiet_hours_active(now) {
            let urgent_override =
                preferences.quiet_hours.allow_urgent && priority == NotificationPriority::Urgent;
            if !urgent_override {
                return AdmissionDecision::DenyQuietHours;
            }
        }
        AdmissionDecision::Allow
    }
}

/// Convenience predicate over the default gate.
pub fn should_show(
    preferences: &NotificationPreferences,
    category: NotificationCategory,
    priority: NotificationPriority,
    now: NaiveDateTime,
) -> bool {
    PreferenceAdmissionGate.evaluate(preferences, category, priority, now).is_allowed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 6).unwrap().and_hms_opt(hour, minute, 0).unwrap()
    }

    fn prefs(global: bool, category: bool, quiet: bool) -> NotificationPreferences {
        let mut prefs = NotificationPreferences::default();
        prefs.enabled = global;
        prefs.set_category_enabled(NotificationCategory::Vital, category);
        prefs.quiet_hours.enabled = quiet;
        prefs
    }

    #[test]
    fn truth_table() {
        let night = at(23, 30);
        for global in [true, false] {
            for category in [true, false] {
                for quiet in [true, false] {
                    for priority in [NotificationPriority::Urgent, NotificationPriority::Medium] {
                        let p = prefs(global, category, quiet);
                        let expected = global
                            && category
                            && (!quiet || priority == NotificationPriority::Urgent);
                        assert_eq!(
                            should_show(&p, NotificationCategory::Vital, priority, night),
                            expected,
                            "global={} category={} quiet={} priority={:?}",
                            global,
                            category,
                            quiet,
                            priority
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn deny_reason_follows_rule_order() {
        let gate = PreferenceAdmissionGate;
        let night = at(23, 30);
        assert_eq!(
            gate.evaluate(
                &prefs(false, false, true),
                NotificationCategory::Vital,
                NotificationPriority::Low,
                night
            ),
            AdmissionDecision::DenyGloballyDisabled
        );
        assert_eq!(
            gate.evaluate(
                &prefs(true, false, true),
                NotificationCategory::Vital,
                NotificationPriority::Low,
                night
            ),
            AdmissionDecision::DenyCategoryDisabled
        );
        assert_eq!(
            gate.evaluate(
                &prefs(true, true, true),
                NotificationCategory::Vital,
                NotificationPriority::Low,
                night
            ),
            AdmissionDecision::DenyQuietHours
        );
    }

    #[test]
    fn urgent_needs_allow_urgent_during_quiet_hours() {
        let mut p = NotificationPreferences::default();
        p.quiet_hours.allow_urgent = false;
        let urgent = NotificationPriority::Urgent;
        assert!(!should_show(&p, NotificationCategory::Vital, urgent, at(23, 30)));
        assert!(should_show(&p, NotificationCategory::Vital, urgent, at(12, 0)));
    }

    #[test]
    fn default_preferences_deny_sync() {
        let p = NotificationPreferences::default();
        let (urgent, low) = (NotificationPriority::Urgent, NotificationPriority::Low);
        assert!(!should_show(&p, NotificationCategory::Sync, urgent, at(12, 0)));
        assert!(should_show(&p, NotificationCategory::Tip, low, at(12, 0)));
        assert!(!should_show(&p, NotificationCategory::Tip, low, at(23, 30)));
    }
}

//! User notification preferences and the quiet-hours predicate.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::errors::NotificationError;
use super::types::NotificationCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Immediate,
    Hourly,
    Daily,
    Weekly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPreference {
    pub enabled: bool,
    pub frequency: Frequency,
    pub sound: bool,
    pub vibration: bool,
}

impl CategoryPreference {
    /// Built-in defaults, shared by producers and the preferences UI.
    pub fn default_for(category: NotificationCategory) -> Self {
        use NotificationCategory::*;
        let (enabled, frequency, sound, vibration) = match category {
            Health | Medication | Appointment | Vital => (true, Frequency::Immediate, true, true),
            Symptom | Education | Quiz | Tip => (true, Frequency::Daily, false, false),
            System => (true, Frequency::Immediate, true, false),
            Update => (true, Frequency::Immediate, false, false),
            Sync => (false, Frequency::Immediate, false, false),
        };
        Self { enabled, frequency, sound, vibration }
    }
}

/// Time-of-day window during which only urgent notifications get through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuietHours {
    pub enabled: bool,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    pub allow_urgent: bool,
    #[serde(with = "weekday_numbers")]
    pub days_of_week: Vec<Weekday>,
}

impl Default for QuietHours {
    fn default() -> Self {
        Self {
            enabled: true,
            start_time: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or_default(),
            end_time: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default(),
            allow_urgent: true,
            days_of_week: vec![
                Weekday::Sun,
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ],
        }
    }
}

impl QuietHours {
    /// Whether the window covers `now` (local wall-clock time).
    ///
    /// Comparison is at minute resolution. The start is inclusive and the end
    /// exclusive; when `start_time > end_time` the window wraps past midnight.
    /// The weekday check uses the day of `now`, so the early-morning half of an
    /// overnight window belongs to the day it falls on.
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.days_of_week.contains(&now.weekday()) {
            return false;
        }

        let current = (now.hour(), now.minute());
        let start = (self.start_time.hour(), self.start_time.minute());
        let end = (self.end_time.hour(), self.end_time.minute());

        if start <= end {
            start <= current && current < end
        } else {
            current >= start || current < end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub enabled: bool,
    pub sound: bool,
    pub vibration: bool,
    pub quiet_hours: QuietHours,
    pub categories: BTreeMap<NotificationCategory, CategoryPreference>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: true,
            vibration: true,
            quiet_hours: QuietHours::default(),
            categories: NotificationCategory::ALL
                .iter()
                .map(|c| (*c, CategoryPreference::default_for(*c)))
                .collect(),
        }
    }
}

impl NotificationPreferences {
    /// Inserts the default entry for every category missing from the map.
    /// Returns `true` if anything was added.
    pub fn ensure_all_categories(&mut self) -> bool {
        let mut added = false;
        for category in NotificationCategory::ALL {
            self.categories.entry(category).or_insert_with(|| {
                added = true;
                CategoryPreference::default_for(category)
            });
        }
        added
    }

    /// Preference for `category`, falling back to the built-in default.
    pub fn category(&self, category: NotificationCategory) -> CategoryPreference {
        self.categories
            .get(&category)
            .copied()
            .unwrap_or_else(|| CategoryPreference::default_for(category))
    }

    pub fn is_quiet_hours_active(&self, now: NaiveDateTime) -> bool {
        self.quiet_hours.is_active(now)
    }

    pub fn set_category_enabled(&mut self, category: NotificationCategory, enabled: bool) {
        self.categories
            .entry(category)
            .or_insert_with(|| CategoryPreference::default_for(category))
            .enabled = enabled;
    }

    /// Merges `patch` field by field.
    pub fn apply_patch(&mut self, patch: PreferencesPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(sound) = patch.sound {
            self.sound = sound;
        }
        if let Some(vibration) = patch.vibration {
            self.vibration = vibration;
        }
        if let Some(quiet) = patch.quiet_hours {
            let qh = &mut self.quiet_hours;
            if let Some(enabled) = quiet.enabled {
                qh.enabled = enabled;
            }
            if let Some(start) = quiet.start_time {
                qh.start_time = start;
            }
            if let Some(end) = quiet.end_time {
                qh.end_time = end;
            }
            if let Some(allow_urgent) = quiet.allow_urgent {
                qh.allow_urgent = allow_urgent;
            }
            if let Some(days) = quiet.days_of_week {
                qh.days_of_week = days;
            }
        }
        self.categories.extend(patch.categories);
        self.ensure_all_categories();
    }
}

/// Partial update for [`NotificationPreferences`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferencesPatch {
    pub enabled: Option<bool>,
    pub sound: Option<bool>,
    pub vibration: Option<bool>,
    pub quiet_hours: Option<QuietHoursPatch>,
    pub categories: BTreeMap<NotificationCategory, CategoryPreference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuietHoursPatch {
    pub enabled: Option<bool>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub allow_urgent: Option<bool>,
    pub days_of_week: Option<Vec<Weekday>>,
}

impl QuietHoursPatch {
    /// Builds a window patch from two `"HH:MM"` strings.
    pub fn window(start: &str, end: &str) -> Result<Self, NotificationError> {
        Ok(Self {
            start_time: Some(parse_time_of_day("quiet_hours.start_time", start)?),
            end_time: Some(parse_time_of_day("quiet_hours.end_time", end)?),
            ..Self::default()
        })
    }
}

/// Parses a `"HH:MM"` time of day.
pub fn parse_time_of_day(field: &str, value: &str) -> Result<NaiveTime, NotificationError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|e| {
        NotificationError::invalid_input(field, format!("expected HH:MM, got '{}': {}", value, e))
    })
}

/// `NaiveTime` as `"HH:MM"`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(de::Error::custom)
    }
}

/// Weekdays as numbers, 0 = Sunday through 6 = Saturday.
mod weekday_numbers {
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(days: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(days.iter().map(|d| d.num_days_from_sunday()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Weekday>, D::Error> {
        let numbers = Vec::<u8>::deserialize(deserializer)?;
        numbers
            .into_iter()
            .map(|n| match n {
                0 => Ok(Weekday::Sun),
                1 => Ok(Weekday::Mon),
                2 => Ok(Weekday::Tue),
                3 => Ok(Weekday::Wed),
                4 => Ok(Weekday::Thu),
                5 => Ok(Weekday::Fri),
                6 => Ok(Weekday::Sat),
                other => Err(de::Error::custom(format!("weekday out of range: {}", other))),
            })
            .collect()
    }
}

//! The notification-center state and its command reducer.
//!
//! Every mutation is expressed as a [`StoreCommand`] and applied through
//! [`NotificationState::apply`] (or the by-value [`reduce`]). The unread
//! counter is maintained incrementally by each transition;
//! [`NotificationState::recount_unread`] exists to check it, not to drive it.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet, VecDeque};
use tracing::debug;

use super::types::{CategoryFilter, Notification, NotificationId, NotificationStats, SortMode};

/// A single state transition request.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    Add(Notification),
    Remove(NotificationId),
    MarkRead(NotificationId),
    MarkAllRead,
    Dismiss(NotificationId),
    DismissAll,
    SetFilter(CategoryFilter),
    SetSortBy(SortMode),
    ClearExpired(DateTime<Utc>),
}

/// What a command did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// The notification list changed and must be persisted.
    pub list_changed: bool,
    /// Entries added, modified or removed by the command.
    pub affected: Vec<NotificationId>,
}

impl Transition {
    fn unchanged() -> Self {
        Self::default()
    }

    fn changed(affected: Vec<NotificationId>) -> Self {
        Self { list_changed: !affected.is_empty(), affected }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationState {
    /// Most recent first.
    notifications: VecDeque<Notification>,
    unread_count: usize,
    filter: CategoryFilter,
    sort_by: SortMode,
}

impl NotificationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a state from a persisted list (most recent first). Later
    /// duplicates of an id are dropped.
    pub fn from_notifications(list: Vec<Notification>) -> Self {
        let mut seen = HashSet::with_capacity(list.len());
        let notifications: VecDeque<Notification> =
            list.into_iter().filter(|n| seen.insert(n.id.clone())).collect();
        let mut state = Self { notifications, ..Self::default() };
        state.unread_count = state.recount_unread();
        state
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn sort_by(&self) -> SortMode {
        self.sort_by
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn to_vec(&self) -> Vec<Notification> {
        self.notifications.iter().cloned().collect()
    }

    /// Counts unread entries from scratch.
    pub fn recount_unread(&self) -> usize {
        self.notifications.iter().filter(|n| n.is_unread()).count()
    }

    pub fn stats(&self) -> NotificationStats {
        let mut by_category = BTreeMap::new();
        let mut dismissed = 0;
        for n in &self.notifications {
            *by_category.entry(n.category).or_insert(0) += 1;
            if n.dismissed {
                dismissed += 1;
            }
        }
        NotificationStats {
            total: self.notifications.len(),
            unread: self.unread_count,
            dismissed,
            by_category,
        }
    }

    /// Visible entries under the active filter and sort mode.
    ///
    /// Dismissed entries are excluded. Priority and category modes break ties
    /// by descending timestamp; equal timestamps keep list order.
    pub fn filtered(&self) -> Vec<Notification> {
        let mut visible: Vec<Notification> = self
            .notifications
            .iter()
            .filter(|n| !n.dismissed && self.filter.matches(n.category))
            .cloned()
            .collect();

        match self.sort_by {
            SortMode::Timestamp => visible.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            SortMode::Priority => visible.sort_by(|a, b| {
                a.priority
                    .rank()
                    .cmp(&b.priority.rank())
                    .then_with(|| b.timestamp.cmp(&a.timestamp))
            }),
            SortMode::Category => visible.sort_by(|a, b| {
                a.category
                    .as_str()
                    .cmp(b.category.as_str())
                    .then_with(|| b.timestamp.cmp(&a.timestamp))
            }),
        }
        visible
    }

    /// Applies `command` in place. Commands naming an absent id are no-ops.
    pub fn apply(&mut self, command: StoreCommand) -> Transition {
        match command {
            StoreCommand::Add(notification) => {
                if self.get(&notification.id).is_some() {
                    debug!("Ignoring add of existing notification {}", notification.id);
                    return Transition::unchanged();
                }
                let id = notification.id.clone();
                if notification.is_unread() {
                    self.unread_count += 1;
                }
                self.notifications.push_front(notification);
                debug!("Added notification {} (unread: {})", id, self.unread_count);
                Transition::changed(vec![id])
            }
            StoreCommand::Remove(id) => {
                let Some(index) = self.notifications.iter().position(|n| n.id == id) else {
                    return Transition::unchanged();
                };
                if let Some(removed) = self.notifications.remove(index) {
                    if removed.is_unread() {
                        self.unread_count = self.unread_count.saturating_sub(1);
                    }
                }
                debug!("Removed notification {} (unread: {})", id, self.unread_count);
                Transition::changed(vec![id])
            }
            StoreCommand::MarkRead(id) => {
                let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) else {
                    return Transition::unchanged();
                };
                if n.read {
                    return Transition::unchanged();
                }
                let was_unread = n.is_unread();
                n.mark_as_read();
                if was_unread {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
                debug!("Marked notification {} read (unread: {})", id, self.unread_count);
                Transition::changed(vec![id])
            }
            StoreCommand::MarkAllRead => {
                let mut affected = Vec::new();
                for n in self.notifications.iter_mut().filter(|n| !n.read) {
                    n.mark_as_read();
                    affected.push(n.id.clone());
                }
                self.unread_count = 0;
                debug!("Marked {} notifications read", affected.len());
                Transition::changed(affected)
            }
            StoreCommand::Dismiss(id) => {
                let Some(n) = self.notifications.iter_mut().find(|n| n.id == id) else {
                    return Transition::unchanged();
                };
                if n.dismissed {
                    return Transition::unchanged();
                }
                let was_unread = n.is_unread();
                n.dismiss();
                if was_unread {
                    self.unread_count = self.unread_count.saturating_sub(1);
                }
                debug!("Dismissed notification {} (unread: {})", id, self.unread_count);
                Transition::changed(vec![id])
            }
            StoreCommand::DismissAll => {
                let mut affected = Vec::new();
                for n in self.notifications.iter_mut().filter(|n| !n.dismissed) {
                    n.dismiss();
                    affected.push(n.id.clone());
                }
                self.unread_count = 0;
                debug!("Dismissed {} notifications", affected.len());
                Transition::changed(affected)
            }
            StoreCommand::SetFilter(filter) => {
                self.filter = filter;
                Transition::unchanged()
            }
            StoreCommand::SetSortBy(sort_by) => {
                self.sort_by = sort_by;
                Transition::unchanged()
            }
            StoreCommand::ClearExpired(now) => {
                let mut removed = Vec::new();
                let mut removed_unread = 0;
                self.notifications.retain(|n| {
                    if n.is_expired_at(now) {
                        removed.push(n.id.clone());
                        if n.is_unread() {
                            removed_unread += 1;
                        }
                        false
                    } else {
                        true
                    }
                });
                self.unread_count = self.unread_count.saturating_sub(removed_unread);
                if !removed.is_empty() {
                    debug!(
                        "Cleared {} expired notifications (unread: {})",
                        removed.len(),
                        self.unread_count
                    );
                }
                Transition::changed(removed)
            }
        }
    }
}

/// Pure form of [`NotificationState::apply`].
pub fn reduce(
    mut state: NotificationState,
    command: StoreCommand,
) -> (NotificationState, Transition) {
    let transition = state.apply(command);
    (state, transition)
}

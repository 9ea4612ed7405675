use tokio::sync::broadcast;
use tracing::trace;

use super::toast::ToastNotification;
use super::types::{Notification, NotificationCategory, NotificationId, NotificationPriority};

/// Why a toast left the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastDismissReason {
    User,
    Timeout,
}

/// Change notifications broadcast to UI subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Added { notification: Notification },
    /// The admission gate denied a request.
    Suppressed { category: NotificationCategory, priority: NotificationPriority },
    Read { id: NotificationId },
    AllRead,
    Dismissed { id: NotificationId },
    AllDismissed,
    Removed { id: NotificationId },
    Expired { ids: Vec<NotificationId> },
    ToastShown { toast: ToastNotification },
    ToastDismissed { id: NotificationId, reason: ToastDismissReason },
    PreferencesChanged,
}

/// Sends `event`, ignoring the case where nobody is listening.
pub(crate) fn publish(sender: &broadcast::Sender<NotificationEvent>, event: NotificationEvent) {
    if let Err(broadcast::error::SendError(event)) = sender.send(event) {
        trace!("No subscribers for notification event {:?}", event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_reaches_subscribers_and_tolerates_none() {
        let (tx, _) = broadcast::channel(4);
        publish(&tx, NotificationEvent::AllRead);

        let mut rx = tx.subscribe();
        let id = NotificationId::generate();
        publish(&tx, NotificationEvent::Removed { id: id.clone() });
        assert_eq!(rx.recv().await.unwrap(), NotificationEvent::Removed { id });
    }
}

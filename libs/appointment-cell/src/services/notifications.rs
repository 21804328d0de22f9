// libs/appointment-cell/src/services/notifications.rs
use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

/// One addressee of an appointment notification.
#[derive(Debug, Clone)]
pub struct NotificationRecipient {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    AppointmentInvitation,
    AppointmentCancellation,
    AppointmentReminder,
}

impl NotificationKind {
    pub fn template_name(&self) -> &'static str {
        match self {
            NotificationKind::AppointmentInvitation => "appointment-invitation",
            NotificationKind::AppointmentCancellation => "appointment-cancellation",
            NotificationKind::AppointmentReminder => "appointment-reminder",
        }
    }
}

/// Port for outbound appointment notifications.
///
/// Delivery is fire-and-forget: implementations queue or log and never hand
/// an error back, so a broken mail relay cannot fail a booking.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send_batch(
        &self,
        recipients: &[NotificationRecipient],
        kind: NotificationKind,
        data: &Value,
    );
}

/// Default dispatcher: records the batch in the application log.
pub struct LoggingDispatcher;

#[async_trait]
impl NotificationDispatcher for LoggingDispatcher {
    async fn send_batch(
        &self,
        recipients: &[NotificationRecipient],
        kind: NotificationKind,
        _data: &Value,
    ) {
        info!(
            "Dispatching {} notification to {} recipient(s)",
            kind.template_name(),
            recipients.len()
        );
    }
}

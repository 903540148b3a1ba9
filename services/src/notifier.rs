//! Fire-and-forget notifications sent after successful state transitions.
//!
//! A failed delivery is logged and dropped; it never fails or rolls back the
//! transition that triggered it.

use db::models::notification::{self, NewNotification, NotificationKind};
use db::models::{activity, enrollment};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub activity_id: Option<i64>,
    pub enrollment_id: Option<i64>,
}

impl Notification {
    fn about(
        kind: NotificationKind,
        enrollment: &enrollment::Model,
        title: String,
        message: String,
    ) -> Self {
        Self {
            user_id: enrollment.student_id,
            kind,
            title,
            message,
            activity_id: Some(enrollment.activity_id),
            enrollment_id: Some(enrollment.id),
        }
    }

    pub fn application_accepted(enrollment: &enrollment::Model, activity: &activity::Model) -> Self {
        Self::about(
            NotificationKind::ApplicationAccepted,
            enrollment,
            "Application accepted".into(),
            format!("You have a confirmed spot in \"{}\".", activity.title),
        )
    }

    pub fn application_rejected(
        enrollment: &enrollment::Model,
        activity: &activity::Model,
        reason: &str,
    ) -> Self {
        Self::about(
            NotificationKind::ApplicationRejected,
            enrollment,
            "Application not accepted".into(),
            format!("Your application to \"{}\" was declined: {reason}", activity.title),
        )
    }

    pub fn application_waitlisted(enrollment: &enrollment::Model, activity: &activity::Model) -> Self {
        Self::about(
            NotificationKind::ApplicationWaitlisted,
            enrollment,
            "Added to waitlist".into(),
            format!("You are on the waitlist for \"{}\".", activity.title),
        )
    }

    pub fn application_promoted(enrollment: &enrollment::Model, activity: &activity::Model) -> Self {
        Self::about(
            NotificationKind::ApplicationPromoted,
            enrollment,
            "Off the waitlist".into(),
            format!("A spot opened up in \"{}\" and it is yours.", activity.title),
        )
    }

    pub fn hours_approved(enrollment: &enrollment::Model, hours: f64) -> Self {
        Self::about(
            NotificationKind::HoursApproved,
            enrollment,
            "Hours approved".into(),
            format!("{hours:.2} volunteer hours were approved."),
        )
    }

    pub fn hours_rejected(enrollment: &enrollment::Model, reason: &str) -> Self {
        Self::about(
            NotificationKind::HoursRejected,
            enrollment,
            "Hours request rejected".into(),
            format!("Your hours request was rejected: {reason}"),
        )
    }

    pub fn certificate_issued(enrollment: &enrollment::Model, number: &str) -> Self {
        Self::about(
            NotificationKind::CertificateIssued,
            enrollment,
            "Certificate issued".into(),
            format!("Certificate {number} is ready."),
        )
    }
}

impl From<Notification> for NewNotification {
    fn from(n: Notification) -> Self {
        NewNotification {
            user_id: n.user_id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            activity_id: n.activity_id,
            enrollment_id: n.enrollment_id,
        }
    }
}

pub trait Notifier: Send + Sync {
    /// Must return without waiting on delivery.
    fn notify(&self, notification: Notification);
}

/// Persists notifications as rows on a background task.
#[derive(Clone)]
pub struct DbNotifier {
    db: DatabaseConnection,
}

impl DbNotifier {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl Notifier for DbNotifier {
    fn notify(&self, notification: Notification) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(
                user_id = notification.user_id,
                kind = %notification.kind,
                "No runtime available; notification dropped"
            );
            return;
        };

        let db = self.db.clone();
        handle.spawn(async move {
            let user_id = notification.user_id;
            let kind = notification.kind;
            if let Err(e) = notification::Model::create(&db, notification.into()).await {
                tracing::warn!(user_id, kind = %kind, error = %e, "Failed to store notification");
            }
        });
    }
}

/// Keeps every notification in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    pub fn kinds(&self) -> Vec<NotificationKind> {
        self.sent().into_iter().map(|n| n.kind).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notification);
        }
    }
}

use anyhow::Result;
use chrono::NaiveDate;
use futures_util::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use crate::database::models::LeaveApplication;
use crate::leave::{Days, LeaveType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveEvent {
    Submitted,
    Approved,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct LeaveNotification {
    pub event: LeaveEvent,
    pub recipient_id: Uuid,
    pub recipient_email: String,
    pub application_id: Uuid,
    pub applicant_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_days: Days,
    pub rejection_reason: Option<String>,
}

impl LeaveNotification {
    pub fn for_application(
        event: LeaveEvent,
        application: &LeaveApplication,
        recipient_id: Uuid,
        recipient_email: &str,
    ) -> Self {
        Self {
            event,
            recipient_id,
            recipient_email: recipient_email.to_string(),
            application_id: application.id,
            applicant_id: application.user_id,
            leave_type: application.leave_type,
            start_date: application.start_date,
            end_date: application.end_date,
            leave_days: application.leave_days.clone(),
            rejection_reason: application.rejection_reason.clone(),
        }
    }

    pub fn subject(&self) -> String {
        let name = self.leave_type.display_name();
        match self.event {
            LeaveEvent::Submitted => format!("New {} request awaiting approval", name),
            LeaveEvent::Approved => format!("Your {} request was approved", name),
            LeaveEvent::Rejected => format!("Your {} request was rejected", name),
        }
    }
}

/// Delivers leave notifications. Failures are logged by the caller and never
/// undo the operation that triggered them.
pub trait Notifier: Send + Sync {
    fn notify<'a>(&'a self, notification: &'a LeaveNotification) -> BoxFuture<'a, Result<()>>;
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify<'a>(&'a self, notification: &'a LeaveNotification) -> BoxFuture<'a, Result<()>> {
        log::info!(
            "Notify {} <{}>: {} ({} to {}, {} days, application {})",
            notification.recipient_id,
            notification.recipient_email,
            notification.subject(),
            notification.start_date,
            notification.end_date,
            notification.leave_days,
            notification.application_id
        );
        futures_util::future::ready(Ok(())).boxed()
    }
}

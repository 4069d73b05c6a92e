pub mod notification;
pub mod query;
pub mod request;

pub use notification::{
    NewNotification, Notification, NotificationStatus, NotificationType, RetryAck,
    SubmittedNotification,
};
pub use query::{NotificationPage, NotificationQuery, NotificationStats, DEFAULT_PAGE_LIMIT};
pub use request::{flatten_validation_errors, SubmitNotificationRequest};

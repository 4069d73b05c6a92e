pub mod config;
pub mod errors;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use errors::*;
pub use models::{
    NewNotification, Notification, NotificationPage, NotificationQuery, NotificationStats,
    NotificationStatus, NotificationType, RetryAck, SubmitNotificationRequest,
    SubmittedNotification,
};
pub use traits::{NotificationRepository, Transport};

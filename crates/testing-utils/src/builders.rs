//! 通知记录的测试数据构建器

use chrono::{DateTime, Utc};
use notifier_core::models::{
    NewNotification, Notification, NotificationStatus, NotificationType,
    SubmitNotificationRequest,
};

/// 构建测试用的通知记录
pub struct NotificationBuilder {
    notification: Notification,
}

impl NotificationBuilder {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            notification: Notification {
                id: 1,
                user_id: "user-1".to_string(),
                notification_type: NotificationType::Email,
                title: "Test notification".to_string(),
                message: "Hello from the test suite".to_string(),
                status: NotificationStatus::Pending,
                priority: false,
                retry_count: 0,
                created_at: now,
                updated_at: now,
                delivered_at: None,
            },
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.notification.id = id;
        self
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.notification.user_id = user_id.to_string();
        self
    }

    pub fn with_type(mut self, notification_type: NotificationType) -> Self {
        self.notification.notification_type = notification_type;
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.notification.title = title.to_string();
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.notification.message = message.to_string();
        self
    }

    pub fn with_status(mut self, status: NotificationStatus) -> Self {
        self.notification.status = status;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.notification.retry_count = retry_count;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.notification.created_at = created_at;
        self.notification.updated_at = created_at;
        self
    }

    pub fn failed(self) -> Self {
        self.with_status(NotificationStatus::Failed)
    }

    pub fn delivered(mut self) -> Self {
        self.notification.status = NotificationStatus::Delivered;
        self.notification.delivered_at = Some(self.notification.updated_at);
        self
    }

    pub fn build(self) -> Notification {
        self.notification
    }

    /// 转换为仓储创建参数，ID 与时间戳由仓储重新分配
    pub fn build_new(self) -> NewNotification {
        let n = self.notification;
        NewNotification {
            user_id: n.user_id,
            notification_type: n.notification_type,
            title: n.title,
            message: n.message,
            status: n.status,
            priority: n.priority,
            retry_count: n.retry_count,
        }
    }
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 构造合法的提交请求
pub fn submit_request(user_id: &str, notification_type: NotificationType) -> SubmitNotificationRequest {
    SubmitNotificationRequest::new(user_id, notification_type, "Test notification", "Hello")
}

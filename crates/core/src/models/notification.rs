use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 通知记录
///
/// 对外序列化字段使用 camelCase，与 HTTP 接口保持一致。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub priority: bool,
    pub retry_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub delivered_at: Option<DateTime<Utc>>,
}

/// 投递状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Delivered,
    Failed,
}

/// 通知渠道类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NotificationType {
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "sms")]
    Sms,
    #[serde(rename = "in-app")]
    InApp,
}

/// 新建通知所需的数据，ID 和时间戳由仓储生成
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub status: NotificationStatus,
    pub priority: bool,
    pub retry_count: u32,
}

/// 提交成功后返回给调用方的摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedNotification {
    pub id: i64,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub status: NotificationStatus,
    pub created_at: DateTime<Utc>,
}

/// 手动重试的受理回执
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryAck {
    pub id: i64,
    pub message: String,
}

impl NotificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid notification status: {s}")),
        }
    }
}

impl NotificationType {
    pub const ALL: [NotificationType; 3] = [Self::Email, Self::Sms, Self::InApp];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::InApp => "in-app",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "in-app" => Ok(Self::InApp),
            _ => Err(format!("Invalid notification type: {s}")),
        }
    }
}

impl Notification {
    /// 由仓储在创建时调用，`delivered_at` 仅在初始状态为已送达时填充
    pub fn from_new(id: i64, new: NewNotification, now: DateTime<Utc>) -> Self {
        let delivered_at = (new.status == NotificationStatus::Delivered).then_some(now);
        Self {
            id,
            user_id: new.user_id,
            notification_type: new.notification_type,
            title: new.title,
            message: new.message,
            status: new.status,
            priority: new.priority,
            retry_count: new.retry_count,
            created_at: now,
            updated_at: now,
            delivered_at,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == NotificationStatus::Pending
    }

    pub fn is_delivered(&self) -> bool {
        self.status == NotificationStatus::Delivered
    }

    pub fn is_failed(&self) -> bool {
        self.status == NotificationStatus::Failed
    }

    /// 自动重试配额是否已耗尽
    pub fn retries_exhausted(&self, max_retries: u32) -> bool {
        self.retry_count >= max_retries
    }

    /// 更新状态；进入已送达时总是刷新 `delivered_at`，其它状态保留原值
    pub fn update_status(&mut self, status: NotificationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
        if status == NotificationStatus::Delivered {
            self.delivered_at = Some(now);
        }
    }

    pub fn increment_retry(&mut self, now: DateTime<Utc>) {
        self.retry_count += 1;
        self.updated_at = now;
    }
}

impl NewNotification {
    pub fn pending(
        user_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            notification_type,
            title: title.into(),
            message: message.into(),
            status: NotificationStatus::Pending,
            priority: false,
            retry_count: 0,
        }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }
}

impl From<&Notification> for SubmittedNotification {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            user_id: notification.user_id.clone(),
            notification_type: notification.notification_type,
            title: notification.title.clone(),
            status: notification.status,
            created_at: notification.created_at,
        }
    }
}

impl RetryAck {
    pub fn initiated(id: i64) -> Self {
        Self {
            id,
            message: "Notification retry initiated".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(status: NotificationStatus) -> Notification {
        let new = NewNotification {
            status,
            ..NewNotification::pending("user-1", NotificationType::Email, "Hi", "Body")
        };
        Notification::from_new(1, new, Utc::now())
    }

    #[test]
    fn test_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotificationType::InApp).unwrap(),
            "\"in-app\""
        );
        assert_eq!("sms".parse::<NotificationType>(), Ok(NotificationType::Sms));
        assert!("push".parse::<NotificationType>().is_err());
        assert!("Email".parse::<NotificationType>().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&NotificationStatus::Delivered).unwrap(),
            "\"delivered\""
        );
        assert_eq!(
            "failed".parse::<NotificationStatus>(),
            Ok(NotificationStatus::Failed)
        );
    }

    #[test]
    fn test_from_new_sets_delivered_at_only_when_delivered() {
        let pending = sample(NotificationStatus::Pending);
        assert!(pending.delivered_at.is_none());
        assert_eq!(pending.created_at, pending.updated_at);

        let delivered = sample(NotificationStatus::Delivered);
        assert_eq!(delivered.delivered_at, Some(delivered.created_at));
    }

    #[test]
    fn test_delivered_at_survives_later_transitions() {
        let mut notification = sample(NotificationStatus::Pending);
        let delivered_time = Utc::now();
        notification.update_status(NotificationStatus::Delivered, delivered_time);
        notification.update_status(NotificationStatus::Failed, Utc::now());

        assert!(notification.is_failed());
        assert_eq!(notification.delivered_at, Some(delivered_time));
    }

    #[test]
    fn test_serialization_uses_camel_case() {
        let notification = sample(NotificationStatus::Pending);
        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["type"], "email");
        assert_eq!(json["retryCount"], 0);
        assert!(json["deliveredAt"].is_null());
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn test_retries_exhausted() {
        let mut notification = sample(NotificationStatus::Failed);
        assert!(!notification.retries_exhausted(3));
        for _ in 0..3 {
            notification.increment_retry(Utc::now());
        }
        assert!(notification.retries_exhausted(3));
    }
}

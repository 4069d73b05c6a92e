use serde::{Deserialize, Serialize};

use super::notification::{Notification, NotificationStatus, NotificationType};

/// 未指定 limit 时的默认分页大小
pub const DEFAULT_PAGE_LIMIT: usize = 10;

/// 按用户查询通知的过滤与分页条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub status: Option<NotificationStatus>,
    pub notification_type: Option<NotificationType>,
}

impl NotificationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_type(mut self, notification_type: NotificationType) -> Self {
        self.notification_type = Some(notification_type);
        self
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_PAGE_LIMIT)
    }

    pub fn effective_offset(&self) -> usize {
        self.offset.unwrap_or(0)
    }

    /// 用户之外的过滤条件是否命中
    pub fn matches(&self, notification: &Notification) -> bool {
        let status_ok = match self.status {
            Some(status) => notification.status == status,
            None => true,
        };
        let type_ok = match self.notification_type {
            Some(notification_type) => notification.notification_type == notification_type,
            None => true,
        };
        status_ok && type_ok
    }
}

/// 分页结果，`total` 为过滤后、分页前的数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl NotificationPage {
    pub fn empty(query: &NotificationQuery) -> Self {
        Self {
            notifications: Vec::new(),
            total: 0,
            limit: query.effective_limit(),
            offset: query.effective_offset(),
        }
    }
}

/// 全局投递统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationStats {
    pub total: u64,
    pub delivered: u64,
    pub failed: u64,
    pub pending: u64,
    pub delivery_rate: f64,
}

impl NotificationStats {
    /// 由各状态计数构造，送达率为百分比并保留一位小数，总数为 0 时为 0
    pub fn from_counts(delivered: u64, failed: u64, pending: u64) -> Self {
        let total = delivered + failed + pending;
        let delivery_rate = if total == 0 {
            0.0
        } else {
            (delivered as f64 * 1000.0 / total as f64).round() / 10.0
        };
        Self {
            total,
            delivered,
            failed,
            pending,
            delivery_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewNotification;
    use chrono::Utc;

    #[test]
    fn test_query_defaults() {
        let query = NotificationQuery::new();
        assert_eq!(query.effective_limit(), 10);
        assert_eq!(query.effective_offset(), 0);

        let query = NotificationQuery::new().with_limit(5).with_offset(3);
        assert_eq!(query.effective_limit(), 5);
        assert_eq!(query.effective_offset(), 3);
    }

    #[test]
    fn test_query_matches_filters() {
        let notification = Notification::from_new(
            1,
            NewNotification::pending("u1", NotificationType::Sms, "t", "m"),
            Utc::now(),
        );

        assert!(NotificationQuery::new().matches(&notification));
        assert!(NotificationQuery::new()
            .with_type(NotificationType::Sms)
            .with_status(NotificationStatus::Pending)
            .matches(&notification));
        assert!(!NotificationQuery::new()
            .with_type(NotificationType::Email)
            .matches(&notification));
        assert!(!NotificationQuery::new()
            .with_status(NotificationStatus::Failed)
            .matches(&notification));
    }

    #[test]
    fn test_stats_rounding() {
        let stats = NotificationStats::from_counts(7, 2, 1);
        assert_eq!(stats.total, 10);
        assert_eq!(stats.delivery_rate, 70.0);

        let stats = NotificationStats::from_counts(2, 1, 0);
        assert_eq!(stats.delivery_rate, 66.7);

        let stats = NotificationStats::from_counts(1, 2, 0);
        assert_eq!(stats.delivery_rate, 33.3);
    }

    #[test]
    fn test_stats_empty_store() {
        let stats = NotificationStats::from_counts(0, 0, 0);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.delivery_rate, 0.0);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["deliveryRate"], 0.0);
    }
}

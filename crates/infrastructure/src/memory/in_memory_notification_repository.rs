use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use notifier_core::{
    errors::NotifierResult,
    models::{
        NewNotification, Notification, NotificationPage, NotificationQuery, NotificationStats,
        NotificationStatus,
    },
    traits::NotificationRepository,
};
use tokio::sync::RwLock;
use tracing::debug;

/// 内存通知仓储
///
/// 记录和ID计数器放在同一把锁下，ID 分配与插入在一次写锁内完成。
/// 每个实例拥有独立的计数器，ID 从 1 开始。
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    store: RwLock<Store>,
}

#[derive(Debug)]
struct Store {
    records: HashMap<i64, Notification>,
    next_id: i64,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            next_id: 1,
        }
    }
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.records.is_empty()
    }

    async fn modify<F>(&self, id: i64, f: F) -> Option<Notification>
    where
        F: FnOnce(&mut Notification),
    {
        let mut store = self.store.write().await;
        let notification = store.records.get_mut(&id)?;
        f(notification);
        Some(notification.clone())
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn create(&self, notification: NewNotification) -> NotifierResult<Notification> {
        let mut store = self.store.write().await;
        let id = store.next_id;
        store.next_id += 1;

        let created = Notification::from_new(id, notification, Utc::now());
        store.records.insert(id, created.clone());
        debug!(
            "创建通知: id={}, user={}, type={}",
            id, created.user_id, created.notification_type
        );
        Ok(created)
    }

    async fn get(&self, id: i64) -> NotifierResult<Option<Notification>> {
        Ok(self.store.read().await.records.get(&id).cloned())
    }

    async fn query(
        &self,
        user_id: &str,
        query: &NotificationQuery,
    ) -> NotifierResult<NotificationPage> {
        let limit = query.effective_limit();
        let offset = query.effective_offset();

        let store = self.store.read().await;
        let mut matched: Vec<&Notification> = store
            .records
            .values()
            .filter(|n| n.user_id == user_id && query.matches(n))
            .collect();
        matched.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matched.len();
        let notifications = matched
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(NotificationPage {
            notifications,
            total,
            limit,
            offset,
        })
    }

    async fn update_status(
        &self,
        id: i64,
        status: NotificationStatus,
    ) -> NotifierResult<Option<Notification>> {
        Ok(self
            .modify(id, |n| n.update_status(status, Utc::now()))
            .await)
    }

    async fn increment_retry(&self, id: i64) -> NotifierResult<Option<Notification>> {
        Ok(self.modify(id, |n| n.increment_retry(Utc::now())).await)
    }

    async fn list_failed(&self) -> NotifierResult<Vec<Notification>> {
        let store = self.store.read().await;
        let mut failed: Vec<Notification> = store
            .records
            .values()
            .filter(|n| n.is_failed())
            .cloned()
            .collect();
        failed.sort_by_key(|n| n.id);
        Ok(failed)
    }

    async fn stats(&self) -> NotifierResult<NotificationStats> {
        let store = self.store.read().await;
        let (mut delivered, mut failed, mut pending) = (0u64, 0u64, 0u64);
        for notification in store.records.values() {
            match notification.status {
                NotificationStatus::Delivered => delivered += 1,
                NotificationStatus::Failed => failed += 1,
                NotificationStatus::Pending => pending += 1,
            }
        }
        Ok(NotificationStats::from_counts(delivered, failed, pending))
    }
}

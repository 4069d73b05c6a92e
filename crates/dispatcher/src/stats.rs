use std::sync::Arc;

use notifier_core::{
    errors::NotifierResult, models::NotificationStats, traits::NotificationRepository,
};

/// 投递统计服务，无内部状态
#[derive(Clone)]
pub struct StatsService {
    repository: Arc<dyn NotificationRepository>,
}

impl StatsService {
    pub fn new(repository: Arc<dyn NotificationRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_stats(&self) -> NotifierResult<NotificationStats> {
        self.repository.stats().await
    }
}

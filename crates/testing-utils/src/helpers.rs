//! 异步断言用的等待工具

use std::time::Duration;

use notifier_core::{
    models::{Notification, NotificationStatus},
    traits::NotificationRepository,
};
use tokio::time::{sleep, Instant};

/// 测试环境辅助方法
pub struct TestEnv;

impl TestEnv {
    /// 轮询等待条件成立，超时返回最后一次的结果
    ///
    /// 计时使用 tokio 时钟，在 `start_paused` 的测试中同样适用。
    pub async fn wait_for<F, Fut>(mut condition: F, timeout: Duration) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if condition().await {
                return true;
            }
            sleep(Duration::from_millis(100)).await;
        }

        condition().await
    }

    /// 等待通知进入指定状态，超时返回当前记录
    pub async fn wait_for_status(
        repository: &dyn NotificationRepository,
        id: i64,
        status: NotificationStatus,
        timeout: Duration,
    ) -> Option<Notification> {
        let start = Instant::now();

        loop {
            let current = repository.get(id).await.ok().flatten();
            let reached = current.as_ref().map(|n| n.status == status).unwrap_or(false);
            if reached || start.elapsed() >= timeout {
                return current;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }

    /// 等待通知离开 pending 状态
    pub async fn wait_until_settled(
        repository: &dyn NotificationRepository,
        id: i64,
        timeout: Duration,
    ) -> Option<Notification> {
        let start = Instant::now();

        loop {
            let current = repository.get(id).await.ok().flatten();
            let settled = current.as_ref().map(|n| !n.is_pending()).unwrap_or(false);
            if settled || start.elapsed() >= timeout {
                return current;
            }
            sleep(Duration::from_millis(10)).await;
        }
    }
}

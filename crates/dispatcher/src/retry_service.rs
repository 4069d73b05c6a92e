use std::time::Duration;

use metrics::counter;
use notifier_core::{
    config::RetryConfig,
    errors::NotifierResult,
    models::{Notification, NotificationStatus},
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};

use crate::dispatcher::NotificationDispatcher;

/// 单次扫描的结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// 扫描到的失败通知数量
    pub scanned: usize,
    /// 重新排队投递的数量
    pub requeued: usize,
    /// 已达重试上限而跳过的数量
    pub exhausted: usize,
    /// 因记录消失或仓储错误而跳过的数量
    pub skipped: usize,
}

/// 失败通知重试扫描器
///
/// 按固定周期扫描失败通知，未达上限的记录重试次数加一、重置为 pending 并重新投递。
/// 没有退避和抖动，达到上限的记录永远不再被处理。
pub struct RetrySweeper {
    dispatcher: NotificationDispatcher,
    config: RetryConfig,
}

impl RetrySweeper {
    pub fn new(dispatcher: NotificationDispatcher, config: RetryConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// 执行一次扫描
    ///
    /// 逐条处理，单条记录出错只记录日志并继续；本次扫描不等待重新发起的投递。
    pub async fn sweep(&self) -> NotifierResult<SweepReport> {
        debug!("扫描需要重试的通知");

        let failed = self.dispatcher.repository().list_failed().await?;
        let mut report = SweepReport {
            scanned: failed.len(),
            ..SweepReport::default()
        };

        for notification in failed {
            if notification.retries_exhausted(self.config.max_retries) {
                report.exhausted += 1;
                continue;
            }

            match self.requeue(&notification).await {
                Ok(Some(pending)) => {
                    debug!(
                        "通知 {} 重新投递，重试次数: {}",
                        pending.id, pending.retry_count
                    );
                    self.dispatcher.spawn_delivery(pending);
                    report.requeued += 1;
                }
                Ok(None) => {
                    warn!("通知 {} 在重试前已不存在", notification.id);
                    report.skipped += 1;
                }
                Err(e) => {
                    error!("重试通知 {} 失败: {}", notification.id, e);
                    report.skipped += 1;
                }
            }
        }

        if report.requeued > 0 {
            counter!("notifier_retry_requeued_total").increment(report.requeued as u64);
            info!(
                "本次扫描重新投递了 {} 个通知 (跳过 {}, 已达上限 {})",
                report.requeued, report.skipped, report.exhausted
            );
        }

        Ok(report)
    }

    async fn requeue(&self, notification: &Notification) -> NotifierResult<Option<Notification>> {
        let repository = self.dispatcher.repository();
        if repository.increment_retry(notification.id).await?.is_none() {
            return Ok(None);
        }
        repository
            .update_status(notification.id, NotificationStatus::Pending)
            .await
    }

    /// 运行扫描循环，直到收到关闭信号
    ///
    /// 首次扫描在启动后一个完整周期触发。
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) {
        let period = Duration::from_secs(self.config.interval_seconds.max(1));
        let mut interval = interval_at(Instant::now() + period, period);

        info!(
            "重试扫描器已启动: 间隔 {}s, 最大重试次数 {}",
            self.config.interval_seconds, self.config.max_retries
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.sweep().await {
                        error!("重试扫描失败: {}", e);
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("重试扫描器收到关闭信号");
                    break;
                }
            }
        }
    }

    pub fn spawn(self, shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown_rx))
    }
}

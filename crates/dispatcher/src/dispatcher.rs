//! 通知分发器
//!
//! 负责提交校验、记录创建、异步投递和手动重试。投递在独立的 tokio 任务中执行，
//! 提交方不会等待投递结果；投递路径上的任何错误都只会让记录落为失败状态。

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use metrics::counter;
use notifier_core::{
    errors::{NotifierError, NotifierResult},
    models::{
        Notification, NotificationPage, NotificationQuery, NotificationStatus, NotificationType,
        RetryAck, SubmitNotificationRequest,
    },
    traits::{NotificationRepository, Transport},
};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 按渠道存放的投递通道，每个渠道一个槽位
#[derive(Clone, Default)]
pub struct TransportSet {
    email: Option<Arc<dyn Transport>>,
    sms: Option<Arc<dyn Transport>>,
    in_app: Option<Arc<dyn Transport>>,
}

impl TransportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按通道自身声明的渠道放入对应槽位，同一渠道后放入的覆盖先放入的
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        let slot = match transport.channel() {
            NotificationType::Email => &mut self.email,
            NotificationType::Sms => &mut self.sms,
            NotificationType::InApp => &mut self.in_app,
        };
        *slot = Some(transport);
        self
    }

    pub fn from_transports(transports: impl IntoIterator<Item = Arc<dyn Transport>>) -> Self {
        transports
            .into_iter()
            .fold(Self::new(), |set, transport| set.with_transport(transport))
    }

    pub fn get(&self, notification_type: NotificationType) -> Option<&Arc<dyn Transport>> {
        match notification_type {
            NotificationType::Email => self.email.as_ref(),
            NotificationType::Sms => self.sms.as_ref(),
            NotificationType::InApp => self.in_app.as_ref(),
        }
    }

    pub fn missing_channels(&self) -> Vec<NotificationType> {
        NotificationType::ALL
            .into_iter()
            .filter(|channel| self.get(*channel).is_none())
            .collect()
    }

    /// 所有渠道都必须有对应的投递通道
    pub fn ensure_complete(&self) -> NotifierResult<()> {
        let missing = self.missing_channels();
        if missing.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = missing.iter().map(|c| c.as_str()).collect();
        Err(NotifierError::Configuration(format!(
            "缺少投递通道: {}",
            names.join(", ")
        )))
    }
}

/// 通知分发器
///
/// 内部全部为 `Arc`，克隆开销很小，可直接交给后台任务使用。
#[derive(Clone)]
pub struct NotificationDispatcher {
    repository: Arc<dyn NotificationRepository>,
    transports: Arc<TransportSet>,
}

impl NotificationDispatcher {
    /// 创建分发器，任一渠道缺少投递通道时返回配置错误
    pub fn new(
        repository: Arc<dyn NotificationRepository>,
        transports: TransportSet,
    ) -> NotifierResult<Self> {
        transports.ensure_complete()?;
        Ok(Self::new_partial(repository, transports))
    }

    /// 允许缺少部分渠道；缺失渠道的通知投递时直接记为失败
    pub fn new_partial(
        repository: Arc<dyn NotificationRepository>,
        transports: TransportSet,
    ) -> Self {
        let missing = transports.missing_channels();
        if !missing.is_empty() {
            warn!("分发器缺少投递通道: {:?}", missing);
        }
        Self {
            repository,
            transports: Arc::new(transports),
        }
    }

    pub fn repository(&self) -> &Arc<dyn NotificationRepository> {
        &self.repository
    }

    /// 提交通知
    ///
    /// 校验通过后创建 pending 记录并立即返回，投递在后台进行。
    /// 校验失败时不会创建任何记录。
    pub async fn submit(&self, request: SubmitNotificationRequest) -> NotifierResult<Notification> {
        let new_notification = request.validate()?;
        let notification = self.repository.create(new_notification).await?;

        counter!(
            "notifier_notifications_submitted_total",
            "channel" => notification.notification_type.as_str()
        )
        .increment(1);
        info!(
            "通知已提交: id={}, user={}, type={}",
            notification.id, notification.user_id, notification.notification_type
        );

        self.spawn_delivery(notification.clone());
        Ok(notification)
    }

    /// 在后台任务中投递，返回的句柄可用于等待最终状态
    pub fn spawn_delivery(&self, notification: Notification) -> JoinHandle<NotificationStatus> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.deliver(&notification).await })
    }

    /// 投递一次并写回最终状态
    ///
    /// 通道返回失败、通道错误、通道缺失或通道 panic 都记为失败。
    pub async fn deliver(&self, notification: &Notification) -> NotificationStatus {
        let channel = notification.notification_type;
        let outcome = match self.transports.get(channel) {
            Some(transport) => AssertUnwindSafe(transport.attempt(
                &notification.user_id,
                &notification.title,
                &notification.message,
            ))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| Err(NotifierError::transport(channel, "投递通道发生panic"))),
            None => Err(NotifierError::Configuration(format!(
                "缺少 {channel} 投递通道"
            ))),
        };

        let (status, label) = match outcome {
            Ok(true) => (NotificationStatus::Delivered, "delivered"),
            Ok(false) => {
                warn!("通知 {} 投递失败: channel={}", notification.id, channel);
                (NotificationStatus::Failed, "failed")
            }
            Err(e) => {
                error!("通知 {} 投递出错: {}", notification.id, e);
                (NotificationStatus::Failed, "error")
            }
        };
        counter!(
            "notifier_delivery_attempts_total",
            "channel" => channel.as_str(),
            "outcome" => label
        )
        .increment(1);

        match self.repository.update_status(notification.id, status).await {
            Ok(Some(_)) => debug!("通知 {} 状态更新为 {}", notification.id, status),
            Ok(None) => warn!("通知 {} 已不存在，忽略投递结果 {}", notification.id, status),
            Err(e) => error!("更新通知 {} 状态失败: {}", notification.id, e),
        }

        status
    }

    /// 手动重试失败的通知
    ///
    /// 只接受失败状态的记录，重置为 pending 后在后台重新投递，不增加重试次数。
    pub async fn retry(&self, id: i64) -> NotifierResult<RetryAck> {
        let notification = self
            .repository
            .get(id)
            .await?
            .ok_or(NotifierError::NotificationNotFound { id })?;

        if !notification.is_failed() {
            return Err(NotifierError::InvalidState {
                id,
                status: notification.status,
            });
        }

        let pending = self
            .repository
            .update_status(id, NotificationStatus::Pending)
            .await?
            .ok_or(NotifierError::NotificationNotFound { id })?;

        info!("手动重试通知: id={}, retry_count={}", id, pending.retry_count);
        self.spawn_delivery(pending);
        Ok(RetryAck::initiated(id))
    }

    /// 查询用户的通知
    pub async fn list_for_user(
        &self,
        user_id: &str,
        query: &NotificationQuery,
    ) -> NotifierResult<NotificationPage> {
        self.repository.query(user_id, query).await
    }

    pub async fn get(&self, id: i64) -> NotifierResult<Notification> {
        self.repository
            .get(id)
            .await?
            .ok_or(NotifierError::NotificationNotFound { id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifier_testing_utils::ScriptedTransport;

    #[test]
    fn test_transport_set_routes_by_channel() {
        let set = TransportSet::new()
            .with_transport(Arc::new(ScriptedTransport::succeeding(NotificationType::Sms)));

        assert!(set.get(NotificationType::Sms).is_some());
        assert!(set.get(NotificationType::Email).is_none());
        assert_eq!(
            set.missing_channels(),
            vec![NotificationType::Email, NotificationType::InApp]
        );
        assert!(matches!(
            set.ensure_complete(),
            Err(NotifierError::Configuration(_))
        ));
    }

    #[test]
    fn test_complete_transport_set() {
        let set = TransportSet::from_transports(NotificationType::ALL.into_iter().map(|c| {
            Arc::new(ScriptedTransport::succeeding(c)) as Arc<dyn Transport>
        }));
        assert!(set.ensure_complete().is_ok());
    }
}

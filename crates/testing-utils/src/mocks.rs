//! 仓储与投递通道的测试替身
//!
//! `MockNotificationRepository` 由 `mockall` 生成，用于注入仓储故障；
//! 投递通道替身可以编排每次调用的结果并记录调用参数。

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mockall::mock;
use notifier_core::{
    errors::{NotifierError, NotifierResult},
    models::{
        NewNotification, Notification, NotificationPage, NotificationQuery, NotificationStats,
        NotificationStatus, NotificationType,
    },
    traits::{NotificationRepository, Transport},
};

mock! {
    pub NotificationRepository {}

    #[async_trait]
    impl NotificationRepository for NotificationRepository {
        async fn create(&self, notification: NewNotification) -> NotifierResult<Notification>;
        async fn get(&self, id: i64) -> NotifierResult<Option<Notification>>;
        async fn query(
            &self,
            user_id: &str,
            query: &NotificationQuery,
        ) -> NotifierResult<NotificationPage>;
        async fn update_status(
            &self,
            id: i64,
            status: NotificationStatus,
        ) -> NotifierResult<Option<Notification>>;
        async fn increment_retry(&self, id: i64) -> NotifierResult<Option<Notification>>;
        async fn list_failed(&self) -> NotifierResult<Vec<Notification>>;
        async fn stats(&self) -> NotifierResult<NotificationStats>;
    }
}

/// 一次投递调用的参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCall {
    pub destination: String,
    pub subject: String,
    pub body: String,
}

/// 按脚本返回结果的投递通道
///
/// 脚本耗尽后返回默认结果。
#[derive(Debug)]
pub struct ScriptedTransport {
    channel: NotificationType,
    outcomes: Mutex<VecDeque<bool>>,
    default_outcome: bool,
    latency: Duration,
    calls: Mutex<Vec<TransportCall>>,
}

impl ScriptedTransport {
    pub fn succeeding(channel: NotificationType) -> Self {
        Self::with_default(channel, true)
    }

    pub fn failing(channel: NotificationType) -> Self {
        Self::with_default(channel, false)
    }

    /// 先依次返回 `outcomes`，之后返回 `false`
    pub fn with_outcomes(channel: NotificationType, outcomes: Vec<bool>) -> Self {
        let transport = Self::with_default(channel, false);
        *transport.outcomes.lock().unwrap() = outcomes.into();
        transport
    }

    fn with_default(channel: NotificationType, default_outcome: bool) -> Self {
        Self {
            channel,
            outcomes: Mutex::new(VecDeque::new()),
            default_outcome,
            latency: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn channel(&self) -> NotificationType {
        self.channel
    }

    async fn attempt(&self, destination: &str, subject: &str, body: &str) -> NotifierResult<bool> {
        self.calls.lock().unwrap().push(TransportCall {
            destination: destination.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_outcome);
        Ok(outcome)
    }
}

/// 每次调用都返回通道内部错误
#[derive(Debug, Clone, Copy)]
pub struct ErroringTransport(pub NotificationType);

#[async_trait]
impl Transport for ErroringTransport {
    fn channel(&self) -> NotificationType {
        self.0
    }

    async fn attempt(&self, _destination: &str, _subject: &str, _body: &str) -> NotifierResult<bool> {
        Err(NotifierError::transport(self.0, "connection reset"))
    }
}

/// 每次调用都 panic
#[derive(Debug, Clone, Copy)]
pub struct PanickingTransport(pub NotificationType);

#[async_trait]
impl Transport for PanickingTransport {
    fn channel(&self) -> NotificationType {
        self.0
    }

    async fn attempt(&self, _destination: &str, _subject: &str, _body: &str) -> NotifierResult<bool> {
        panic!("{} transport blew up", self.0)
    }
}

use async_trait::async_trait;
use notifier_core::{errors::NotifierResult, models::NotificationType, traits::Transport};
use tracing::info;

/// 站内信，写入即视为送达
#[derive(Debug, Clone, Copy, Default)]
pub struct InAppTransport;

impl InAppTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for InAppTransport {
    fn channel(&self) -> NotificationType {
        NotificationType::InApp
    }

    async fn attempt(&self, destination: &str, subject: &str, _body: &str) -> NotifierResult<bool> {
        info!("站内信已送达: to={}, subject={}", destination, subject);
        Ok(true)
    }
}

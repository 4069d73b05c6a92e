use std::time::Duration;

use async_trait::async_trait;
use notifier_core::{
    config::ChannelConfig, errors::NotifierResult, models::NotificationType, traits::Transport,
};
use tracing::{info, warn};

/// 模拟外部通道的投递
///
/// 每次调用先等待固定延迟，再以 `success_rate` 的概率成功，各次调用相互独立。
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    channel: NotificationType,
    latency: Duration,
    success_rate: f64,
}

impl SimulatedTransport {
    pub fn new(channel: NotificationType, latency: Duration, success_rate: f64) -> Self {
        Self {
            channel,
            latency,
            success_rate: success_rate.clamp(0.0, 1.0),
        }
    }

    pub fn email(config: &ChannelConfig) -> Self {
        Self::new(
            NotificationType::Email,
            Duration::from_millis(config.latency_ms),
            config.success_rate,
        )
    }

    /// 短信没有标题，投递时忽略 subject
    pub fn sms(config: &ChannelConfig) -> Self {
        Self::new(
            NotificationType::Sms,
            Duration::from_millis(config.latency_ms),
            config.success_rate,
        )
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

#[async_trait]
impl Transport for SimulatedTransport {
    fn channel(&self) -> NotificationType {
        self.channel
    }

    async fn attempt(&self, destination: &str, subject: &str, body: &str) -> NotifierResult<bool> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let delivered = rand::random::<f64>() < self.success_rate;
        match (self.channel, delivered) {
            (NotificationType::Sms, true) => {
                info!("短信已发送: to={}, body={}", destination, body);
            }
            (_, true) => {
                info!(
                    "{}已发送: to={}, subject={}",
                    self.channel, destination, subject
                );
            }
            (_, false) => {
                warn!("{}投递失败: to={}", self.channel, destination);
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds_at_full_rate() {
        let transport = SimulatedTransport::new(NotificationType::Email, Duration::ZERO, 1.0);
        for _ in 0..20 {
            assert!(transport.attempt("user-1", "Hi", "Body").await.unwrap());
        }
    }

    #[tokio::test]
    async fn test_never_succeeds_at_zero_rate() {
        let transport = SimulatedTransport::new(NotificationType::Sms, Duration::ZERO, 0.0);
        for _ in 0..20 {
            assert!(!transport.attempt("user-1", "", "Body").await.unwrap());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_configured_latency() {
        let transport = SimulatedTransport::email(&ChannelConfig::email());
        let started = tokio::time::Instant::now();
        transport.attempt("user-1", "Hi", "Body").await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(800));
    }

    #[test]
    fn test_success_rate_is_clamped() {
        let transport = SimulatedTransport::new(NotificationType::Email, Duration::ZERO, 3.0);
        assert_eq!(transport.success_rate(), 1.0);
    }
}

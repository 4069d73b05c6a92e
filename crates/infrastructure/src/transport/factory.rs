use std::sync::Arc;

use notifier_core::{config::TransportConfig, traits::Transport};
use tracing::info;

use super::{InAppTransport, SimulatedTransport};

/// 投递通道工厂
pub struct TransportFactory;

impl TransportFactory {
    /// 按配置创建全部三个通道
    pub fn create(config: &TransportConfig) -> Vec<Arc<dyn Transport>> {
        info!(
            "创建投递通道: email(latency={}ms, rate={}), sms(latency={}ms, rate={}), in_app",
            config.email.latency_ms,
            config.email.success_rate,
            config.sms.latency_ms,
            config.sms.success_rate
        );

        vec![
            Arc::new(SimulatedTransport::email(&config.email)),
            Arc::new(SimulatedTransport::sms(&config.sms)),
            Arc::new(InAppTransport::new()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notifier_core::models::NotificationType;

    #[test]
    fn test_creates_one_transport_per_channel() {
        let transports = TransportFactory::create(&TransportConfig::default());
        let channels: Vec<NotificationType> = transports.iter().map(|t| t.channel()).collect();
        assert_eq!(channels, NotificationType::ALL.to_vec());
    }

    #[test]
    fn test_channels_follow_config() {
        let mut config = TransportConfig::default();
        config.email.latency_ms = 5;
        config.sms.success_rate = 0.0;

        let transports = TransportFactory::create(&config);
        assert_eq!(transports.len(), 3);
    }
}

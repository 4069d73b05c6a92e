pub mod api_observability;
pub mod app_config;
pub mod retry_transport;

pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use retry_transport::{ChannelConfig, RetryConfig, TransportConfig};

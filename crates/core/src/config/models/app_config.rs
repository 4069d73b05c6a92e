use anyhow::{Context, Result};
use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    retry_transport::{RetryConfig, TransportConfig},
};

/// 未指定配置文件时依次尝试的路径
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["config/notifier.toml", "notifier.toml"];

/// 环境变量前缀
pub const ENV_PREFIX: &str = "NOTIFIER";

/// 服务配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub retry: RetryConfig,
    pub transport: TransportConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// # 参数
    ///
    /// * `config_path` - 配置文件路径；为 `None` 时尝试默认路径，都不存在则只用默认值
    ///
    /// # 返回值
    ///
    /// 返回加载并校验通过的配置。显式指定的文件不存在时返回错误。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Self::with_defaults(ConfigBuilder::builder())?;

        match config_path {
            Some(path) => {
                if !Path::new(path).exists() {
                    return Err(anyhow::anyhow!("配置文件不存在: {}", path));
                }
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
            None => {
                if let Some(path) = DEFAULT_CONFIG_PATHS
                    .iter()
                    .find(|path| Path::new(path).exists())
                {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                }
            }
        }

        // 环境变量优先级最高
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = Self::default();
        Ok(builder
            .set_default("retry.enabled", defaults.retry.enabled)?
            .set_default("retry.interval_seconds", defaults.retry.interval_seconds)?
            .set_default("retry.max_retries", defaults.retry.max_retries as u64)?
            .set_default("transport.email.latency_ms", defaults.transport.email.latency_ms)?
            .set_default(
                "transport.email.success_rate",
                defaults.transport.email.success_rate,
            )?
            .set_default("transport.sms.latency_ms", defaults.transport.sms.latency_ms)?
            .set_default(
                "transport.sms.success_rate",
                defaults.transport.sms.success_rate,
            )?
            .set_default("api.enabled", defaults.api.enabled)?
            .set_default("api.bind_address", defaults.api.bind_address)?
            .set_default("api.cors_enabled", defaults.api.cors_enabled)?
            .set_default(
                "api.request_timeout_seconds",
                defaults.api.request_timeout_seconds,
            )?
            .set_default("observability.log_level", defaults.observability.log_level)?
            .set_default("observability.log_format", defaults.observability.log_format)?
            .set_default(
                "observability.metrics_enabled",
                defaults.observability.metrics_enabled,
            )?)
    }

    /// 从TOML字符串加载配置，缺失的字段取默认值
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// 序列化为TOML字符串
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    /// 校验配置有效性
    pub fn validate(&self) -> Result<()> {
        self.retry.validate().context("重试配置验证失败")?;

        self.transport.validate().context("投递通道配置验证失败")?;

        self.api.validate().context("API配置验证失败")?;

        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.retry.interval_seconds, 60);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.transport.email.latency_ms, 800);
        assert_eq!(config.transport.sms.success_rate, 0.85);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [retry]
            max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.interval_seconds, 60);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_partial_channel_section_uses_channel_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [transport.email]
            latency_ms = 100

            [transport.sms]
            success_rate = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.transport.email.latency_ms, 100);
        assert_eq!(config.transport.email.success_rate, 0.9);
        assert_eq!(config.transport.sms.latency_ms, 600);
        assert_eq!(config.transport.sms.success_rate, 0.5);
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = AppConfig::default();
        config.observability.log_format = "json".to_string();

        let toml_str = config.to_toml().unwrap();
        let parsed = AppConfig::from_toml(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.retry.interval_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.transport.email.success_rate = 1.5;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.api.bind_address = String::new();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.observability.log_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}

use serde::{Deserialize, Deserializer, Serialize};

/// 失败通知自动重试配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub enabled: bool,
    /// 扫描周期（秒），首次扫描在启动后一个完整周期触发
    pub interval_seconds: u64,
    /// 自动重试上限，达到后不再被扫描器处理
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            max_retries: 3,
        }
    }
}

impl RetryConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval_seconds == 0 {
            return Err(anyhow::anyhow!("重试扫描间隔必须大于0"));
        }
        Ok(())
    }
}

/// 模拟投递通道参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub latency_ms: u64,
    pub success_rate: f64,
}

impl ChannelConfig {
    pub fn email() -> Self {
        Self {
            latency_ms: 800,
            success_rate: 0.9,
        }
    }

    pub fn sms() -> Self {
        Self {
            latency_ms: 600,
            success_rate: 0.85,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(anyhow::anyhow!(
                "成功率必须在0到1之间: {}",
                self.success_rate
            ));
        }
        Ok(())
    }
}

/// 通道配置的部分字段，缺失的字段由各通道自己的默认值补齐
#[derive(Debug, Deserialize)]
struct PartialChannelConfig {
    latency_ms: Option<u64>,
    success_rate: Option<f64>,
}

impl PartialChannelConfig {
    fn or(self, defaults: ChannelConfig) -> ChannelConfig {
        ChannelConfig {
            latency_ms: self.latency_ms.unwrap_or(defaults.latency_ms),
            success_rate: self.success_rate.unwrap_or(defaults.success_rate),
        }
    }
}

fn deserialize_email<'de, D>(deserializer: D) -> Result<ChannelConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialChannelConfig::deserialize(deserializer)?.or(ChannelConfig::email()))
}

fn deserialize_sms<'de, D>(deserializer: D) -> Result<ChannelConfig, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(PartialChannelConfig::deserialize(deserializer)?.or(ChannelConfig::sms()))
}

/// 邮件和短信的模拟参数；站内信总是可用，没有可配置项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    #[serde(deserialize_with = "deserialize_email")]
    pub email: ChannelConfig,
    #[serde(deserialize_with = "deserialize_sms")]
    pub sms: ChannelConfig,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            email: ChannelConfig::email(),
            sms: ChannelConfig::sms(),
        }
    }
}

impl TransportConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.email
            .validate()
            .map_err(|e| anyhow::anyhow!("邮件通道: {e}"))?;
        self.sms
            .validate()
            .map_err(|e| anyhow::anyhow!("短信通道: {e}"))?;
        Ok(())
    }
}

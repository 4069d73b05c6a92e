use async_trait::async_trait;

use crate::errors::NotifierResult;
use crate::models::NotificationType;

/// 投递通道接口
///
/// `Ok(true)` 表示送达，`Ok(false)` 表示未能送达，`Err` 表示通道内部错误。
/// 后两者对分发器而言都意味着投递失败。
#[async_trait]
pub trait Transport: Send + Sync {
    /// 该实现负责的渠道
    fn channel(&self) -> NotificationType;

    async fn attempt(&self, destination: &str, subject: &str, body: &str)
        -> NotifierResult<bool>;
}

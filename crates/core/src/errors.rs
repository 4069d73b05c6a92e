use thiserror::Error;

use crate::models::{NotificationStatus, NotificationType};

/// 通知服务错误类型定义
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("参数校验失败: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("通知未找到: {id}")]
    NotificationNotFound { id: i64 },

    #[error("通知 {id} 当前状态为 {status}，不允许该操作")]
    InvalidState { id: i64, status: NotificationStatus },

    #[error("投递通道错误: {channel} - {message}")]
    Transport {
        channel: NotificationType,
        message: String,
    },

    #[error("配置错误: {0}")]
    Configuration(String),

    /// 仓储实现内部的故障，例如存储后端不可用
    #[error("内部错误: {0}")]
    Internal(String),
}

impl NotifierError {
    pub fn transport(channel: NotificationType, message: impl Into<String>) -> Self {
        Self::Transport {
            channel,
            message: message.into(),
        }
    }

    /// 校验错误和状态错误属于调用方错误，其余均为服务端错误
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotificationNotFound { .. } | Self::InvalidState { .. }
        )
    }
}

/// 统一的Result类型
pub type NotifierResult<T> = std::result::Result<T, NotifierError>;

//! 通知仓储接口定义
//!
//! 仓储是通知记录集合的唯一所有者，分发器、重试扫描器和统计服务都只通过
//! 此接口读写记录。记录一经创建永不删除。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use notifier_core::models::{NewNotification, NotificationStatus, NotificationType};
//! use notifier_core::traits::NotificationRepository;
//!
//! async fn mark_delivered(repo: &dyn NotificationRepository) -> NotifierResult<()> {
//!     let created = repo
//!         .create(NewNotification::pending("user-1", NotificationType::InApp, "Hi", "Body"))
//!         .await?;
//!     if repo.update_status(created.id, NotificationStatus::Delivered).await?.is_none() {
//!         tracing::warn!("通知 {} 已不存在", created.id);
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

use crate::errors::NotifierResult;
use crate::models::{
    NewNotification, Notification, NotificationPage, NotificationQuery, NotificationStats,
    NotificationStatus,
};

/// 通知仓储接口
///
/// 实现必须保证 ID 分配与插入原子完成，并且对同一记录的并发修改不会丢失更新。
///
/// # 线程安全
///
/// 此trait要求实现 `Send + Sync`，实例通常以 `Arc<dyn NotificationRepository>` 共享。
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// 创建通知
    ///
    /// 分配单调递增的 ID，`created_at` 与 `updated_at` 设为当前时间；
    /// 仅当初始状态为已送达时才设置 `delivered_at`。
    async fn create(&self, notification: NewNotification) -> NotifierResult<Notification>;

    /// 根据ID获取通知，不存在时返回 `None`
    async fn get(&self, id: i64) -> NotifierResult<Option<Notification>>;

    /// 查询某个用户的通知
    ///
    /// 先按用户过滤，再按可选的状态和类型过滤，按创建时间倒序排列
    /// （创建时间相同按 ID 倒序），最后应用 offset/limit。
    /// 返回的 `total` 为分页前的过滤结果数量。
    async fn query(
        &self,
        user_id: &str,
        query: &NotificationQuery,
    ) -> NotifierResult<NotificationPage>;

    /// 更新状态并刷新 `updated_at`
    ///
    /// 转入已送达时总是把 `delivered_at` 设为当前时间。
    /// 记录不存在时返回 `None`，由调用方决定如何处理。
    async fn update_status(
        &self,
        id: i64,
        status: NotificationStatus,
    ) -> NotifierResult<Option<Notification>>;

    /// 重试次数加一并刷新 `updated_at`，记录不存在时返回 `None`
    async fn increment_retry(&self, id: i64) -> NotifierResult<Option<Notification>>;

    /// 获取当前所有失败状态通知的快照
    async fn list_failed(&self) -> NotifierResult<Vec<Notification>>;

    /// 统计全部通知的状态分布和送达率
    async fn stats(&self) -> NotifierResult<NotificationStats>;
}

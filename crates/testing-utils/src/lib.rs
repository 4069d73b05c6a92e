//! # Notifier Testing Utils
//!
//! 工作区共享的测试工具：
//!
//! - **Mocks**: 基于 `mockall` 的仓储 mock，以及可编排结果的投递通道
//! - **Builders**: 通知记录构建器
//! - **Helpers**: 异步条件等待
//!
//! ```toml
//! [dev-dependencies]
//! notifier-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;

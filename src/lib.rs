//! # Notifier
//!
//! 通知分发服务的进程入口：装配仓储、投递通道、分发器、重试扫描器和 HTTP 接口，
//! 并负责日志初始化与优雅关闭。

pub mod app;
pub mod common;
pub mod shutdown;

pub use app::Application;
pub use common::{init_logging, load_config, start_application, StartupConfig};
pub use shutdown::ShutdownManager;

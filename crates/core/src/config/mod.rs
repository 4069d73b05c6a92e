//! 服务配置
//!
//! 加载顺序：内置默认值 < TOML 配置文件 < `NOTIFIER_` 前缀的环境变量。
//! 嵌套字段在环境变量中用双下划线分隔，例如 `NOTIFIER_RETRY__MAX_RETRIES=5`。

pub mod models;

pub use models::*;

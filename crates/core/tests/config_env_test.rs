use notifier_core::config::AppConfig;
use std::env;

// 环境变量是进程级状态，单独放在一个测试二进制里
#[test]
fn test_environment_overrides_defaults() {
    env::set_var("NOTIFIER_RETRY__MAX_RETRIES", "7");
    env::set_var("NOTIFIER_API__BIND_ADDRESS", "127.0.0.1:7000");
    env::set_var("NOTIFIER_OBSERVABILITY__METRICS_ENABLED", "false");

    let result = AppConfig::load(None);

    env::remove_var("NOTIFIER_RETRY__MAX_RETRIES");
    env::remove_var("NOTIFIER_API__BIND_ADDRESS");
    env::remove_var("NOTIFIER_OBSERVABILITY__METRICS_ENABLED");

    let config = result.unwrap();
    assert_eq!(config.retry.max_retries, 7);
    assert_eq!(config.api.bind_address, "127.0.0.1:7000");
    assert!(!config.observability.metrics_enabled);
    assert_eq!(config.retry.interval_seconds, 60);
}

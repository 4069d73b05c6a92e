//! # Notifier API
//!
//! 通知服务的 HTTP 接口，基于 Axum 构建，只做参数解析和响应映射，
//! 业务逻辑全部委托给分发器和统计服务。
//!
//! ## API 端点
//!
//! - `POST /api/notifications` - 提交通知
//! - `GET /api/notifications/stats` - 投递统计
//! - `GET /api/notifications/{id}` - 获取单条通知
//! - `POST /api/notifications/{id}/retry` - 手动重试失败通知
//! - `GET /api/users/{userId}/notifications` - 查询用户通知
//! - `GET /health` - 健康检查
//! - `GET /metrics` - Prometheus 指标（启用时）

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;

use std::time::Duration;

use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use notifier_core::config::ApiConfig;
use notifier_dispatcher::{NotificationDispatcher, StatsService};
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, request_timeout, trace_layer};
use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(
    dispatcher: NotificationDispatcher,
    stats: StatsService,
    metrics: Option<PrometheusHandle>,
    api_config: &ApiConfig,
) -> Router {
    let state = AppState {
        dispatcher,
        stats,
        metrics,
    };
    let timeout = Duration::from_secs(api_config.request_timeout_seconds);

    let app = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging))
            .layer(axum::middleware::from_fn_with_state(timeout, request_timeout)),
    );

    if api_config.cors_enabled {
        app.layer(cors_layer())
    } else {
        app
    }
}

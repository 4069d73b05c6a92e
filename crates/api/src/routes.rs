use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use notifier_dispatcher::{NotificationDispatcher, StatsService};

use crate::handlers::{
    health::health_check,
    metrics::render_metrics,
    notifications::{
        get_notification, get_stats, list_user_notifications, retry_notification,
        submit_notification,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: NotificationDispatcher,
    pub stats: StatsService,
    pub metrics: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        // 通知API
        .route("/api/notifications", post(submit_notification))
        .route("/api/notifications/stats", get(get_stats))
        .route("/api/notifications/{id}", get(get_notification))
        .route("/api/notifications/{id}/retry", post(retry_notification))
        .route(
            "/api/users/{user_id}/notifications",
            get(list_user_notifications),
        )
        .with_state(state)
}

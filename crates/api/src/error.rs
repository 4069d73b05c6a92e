use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notifier_core::{errors::NotifierError, models::flatten_validation_errors};
use serde_json::json;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("通知服务错误: {0}")]
    Notifier(#[from] NotifierError),

    #[error("请求体格式错误: {0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("无效的通知ID: {0}")]
    InvalidId(String),

    #[error("指标导出未启用")]
    MetricsDisabled,

    #[error("请求超时")]
    Timeout,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, code) = match &self {
            ApiError::Notifier(NotifierError::Validation(errors)) => {
                let details: Vec<_> = flatten_validation_errors(errors)
                    .into_iter()
                    .map(|(field, message)| json!({ "field": field, "message": message }))
                    .collect();
                let body = Json(json!({
                    "message": "Validation error",
                    "errors": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            ApiError::Notifier(NotifierError::NotificationNotFound { .. })
            | ApiError::InvalidId(_) => (
                StatusCode::NOT_FOUND,
                "Notification not found".to_string(),
                "NOTIFICATION_NOT_FOUND",
            ),
            ApiError::Notifier(NotifierError::InvalidState { .. }) => (
                StatusCode::BAD_REQUEST,
                "Only failed notifications can be retried".to_string(),
                "INVALID_STATE",
            ),
            ApiError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
                "BAD_REQUEST",
            ),
            ApiError::MetricsDisabled => (
                StatusCode::NOT_FOUND,
                "Metrics exporter is disabled".to_string(),
                "METRICS_DISABLED",
            ),
            ApiError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                "Request timed out".to_string(),
                "TIMEOUT",
            ),
            ApiError::Notifier(e) => {
                error!("请求处理失败: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let body = Json(json!({
            "message": message,
            "code": code,
        }));

        (status, body).into_response()
    }
}

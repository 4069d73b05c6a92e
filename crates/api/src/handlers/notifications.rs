use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::IntoResponse,
    Json,
};
use notifier_core::models::{
    NotificationPage, NotificationQuery, NotificationStatus, NotificationType,
    SubmitNotificationRequest, SubmittedNotification,
};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    response::{created, success},
    routes::AppState,
};

/// 用户通知查询参数
///
/// 数值参数无法解析时按未提供处理；状态或类型不是已知取值时结果为空。
#[derive(Debug, Default, Deserialize)]
pub struct NotificationListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
}

impl NotificationListParams {
    /// 转换为仓储查询；返回 `None` 表示过滤条件不可能命中任何记录
    pub fn to_query(&self) -> Option<NotificationQuery> {
        let mut query = self.pagination();

        if let Some(status) = non_empty(self.status.as_deref()) {
            query.status = Some(status.parse::<NotificationStatus>().ok()?);
        }
        if let Some(notification_type) = non_empty(self.notification_type.as_deref()) {
            query.notification_type = Some(notification_type.parse::<NotificationType>().ok()?);
        }

        Some(query)
    }

    /// 仅包含分页参数的查询
    pub fn pagination(&self) -> NotificationQuery {
        NotificationQuery {
            limit: parse_number(self.limit.as_deref()),
            offset: parse_number(self.offset.as_deref()),
            ..NotificationQuery::default()
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn parse_number(value: Option<&str>) -> Option<usize> {
    non_empty(value).and_then(|v| v.parse::<usize>().ok())
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::InvalidId(raw.to_string()))
}

/// 提交通知
pub async fn submit_notification(
    State(state): State<AppState>,
    payload: Result<Json<SubmitNotificationRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(request) = payload?;
    let notification = state.dispatcher.submit(request).await?;
    Ok(created(SubmittedNotification::from(&notification)))
}

/// 查询用户通知
pub async fn list_user_notifications(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<NotificationListParams>,
) -> ApiResult<impl IntoResponse> {
    let page = match params.to_query() {
        Some(query) => state.dispatcher.list_for_user(&user_id, &query).await?,
        None => NotificationPage::empty(&params.pagination()),
    };
    Ok(success(page))
}

/// 投递统计
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let stats = state.stats.get_stats().await?;
    Ok(success(stats))
}

/// 获取单条通知
pub async fn get_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let notification = state.dispatcher.get(parse_id(&id)?).await?;
    Ok(success(notification))
}

/// 手动重试失败通知
pub async fn retry_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let ack = state.dispatcher.retry(parse_id(&id)?).await?;
    Ok(success(ack))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(
        limit: Option<&str>,
        offset: Option<&str>,
        status: Option<&str>,
        notification_type: Option<&str>,
    ) -> NotificationListParams {
        NotificationListParams {
            limit: limit.map(str::to_string),
            offset: offset.map(str::to_string),
            status: status.map(str::to_string),
            notification_type: notification_type.map(str::to_string),
        }
    }

    #[test]
    fn test_numeric_params() {
        let query = params(Some("5"), Some("10"), None, None).to_query().unwrap();
        assert_eq!(query.effective_limit(), 5);
        assert_eq!(query.effective_offset(), 10);

        // 非法数值按未提供处理
        let query = params(Some("abc"), Some("-1"), None, None)
            .to_query()
            .unwrap();
        assert_eq!(query.effective_limit(), 10);
        assert_eq!(query.effective_offset(), 0);
    }

    #[test]
    fn test_filters() {
        let query = params(None, None, Some("failed"), Some("in-app"))
            .to_query()
            .unwrap();
        assert_eq!(query.status, Some(NotificationStatus::Failed));
        assert_eq!(query.notification_type, Some(NotificationType::InApp));

        let query = params(None, None, Some(""), Some("")).to_query().unwrap();
        assert!(query.status.is_none());
        assert!(query.notification_type.is_none());
    }

    #[test]
    fn test_unknown_filter_matches_nothing() {
        assert!(params(None, None, Some("archived"), None)
            .to_query()
            .is_none());
        assert!(params(None, None, None, Some("push")).to_query().is_none());
    }
}

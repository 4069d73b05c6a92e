use std::borrow::Cow;

use serde::{de::IgnoredAny, Deserialize, Serialize};
use validator::{ValidationError, ValidationErrors};

use super::notification::{NewNotification, NotificationType};

/// 提交通知请求
///
/// 字段保持原始字符串形式，缺失字段反序列化为空串，类型不符的字段记入
/// `malformed_fields`，由 [`validate`](Self::validate) 统一给出逐字段的错误信息，
/// 而不是在反序列化阶段直接失败。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSubmitRequest")]
pub struct SubmitNotificationRequest {
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub priority: Option<bool>,
    /// 请求体中类型不符的字段（线上字段名）
    #[serde(skip)]
    pub malformed_fields: Vec<&'static str>,
}

/// 请求体的原始形态，每个字段都接受任意 JSON 值
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSubmitRequest {
    #[serde(default)]
    user_id: Lenient<String>,
    #[serde(default, rename = "type")]
    notification_type: Lenient<String>,
    #[serde(default)]
    title: Lenient<String>,
    #[serde(default)]
    message: Lenient<String>,
    #[serde(default)]
    priority: Lenient<Option<bool>>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Malformed(IgnoredAny),
}

impl<T: Default> Default for Lenient<T> {
    fn default() -> Self {
        Lenient::Value(T::default())
    }
}

impl<T: Default> Lenient<T> {
    fn take(self, field: &'static str, malformed: &mut Vec<&'static str>) -> T {
        match self {
            Lenient::Value(value) => value,
            Lenient::Malformed(_) => {
                malformed.push(field);
                T::default()
            }
        }
    }
}

impl From<RawSubmitRequest> for SubmitNotificationRequest {
    fn from(raw: RawSubmitRequest) -> Self {
        let mut malformed = Vec::new();
        Self {
            user_id: raw.user_id.take("userId", &mut malformed),
            notification_type: raw.notification_type.take("type", &mut malformed),
            title: raw.title.take("title", &mut malformed),
            message: raw.message.take("message", &mut malformed),
            priority: raw.priority.take("priority", &mut malformed),
            malformed_fields: malformed,
        }
    }
}

impl SubmitNotificationRequest {
    pub fn new(
        user_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            notification_type: notification_type.as_str().to_string(),
            title: title.into(),
            message: message.into(),
            priority: None,
            malformed_fields: Vec::new(),
        }
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = Some(priority);
        self
    }

    fn is_malformed(&self, field: &str) -> bool {
        self.malformed_fields.iter().any(|malformed| *malformed == field)
    }

    /// 校验请求并转换为待创建的通知（状态 pending，重试次数 0）
    pub fn validate(&self) -> Result<NewNotification, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        self.check_text(
            &mut errors,
            "userId",
            &self.user_id,
            "User ID is required",
            "User ID must be a string",
        );
        let notification_type = match self.notification_type.parse::<NotificationType>() {
            Ok(notification_type) => Some(notification_type),
            Err(_) => {
                errors.add(
                    "type",
                    field_error("invalid_type", "Type must be email, sms, or in-app"),
                );
                None
            }
        };
        self.check_text(
            &mut errors,
            "title",
            &self.title,
            "Title is required",
            "Title must be a string",
        );
        self.check_text(
            &mut errors,
            "message",
            &self.message,
            "Message is required",
            "Message must be a string",
        );
        if self.is_malformed("priority") {
            errors.add(
                "priority",
                field_error("invalid_type", "Priority must be a boolean"),
            );
        }

        match notification_type {
            Some(notification_type) if errors.is_empty() => Ok(NewNotification::pending(
                self.user_id.clone(),
                notification_type,
                self.title.clone(),
                self.message.clone(),
            )
            .with_priority(self.priority.unwrap_or(false))),
            _ => Err(errors),
        }
    }

    fn check_text(
        &self,
        errors: &mut ValidationErrors,
        field: &'static str,
        value: &str,
        required: &'static str,
        wrong_type: &'static str,
    ) {
        if self.is_malformed(field) {
            errors.add(field, field_error("invalid_type", wrong_type));
        } else {
            require_non_empty(errors, field, value, required);
        }
    }
}

fn require_non_empty(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    message: &'static str,
) {
    if value.is_empty() {
        errors.add(field, field_error("required", message));
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// 把校验错误展开为 (字段, 信息) 列表，按字段名排序以保证输出稳定
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<(String, String)> {
    let mut flattened: Vec<(String, String)> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, field_errors)| {
            field_errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect();
    flattened.sort();
    flattened
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotificationStatus;

    #[test]
    fn test_valid_request_becomes_pending_notification() {
        let request =
            SubmitNotificationRequest::new("user-1", NotificationType::Sms, "Title", "Body")
                .with_priority(true);

        let new = request.validate().unwrap();
        assert_eq!(new.notification_type, NotificationType::Sms);
        assert_eq!(new.status, NotificationStatus::Pending);
        assert_eq!(new.retry_count, 0);
        assert!(new.priority);
    }

    #[test]
    fn test_priority_defaults_to_false() {
        let request =
            SubmitNotificationRequest::new("user-1", NotificationType::Email, "Title", "Body");
        assert!(!request.validate().unwrap().priority);
    }

    #[test]
    fn test_missing_fields_report_each_field() {
        let request: SubmitNotificationRequest = serde_json::from_str("{}").unwrap();
        let errors = request.validate().unwrap_err();
        let flattened = flatten_validation_errors(&errors);

        assert_eq!(
            flattened,
            vec![
                ("message".to_string(), "Message is required".to_string()),
                ("title".to_string(), "Title is required".to_string()),
                (
                    "type".to_string(),
                    "Type must be email, sms, or in-app".to_string()
                ),
                ("userId".to_string(), "User ID is required".to_string()),
            ]
        );
    }

    #[test]
    fn test_unknown_type_rejected() {
        let request = SubmitNotificationRequest {
            user_id: "user-1".to_string(),
            notification_type: "push".to_string(),
            title: "Title".to_string(),
            message: "Body".to_string(),
            ..SubmitNotificationRequest::default()
        };
        let errors = request.validate().unwrap_err();
        let flattened = flatten_validation_errors(&errors);
        assert_eq!(flattened.len(), 1);
        assert_eq!(flattened[0].0, "type");
    }

    #[test]
    fn test_deserializes_wire_format() {
        let request: SubmitNotificationRequest = serde_json::from_str(
            r#"{"userId":"u1","type":"in-app","title":"t","message":"m","priority":true}"#,
        )
        .unwrap();
        assert_eq!(request.user_id, "u1");
        assert_eq!(request.notification_type, "in-app");
        assert_eq!(request.priority, Some(true));
        assert!(request.malformed_fields.is_empty());
    }

    #[test]
    fn test_wrongly_typed_fields_become_field_errors() {
        let request: SubmitNotificationRequest = serde_json::from_str(
            r#"{"userId":123,"type":"email","title":"t","message":null,"priority":"yes"}"#,
        )
        .unwrap();
        assert_eq!(request.malformed_fields, vec!["userId", "message", "priority"]);

        let errors = request.validate().unwrap_err();
        assert_eq!(
            flatten_validation_errors(&errors),
            vec![
                ("message".to_string(), "Message must be a string".to_string()),
                ("priority".to_string(), "Priority must be a boolean".to_string()),
                ("userId".to_string(), "User ID must be a string".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_priority_is_absent() {
        let request: SubmitNotificationRequest = serde_json::from_str(
            r#"{"userId":"u1","type":"sms","title":"t","message":"m","priority":null}"#,
        )
        .unwrap();
        assert!(!request.validate().unwrap().priority);
    }
}

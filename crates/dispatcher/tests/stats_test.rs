use std::sync::Arc;
use std::time::Duration;

use notifier_core::errors::NotifierError;
use notifier_core::models::{NotificationStats, NotificationType};
use notifier_core::traits::Transport;
use notifier_dispatcher::{NotificationDispatcher, StatsService, TransportSet};
use notifier_infrastructure::InMemoryNotificationRepository;
use notifier_testing_utils::{submit_request, MockNotificationRepository, ScriptedTransport, TestEnv};

#[tokio::test]
async fn test_stats_on_empty_repository() {
    let stats = StatsService::new(Arc::new(InMemoryNotificationRepository::new()))
        .get_stats()
        .await
        .unwrap();

    assert_eq!(stats, NotificationStats::from_counts(0, 0, 0));
    assert_eq!(stats.delivery_rate, 0.0);
}

#[tokio::test]
async fn test_stats_after_deliveries() {
    let repository = Arc::new(InMemoryNotificationRepository::new());
    let transports = TransportSet::from_transports([
        Arc::new(ScriptedTransport::succeeding(NotificationType::Email)) as Arc<dyn Transport>,
        Arc::new(ScriptedTransport::failing(NotificationType::Sms)) as Arc<dyn Transport>,
        Arc::new(ScriptedTransport::succeeding(NotificationType::InApp)) as Arc<dyn Transport>,
    ]);
    let dispatcher = NotificationDispatcher::new(repository.clone(), transports).unwrap();

    // 2 送达, 1 失败
    let mut ids = Vec::new();
    for notification_type in [
        NotificationType::Email,
        NotificationType::InApp,
        NotificationType::Sms,
    ] {
        let created = dispatcher
            .submit(submit_request("user-1", notification_type))
            .await
            .unwrap();
        ids.push(created.id);
    }
    for id in ids {
        TestEnv::wait_until_settled(repository.as_ref(), id, Duration::from_secs(2)).await;
    }

    let stats = StatsService::new(repository).get_stats().await.unwrap();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.delivered, 2);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.delivery_rate, 66.7);
}

#[tokio::test]
async fn test_stats_propagates_repository_error() {
    let mut repository = MockNotificationRepository::new();
    repository
        .expect_stats()
        .returning(|| Err(NotifierError::Internal("storage unavailable".to_string())));

    let result = StatsService::new(Arc::new(repository)).get_stats().await;
    assert!(matches!(result, Err(NotifierError::Internal(_))));
}

pub mod in_memory_notification_repository;

pub use in_memory_notification_repository::InMemoryNotificationRepository;

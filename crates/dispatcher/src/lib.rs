pub mod dispatcher;
pub mod retry_service;
pub mod stats;

pub use dispatcher::{NotificationDispatcher, TransportSet};
pub use retry_service::{RetrySweeper, SweepReport};
pub use stats::StatsService;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use notifier_api::create_app;
use notifier_core::AppConfig;
use notifier_dispatcher::{NotificationDispatcher, RetrySweeper, StatsService, TransportSet};
use notifier_infrastructure::{InMemoryNotificationRepository, TransportFactory};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 应用程序主结构
///
/// 持有进程内唯一的仓储、分发器和统计服务，多个实例可以在测试中并存。
pub struct Application {
    config: AppConfig,
    dispatcher: NotificationDispatcher,
    stats: StatsService,
    metrics: Option<PrometheusHandle>,
}

impl Application {
    /// 按配置装配各组件，启用指标时安装全局 Prometheus 记录器
    pub fn new(config: AppConfig) -> Result<Self> {
        let metrics = if config.observability.metrics_enabled {
            let handle = PrometheusBuilder::new()
                .install_recorder()
                .context("安装Prometheus指标记录器失败")?;
            Some(handle)
        } else {
            None
        };

        Self::with_metrics(config, metrics)
    }

    /// 使用外部提供的指标句柄装配组件，不触碰全局记录器
    pub fn with_metrics(config: AppConfig, metrics: Option<PrometheusHandle>) -> Result<Self> {
        config.validate().context("配置验证失败")?;

        let repository = Arc::new(InMemoryNotificationRepository::new());
        let transports =
            TransportSet::from_transports(TransportFactory::create(&config.transport));
        let dispatcher = NotificationDispatcher::new(repository.clone(), transports)
            .context("创建通知分发器失败")?;
        let stats = StatsService::new(repository);

        info!(
            "应用组件已装配: 重试{}, API{}, 指标{}",
            enabled_label(config.retry.enabled),
            enabled_label(config.api.enabled),
            enabled_label(metrics.is_some())
        );

        Ok(Self {
            config,
            dispatcher,
            stats,
            metrics,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &NotificationDispatcher {
        &self.dispatcher
    }

    pub fn stats(&self) -> &StatsService {
        &self.stats
    }

    /// 构建 HTTP 路由
    pub fn router(&self) -> Router {
        create_app(
            self.dispatcher.clone(),
            self.stats.clone(),
            self.metrics.clone(),
            &self.config.api,
        )
    }

    /// 运行重试扫描器和 API 服务器，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let sweeper_handle = if self.config.retry.enabled {
            let sweeper = RetrySweeper::new(self.dispatcher.clone(), self.config.retry.clone());
            Some(sweeper.spawn(shutdown_rx.resubscribe()))
        } else {
            info!("自动重试已禁用");
            None
        };

        let result = if self.config.api.enabled {
            self.run_api(shutdown_rx).await
        } else {
            let _ = shutdown_rx.recv().await;
            Ok(())
        };

        if let Some(handle) = sweeper_handle {
            if let Err(e) = handle.await {
                error!("重试扫描器异常退出: {}", e);
            }
        }

        info!("所有组件已停止");
        result
    }

    async fn run_api(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        let bind_address = &self.config.api.bind_address;
        let listener = TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("绑定地址失败: {bind_address}"))?;

        info!("API服务器启动在 http://{}", bind_address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await
            .context("API服务器运行失败")?;

        info!("API服务器已停止");
        Ok(())
    }
}

fn enabled_label(enabled: bool) -> &'static str {
    if enabled {
        "已启用"
    } else {
        "已禁用"
    }
}

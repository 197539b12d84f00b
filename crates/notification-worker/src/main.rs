//! 订单确认通知服务入口
//!
//! 消费订单创建事件，渲染并派发确认邮件。

use std::sync::Arc;

use anyhow::Result;
use pipeline_shared::config::AppConfig;
use pipeline_shared::observability;
use tokio::sync::watch;
use tracing::info;

use notification_worker::consumer::NotificationConsumer;
use notification_worker::sender::SimulatedSmtpDispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load("notification-worker").unwrap_or_else(|e| {
        eprintln!("加载配置失败，使用默认配置: {e}");
        AppConfig::default()
    });

    observability::init(&config.observability)?;

    info!(
        environment = %config.environment,
        brokers = %config.kafka.brokers,
        "notification-worker 启动中"
    );

    let dispatcher = Arc::new(SimulatedSmtpDispatcher::new());
    let consumer = NotificationConsumer::new(&config, dispatcher)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("收到退出信号，准备关闭");
            let _ = shutdown_tx.send(true);
        }
    });

    consumer.run(shutdown_rx).await?;
    Ok(())
}

//! 订单处理服务入口
//!
//! 消费原始订单消息，校验并执行履约步骤，发布订单创建事件。

use std::sync::Arc;

use anyhow::Result;
use pipeline_shared::config::AppConfig;
use pipeline_shared::kafka::KafkaProducer;
use pipeline_shared::observability;
use tokio::sync::watch;
use tracing::info;

use order_processor_service::consumer::OrderConsumer;
use order_processor_service::processor::{OrderProcessor, SimulatedFulfillment};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load("order-processor").unwrap_or_else(|e| {
        eprintln!("加载配置失败，使用默认配置: {e}");
        AppConfig::default()
    });

    observability::init(&config.observability)?;

    info!(
        environment = %config.environment,
        brokers = %config.kafka.brokers,
        "order-processor 启动中"
    );

    let producer = KafkaProducer::new(&config.kafka)?;
    let processor = OrderProcessor::new(Arc::new(SimulatedFulfillment::new()));
    let consumer = OrderConsumer::new(&config, processor, producer)?;

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

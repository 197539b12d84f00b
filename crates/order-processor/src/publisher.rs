//! 订单创建事件发布
//!
//! 订单处理成功后向扇出 topic 发布 OrderCreatedEvent，
//! 下游（通知等）各自订阅消费。通过 trait 抽象发布能力，
//! 测试中可用内存实现替代真实的 Kafka 生产者。

use async_trait::async_trait;
use pipeline_shared::error::PipelineError;
use pipeline_shared::kafka::{KafkaProducer, topics};
use pipeline_shared::messages::OrderCreatedEvent;

/// 订单事件发布能力
#[async_trait]
pub trait OrderEventPublisher: Send + Sync {
    /// 发布订单创建事件到扇出 topic
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PipelineError>;
}

#[async_trait]
impl OrderEventPublisher for KafkaProducer {
    async fn publish_order_created(&self, event: &OrderCreatedEvent) -> Result<(), PipelineError> {
        // 以 order_id 作为分区键，同一订单的事件落在同一分区保持有序
        let key = event.order_id.to_string();
        self.send_json(topics::ORDER_CREATED, &key, event).await?;
        Ok(())
    }
}

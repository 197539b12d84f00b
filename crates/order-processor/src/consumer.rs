//! 订单消息消费与分发
//!
//! 将 Kafka 消息解码为订单消息，校验后交给处理器执行履约步骤，
//! 成功时向扇出 topic 发布订单创建事件。
//! 单条消息的处理结果以 MessageOutcome 显式表达：
//! - 空负载、校验失败 -> Skipped，就地终结不再重试
//! - 解析失败、履约失败 -> Failed，上报平台按重投递策略处理

use pipeline_shared::batch::{BatchReport, MessageOutcome, SkipReason, run_batch};
use pipeline_shared::config::AppConfig;
use pipeline_shared::error::PipelineError;
use pipeline_shared::kafka::{ConsumerMessage, KafkaConsumer, KafkaProducer, topics};
use pipeline_shared::messages::{OrderCreatedEvent, OrderMessage};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::error::OrderError;
use crate::processor::OrderProcessor;
use crate::publisher::OrderEventPublisher;
use crate::validator::validate;

/// 订单消费者
///
/// 组合 KafkaConsumer（消息拉取）、OrderProcessor（履约处理）
/// 和 KafkaProducer（订单创建事件投递）三个组件，形成完整的消费管道。
pub struct OrderConsumer {
    consumer: KafkaConsumer,
    processor: OrderProcessor,
    producer: KafkaProducer,
    batch_size: usize,
}

impl OrderConsumer {
    pub fn new(
        config: &AppConfig,
        processor: OrderProcessor,
        producer: KafkaProducer,
    ) -> Result<Self, OrderError> {
        let consumer = KafkaConsumer::new(&config.kafka, None)?;
        Ok(Self {
            consumer,
            processor,
            producer,
            batch_size: config.kafka.batch_size,
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    ///
    /// 将 processor 和 producer 移入闭包，通过 KafkaConsumer::start
    /// 驱动批次消费。单独抽取 handle_batch / handle_message 方便单元测试。
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), OrderError> {
        self.consumer.subscribe(&[topics::ORDER_REQUESTS])?;

        info!(topic = topics::ORDER_REQUESTS, "订单消费者已启动");

        let processor = self.processor;
        let producer = self.producer;
        let batch_size = self.batch_size;

        self.consumer
            .start(shutdown, batch_size, |batch| {
                let processor = &processor;
                let producer = &producer;
                async move { handle_batch(processor, producer, batch).await }
            })
            .await;

        info!("订单消费者已停止");
        Ok(())
    }
}

/// 按投递顺序处理一个批次
///
/// 每条消息独立处理；某条消息 Failed 时批内剩余消息不再尝试，
/// 整批以失败上报（批次语义见共享库 run_batch）。
pub async fn handle_batch(
    processor: &OrderProcessor,
    publisher: &dyn OrderEventPublisher,
    messages: Vec<ConsumerMessage>,
) -> BatchReport {
    run_batch(messages, |msg| async move {
        handle_message(processor, publisher, &msg).await
    })
    .await
}

/// 处理单条订单消息的完整流程
///
/// 拆分为独立函数而非方法，便于在测试中直接调用而无需构造完整的 Consumer。
/// 流程：反序列化 -> 校验 -> 履约处理 -> 发布订单创建事件
pub async fn handle_message(
    processor: &OrderProcessor,
    publisher: &dyn OrderEventPublisher,
    msg: &ConsumerMessage,
) -> MessageOutcome {
    // 1. 负载取文本
    let body = match msg.payload_str() {
        Ok(body) => body,
        Err(e) => {
            error!(offset = msg.offset, error = %e, "订单负载不是合法文本");
            return MessageOutcome::Failed(e);
        }
    };

    // 2. 反序列化；空体和 JSON null 都视为空负载跳过，解析失败则传播
    if body.trim().is_empty() {
        warn!(offset = msg.offset, "订单负载为空，跳过该消息");
        return MessageOutcome::Skipped(SkipReason::EmptyPayload);
    }

    let order: OrderMessage = match serde_json::from_str::<Option<OrderMessage>>(body) {
        Ok(Some(order)) => order,
        Ok(None) => {
            warn!(offset = msg.offset, "订单负载为 null，跳过该消息");
            return MessageOutcome::Skipped(SkipReason::EmptyPayload);
        }
        Err(e) => {
            error!(offset = msg.offset, error = %e, "订单反序列化失败，交由平台重投递");
            return MessageOutcome::Failed(PipelineError::MalformedPayload(e.to_string()));
        }
    };

    info!(
        order_id = order.order_id,
        user_id = order.user_id,
        total_amount = order.total_amount,
        items = order.items.len(),
        "收到订单消息"
    );

    // 3. 校验；失败是终结性结果，记录后视为已处理
    let result = validate(&order);
    if !result.is_valid {
        warn!(
            order_id = order.order_id,
            reason = %result.error_message,
            "订单校验未通过，消息视为已处理"
        );
        return MessageOutcome::Skipped(SkipReason::ValidationFailed(result.error_message));
    }

    // 4. 履约处理；任一步骤失败整条消息失败并传播
    if let Err(e) = processor.process(&order).await {
        error!(
            order_id = order.order_id,
            error = %e,
            "订单处理失败，交由平台重投递"
        );
        return MessageOutcome::Failed(e.into());
    }

    // 5. 发布订单创建事件；发布失败只告警，不影响消息本身的完成状态
    publish_order_created(publisher, order).await;

    MessageOutcome::Handled
}

/// 将处理完成的订单转换为事件并发布到扇出 topic
async fn publish_order_created(publisher: &dyn OrderEventPublisher, order: OrderMessage) {
    let event = OrderCreatedEvent::from(order);
    if let Err(e) = publisher.publish_order_created(&event).await {
        warn!(
            order_id = event.order_id,
            error = %e,
            "发布订单创建事件失败"
        );
    }
}

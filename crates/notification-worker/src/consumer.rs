//! 通知消费者
//!
//! 从扇出 topic 消费订单创建事件：拆信封 -> 反序列化 -> 渲染邮件 ->
//! 派发。拆信封永远不会让消息失败；空事件跳过；反序列化失败与
//! 派发失败向上传播交由平台重投递。

use std::sync::Arc;

use pipeline_shared::batch::{BatchReport, MessageOutcome, SkipReason, run_batch};
use pipeline_shared::config::AppConfig;
use pipeline_shared::error::PipelineError;
use pipeline_shared::kafka::{ConsumerMessage, KafkaConsumer, topics};
use pipeline_shared::messages::OrderCreatedEvent;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::envelope::unwrap_envelope;
use crate::error::NotificationError;
use crate::sender::EmailDispatcher;
use crate::templates::render_confirmation;

/// 通知消费者
///
/// 组合 KafkaConsumer（消息拉取）与 EmailDispatcher（邮件派发），
/// 渲染逻辑为纯函数无需注入。
pub struct NotificationConsumer {
    consumer: KafkaConsumer,
    dispatcher: Arc<dyn EmailDispatcher>,
    batch_size: usize,
}

impl NotificationConsumer {
    pub fn new(
        config: &AppConfig,
        dispatcher: Arc<dyn EmailDispatcher>,
    ) -> Result<Self, NotificationError> {
        // 独立的消费组后缀，避免与订单处理器争抢同一组的分区
        let consumer = KafkaConsumer::new(&config.kafka, Some("notifications"))?;
        Ok(Self {
            consumer,
            dispatcher,
            batch_size: config.kafka.batch_size,
        })
    }

    /// 启动消费循环，直到收到 shutdown 信号
    pub async fn run(self, shutdown: watch::Receiver<bool>) -> Result<(), NotificationError> {
        self.consumer.subscribe(&[topics::ORDER_CREATED])?;

        info!(topic = topics::ORDER_CREATED, "通知消费者已启动");

        let dispatcher = self.dispatcher;
        let batch_size = self.batch_size;

        self.consumer
            .start(shutdown, batch_size, |batch| {
                let dispatcher = dispatcher.as_ref();
                async move { handle_batch(dispatcher, batch).await }
            })
            .await;

        info!("通知消费者已停止");
        Ok(())
    }
}

/// 按投递顺序处理一个批次，语义与订单处理器一侧一致
pub async fn handle_batch(
    dispatcher: &dyn EmailDispatcher,
    messages: Vec<ConsumerMessage>,
) -> BatchReport {
    run_batch(messages, |msg| async move {
        handle_message(dispatcher, &msg).await
    })
    .await
}

/// 处理单条通知消息的完整流程
///
/// 拆分为独立函数而非方法，便于在测试中直接调用而无需构造完整的 Consumer。
pub async fn handle_message(
    dispatcher: &dyn EmailDispatcher,
    msg: &ConsumerMessage,
) -> MessageOutcome {
    let body = match msg.payload_str() {
        Ok(body) => body,
        Err(e) => {
            error!(offset = msg.offset, error = %e, "通知负载不是合法文本");
            return MessageOutcome::Failed(e);
        }
    };

    // 1. 拆信封；任何不符合信封形状的消息体原样透传，这一步不会失败
    let inner = unwrap_envelope(body);

    // 2. 反序列化内层事件；空体和 null 跳过，解析失败传播
    if inner.trim().is_empty() {
        warn!(offset = msg.offset, "事件负载为空，跳过该消息");
        return MessageOutcome::Skipped(SkipReason::EmptyPayload);
    }

    let event: OrderCreatedEvent = match serde_json::from_str::<Option<OrderCreatedEvent>>(&inner) {
        Ok(Some(event)) => event,
        Ok(None) => {
            warn!(offset = msg.offset, "事件负载为 null，跳过该消息");
            return MessageOutcome::Skipped(SkipReason::EmptyPayload);
        }
        Err(e) => {
            error!(offset = msg.offset, error = %e, "事件反序列化失败，交由平台重投递");
            return MessageOutcome::Failed(PipelineError::MalformedPayload(e.to_string()));
        }
    };

    info!(
        order_id = event.order_id,
        user_id = event.user_id,
        "收到订单创建事件"
    );

    // 3. 渲染 + 派发；派发失败让消息整体失败
    let email = render_confirmation(&event);

    match dispatcher.send(&email).await {
        Ok(receipt) => {
            info!(
                order_id = event.order_id,
                to = %email.to,
                message_id = %receipt.message_id,
                "订单确认通知已派发"
            );
            MessageOutcome::Handled
        }
        Err(e) => {
            error!(
                order_id = event.order_id,
                error = %e,
                "通知派发失败，交由平台重投递"
            );
            MessageOutcome::Failed(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sender::{DispatchReceipt, SimulatedSmtpDispatcher};
    use async_trait::async_trait;
    use pipeline_shared::messages::EmailContent;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    fn make_test_message(offset: i64, body: &str) -> ConsumerMessage {
        ConsumerMessage {
            topic: topics::ORDER_CREATED.to_string(),
            partition: 0,
            offset,
            key: None,
            payload: body.as_bytes().to_vec(),
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    /// 记录发出的邮件的测试派发器
    #[derive(Default)]
    struct RecordingDispatcher {
        sent: Mutex<Vec<EmailContent>>,
    }

    #[async_trait]
    impl EmailDispatcher for RecordingDispatcher {
        async fn send(&self, email: &EmailContent) -> Result<DispatchReceipt, NotificationError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(DispatchReceipt {
                message_id: "msg-test-001".to_string(),
            })
        }
    }

    /// 总是发送失败的派发器
    struct FailingDispatcher;

    #[async_trait]
    impl EmailDispatcher for FailingDispatcher {
        async fn send(&self, _email: &EmailContent) -> Result<DispatchReceipt, NotificationError> {
            Err(NotificationError::SendFailed {
                reason: "SMTP 连接超时".to_string(),
            })
        }
    }

    const DIRECT_BODY: &str = r#"{"OrderId":7,"UserId":3,"TotalAmount":50,"Items":[{"ProductId":1,"ProductName":"Gadget","Quantity":1}],"Timestamp":"2026-01-20T10:00:00Z"}"#;

    #[tokio::test]
    async fn test_enveloped_event_is_unwrapped_and_dispatched() {
        let dispatcher = RecordingDispatcher::default();
        let wrapped = serde_json::json!({ "Message": DIRECT_BODY }).to_string();

        let outcome = handle_message(&dispatcher, &make_test_message(1, &wrapped)).await;

        assert!(matches!(outcome, MessageOutcome::Handled));

        let sent = dispatcher.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].subject.contains('7'));
        assert!(sent[0].html_body.contains("Gadget (x1)"));
    }

    #[tokio::test]
    async fn test_direct_body_without_envelope_is_dispatched() {
        // 事件也可能不经信封直接投递，两种形状都要透明处理
        let dispatcher = RecordingDispatcher::default();

        let outcome = handle_message(&dispatcher, &make_test_message(1, DIRECT_BODY)).await;

        assert!(matches!(outcome, MessageOutcome::Handled));
        assert_eq!(dispatcher.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_camel_case_body_is_accepted() {
        let dispatcher = RecordingDispatcher::default();
        let body = r#"{"orderId":8,"userId":4,"totalAmount":12.5,"items":[{"productId":2,"productName":"Widget","quantity":2}],"timestamp":"2026-01-20T10:00:00Z"}"#;

        let outcome = handle_message(&dispatcher, &make_test_message(1, body)).await;

        assert!(matches!(outcome, MessageOutcome::Handled));
        assert_eq!(
            dispatcher.sent.lock().unwrap()[0].to,
            "usuario4@example.com"
        );
    }

    #[tokio::test]
    async fn test_null_event_is_skipped() {
        let dispatcher = RecordingDispatcher::default();

        let outcome = handle_message(&dispatcher, &make_test_message(1, "null")).await;
        assert!(matches!(
            outcome,
            MessageOutcome::Skipped(SkipReason::EmptyPayload)
        ));

        // 信封里装着 null 也一样跳过
        let wrapped = r#"{"Message":"null"}"#;
        let outcome = handle_message(&dispatcher, &make_test_message(2, wrapped)).await;
        assert!(matches!(
            outcome,
            MessageOutcome::Skipped(SkipReason::EmptyPayload)
        ));

        assert!(dispatcher.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_event_fails_for_redelivery() {
        let dispatcher = RecordingDispatcher::default();

        let outcome = handle_message(&dispatcher, &make_test_message(1, "no soy json")).await;

        match outcome {
            MessageOutcome::Failed(err) => assert_eq!(err.code(), "MALFORMED_PAYLOAD"),
            other => panic!("预期 Failed，实际 {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_dispatch_failure_propagates() {
        let outcome = handle_message(&FailingDispatcher, &make_test_message(1, DIRECT_BODY)).await;

        match outcome {
            MessageOutcome::Failed(err) => {
                assert_eq!(err.code(), "EXTERNAL_SERVICE_ERROR");
                assert!(err.is_retryable());
            }
            other => panic!("预期 Failed，实际 {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_aborts_after_failed_dispatch() {
        let messages = vec![
            make_test_message(1, DIRECT_BODY),
            make_test_message(2, DIRECT_BODY),
        ];

        let report = handle_batch(&FailingDispatcher, messages).await;

        assert!(!report.is_success());
        assert_eq!(report.attempted, 1);
        assert_eq!(report.failure.as_ref().unwrap().0, 0);
    }

    #[tokio::test]
    async fn test_simulated_dispatcher_end_to_end() {
        let dispatcher = SimulatedSmtpDispatcher::with_latency(Duration::from_millis(1));

        let report = handle_batch(&dispatcher, vec![make_test_message(1, DIRECT_BODY)]).await;

        assert!(report.is_success());
        assert_eq!(report.handled, 1);
    }
}

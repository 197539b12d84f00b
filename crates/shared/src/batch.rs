//! 批次执行器与单消息结果
//!
//! 用显式的单消息结果类型代替"捕获再重抛"的控制流：每条消息的处理
//! 函数返回 `MessageOutcome`，批次执行器按投递顺序聚合并得出整批结论。
//! 可重试性由结果类型表达——`Failed` 上报给平台触发重投递，
//! `Skipped` 与 `Handled` 都视为就地终结。

use std::future::Future;

use tracing::{info, warn};

use crate::error::PipelineError;
use crate::kafka::ConsumerMessage;

// ---------------------------------------------------------------------------
// MessageOutcome — 单消息处理结果
// ---------------------------------------------------------------------------

/// 消息被跳过的原因
///
/// 跳过是终结性结果：记录日志后视为已处理，不重试也不进死信，
/// 与向上传播的错误严格区分。
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// 负载为空或 JSON null，按约定静默跳过
    EmptyPayload,
    /// 订单校验未通过，携带具体的失败原因
    ValidationFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "空负载"),
            Self::ValidationFailed(reason) => write!(f, "校验失败: {reason}"),
        }
    }
}

/// 单条消息的处理结果
#[derive(Debug)]
pub enum MessageOutcome {
    /// 处理完成，所有副作用步骤均已执行
    Handled,
    /// 按策略跳过，视为已处理
    Skipped(SkipReason),
    /// 处理失败，需要上报平台重投递
    Failed(PipelineError),
}

// ---------------------------------------------------------------------------
// BatchReport — 批次聚合结果
// ---------------------------------------------------------------------------

/// 一个批次的聚合处理报告
///
/// `failure` 记录首个失败消息在批内的下标及其错误。
/// 出现失败后批内剩余消息不再尝试（attempted 会小于批次大小），
/// 它们随平台的重投递一并再来。
#[derive(Debug, Default)]
pub struct BatchReport {
    /// 实际尝试处理的消息数
    pub attempted: usize,
    pub handled: usize,
    pub skipped: usize,
    /// 首个失败的 (批内下标, 错误)，None 表示整批正常完成
    pub failure: Option<(usize, PipelineError)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// 按投递顺序逐条处理一个批次
///
/// 消息之间互不影响：一条消息的跳过不妨碍后续消息；但一旦某条消息
/// 返回 `Failed`，剩余消息立即放弃，整批以失败上报。批内无并行、
/// 无重排序，也没有跨消息的共享状态。
pub async fn run_batch<F, Fut>(messages: Vec<ConsumerMessage>, handler: F) -> BatchReport
where
    F: Fn(ConsumerMessage) -> Fut,
    Fut: Future<Output = MessageOutcome>,
{
    let total = messages.len();
    let mut report = BatchReport::default();

    for (index, msg) in messages.into_iter().enumerate() {
        report.attempted += 1;

        match handler(msg).await {
            MessageOutcome::Handled => report.handled += 1,
            MessageOutcome::Skipped(reason) => {
                report.skipped += 1;
                info!(index, %reason, "消息已跳过，视为处理完成");
            }
            MessageOutcome::Failed(err) => {
                warn!(
                    index,
                    remaining = total - index - 1,
                    error = %err,
                    "消息处理失败，放弃批内剩余消息"
                );
                report.failure = Some((index, err));
                break;
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn make_message(offset: i64, body: &str) -> ConsumerMessage {
        ConsumerMessage {
            topic: "orders.requests".to_string(),
            partition: 0,
            offset,
            key: None,
            payload: body.as_bytes().to_vec(),
            timestamp: None,
            headers: HashMap::new(),
        }
    }

    #[tokio::test]
    async fn test_run_batch_all_handled() {
        let messages = vec![make_message(1, "a"), make_message(2, "b")];

        let report = run_batch(messages, |_msg| async { MessageOutcome::Handled }).await;

        assert!(report.is_success());
        assert_eq!(report.attempted, 2);
        assert_eq!(report.handled, 2);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_run_batch_skip_does_not_stop_batch() {
        let messages = vec![make_message(1, ""), make_message(2, "b"), make_message(3, "")];

        let report = run_batch(messages, |msg| async move {
            if msg.payload.is_empty() {
                MessageOutcome::Skipped(SkipReason::EmptyPayload)
            } else {
                MessageOutcome::Handled
            }
        })
        .await;

        assert!(report.is_success());
        assert_eq!(report.attempted, 3);
        assert_eq!(report.handled, 1);
        assert_eq!(report.skipped, 2);
    }

    #[tokio::test]
    async fn test_run_batch_failure_aborts_remaining() {
        // 第 k 条失败时：1..k 按顺序尝试，k 之后的消息不再处理
        let messages = vec![
            make_message(1, "ok"),
            make_message(2, "boom"),
            make_message(3, "never"),
            make_message(4, "never"),
        ];

        let seen: Mutex<Vec<i64>> = Mutex::new(Vec::new());

        let report = run_batch(messages, |msg| {
            let seen = &seen;
            async move {
                seen.lock().unwrap().push(msg.offset);
                if msg.payload == b"boom" {
                    MessageOutcome::Failed(PipelineError::Internal("注入故障".to_string()))
                } else {
                    MessageOutcome::Handled
                }
            }
        })
        .await;

        assert!(!report.is_success());
        assert_eq!(report.attempted, 2);
        assert_eq!(report.handled, 1);

        let (index, err) = report.failure.unwrap();
        assert_eq!(index, 1);
        assert_eq!(err.code(), "INTERNAL_ERROR");

        // 失败之后的消息从未被尝试
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_run_batch_preserves_delivery_order() {
        let messages = vec![make_message(10, "a"), make_message(11, "b"), make_message(12, "c")];

        let seen: Mutex<Vec<i64>> = Mutex::new(Vec::new());

        run_batch(messages, |msg| {
            let seen = &seen;
            async move {
                seen.lock().unwrap().push(msg.offset);
                MessageOutcome::Handled
            }
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), vec![10, 11, 12]);
    }

    #[tokio::test]
    async fn test_run_batch_empty() {
        let report = run_batch(vec![], |_msg| async { MessageOutcome::Handled }).await;
        assert!(report.is_success());
        assert_eq!(report.attempted, 0);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::EmptyPayload.to_string(), "空负载");
        assert_eq!(
            SkipReason::ValidationFailed("OrderId debe ser mayor que 0".to_string()).to_string(),
            "校验失败: OrderId debe ser mayor que 0"
        );
    }
}

//! 邮件派发器
//!
//! 通过 `EmailDispatcher` trait 抽象发送行为。当前版本为固定延迟的
//! 模拟发送（仅记录日志），便于在无外部依赖的情况下验证消费管道的
//! 完整性。未来替换为真实 SMTP / 邮件服务商 SDK 时只需实现同一 trait。

use std::time::Duration;

use async_trait::async_trait;
use pipeline_shared::messages::EmailContent;
use tracing::info;
use uuid::Uuid;

use crate::error::NotificationError;

/// 模拟发送的固定延迟
const SEND_LATENCY: Duration = Duration::from_millis(100);

/// 派发回执
///
/// 外部渠道返回的消息标识，用于追踪投递状态。
#[derive(Debug, Clone)]
pub struct DispatchReceipt {
    pub message_id: String,
}

/// 邮件派发能力
#[async_trait]
pub trait EmailDispatcher: Send + Sync {
    /// 发送一封邮件，成功返回回执，失败的错误会让消息整体失败
    async fn send(&self, email: &EmailContent) -> Result<DispatchReceipt, NotificationError>;
}

// ---------------------------------------------------------------------------
// SimulatedSmtpDispatcher — 模拟实现
// ---------------------------------------------------------------------------

/// 模拟 SMTP 派发器
///
/// 等待固定延迟后记录日志并返回生成的回执，不做真实网络传输。
pub struct SimulatedSmtpDispatcher {
    latency: Duration,
}

impl SimulatedSmtpDispatcher {
    pub fn new() -> Self {
        Self {
            latency: SEND_LATENCY,
        }
    }

    /// 测试中用更短的延迟加速执行
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedSmtpDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailDispatcher for SimulatedSmtpDispatcher {
    async fn send(&self, email: &EmailContent) -> Result<DispatchReceipt, NotificationError> {
        tokio::time::sleep(self.latency).await;

        let message_id = Uuid::now_v7().to_string();

        info!(
            to = %email.to,
            subject = %email.subject,
            message_id = %message_id,
            "模拟发送订单确认邮件"
        );

        Ok(DispatchReceipt { message_id })
    }
}

//! 通知服务错误类型
//!
//! 只覆盖需要向上传播的故障；信封形状不符、空事件等情形
//! 不是错误，而是就地终结的跳过结果。

use pipeline_shared::error::PipelineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// 邮件派发失败，消息整体视为失败并传播
    #[error("通知发送失败: {reason}")]
    SendFailed { reason: String },

    #[error(transparent)]
    Shared(#[from] PipelineError),
}

impl From<NotificationError> for PipelineError {
    fn from(err: NotificationError) -> Self {
        match err {
            NotificationError::SendFailed { reason } => PipelineError::ExternalService {
                service: "email-dispatcher".to_string(),
                message: reason,
            },
            NotificationError::Shared(inner) => inner,
        }
    }
}

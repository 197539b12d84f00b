//! 订单处理服务专用错误类型
//!
//! 在共享库 PipelineError 基础上定义本服务特有的错误变体。
//! 校验失败不是错误——它以 ValidationResult 表达并就地终结，
//! 这里只覆盖需要向上传播的故障。

use pipeline_shared::error::PipelineError;

/// 订单处理错误
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// 某个履约步骤执行失败，消息整体视为失败并传播
    #[error("履约步骤失败: 步骤={step}, 原因={reason}")]
    Fulfillment { step: String, reason: String },

    /// 透传共享库错误，避免在每个 match 分支手动转换
    #[error(transparent)]
    Shared(#[from] PipelineError),
}

impl From<OrderError> for PipelineError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Fulfillment { step, reason } => PipelineError::ExternalService {
                service: format!("fulfillment:{step}"),
                message: reason,
            },
            OrderError::Shared(inner) => inner,
        }
    }
}

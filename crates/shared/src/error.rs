//! 统一错误处理模块
//!
//! 定义管道中共享的错误类型，使用 thiserror 提供良好的错误信息。
//! 错误是否可重试决定了消息的去向：可重试错误向上传播，由队列平台
//! 按其重投递策略重新投递；不可重试的情形（校验失败、空负载）不会
//! 走到错误通道，而是以跳过结果就地终结。

use thiserror::Error;

/// 管道错误类型
#[derive(Debug, Error)]
pub enum PipelineError {
    // ==================== Kafka 错误 ====================
    #[error("Kafka 错误: {0}")]
    Kafka(String),

    // ==================== 负载错误 ====================
    /// 消息体无法解析为预期的 JSON 形状。
    /// 与"空负载"不同：空负载被视为已处理并跳过，解析失败则向上传播
    /// 交由平台重投递。
    #[error("消息负载解析失败: {0}")]
    MalformedPayload(String),

    // ==================== 外部服务错误 ====================
    #[error("外部服务错误: {service} - {message}")]
    ExternalService { service: String, message: String },

    // ==================== 配置错误 ====================
    #[error("配置错误: {0}")]
    Config(String),

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Kafka(_) => "KAFKA_ERROR",
            Self::MalformedPayload(_) => "MALFORMED_PAYLOAD",
            Self::ExternalService { .. } => "EXTERNAL_SERVICE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为可重试错误
    ///
    /// 可重试错误会作为批次失败上报给平台，触发重投递。
    /// MalformedPayload 归入可重试：消息内容虽然不会自己变好，
    /// 但去向（重试还是死信）由平台的重投递策略决定，不在本系统内裁决。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Kafka(_) | Self::MalformedPayload(_) | Self::ExternalService { .. }
        )
    }
}

//! 订单管道消息模型
//!
//! 定义两个消费者共享的消息形状：进入管道的订单消息、扇出后的订单创建
//! 事件、校验结果以及派发用的邮件内容。线上格式以 PascalCase 为准
//! （上游序列化器的约定），同时通过 alias 兼容 camelCase 变体。
//!
//! 所有类型均为单次调用内的短生命周期值：反序列化构造、处理后丢弃，
//! 不持久化也不跨消息共享。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// OrderMessage — 进入订单处理器的消息
// ---------------------------------------------------------------------------

/// 订单消息
///
/// 订单处理器的输入。有效性是字段的纯函数（不查询任何外部状态）：
/// orderId / userId / totalAmount 均须大于 0，items 至少一项。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderMessage {
    #[serde(alias = "orderId")]
    pub order_id: i64,
    #[serde(alias = "userId")]
    pub user_id: i64,
    #[serde(alias = "totalAmount")]
    pub total_amount: f64,
    #[serde(alias = "items")]
    pub items: Vec<OrderItem>,
    #[serde(alias = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// 订单条目
///
/// 仅随所属的 OrderMessage / OrderCreatedEvent 存在，没有独立生命周期。
/// productName 允许为空，上游缺失该字段时按空字符串处理。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderItem {
    #[serde(alias = "productId")]
    pub product_id: i64,
    #[serde(default, alias = "productName")]
    pub product_name: String,
    #[serde(alias = "quantity")]
    pub quantity: i32,
}

// ---------------------------------------------------------------------------
// ValidationResult — 校验结果
// ---------------------------------------------------------------------------

/// 校验结果
///
/// 由校验器产出，调用方立即消费以决定是否继续处理，不做存储。
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// 校验通过时为空字符串
    pub error_message: String,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            error_message: String::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error_message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// OrderCreatedEvent — 扇出事件
// ---------------------------------------------------------------------------

/// 订单创建事件
///
/// 通知消费者在拆信封之后拿到的输入。字段与 OrderMessage 完全一致，
/// 但作为独立类型存在：它代表一个已发布的事实而非一个待校验的请求，
/// 信任边界不同。到达这一阶段的事件默认已在上游通过了订单校验，
/// 下游不再重复校验。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OrderCreatedEvent {
    #[serde(alias = "orderId")]
    pub order_id: i64,
    #[serde(alias = "userId")]
    pub user_id: i64,
    #[serde(alias = "totalAmount")]
    pub total_amount: f64,
    #[serde(alias = "items")]
    pub items: Vec<OrderItem>,
    #[serde(alias = "timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<OrderMessage> for OrderCreatedEvent {
    fn from(order: OrderMessage) -> Self {
        Self {
            order_id: order.order_id,
            user_id: order.user_id,
            total_amount: order.total_amount,
            items: order.items,
            timestamp: order.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// EmailContent — 派发用邮件内容
// ---------------------------------------------------------------------------

/// 邮件内容
///
/// 每条通知渲染一次，交给派发器后即丢弃。
#[derive(Debug, Clone, PartialEq)]
pub struct EmailContent {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub html_body: String,
}

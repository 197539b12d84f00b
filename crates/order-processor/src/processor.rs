//! 订单履约处理器
//!
//! 校验通过的订单依次经过四个履约步骤：库存检查 -> 库存预留 ->
//! 运费计算 -> 发票生成。步骤顺序固定，全部完成消息才算处理完毕；
//! 任一步骤失败即整体失败并向上传播，不存在部分完成状态。
//!
//! 四个步骤通过 `FulfillmentService` trait 抽象，当前默认实现为
//! 固定延迟的模拟执行，接入真实库存/计费系统时只需替换实现，
//! 状态机本身不动。

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pipeline_shared::messages::OrderMessage;
use tracing::info;

use crate::error::OrderError;

/// 模拟步骤的固定延迟
const STEP_LATENCY: Duration = Duration::from_millis(100);

/// 履约能力抽象
///
/// 使用 trait object 而非泛型参数，因为处理器会被存储到 Consumer 中，
/// trait object 避免了泛型传播到整个调用链。
#[async_trait]
pub trait FulfillmentService: Send + Sync {
    /// 检查订单各条目的库存
    async fn check_inventory(&self, order: &OrderMessage) -> Result<(), OrderError>;

    /// 预留库存
    async fn reserve_items(&self, order: &OrderMessage) -> Result<(), OrderError>;

    /// 计算运费
    async fn calculate_shipping(&self, order: &OrderMessage) -> Result<(), OrderError>;

    /// 生成发票
    async fn generate_invoice(&self, order: &OrderMessage) -> Result<(), OrderError>;
}

// ---------------------------------------------------------------------------
// SimulatedFulfillment — 默认模拟实现
// ---------------------------------------------------------------------------

/// 模拟履约实现
///
/// 每个步骤等待固定延迟后成功返回，只产生日志副作用。
pub struct SimulatedFulfillment {
    latency: Duration,
}

impl SimulatedFulfillment {
    pub fn new() -> Self {
        Self {
            latency: STEP_LATENCY,
        }
    }

    /// 测试中用更短的延迟加速执行
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedFulfillment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FulfillmentService for SimulatedFulfillment {
    async fn check_inventory(&self, order: &OrderMessage) -> Result<(), OrderError> {
        tokio::time::sleep(self.latency).await;
        info!(
            order_id = order.order_id,
            items = order.items.len(),
            "模拟库存检查完成"
        );
        Ok(())
    }

    async fn reserve_items(&self, order: &OrderMessage) -> Result<(), OrderError> {
        tokio::time::sleep(self.latency).await;
        info!(order_id = order.order_id, "模拟库存预留完成");
        Ok(())
    }

    async fn calculate_shipping(&self, order: &OrderMessage) -> Result<(), OrderError> {
        tokio::time::sleep(self.latency).await;
        info!(
            order_id = order.order_id,
            total_amount = order.total_amount,
            "模拟运费计算完成"
        );
        Ok(())
    }

    async fn generate_invoice(&self, order: &OrderMessage) -> Result<(), OrderError> {
        tokio::time::sleep(self.latency).await;
        info!(
            order_id = order.order_id,
            user_id = order.user_id,
            "模拟发票生成完成"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// OrderProcessor
// ---------------------------------------------------------------------------

/// 订单处理器
///
/// 持有履约能力并驱动四步状态机。处理器本身无状态，
/// 可在并发调用下安全复用。
pub struct OrderProcessor {
    fulfillment: Arc<dyn FulfillmentService>,
}

impl OrderProcessor {
    pub fn new(fulfillment: Arc<dyn FulfillmentService>) -> Self {
        Self { fulfillment }
    }

    /// 按固定顺序执行履约步骤
    ///
    /// 每一步 await 完成后才开始下一步；首个错误中止后续步骤并传播。
    pub async fn process(&self, order: &OrderMessage) -> Result<(), OrderError> {
        info!(
            order_id = order.order_id,
            user_id = order.user_id,
            total_amount = order.total_amount,
            "开始处理订单"
        );

        self.fulfillment.check_inventory(order).await?;
        self.fulfillment.reserve_items(order).await?;
        self.fulfillment.calculate_shipping(order).await?;
        self.fulfillment.generate_invoice(order).await?;

        info!(order_id = order.order_id, "订单处理完成");
        Ok(())
    }
}

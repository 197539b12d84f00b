//! 订单确认通知服务
//!
//! 从扇出 topic 消费订单创建事件：拆掉发布/订阅信封，反序列化内层
//! 事件，渲染 HTML 确认邮件并交给派发器发送。到达这里的事件默认
//! 已在上游通过订单校验，本服务不再重复校验。

pub mod consumer;
pub mod envelope;
pub mod error;
pub mod sender;
pub mod templates;

//! 订单处理服务
//!
//! 消费 Kafka 中的原始订单消息：反序列化、校验，通过后依次执行
//! 履约步骤（库存检查、预留、运费计算、发票生成），
//! 成功后向扇出 topic 发布订单创建事件。
//! 校验失败与空负载就地终结，解析失败与履约失败上报平台重投递。

pub mod consumer;
pub mod error;
pub mod processor;
pub mod publisher;
pub mod validator;

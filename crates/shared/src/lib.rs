//! 共享库
//!
//! 包含两个消费者服务共用的消息模型、错误处理、配置、
//! Kafka 基础设施和批次执行器。

pub mod batch;
pub mod config;
pub mod error;
pub mod kafka;
pub mod messages;
pub mod observability;

//! 发布/订阅信封拆解
//!
//! 经由 topic 扇出再落到队列的事件被包在一层信封对象里，
//! 真正的事件 JSON 作为转义字符串放在 `Message` 字段中。
//! 拆信封刻意保持宽松：任何解析失败或字段缺失都回退为
//! 把原始消息体当作内层负载——可用性优先于协议严格性，
//! 拆信封这一步永远不会让消息失败。

use tracing::debug;

/// 尝试从信封对象中取出内层负载
///
/// 消息体能解析为带字符串 `Message` 字段的 JSON 对象时返回该字段值，
/// 其余情况（非 JSON、非对象、字段缺失或非字符串）原样返回消息体。
pub fn unwrap_envelope(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => match map.get("Message").and_then(|v| v.as_str()) {
            Some(inner) => {
                debug!("检测到信封格式，提取内层消息");
                inner.to_string()
            }
            None => body.to_string(),
        },
        _ => body.to_string(),
    }
}

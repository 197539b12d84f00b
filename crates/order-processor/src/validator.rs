//! 订单校验
//!
//! 纯同步校验，不查询任何外部状态。规则按固定顺序评估，
//! 首个不满足的规则短路返回，错误文案与上游消费方约定保持一致。

use pipeline_shared::messages::{OrderMessage, ValidationResult};

/// 校验一条订单消息
///
/// 评估顺序固定：orderId -> userId -> totalAmount -> items。
/// 多条规则同时不满足时，始终报告最先列出的那条。
pub fn validate(order: &OrderMessage) -> ValidationResult {
    if order.order_id <= 0 {
        return ValidationResult::invalid("OrderId debe ser mayor que 0");
    }

    if order.user_id <= 0 {
        return ValidationResult::invalid("UserId debe ser mayor que 0");
    }

    if order.total_amount <= 0.0 {
        return ValidationResult::invalid("TotalAmount debe ser mayor que 0");
    }

    if order.items.is_empty() {
        return ValidationResult::invalid("Debe tener al menos 1 item");
    }

    ValidationResult::valid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pipeline_shared::messages::OrderItem;

    fn make_order() -> OrderMessage {
        OrderMessage {
            order_id: 1,
            user_id: 1,
            total_amount: 99.99,
            items: vec![OrderItem {
                product_id: 1,
                product_name: "Widget".to_string(),
                quantity: 2,
            }],
            timestamp: Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_valid_order() {
        let result = validate(&make_order());
        assert!(result.is_valid);
        assert!(result.error_message.is_empty());
    }

    #[test]
    fn test_invalid_order_id() {
        let order = OrderMessage {
            order_id: 0,
            ..make_order()
        };
        let result = validate(&order);
        assert!(!result.is_valid);
        assert_eq!(result.error_message, "OrderId debe ser mayor que 0");
    }

    #[test]
    fn test_invalid_user_id() {
        let order = OrderMessage {
            user_id: -5,
            ..make_order()
        };
        let result = validate(&order);
        assert!(!result.is_valid);
        assert_eq!(result.error_message, "UserId debe ser mayor que 0");
    }

    #[test]
    fn test_invalid_total_amount() {
        let order = OrderMessage {
            total_amount: 0.0,
            ..make_order()
        };
        let result = validate(&order);
        assert!(!result.is_valid);
        assert_eq!(result.error_message, "TotalAmount debe ser mayor que 0");
    }

    #[test]
    fn test_empty_items() {
        let order = OrderMessage {
            items: vec![],
            ..make_order()
        };
        let result = validate(&order);
        assert!(!result.is_valid);
        assert_eq!(result.error_message, "Debe tener al menos 1 item");
    }

    #[test]
    fn test_multiple_failures_report_earliest_rule() {
        // orderId 与 items 同时不满足时，短路在最先列出的规则上
        let order = OrderMessage {
            order_id: 0,
            items: vec![],
            ..make_order()
        };
        let result = validate(&order);
        assert_eq!(result.error_message, "OrderId debe ser mayor que 0");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let order = OrderMessage {
            total_amount: -1.0,
            ..make_order()
        };
        let first = validate(&order);
        let second = validate(&order);
        assert_eq!(first, second);
    }
}

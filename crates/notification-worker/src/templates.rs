//! 订单确认邮件模板
//!
//! 由订单创建事件确定性地渲染邮件内容。收件地址由 userId 按固定
//! 模板推导，主题嵌入 orderId，正文为 HTML 文档：订单号、用户、
//! 两位小数的总额、格式化时间戳，以及每个条目一行的商品列表。
//! 当前使用硬编码模板以降低外部依赖。

use pipeline_shared::messages::{EmailContent, OrderCreatedEvent};

/// 固定发件地址
pub const FROM_ADDRESS: &str = "pedidos@tienda.example.com";

/// 渲染订单确认邮件
///
/// 纯函数：同一事件渲染结果恒定。不对事件本身做任何校验——
/// 能走到这里的事件默认已满足上游的订单有效性规则。
pub fn render_confirmation(event: &OrderCreatedEvent) -> EmailContent {
    let to = format!("usuario{}@example.com", event.user_id);
    let subject = format!("Confirmación de pedido #{}", event.order_id);

    let mut items_html = String::new();
    for item in &event.items {
        items_html.push_str(&format!(
            "<li>{} (x{})</li>",
            item.product_name, item.quantity
        ));
    }

    let html_body = format!(
        "<html><body>\
         <h1>¡Gracias por tu pedido!</h1>\
         <p>Pedido #{order_id} confirmado para el usuario {user_id}.</p>\
         <p>Total: ${total:.2}</p>\
         <p>Fecha: {timestamp}</p>\
         <h2>Artículos</h2>\
         <ul>{items}</ul>\
         </body></html>",
        order_id = event.order_id,
        user_id = event.user_id,
        total = event.total_amount,
        timestamp = event.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        items = items_html,
    );

    EmailContent {
        to,
        from: FROM_ADDRESS.to_string(),
        subject,
        html_body,
    }
}

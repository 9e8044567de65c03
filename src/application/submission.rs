use crate::domain::order::OneClickOrder;
use crate::domain::ports::OrderGatewayArc;
use crate::error::Result;

/// Validates and submits a one-click order, returning the opaque order id.
///
/// Validation failures surface synchronously and are never logged as
/// system failures. Backend rejections are logged raw and mapped to
/// user-readable messages by `CheckoutError::user_message`. There is no
/// retry here: the user resubmits explicitly.
pub async fn submit_one_click(gateway: &OrderGatewayArc, order: OneClickOrder) -> Result<String> {
    let order = order.normalized()?;
    match gateway.submit_one_click(&order).await {
        Ok(order_id) => {
            tracing::debug!(order_id = %order_id, product_id = %order.product_id, "one-click order submitted");
            Ok(order_id)
        }
        Err(err) => {
            tracing::warn!(error = %err, product_id = %order.product_id, "order submission failed");
            Err(err)
        }
    }
}

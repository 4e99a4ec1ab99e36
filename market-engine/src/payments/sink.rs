/// Order status port the payment coordinator reports into
///
/// Each call returns whether the order exists. Implementations must be
/// idempotent: repeating a call, or calling it after the order has moved
/// past the target status, succeeds without changing anything.
pub trait OrderStatusSink: Send + Sync {
    fn mark_order_paid(&self, order_id: &str) -> bool;
    fn mark_order_payment_failed(&self, order_id: &str) -> bool;
    fn mark_order_cod_confirmed(&self, order_id: &str) -> bool;
}

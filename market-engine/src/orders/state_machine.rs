//! Order and shipment transition rules
//!
//! ```text
//! order:     pending_payment ──► cod_confirmed ──► paid
//!                  │   └──────────────────────────► paid
//!                  └──► payment_failed ──► cod_confirmed | paid
//!
//! shipment:  pending ──► packed ──► shipped ──► delivered
//!               └──────────┴──────────┴──► cancelled
//! ```
//!
//! `paid`, `delivered` and `cancelled` are terminal.

use shared::order::{OrderStatus, ShipmentStatus};

/// Whether an order may move from `from` to `to` (`from != to`)
pub fn can_transition_order(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;
    match from {
        PendingPayment => matches!(to, CodConfirmed | Paid | PaymentFailed),
        PaymentFailed => matches!(to, CodConfirmed | Paid),
        CodConfirmed => matches!(to, Paid),
        Paid => false,
    }
}

/// Whether a shipment may move from `from` to `to` (`from != to`)
///
/// Forward moves are single-step; skipping ahead is rejected so the timeline
/// always records every stage.
pub fn can_transition_shipment(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    if to == ShipmentStatus::Cancelled {
        return !from.is_terminal();
    }
    from.next() == Some(to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::*;
    use ShipmentStatus::*;

    #[test]
    fn test_order_transitions() {
        assert!(can_transition_order(PendingPayment, Paid));
        assert!(can_transition_order(PendingPayment, CodConfirmed));
        assert!(can_transition_order(PendingPayment, PaymentFailed));

        assert!(can_transition_order(PaymentFailed, Paid));
        assert!(can_transition_order(PaymentFailed, CodConfirmed));
        assert!(!can_transition_order(PaymentFailed, PendingPayment));

        assert!(can_transition_order(CodConfirmed, Paid));
        assert!(!can_transition_order(CodConfirmed, PaymentFailed));
        assert!(!can_transition_order(CodConfirmed, PendingPayment));

        for to in [PendingPayment, CodConfirmed, PaymentFailed] {
            assert!(!can_transition_order(Paid, to));
        }
    }

    #[test]
    fn test_shipment_single_step() {
        assert!(can_transition_shipment(Pending, Packed));
        assert!(can_transition_shipment(Packed, Shipped));
        assert!(can_transition_shipment(Shipped, Delivered));

        assert!(!can_transition_shipment(Pending, Shipped));
        assert!(!can_transition_shipment(Pending, Delivered));
        assert!(!can_transition_shipment(Delivered, Pending));
        assert!(!can_transition_shipment(Shipped, Packed));
    }

    #[test]
    fn test_shipment_cancellation() {
        assert!(can_transition_shipment(Pending, Cancelled));
        assert!(can_transition_shipment(Packed, Cancelled));
        assert!(can_transition_shipment(Shipped, Cancelled));
        assert!(!can_transition_shipment(Delivered, Cancelled));
        assert!(!can_transition_shipment(Cancelled, Pending));
    }
}

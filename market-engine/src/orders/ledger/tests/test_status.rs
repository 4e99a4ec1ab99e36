use super::*;

#[test]
fn test_mark_paid_is_terminal() {
    let ledger = create_test_ledger();
    let order = place_two_vendor_order(&ledger, &Actor::buyer("u1"), "k1");

    assert!(ledger.mark_order_paid(&order.id));
    // later callbacks report success but change nothing
    assert!(ledger.mark_order_payment_failed(&order.id));
    assert!(ledger.mark_order_cod_confirmed(&order.id));
    assert!(ledger.mark_order_paid(&order.id));

    let stored = ledger.get_order_for_admin(&order.id).unwrap();
    assert_eq!(stored.status, OrderStatus::Paid);
}

#[test]
fn test_failed_payment_can_be_retried() {
    let ledger = create_test_ledger();
    let order = place_two_vendor_order(&ledger, &Actor::buyer("u1"), "k1");

    assert!(ledger.mark_order_payment_failed(&order.id));
    assert_eq!(
        ledger.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::PaymentFailed
    );

    assert!(ledger.mark_order_cod_confirmed(&order.id));
    assert_eq!(
        ledger.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::CodConfirmed
    );
}

#[test]
fn test_cod_confirmed_does_not_regress() {
    let ledger = create_test_ledger();
    let order = place_two_vendor_order(&ledger, &Actor::buyer("u1"), "k1");

    assert!(ledger.mark_order_cod_confirmed(&order.id));
    assert!(ledger.mark_order_payment_failed(&order.id));
    assert_eq!(
        ledger.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::CodConfirmed
    );

    assert!(ledger.mark_order_paid(&order.id));
    assert_eq!(
        ledger.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::Paid
    );
}

#[test]
fn test_mark_unknown_order() {
    let ledger = create_test_ledger();
    assert!(!ledger.mark_order_paid("ord_missing"));
    assert!(!ledger.mark_order_cod_confirmed("ord_missing"));
    assert!(!ledger.mark_order_payment_failed("ord_missing"));
}

#[test]
fn test_admin_update_paid_then_failed_rejected() {
    let ledger = create_test_ledger();
    let order = place_two_vendor_order(&ledger, &Actor::buyer("u1"), "k1");

    let paid = ledger.update_order_status(&order.id, "paid").unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    let err = ledger
        .update_order_status(&order.id, "payment_failed")
        .unwrap_err();
    assert!(matches!(err, CommerceError::OrderStatusTransition { .. }));
    assert_eq!(
        ledger.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::Paid
    );
}

#[test]
fn test_admin_update_validation() {
    let ledger = create_test_ledger();
    let order = place_two_vendor_order(&ledger, &Actor::buyer("u1"), "k1");

    assert!(matches!(
        ledger.update_order_status(&order.id, "shipped").unwrap_err(),
        CommerceError::InvalidOrderStatus(_)
    ));
    assert!(matches!(
        ledger.update_order_status("ord_missing", "paid").unwrap_err(),
        CommerceError::OrderNotFound(_)
    ));

    // same status is a no-op
    let same = ledger
        .update_order_status(&order.id, "pending_payment")
        .unwrap();
    assert_eq!(same.status, OrderStatus::PendingPayment);

    ledger
        .update_order_status(&order.id, "payment_failed")
        .unwrap();
    assert!(matches!(
        ledger
            .update_order_status(&order.id, "pending_payment")
            .unwrap_err(),
        CommerceError::OrderStatusTransition { .. }
    ));
}

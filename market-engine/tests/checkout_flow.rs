//! End-to-end buyer journeys through the `Marketplace` entry points
//!
//! Two-vendor cart → order → payment (card / COD) → shipping → refund

use market_engine::audit::{AuditAction, MemoryAuditSink};
use market_engine::payments::webhook::sign_payload;
use market_engine::{
    CommerceError, EngineConfig, ErrorCode, InMemoryCatalog, InMemoryVendorDirectory,
    MarketError, Marketplace, PaymentError, RefundError,
};
use shared::models::{Actor, ProductSnapshot};
use shared::order::{OrderStatus, ShipmentStatus};
use shared::payment::{PaymentSettingsUpdate, PaymentStatus};
use shared::refund::RefundStatus;
use shared::util::now_secs;
use std::sync::Arc;

const WEBHOOK_SECRET: &str = "whsec_flow";

struct Harness {
    market: Marketplace,
    audit: Arc<MemoryAuditSink>,
}

fn create_marketplace() -> Harness {
    let catalog = Arc::new(InMemoryCatalog::new());
    let vendors = Arc::new(InMemoryVendorDirectory::new());
    for (product_id, vendor_id, price) in [
        ("tea", "vendor-a", 600),
        ("kettle", "vendor-b", 2600),
    ] {
        vendors.add_verified(vendor_id);
        catalog.upsert(ProductSnapshot {
            product_id: product_id.to_string(),
            vendor_id: vendor_id.to_string(),
            title: format!("{} (test)", product_id),
            currency: "USD".to_string(),
            unit_price_cents: price,
            stock_qty: 20,
        });
    }
    let audit = Arc::new(MemoryAuditSink::new());
    let market = Marketplace::new(
        EngineConfig::with_webhook_secret(WEBHOOK_SECRET),
        catalog,
        vendors,
        audit.clone(),
    );
    Harness { market, audit }
}

fn fill_cart(market: &Marketplace, actor: &Actor) {
    market.add_to_cart(actor, "tea", 2).unwrap();
    market.add_to_cart(actor, "kettle", 1).unwrap();
}

fn intent_event(event_id: &str, event_type: &str, provider_ref: &str) -> Vec<u8> {
    serde_json::to_vec(&serde_json::json!({
        "id": event_id,
        "type": event_type,
        "data": { "object": { "id": provider_ref, "object": "payment_intent" } }
    }))
    .unwrap()
}

#[test]
fn test_two_vendor_quote_and_order() {
    let h = create_marketplace();
    let buyer = Actor::buyer("u1");
    fill_cart(&h.market, &buyer);

    let quote = h.market.quote(&buyer).unwrap();
    assert_eq!(quote.shipments.len(), 2);
    assert_eq!(quote.subtotal_cents, 3800);
    assert_eq!(quote.shipping_cents, 1000);
    assert_eq!(quote.discount_cents, 0);
    assert_eq!(quote.tax_cents, 0);
    assert_eq!(quote.total_cents, 4800);

    let order = h.market.place_order(&buyer, "checkout-1").unwrap();
    assert_eq!(order.status, OrderStatus::PendingPayment);
    assert_eq!(order.total_cents, 4800);
    assert_eq!(order.shipments[0].vendor_id, "vendor-a");
    assert_eq!(order.shipments[0].total_cents, 1700);
    assert_eq!(order.shipments[1].total_cents, 3100);
    assert!(h.market.get_cart(&buyer).unwrap().items.is_empty());

    // replay returns the same order even though the cart is now empty
    let replay = h.market.place_order(&buyer, " checkout-1 ").unwrap();
    assert_eq!(replay.id, order.id);
    assert_eq!(
        h.market.place_order(&buyer, "checkout-2").unwrap_err(),
        CommerceError::CartEmpty
    );
}

#[tokio::test]
async fn test_card_payment_settles_through_webhook() {
    let h = create_marketplace();
    let buyer = Actor::buyer("u1");
    fill_cart(&h.market, &buyer);
    let order = h.market.place_order(&buyer, "checkout-1").unwrap();

    let intent = h
        .market
        .pay_with_card(&buyer, &order.id, "pay-1")
        .await
        .unwrap();
    assert_eq!(intent.amount_cents, 4800);
    assert_eq!(intent.status, PaymentStatus::Pending);

    let replay = h
        .market
        .pay_with_card(&buyer, &order.id, "pay-1")
        .await
        .unwrap();
    assert_eq!(replay.id, intent.id);

    let payload = intent_event("evt_1", "payment_intent.succeeded", &intent.provider_ref);
    let header = sign_payload(&payload, WEBHOOK_SECRET, now_secs());

    let first = h.market.handle_stripe_webhook(&payload, &header).unwrap();
    assert!(first.processed);
    assert!(!first.duplicate);
    assert_eq!(first.order_id.as_deref(), Some(order.id.as_str()));
    assert_eq!(first.payment_status, Some(PaymentStatus::Succeeded));

    let second = h.market.handle_stripe_webhook(&payload, &header).unwrap();
    assert!(second.duplicate);
    assert!(!second.processed);

    let settled = h.market.get_order(&buyer, &order.id).unwrap().unwrap();
    assert_eq!(settled.status, OrderStatus::Paid);
    assert_eq!(
        h.market.get_payment(&intent.id).unwrap().status(),
        PaymentStatus::Succeeded
    );

    // a late failure event never downgrades a settled payment
    let late = intent_event("evt_2", "payment_intent.payment_failed", &intent.provider_ref);
    let late_header = sign_payload(&late, WEBHOOK_SECRET, now_secs());
    h.market.handle_stripe_webhook(&late, &late_header).unwrap();
    assert_eq!(
        h.market.get_order_for_admin(&order.id).unwrap().status,
        OrderStatus::Paid
    );

    // one record per processed event; the duplicate delivery adds none
    let applied = h
        .audit
        .records()
        .iter()
        .filter(|r| r.action == AuditAction::PaymentWebhookApplied)
        .count();
    assert_eq!(applied, 2);
}

#[test]
fn test_webhook_rejects_bad_signature() {
    let h = create_marketplace();
    let payload = intent_event("evt_1", "payment_intent.succeeded", "pi_1");
    let header = sign_payload(&payload, "whsec_other", now_secs());

    assert_eq!(
        h.market.handle_stripe_webhook(&payload, &header).unwrap_err(),
        PaymentError::InvalidSignature
    );
    let stale = sign_payload(&payload, WEBHOOK_SECRET, now_secs() - 3600);
    assert_eq!(
        h.market.handle_stripe_webhook(&payload, &stale).unwrap_err(),
        PaymentError::InvalidSignature
    );
}

#[test]
fn test_cod_disabled_then_enabled() {
    let h = create_marketplace();
    let guest = Actor::guest("g1");
    fill_cart(&h.market, &guest);
    let order = h.market.place_order(&guest, "checkout-1").unwrap();

    h.market.update_payment_settings(PaymentSettingsUpdate {
        cod_enabled: Some(false),
        ..Default::default()
    });
    let err = h.market.pay_with_cod(&guest, &order.id, "cod-1").unwrap_err();
    assert_eq!(err, MarketError::Payment(PaymentError::CodDisabled));
    assert_eq!(err.code(), ErrorCode::CodDisabled);

    let settings = h.market.update_payment_settings(PaymentSettingsUpdate {
        cod_enabled: Some(true),
        ..Default::default()
    });
    assert!(settings.cod_enabled);

    let payment = h.market.pay_with_cod(&guest, &order.id, "cod-1").unwrap();
    assert_eq!(payment.status, PaymentStatus::PendingCollection);
    assert_eq!(
        h.market.get_order(&guest, &order.id).unwrap().unwrap().status,
        OrderStatus::CodConfirmed
    );
}

#[test]
fn test_vendor_shipment_lifecycle() {
    let h = create_marketplace();
    let buyer = Actor::buyer("u1");
    fill_cart(&h.market, &buyer);
    let order = h.market.place_order(&buyer, "checkout-1").unwrap();
    let shipment_id = order.shipments[0].id.clone();

    let listed = h.market.list_vendor_shipments("vendor-a").unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].items.len(), 1);

    assert!(matches!(
        h.market
            .update_vendor_shipment_status("vendor-b", &shipment_id, "packed", "vb")
            .unwrap_err(),
        CommerceError::ShipmentForbidden(_)
    ));
    assert!(matches!(
        h.market
            .update_vendor_shipment_status("vendor-a", &shipment_id, "delivered", "va")
            .unwrap_err(),
        CommerceError::ShipmentTransition { .. }
    ));

    for status in ["packed", "shipped", "delivered"] {
        h.market
            .update_vendor_shipment_status("vendor-a", &shipment_id, status, "va")
            .unwrap();
    }
    let delivered = h
        .market
        .get_vendor_shipment("vendor-a", &shipment_id)
        .unwrap()
        .unwrap();
    assert_eq!(delivered.status, ShipmentStatus::Delivered);
    assert!(delivered.shipped_at.is_some());
    assert!(delivered.delivered_at.is_some());
    let timeline: Vec<ShipmentStatus> = delivered.timeline.iter().map(|e| e.status).collect();
    assert_eq!(
        timeline,
        [
            ShipmentStatus::Pending,
            ShipmentStatus::Packed,
            ShipmentStatus::Shipped,
            ShipmentStatus::Delivered
        ]
    );

    assert!(matches!(
        h.market
            .get_vendor_shipment("vendor-b", &shipment_id)
            .unwrap_err(),
        CommerceError::ShipmentForbidden(_)
    ));
    assert!(
        h.market
            .get_vendor_shipment("vendor-a", "shp_missing")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_refund_request_and_decision() {
    let h = create_marketplace();
    let buyer = Actor::buyer("u1");
    fill_cart(&h.market, &buyer);
    let order = h.market.place_order(&buyer, "checkout-1").unwrap();
    let shipment = order.shipments[1].clone();

    let err = h
        .market
        .request_refund(&buyer, &order.id, &shipment.id, "damaged", 0)
        .unwrap_err();
    assert_eq!(err, MarketError::Refund(RefundError::OrderNotRefundable));

    h.market.pay_with_cod(&buyer, &order.id, "cod-1").unwrap();

    let request = h
        .market
        .request_refund(&buyer, &order.id, &shipment.id, " damaged ", 0)
        .unwrap();
    assert_eq!(request.requested_amount_cents, 3100);
    assert_eq!(request.vendor_id, "vendor-b");
    assert_eq!(request.reason, "damaged");

    let duplicate = h
        .market
        .request_refund(&buyer, &order.id, &shipment.id, "again", 100)
        .unwrap_err();
    assert_eq!(duplicate.code(), ErrorCode::RefundRequestDuplicate);

    assert_eq!(
        h.market
            .decide_refund("vendor-a", &request.id, "approve", "", "va")
            .unwrap_err(),
        RefundError::RefundRequestForbidden
    );

    let decided = h
        .market
        .decide_refund("vendor-b", &request.id, "approve", "ok", "vb")
        .unwrap();
    assert_eq!(decided.status, RefundStatus::Approved);
    assert_eq!(decided.decided_by_user_id.as_deref(), Some("vb"));

    assert_eq!(
        h.market
            .decide_refund("vendor-b", &request.id, "reject", "", "vb")
            .unwrap_err(),
        RefundError::DecisionConflict
    );

    // the shipment is free for a new request once decided
    let second = h
        .market
        .request_refund(&buyer, &order.id, &shipment.id, "still broken", 500)
        .unwrap();
    assert_ne!(second.id, request.id);

    let pending = h
        .market
        .list_vendor_refunds("vendor-b", Some("pending"))
        .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, second.id);
    assert_eq!(h.market.list_vendor_refunds("vendor-b", None).unwrap().len(), 2);
}

#[test]
fn test_every_mutation_is_audited() {
    let h = create_marketplace();
    let buyer = Actor::buyer("u1");
    fill_cart(&h.market, &buyer);
    let cart = h.market.get_cart(&buyer).unwrap();
    h.market
        .update_cart_item(&buyer, &cart.items[0].id, 3)
        .unwrap();
    h.market.remove_cart_item(&buyer, &cart.items[0].id).unwrap();
    h.market.add_to_cart(&buyer, "tea", 1).unwrap();
    let order = h.market.place_order(&buyer, "checkout-1").unwrap();
    h.market.update_order_status(&order.id, "paid").unwrap();

    let actions: Vec<AuditAction> = h.audit.records().iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        [
            AuditAction::CartItemUpserted,
            AuditAction::CartItemUpserted,
            AuditAction::CartItemQtyUpdated,
            AuditAction::CartItemRemoved,
            AuditAction::CartItemUpserted,
            AuditAction::OrderPlaced,
            AuditAction::OrderStatusUpdated,
        ]
    );
    let records = h.audit.records();
    assert!(records.iter().all(|r| !r.actor.is_empty()));
    assert_eq!(records[2].resource_id, "user:u1");
}

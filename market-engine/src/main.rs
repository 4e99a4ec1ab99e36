use market_engine::audit::{AuditWorker, ChannelAuditSink};
use market_engine::{
    ChangeRecord, EngineConfig, InMemoryCatalog, InMemoryVendorDirectory, Marketplace,
};
use shared::models::{Actor, ProductSnapshot};
use std::sync::Arc;

/// Run one guest checkout against an in-memory catalog and print the order
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load config (.env + environment)
    let config = EngineConfig::from_env();
    market_engine::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Market engine demo starting...");

    // 2. Audit channel + background worker
    let (audit, rx) = ChannelAuditSink::new(config.audit_buffer_size);
    let worker = tokio::spawn(
        AuditWorker::new(|record: ChangeRecord| {
            tracing::info!(
                action = %record.action,
                actor = %record.actor,
                changes = record.changes.len(),
                "audit"
            );
        })
        .run(rx),
    );

    // 3. Demo catalog
    let catalog = Arc::new(InMemoryCatalog::new());
    let vendors = Arc::new(InMemoryVendorDirectory::new());
    for (product_id, vendor_id, price) in [("mug", "vendor-a", 600), ("lamp", "vendor-b", 2600)] {
        vendors.add_verified(vendor_id);
        catalog.upsert(ProductSnapshot {
            product_id: product_id.to_string(),
            vendor_id: vendor_id.to_string(),
            title: product_id.to_string(),
            currency: config.currency.clone(),
            unit_price_cents: price,
            stock_qty: 0,
        });
    }

    let market = Marketplace::new(config, catalog, vendors, Arc::new(audit.clone()));

    // 4. Guest checkout + cash on delivery
    let guest = Actor::guest(shared::util::prefixed_id("guest"));
    market.add_to_cart(&guest, "mug", 2)?;
    market.add_to_cart(&guest, "lamp", 1)?;
    let order = market.place_order(&guest, "demo-checkout")?;
    let payment = market.pay_with_cod(&guest, &order.id, "demo-cod")?;

    let settled = market
        .get_order(&guest, &order.id)?
        .ok_or("order vanished")?;
    println!("{}", serde_json::to_string_pretty(&settled)?);
    tracing::info!(
        order_id = %settled.id,
        payment_id = %payment.id,
        total_cents = settled.total_cents,
        "Demo checkout finished"
    );

    // Close the channel and let the worker drain
    drop(market);
    drop(audit);
    let delivered = worker.await?;
    tracing::info!(delivered, "Audit records delivered");

    Ok(())
}

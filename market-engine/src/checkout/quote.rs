use crate::core::{CommerceError, CommerceResult};
use shared::order::{CartItem, CheckoutQuote, QuoteShipment};
use std::collections::BTreeMap;

/// Partition cart lines into vendor shipments and price them
///
/// Shipments come out sorted by vendor id; lines inside a shipment keep cart
/// order. Each shipment pays `shipping_fee_cents` exactly once. Discount and
/// tax are always zero (prices are tax-inclusive, promotions are not applied).
pub fn build_quote(
    currency: &str,
    items: &[CartItem],
    shipping_fee_cents: i64,
) -> CommerceResult<CheckoutQuote> {
    if items.is_empty() {
        return Err(CommerceError::CartEmpty);
    }

    let mut by_vendor: BTreeMap<&str, Vec<CartItem>> = BTreeMap::new();
    for item in items {
        by_vendor
            .entry(item.vendor_id.as_str())
            .or_default()
            .push(item.clone());
    }

    let shipments = by_vendor
        .into_iter()
        .map(|(vendor_id, items)| -> CommerceResult<QuoteShipment> {
            let item_count = checked_sum(items.iter().map(|i| i.qty))?;
            let subtotal_cents = checked_sum(items.iter().map(|i| i.line_total_cents))?;
            let total_cents = subtotal_cents
                .checked_add(shipping_fee_cents)
                .ok_or(CommerceError::InvalidQuantity)?;
            Ok(QuoteShipment {
                vendor_id: vendor_id.to_string(),
                items,
                item_count,
                subtotal_cents,
                shipping_fee_cents,
                total_cents,
            })
        })
        .collect::<CommerceResult<Vec<_>>>()?;

    let item_count = checked_sum(shipments.iter().map(|s| s.item_count))?;
    let subtotal_cents = checked_sum(shipments.iter().map(|s| s.subtotal_cents))?;
    let shipping_cents = checked_sum(shipments.iter().map(|s| s.shipping_fee_cents))?;
    let total_cents = checked_sum(shipments.iter().map(|s| s.total_cents))?;

    Ok(CheckoutQuote {
        currency: currency.to_string(),
        shipments,
        item_count,
        subtotal_cents,
        shipping_cents,
        discount_cents: 0,
        tax_cents: 0,
        total_cents,
    })
}

/// Quantities and amounts that no longer fit in an i64 are rejected as
/// `InvalidQuantity`
fn checked_sum(mut values: impl Iterator<Item = i64>) -> CommerceResult<i64> {
    values
        .try_fold(0i64, |acc, v| acc.checked_add(v))
        .ok_or(CommerceError::InvalidQuantity)
}

//! Settled-order revenue split

use crate::ports::VendorDirectory;
use serde::{Deserialize, Serialize};
use shared::order::{Order, ShipmentStatus};

/// Gross and platform commission of one order, in cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFinancials {
    pub gross_cents: i64,
    pub commission_cents: i64,
}

impl OrderFinancials {
    pub fn vendor_payout_cents(&self) -> i64 {
        self.gross_cents - self.commission_cents
    }
}

/// Revenue of a settled order
///
/// Unsettled orders yield zero. Cancelled shipments are excluded; each
/// remaining shipment pays its vendor's override rate, or `default_bps`.
pub fn settled_order_financials(
    order: &Order,
    vendors: &dyn VendorDirectory,
    default_bps: u32,
) -> OrderFinancials {
    if !order.status.is_settled() {
        return OrderFinancials::default();
    }

    order
        .shipments
        .iter()
        .filter(|s| s.status != ShipmentStatus::Cancelled)
        .fold(OrderFinancials::default(), |mut acc, shipment| {
            let bps = vendors
                .vendor(&shipment.vendor_id)
                .map_or(default_bps, |v| v.commission_bps(default_bps));
            acc.gross_cents += shipment.total_cents;
            acc.commission_cents += shipment.total_cents * i64::from(bps) / 10_000;
            acc
        })
}

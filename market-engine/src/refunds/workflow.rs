//! RefundWorkflow - buyer refund requests and vendor decisions
//!
//! One pending request per `(order, shipment)`; the pending index is cleared
//! when the vendor decides, after which a new request may be filed.

use super::error::{RefundError, RefundResult};
use parking_lot::RwLock;
use shared::models::Actor;
use shared::order::Order;
use shared::refund::{RefundDecision, RefundRequest, RefundStatus};
use shared::util::{now_millis, prefixed_id};
use std::collections::HashMap;

#[derive(Debug, Default)]
struct RefundState {
    requests: HashMap<String, RefundRequest>,
    /// vendor id -> request ids, in creation order
    by_vendor: HashMap<String, Vec<String>>,
    /// "<order id>:<shipment id>" -> pending request id
    pending: HashMap<String, String>,
}

fn pending_key(order_id: &str, shipment_id: &str) -> String {
    format!("{}:{}", order_id, shipment_id)
}

/// Refund Workflow
#[derive(Debug, Default)]
pub struct RefundWorkflow {
    state: RwLock<RefundState>,
}

impl RefundWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// File a refund request against one shipment of a settled order
    ///
    /// `requested_amount_cents == 0` requests the full shipment total. The
    /// vendor is taken from the shipment.
    pub fn create_request(
        &self,
        actor: &Actor,
        order: &Order,
        shipment_id: &str,
        reason: &str,
        requested_amount_cents: i64,
    ) -> RefundResult<RefundRequest> {
        if order.id.trim().is_empty() {
            return Err(RefundError::InvalidOrder);
        }
        if !order.status.is_settled() {
            return Err(RefundError::OrderNotRefundable);
        }
        let shipment_id = shipment_id.trim();
        if shipment_id.is_empty() {
            return Err(RefundError::InvalidShipment);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(RefundError::InvalidReason);
        }
        let shipment = order
            .shipment(shipment_id)
            .ok_or_else(|| RefundError::ShipmentNotFound(shipment_id.to_string()))?;

        let amount = if requested_amount_cents == 0 {
            shipment.total_cents
        } else {
            requested_amount_cents
        };
        if amount <= 0 || amount > shipment.total_cents {
            return Err(RefundError::InvalidAmount);
        }

        let now = now_millis();
        let request = RefundRequest {
            id: prefixed_id("rfr"),
            order_id: order.id.clone(),
            shipment_id: shipment.id.clone(),
            vendor_id: shipment.vendor_id.clone(),
            buyer_user_id: actor.buyer_user_id().map(str::to_string),
            guest_token: actor.guest_token().map(str::to_string),
            reason: reason.to_string(),
            requested_amount_cents: amount,
            currency: order.currency.clone(),
            status: RefundStatus::Pending,
            outcome: RefundStatus::Pending,
            decision: None,
            decision_reason: None,
            decided_by_user_id: None,
            decided_at: None,
            created_at: now,
            updated_at: now,
        };

        let key = pending_key(&request.order_id, &request.shipment_id);
        let mut state = self.state.write();
        if let Some(existing) = state.pending.get(&key) {
            tracing::warn!(
                order_id = %request.order_id,
                shipment_id = %request.shipment_id,
                pending_id = %existing,
                "Duplicate refund request rejected"
            );
            return Err(RefundError::RefundRequestDuplicate);
        }
        state.pending.insert(key, request.id.clone());
        state
            .by_vendor
            .entry(request.vendor_id.clone())
            .or_default()
            .push(request.id.clone());
        state.requests.insert(request.id.clone(), request.clone());

        tracing::info!(
            refund_id = %request.id,
            order_id = %request.order_id,
            shipment_id = %request.shipment_id,
            vendor_id = %request.vendor_id,
            amount_cents = request.requested_amount_cents,
            "Refund request created"
        );
        Ok(request)
    }

    /// A vendor's requests, most recently updated first
    pub fn list_vendor_requests(
        &self,
        vendor_id: &str,
        status_filter: Option<&str>,
    ) -> RefundResult<Vec<RefundRequest>> {
        let vendor_id = vendor_id.trim();
        if vendor_id.is_empty() {
            return Err(RefundError::InvalidVendor);
        }
        let status = match status_filter.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<RefundStatus>()
                    .map_err(|_| RefundError::InvalidStatusFilter(raw.to_string()))?,
            ),
            None => None,
        };

        let state = self.state.read();
        let mut requests: Vec<RefundRequest> = state
            .by_vendor
            .get(vendor_id)
            .into_iter()
            .flatten()
            .filter_map(|id| state.requests.get(id))
            .filter(|r| status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(requests)
    }

    /// Approve or reject a pending request; decisions are final
    pub fn decide_request(
        &self,
        vendor_id: &str,
        request_id: &str,
        decision: &str,
        decision_reason: &str,
        actor_user_id: &str,
    ) -> RefundResult<RefundRequest> {
        let vendor_id = vendor_id.trim();
        if vendor_id.is_empty() {
            return Err(RefundError::InvalidVendor);
        }
        let request_id = request_id.trim();
        if request_id.is_empty() {
            return Err(RefundError::RefundRequestNotFound(String::new()));
        }
        let decision = decision
            .parse::<RefundDecision>()
            .map_err(|_| RefundError::InvalidDecision(decision.to_string()))?;
        let decision_reason = decision_reason.trim();
        let actor_user_id = actor_user_id.trim();

        let mut state = self.state.write();
        let request = state
            .requests
            .get_mut(request_id)
            .ok_or_else(|| RefundError::RefundRequestNotFound(request_id.to_string()))?;
        if request.vendor_id != vendor_id {
            tracing::warn!(refund_id = %request_id, vendor_id = %vendor_id, "Refund decision by foreign vendor");
            return Err(RefundError::RefundRequestForbidden);
        }
        if request.status != RefundStatus::Pending {
            return Err(RefundError::DecisionConflict);
        }

        let now = now_millis();
        request.status = decision.outcome();
        request.outcome = decision.outcome();
        request.decision = Some(decision);
        request.decision_reason =
            (!decision_reason.is_empty()).then(|| decision_reason.to_string());
        request.decided_by_user_id = (!actor_user_id.is_empty()).then(|| actor_user_id.to_string());
        request.decided_at = Some(now);
        request.updated_at = now;
        let decided = request.clone();

        state
            .pending
            .remove(&pending_key(&decided.order_id, &decided.shipment_id));

        tracing::info!(
            refund_id = %decided.id,
            vendor_id = %vendor_id,
            decision = decision.as_str(),
            "Refund request decided"
        );
        Ok(decided)
    }

    pub fn get_request(&self, request_id: &str) -> Option<RefundRequest> {
        self.state.read().requests.get(request_id.trim()).cloned()
    }
}

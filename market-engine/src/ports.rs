//! Lookup ports for the catalog and vendor registry
//!
//! The engine only reads through these traits. The in-memory implementations
//! back tests and single-process deployments.

use parking_lot::RwLock;
use shared::models::{ProductSnapshot, VendorProfile, VerificationState};
use std::collections::HashMap;

/// Product snapshot lookup
pub trait ProductCatalog: Send + Sync {
    fn product_snapshot(&self, product_id: &str) -> Option<ProductSnapshot>;
}

/// Vendor registry lookup
pub trait VendorDirectory: Send + Sync {
    fn vendor(&self, vendor_id: &str) -> Option<VendorProfile>;
}

/// In-memory catalog keyed by product id
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<String, ProductSnapshot>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, product: ProductSnapshot) {
        self.products
            .write()
            .insert(product.product_id.clone(), product);
    }

    pub fn remove(&self, product_id: &str) -> Option<ProductSnapshot> {
        self.products.write().remove(product_id)
    }
}

impl ProductCatalog for InMemoryCatalog {
    fn product_snapshot(&self, product_id: &str) -> Option<ProductSnapshot> {
        self.products.read().get(product_id.trim()).cloned()
    }
}

/// In-memory vendor registry keyed by vendor id
#[derive(Debug, Default)]
pub struct InMemoryVendorDirectory {
    vendors: RwLock<HashMap<String, VendorProfile>>,
}

impl InMemoryVendorDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, vendor: VendorProfile) {
        self.vendors.write().insert(vendor.vendor_id.clone(), vendor);
    }

    /// Register a verified vendor with no commission override
    pub fn add_verified(&self, vendor_id: &str) {
        self.upsert(VendorProfile {
            vendor_id: vendor_id.to_string(),
            verification_state: VerificationState::Verified,
            commission_override_bps: None,
        });
    }

    /// Returns false when the vendor is unknown
    pub fn set_verification(&self, vendor_id: &str, state: VerificationState) -> bool {
        match self.vendors.write().get_mut(vendor_id) {
            Some(vendor) => {
                vendor.verification_state = state;
                true
            }
            None => false,
        }
    }

    /// Returns false when the vendor is unknown
    pub fn set_commission(&self, vendor_id: &str, commission_bps: Option<u32>) -> bool {
        match self.vendors.write().get_mut(vendor_id) {
            Some(vendor) => {
                vendor.commission_override_bps = commission_bps;
                true
            }
            None => false,
        }
    }
}

impl VendorDirectory for InMemoryVendorDirectory {
    fn vendor(&self, vendor_id: &str) -> Option<VendorProfile> {
        self.vendors.read().get(vendor_id.trim()).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_lookup() {
        let catalog = InMemoryCatalog::new();
        catalog.upsert(ProductSnapshot {
            product_id: "p1".into(),
            vendor_id: "v1".into(),
            title: "Mug".into(),
            currency: "USD".into(),
            unit_price_cents: 600,
            stock_qty: 0,
        });

        assert_eq!(catalog.product_snapshot(" p1 ").unwrap().title, "Mug");
        assert!(catalog.product_snapshot("p2").is_none());
        assert!(catalog.remove("p1").is_some());
        assert!(catalog.product_snapshot("p1").is_none());
    }

    #[test]
    fn test_vendor_updates() {
        let vendors = InMemoryVendorDirectory::new();
        vendors.add_verified("v1");
        assert!(vendors.vendor("v1").unwrap().is_verified());

        assert!(vendors.set_verification("v1", VerificationState::Suspended));
        assert!(!vendors.vendor("v1").unwrap().is_verified());

        assert!(vendors.set_commission("v1", Some(250)));
        assert_eq!(vendors.vendor("v1").unwrap().commission_bps(1000), 250);

        assert!(!vendors.set_commission("missing", None));
    }
}

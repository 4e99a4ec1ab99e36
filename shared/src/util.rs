/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current UTC timestamp in whole seconds
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Generate a resource id of the form `<prefix>_<32 hex chars>`.
///
/// Prefixes keep ids self-describing in logs: `ord`, `shp`, `oit`, `cit`,
/// `pay`, `rfr`.
pub fn prefixed_id(prefix: &str) -> String {
    format!("{}_{}", prefix, uuid::Uuid::new_v4().simple())
}

//! Catalog persistence metrics.
//!
//! Counts backend operations by outcome and records how often reads fall
//! back from the remote store to the local file.

use metrics::{counter, describe_counter, describe_histogram, histogram};

// ============================================================================
// Metric Names
// ============================================================================

/// Backend operation counter.
pub const BACKEND_OPS: &str = "denial_catalog_backend_ops_total";

/// Backend operation duration histogram.
pub const BACKEND_OP_DURATION: &str = "denial_catalog_backend_op_duration_seconds";

/// Remote-to-file read fallback counter.
pub const READ_FALLBACKS: &str = "denial_catalog_read_fallbacks_total";

/// Schema rejection counter.
pub const SCHEMA_REJECTIONS: &str = "denial_catalog_schema_rejections_total";

// ============================================================================
// Metric Registration
// ============================================================================

/// Registers all catalog metric descriptions.
///
/// Call this once at application startup after initializing the metrics recorder.
pub fn register_metrics() {
    describe_counter!(BACKEND_OPS, "Total catalog backend operations by outcome");
    describe_histogram!(
        BACKEND_OP_DURATION,
        "Duration of catalog backend operations in seconds"
    );
    describe_counter!(
        READ_FALLBACKS,
        "Total reads served from the file after the remote store was unavailable"
    );
    describe_counter!(SCHEMA_REJECTIONS, "Total candidate catalogs rejected by validation");
}

// ============================================================================
// Metric Recording
// ============================================================================

/// Records one backend operation.
pub fn record_backend_op(backend: &str, operation: &str, outcome: &str, duration_secs: f64) {
    let labels = [
        ("backend", backend.to_string()),
        ("operation", operation.to_string()),
        ("outcome", outcome.to_string()),
    ];
    counter!(BACKEND_OPS, &labels).increment(1);
    histogram!(BACKEND_OP_DURATION, &labels).record(duration_secs);
}

/// Records a read that fell back to the file backend.
pub fn record_fallback(reason: &str) {
    counter!(READ_FALLBACKS, "reason" => reason.to_string()).increment(1);
}

/// Records a rejected candidate catalog.
pub fn record_schema_rejection() {
    counter!(SCHEMA_REJECTIONS).increment(1);
}

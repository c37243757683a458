//! Port traits for record sources.
//!
//! These traits define the data interface used by the pagination engine.
//! Implementations live in the infrastructure layer (e.g., `tracker-storage`).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::models::{DkimResult, DmarcScan, GuidanceTag, Organization, SpfScan};

use super::pagination::OrderBy;
use super::record::Record;

// =============================================================================
// Window Queries
// =============================================================================

/// Direction in which a window is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanDirection {
    /// From just after `after` (or the start) towards the end.
    Forward,
    /// From just before `before` (or the end) towards the start.
    Backward,
}

/// A bounded slice of the ordered candidate set.
///
/// `after` and `before` are record keys and act as exclusive bounds on the
/// ordered sequence. Adapters return up to [`WindowQuery::fetch_size`]
/// records in scan order, so a backward window is returned last-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowQuery {
    pub direction: ScanDirection,
    pub after: Option<String>,
    pub before: Option<String>,
    /// Records requested by the caller.
    pub limit: usize,
    pub order_by: Option<OrderBy>,
}

impl WindowQuery {
    /// Records to fetch: one past the limit to detect further data.
    pub fn fetch_size(&self) -> usize {
        self.limit + 1
    }
}

/// Whether records lie outside a window's bounds.
///
/// Unset bounds report `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeyondBounds {
    /// Some record sits at or before the `after` bound.
    pub after: bool,
    /// Some record sits at or after the `before` bound.
    pub before: bool,
}

// =============================================================================
// Source Traits
// =============================================================================

/// Ordered record set for one entity type and one filter context.
///
/// The filter context (e.g. "SPF scans of domain X") is fixed when the
/// source is constructed. Ordering must follow
/// [`compare_records`](super::record::compare_records): the requested field,
/// then key ascending.
#[async_trait]
pub trait RecordSource<R: Record>: Send + Sync {
    /// Fetch a window of records in scan order.
    async fn fetch_window(&self, query: &WindowQuery) -> SourceResult<Vec<R>>;

    /// Check for records past the bounds of `query`, using the same
    /// ordering as [`RecordSource::fetch_window`].
    async fn fetch_beyond_bounds(&self, query: &WindowQuery) -> SourceResult<BeyondBounds>;

    /// Count of the whole candidate set, ignoring any window.
    async fn fetch_total_count(&self) -> SourceResult<u64>;
}

/// Factory for per-entity record sources.
///
/// One implementation exists per backing store.
pub trait RecordSources: Send + Sync {
    /// All organizations.
    fn organizations(&self) -> Arc<dyn RecordSource<Organization>>;

    /// All guidance tags.
    fn guidance_tags(&self) -> Arc<dyn RecordSource<GuidanceTag>>;

    /// DMARC scans of a domain.
    fn dmarc_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<DmarcScan>>;

    /// SPF scans of a domain.
    fn spf_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<SpfScan>>;

    /// DKIM results of a DKIM scan.
    fn dkim_results(&self, dkim_scan_key: &str) -> Arc<dyn RecordSource<DkimResult>>;
}

//! In-memory record sources.
//!
//! Windows follow exactly the rules of the PostgreSQL adapter: ordering by
//! the requested field then key ascending, exclusive keyset bounds, and an
//! empty window when a field-ordered bound key is not in the set.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;

use tracker_core::error::SourceResult;
use tracker_core::models::{DkimResult, DmarcScan, GuidanceTag, Organization, SpfScan};
use tracker_core::ports::{
    compare_records, BeyondBounds, OrderBy, Record, RecordSource, RecordSources, ScanDirection,
    WindowQuery,
};

// =============================================================================
// Record Source
// =============================================================================

/// A fixed set of records held in memory.
#[derive(Debug, Clone)]
pub struct MemoryRecordSource<R> {
    records: Vec<R>,
}

impl<R: Record> MemoryRecordSource<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self { records }
    }

    fn window(&self, query: &WindowQuery) -> Vec<R> {
        let order = query.order_by.as_ref();

        let after = match query.after.as_deref().map(|k| self.bound(k, order)) {
            Some(None) => return Vec::new(),
            Some(Some(bound)) => Some(bound),
            None => None,
        };
        let before = match query.before.as_deref().map(|k| self.bound(k, order)) {
            Some(None) => return Vec::new(),
            Some(Some(bound)) => Some(bound),
            None => None,
        };

        let mut sorted: Vec<&R> = self
            .records
            .iter()
            .filter(|r| after.as_ref().map_or(true, |b| b.compare(*r, order) == Ordering::Greater))
            .filter(|r| before.as_ref().map_or(true, |b| b.compare(*r, order) == Ordering::Less))
            .collect();
        sorted.sort_by(|a, b| compare_records(*a, *b, order));

        if query.direction == ScanDirection::Backward {
            sorted.reverse();
        }

        sorted
            .into_iter()
            .take(query.fetch_size())
            .cloned()
            .collect()
    }

    fn beyond_bounds(&self, query: &WindowQuery) -> BeyondBounds {
        let order = query.order_by.as_ref();
        // `inside` is where window records sit relative to the bound.
        let reaches = |key: Option<&str>, inside: Ordering| {
            key.and_then(|k| self.bound(k, order)).map_or(false, |b| {
                self.records.iter().any(|r| b.compare(r, order) != inside)
            })
        };

        BeyondBounds {
            after: reaches(query.after.as_deref(), Ordering::Greater),
            before: reaches(query.before.as_deref(), Ordering::Less),
        }
    }

    /// Resolve a bound key. Key order needs only the key; field order
    /// needs the bound record itself.
    fn bound<'a>(&'a self, key: &'a str, order: Option<&OrderBy>) -> Option<Bound<'a, R>> {
        match order {
            None => Some(Bound::Key(key)),
            Some(_) => self
                .records
                .iter()
                .find(|r| r.key() == key)
                .map(Bound::Record),
        }
    }
}

enum Bound<'a, R> {
    Key(&'a str),
    Record(&'a R),
}

impl<R: Record> Bound<'_, R> {
    /// Position of `record` relative to this bound.
    fn compare(&self, record: &R, order: Option<&OrderBy>) -> Ordering {
        match self {
            Bound::Key(key) => record.key().cmp(key),
            Bound::Record(bound) => compare_records(record, *bound, order),
        }
    }
}

#[async_trait]
impl<R: Record> RecordSource<R> for MemoryRecordSource<R> {
    async fn fetch_window(&self, query: &WindowQuery) -> SourceResult<Vec<R>> {
        Ok(self.window(query))
    }

    async fn fetch_beyond_bounds(&self, query: &WindowQuery) -> SourceResult<BeyondBounds> {
        Ok(self.beyond_bounds(query))
    }

    async fn fetch_total_count(&self) -> SourceResult<u64> {
        Ok(self.records.len() as u64)
    }
}

// =============================================================================
// Source Factory
// =============================================================================

/// In-memory implementation of [`RecordSources`].
///
/// Scoped sources are filtered by parent key when requested.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    pub organizations: Vec<Organization>,
    pub guidance_tags: Vec<GuidanceTag>,
    pub dmarc_scans: Vec<DmarcScan>,
    pub spf_scans: Vec<SpfScan>,
    pub dkim_results: Vec<DkimResult>,
}

impl RecordSources for MemorySources {
    fn organizations(&self) -> Arc<dyn RecordSource<Organization>> {
        Arc::new(MemoryRecordSource::new(self.organizations.clone()))
    }

    fn guidance_tags(&self) -> Arc<dyn RecordSource<GuidanceTag>> {
        Arc::new(MemoryRecordSource::new(self.guidance_tags.clone()))
    }

    fn dmarc_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<DmarcScan>> {
        let scans = self
            .dmarc_scans
            .iter()
            .filter(|s| s.domain_key == domain_key)
            .cloned()
            .collect();
        Arc::new(MemoryRecordSource::new(scans))
    }

    fn spf_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<SpfScan>> {
        let scans = self
            .spf_scans
            .iter()
            .filter(|s| s.domain_key == domain_key)
            .cloned()
            .collect();
        Arc::new(MemoryRecordSource::new(scans))
    }

    fn dkim_results(&self, dkim_scan_key: &str) -> Arc<dyn RecordSource<DkimResult>> {
        let results = self
            .dkim_results
            .iter()
            .filter(|r| r.dkim_scan_key == dkim_scan_key)
            .cloned()
            .collect();
        Arc::new(MemoryRecordSource::new(results))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use tracker_core::ports::{LoadContext, OrderDirection, PaginationArgs};
    use tracker_core::services::{cursor, ConnectionLoader, LoaderConfig};

    use super::*;

    fn scan(key: &str, domain: &str, ts_secs: i64, pct: i32) -> DmarcScan {
        DmarcScan {
            key: key.to_string(),
            domain_key: domain.to_string(),
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
            record: "v=DMARC1; p=reject".to_string(),
            p_policy: "reject".to_string(),
            sp_policy: "reject".to_string(),
            pct,
            guidance_tags: vec![],
        }
    }

    fn loader() -> ConnectionLoader {
        ConnectionLoader::with_tracing(LoaderConfig::default())
    }

    fn ctx() -> LoadContext {
        LoadContext::new("1", "loadDmarcConnectionsByDomainId").with_parent("domain1")
    }

    fn keys(conn: &tracker_core::ports::Connection<DmarcScan>) -> Vec<String> {
        conn.nodes().map(|n| n.key.clone()).collect()
    }

    fn cursor_of(key: &str) -> String {
        cursor::encode(DmarcScan::TYPE_NAME, key).value
    }

    #[tokio::test]
    async fn test_bounded_forward_window() {
        let source = MemoryRecordSource::new(vec![
            scan("agg3", "d", 3, 100),
            scan("agg1", "d", 1, 100),
            scan("agg2", "d", 2, 100),
        ]);
        let args = PaginationArgs::first(1)
            .after(cursor_of("agg1"))
            .before(cursor_of("agg3"));

        let conn = loader().load(&source, args, &ctx()).await.unwrap();

        assert_eq!(keys(&conn), ["agg2"]);
        assert_eq!(conn.total_count, 3);
        assert!(conn.page_info.has_next_page && conn.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn test_last_by_timestamp() {
        let source = MemoryRecordSource::new(vec![scan("b", "d", 20, 0), scan("a", "d", 10, 0)]);
        let args = PaginationArgs::last(1).order_by(OrderBy::new("timestamp", OrderDirection::Asc));

        let conn = loader().load(&source, args, &ctx()).await.unwrap();

        assert_eq!(keys(&conn), ["b"]);
        assert!(!conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    // Test critique: tri sur un champ non unique, aucune ligne sautée ni dupliquée
    #[tokio::test]
    async fn test_paging_over_duplicate_values_visits_every_record_once() {
        let records: Vec<_> = (0..11)
            .map(|i| scan(&format!("scan{i:02}"), "d", 0, [50, 100, 50][i % 3]))
            .collect();
        let source = MemoryRecordSource::new(records);
        let order = OrderBy::new("pct", OrderDirection::Desc);

        let mut seen = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut args = PaginationArgs::first(3).order_by(order.clone());
            args.after = after.clone();
            let conn = loader().load(&source, args, &ctx()).await.unwrap();
            seen.extend(keys(&conn));
            if !conn.page_info.has_next_page {
                break;
            }
            after = Some(conn.page_info.end_cursor.clone());
        }

        let pct_100: Vec<_> = seen.iter().take(4).cloned().collect();
        assert_eq!(pct_100, ["scan01", "scan04", "scan07", "scan10"]);
        let mut sorted = seen.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 11);
        assert_eq!(seen.len(), 11);

        let mut back = Vec::new();
        let mut before: Option<String> = None;
        loop {
            let mut args = PaginationArgs::last(4).order_by(order.clone());
            args.before = before.clone();
            let conn = loader().load(&source, args, &ctx()).await.unwrap();
            let mut page = keys(&conn);
            page.extend(back);
            back = page;
            if !conn.page_info.has_previous_page {
                break;
            }
            before = Some(conn.page_info.start_cursor.clone());
        }
        assert_eq!(back, seen);
    }

    #[tokio::test]
    async fn test_missing_bound_with_field_order_yields_empty_window() {
        let source = MemoryRecordSource::new(vec![scan("a", "d", 1, 0), scan("b", "d", 2, 0)]);
        let query = WindowQuery {
            direction: ScanDirection::Forward,
            after: Some("deleted".to_string()),
            before: None,
            limit: 10,
            order_by: Some(OrderBy::new("timestamp", OrderDirection::Asc)),
        };
        assert!(source.fetch_window(&query).await.unwrap().is_empty());

        // Key order needs no bound record
        let query = WindowQuery {
            order_by: None,
            ..query
        };
        let keys: Vec<_> = source
            .fetch_window(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.key)
            .collect();
        assert!(keys.is_empty());

        let query = WindowQuery {
            after: Some("a0".to_string()),
            ..query
        };
        assert_eq!(source.fetch_window(&query).await.unwrap().len(), 1);
    }

    // Test critique: un curseur `before` au-delà de la dernière clé ne promet pas de page suivante
    #[tokio::test]
    async fn test_before_past_last_key_has_no_next_page() {
        let source = MemoryRecordSource::new(vec![scan("a", "d", 1, 0), scan("b", "d", 2, 0)]);

        let args = PaginationArgs::first(10).before(cursor_of("zzz"));
        let conn = loader().load(&source, args, &ctx()).await.unwrap();
        assert_eq!(keys(&conn), ["a", "b"]);
        assert!(!conn.page_info.has_next_page);

        let args = PaginationArgs::first(10).after(conn.page_info.end_cursor.clone());
        let next = loader().load(&source, args, &ctx()).await.unwrap();
        assert!(next.edges.is_empty());
    }

    #[tokio::test]
    async fn test_beyond_bounds_with_field_order() {
        let source = MemoryRecordSource::new(vec![
            scan("a", "d", 30, 0),
            scan("b", "d", 10, 0),
            scan("c", "d", 20, 0),
        ]);
        let query = WindowQuery {
            direction: ScanDirection::Forward,
            after: Some("b".to_string()),
            before: Some("a".to_string()),
            limit: 5,
            order_by: Some(OrderBy::new("timestamp", OrderDirection::Asc)),
        };
        let beyond = source.fetch_beyond_bounds(&query).await.unwrap();
        assert!(beyond.after && beyond.before);

        let query = WindowQuery {
            after: Some("gone".to_string()),
            before: None,
            ..query
        };
        assert_eq!(
            source.fetch_beyond_bounds(&query).await.unwrap(),
            BeyondBounds::default()
        );
    }

    #[tokio::test]
    async fn test_sources_are_scoped_to_parent() {
        let sources = MemorySources {
            dmarc_scans: vec![scan("x1", "domain1", 1, 0), scan("x2", "domain2", 1, 0)],
            ..Default::default()
        };
        let source = sources.dmarc_scans("domain1");
        assert_eq!(source.fetch_total_count().await.unwrap(), 1);
        assert_eq!(sources.dmarc_scans("unknown").fetch_total_count().await.unwrap(), 0);
    }
}

//! Connection pagination engine.
//!
//! One generic engine serves every entity type. It validates the caller's
//! arguments, asks the record source for the candidate count and a keyset
//! window, and assembles edges plus page info.
//!
//! # Flow
//!
//! 1. Validate arguments and decode `after`/`before` into keys
//! 2. Fetch the total count, short-circuiting on an empty candidate set
//! 3. Fetch `limit + 1` records in the scan direction
//! 4. Trim the extra record, restore forward order, build edges
//! 5. When a cursor bound is set, ask whether records lie past it
//!
//! Source failures are logged with full detail and returned to the caller
//! as a sanitized [`PaginationError::LoadFailed`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, instrument};

use crate::error::{PaginationError, PaginationResult, SourceError, SourceResult};
use crate::metrics::{
    record_load_failure, record_request, record_validation_error, PaginationTimer,
};
use crate::ports::{
    BeyondBounds, Connection, DiagnosticSink, Edge, Limit, LoadContext, PageInfo, PageRequest,
    PaginationArgs, Record, RecordSource, ScanDirection, TracingSink, WindowQuery,
};

use super::cursor;
use super::validator::validate;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the connection loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Upper bound on each record source fetch.
    pub fetch_timeout: Duration,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// ConnectionLoader
// =============================================================================

/// Generic Relay connection loader.
///
/// Holds no per-request state; a single instance is shared by all resolvers.
pub struct ConnectionLoader {
    config: LoaderConfig,
    sink: Arc<dyn DiagnosticSink>,
}

impl ConnectionLoader {
    pub fn new(config: LoaderConfig, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { config, sink }
    }

    /// Loader that reports diagnostics through `tracing`.
    pub fn with_tracing(config: LoaderConfig) -> Self {
        Self::new(config, Arc::new(TracingSink))
    }

    /// Validate `args` and load one page from `source`.
    #[instrument(skip_all, fields(entity = R::TYPE_NAME, caller = %ctx.caller))]
    pub async fn load<R, S>(
        &self,
        source: &S,
        args: PaginationArgs,
        ctx: &LoadContext,
    ) -> PaginationResult<Connection<R>>
    where
        R: Record,
        S: RecordSource<R> + ?Sized,
    {
        record_request(R::TYPE_NAME);
        let _timer = PaginationTimer::new(R::TYPE_NAME);

        let request = validate::<R>(args, ctx, self.sink.as_ref())
            .inspect_err(|e| record_validation_error(R::TYPE_NAME, e.code()))?;

        self.paginate(source, request, ctx).await
    }

    /// Load one page for an already validated request.
    pub async fn paginate<R, S>(
        &self,
        source: &S,
        request: PageRequest,
        ctx: &LoadContext,
    ) -> PaginationResult<Connection<R>>
    where
        R: Record,
        S: RecordSource<R> + ?Sized,
    {
        let total_count = self.fetch::<R, _, _>(source.fetch_total_count(), ctx).await?;
        if total_count == 0 {
            debug!("Empty candidate set");
            return Ok(Connection::empty());
        }

        let (direction, limit) = match request.limit {
            Limit::First(n) => (ScanDirection::Forward, n as usize),
            Limit::Last(n) => (ScanDirection::Backward, n as usize),
        };

        if limit == 0 {
            return Ok(Connection {
                edges: Vec::new(),
                page_info: PageInfo::default(),
                total_count,
            });
        }

        let query = WindowQuery {
            direction,
            after: request.after,
            before: request.before,
            limit,
            order_by: request.order_by,
        };

        let mut records = self.fetch::<R, _, _>(source.fetch_window(&query), ctx).await?;

        let overflow = records.len() > limit;
        records.truncate(limit);
        if direction == ScanDirection::Backward {
            records.reverse();
        }

        // A bound only implies another page if records actually lie past it.
        let beyond = if records.is_empty() || (query.after.is_none() && query.before.is_none()) {
            BeyondBounds::default()
        } else {
            self.fetch::<R, _, _>(source.fetch_beyond_bounds(&query), ctx)
                .await?
        };

        let (has_next_page, has_previous_page) = match direction {
            ScanDirection::Forward => (overflow || beyond.before, beyond.after),
            ScanDirection::Backward => (beyond.before, overflow || beyond.after),
        };

        let edges: Vec<Edge<R>> = records
            .into_iter()
            .map(|record| Edge {
                cursor: cursor::encode(R::TYPE_NAME, record.key()),
                node: record,
            })
            .collect();

        let page_info = match (edges.first(), edges.last()) {
            (Some(first), Some(last)) => PageInfo {
                has_next_page,
                has_previous_page,
                start_cursor: first.cursor.value.clone(),
                end_cursor: last.cursor.value.clone(),
            },
            _ => PageInfo::default(),
        };

        debug!(edges = edges.len(), total_count, "Connection loaded");

        Ok(Connection {
            edges,
            page_info,
            total_count,
        })
    }

    /// Run one source fetch under the timeout and sanitize its failure.
    async fn fetch<R, T, F>(&self, fut: F, ctx: &LoadContext) -> PaginationResult<T>
    where
        R: Record,
        F: Future<Output = SourceResult<T>>,
    {
        let timeout = self.config.fetch_timeout;
        let result = match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::Timeout(format!(
                "no response within {}ms",
                timeout.as_millis()
            ))),
        };

        result.map_err(|e| {
            self.sink.error(&format!(
                "{} error occurred while user: {} was trying to get {} information for {}, error: {}",
                e.kind(),
                ctx.user,
                R::LABEL,
                ctx.parent_label(),
                e
            ));
            record_load_failure(R::TYPE_NAME);
            PaginationError::LoadFailed { entity: R::LABEL }
        })
    }
}

//! GraphQL schema definition.
//!
//! Every connection field resolves through the shared [`ConnectionLoader`]
//! and a record source obtained from [`RecordSources`].

use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, InputObject, Json, MaybeUndefined,
    Object, Result, Schema, SchemaBuilder,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

use tracker_core::error::PaginationError;
use tracker_core::ports::{
    LoadContext, OrderBy, OrderDirection, PaginationArgs, Record, RecordSource, RecordSources,
};
use tracker_core::services::ConnectionLoader;

use crate::messages::{render_message, Locale};
use crate::types::TrackerSchema;

// -----------------------------------------------------------------------------
// Schema Configuration
// -----------------------------------------------------------------------------

/// Maximum query depth to prevent deeply nested queries (DoS protection).
/// Note: GraphQL introspection requires depth ~13, so we use 15 to allow it.
pub const MAX_QUERY_DEPTH: usize = 15;

/// Maximum query complexity score (DoS protection).
/// Each field has a default complexity of 1, nested objects multiply.
pub const MAX_QUERY_COMPLEXITY: usize = 500;

/// User key reported in diagnostics when the request does not name one.
pub const ANONYMOUS_USER: &str = "anonymous";

/// Per-request caller information, attached by the HTTP handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user: String,
    pub locale: Locale,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            user: ANONYMOUS_USER.to_string(),
            locale: Locale::En,
        }
    }
}

// -----------------------------------------------------------------------------
// Schema Builder
// -----------------------------------------------------------------------------

/// Build the schema with depth and complexity limits.
pub fn build_schema(
    sources: Arc<dyn RecordSources>,
    loader: Arc<ConnectionLoader>,
) -> TrackerSchema {
    schema_builder(sources, loader)
        .limit_depth(MAX_QUERY_DEPTH)
        .limit_complexity(MAX_QUERY_COMPLEXITY)
        .finish()
}

/// Create a schema builder with sources and loader data.
///
/// Remember to call `.limit_depth()` and `.limit_complexity()` before `.finish()`.
pub fn schema_builder(
    sources: Arc<dyn RecordSources>,
    loader: Arc<ConnectionLoader>,
) -> SchemaBuilder<TrackerQuery, EmptyMutation, EmptySubscription> {
    Schema::build(TrackerQuery, EmptyMutation, EmptySubscription)
        .data(sources)
        .data(loader)
}

// -----------------------------------------------------------------------------
// Query Root
// -----------------------------------------------------------------------------

/// Query root exposing one Relay connection per record type.
#[derive(Default)]
pub struct TrackerQuery;

#[Object]
impl TrackerQuery {
    /// Organizations, ordered by key unless `orderBy` is given.
    async fn organizations<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: MaybeUndefined<Json<Value>>,
        last: MaybeUndefined<Json<Value>>,
        before: Option<String>,
        after: Option<String>,
        order_by: Option<OrderByInput>,
    ) -> Result<OrganizationConnection> {
        let sources = ctx.data::<Arc<dyn RecordSources>>()?;
        let args = pagination_args(first, last, before, after, order_by);
        resolve(ctx, sources.organizations(), args, "loadOrganizationConnections", None).await
    }

    /// Guidance tags.
    async fn guidance_tags<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        first: MaybeUndefined<Json<Value>>,
        last: MaybeUndefined<Json<Value>>,
        before: Option<String>,
        after: Option<String>,
        order_by: Option<OrderByInput>,
    ) -> Result<GuidanceTagConnection> {
        let sources = ctx.data::<Arc<dyn RecordSources>>()?;
        let args = pagination_args(first, last, before, after, order_by);
        resolve(ctx, sources.guidance_tags(), args, "loadGuidanceTagConnections", None).await
    }

    /// DMARC scans of one domain.
    #[allow(clippy::too_many_arguments)]
    async fn dmarc_scans<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        domain: String,
        first: MaybeUndefined<Json<Value>>,
        last: MaybeUndefined<Json<Value>>,
        before: Option<String>,
        after: Option<String>,
        order_by: Option<OrderByInput>,
    ) -> Result<DmarcScanConnection> {
        let sources = ctx.data::<Arc<dyn RecordSources>>()?;
        let args = pagination_args(first, last, before, after, order_by);
        resolve(
            ctx,
            sources.dmarc_scans(&domain),
            args,
            "loadDmarcConnectionsByDomainId",
            Some(&domain),
        )
        .await
    }

    /// SPF scans of one domain.
    #[allow(clippy::too_many_arguments)]
    async fn spf_scans<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        domain: String,
        first: MaybeUndefined<Json<Value>>,
        last: MaybeUndefined<Json<Value>>,
        before: Option<String>,
        after: Option<String>,
        order_by: Option<OrderByInput>,
    ) -> Result<SpfScanConnection> {
        let sources = ctx.data::<Arc<dyn RecordSources>>()?;
        let args = pagination_args(first, last, before, after, order_by);
        resolve(
            ctx,
            sources.spf_scans(&domain),
            args,
            "loadSpfConnectionsByDomainId",
            Some(&domain),
        )
        .await
    }

    /// Selector results of one DKIM scan.
    #[allow(clippy::too_many_arguments)]
    async fn dkim_results<'ctx>(
        &self,
        ctx: &Context<'ctx>,
        dkim_scan: String,
        first: MaybeUndefined<Json<Value>>,
        last: MaybeUndefined<Json<Value>>,
        before: Option<String>,
        after: Option<String>,
        order_by: Option<OrderByInput>,
    ) -> Result<DkimResultConnection> {
        let sources = ctx.data::<Arc<dyn RecordSources>>()?;
        let args = pagination_args(first, last, before, after, order_by);
        resolve(
            ctx,
            sources.dkim_results(&dkim_scan),
            args,
            "loadDkimResultConnectionsByDkimId",
            Some(&dkim_scan),
        )
        .await
    }
}

/// Run the loader for one connection field.
async fn resolve<R, C>(
    ctx: &Context<'_>,
    source: Arc<dyn RecordSource<R>>,
    args: PaginationArgs,
    caller: &str,
    parent: Option<&str>,
) -> Result<C>
where
    R: Record,
    C: From<tracker_core::ports::Connection<R>>,
{
    let loader = ctx.data::<Arc<ConnectionLoader>>()?;
    let request = ctx.data_opt::<RequestContext>().cloned().unwrap_or_default();

    let mut load_ctx = LoadContext::new(request.user, caller);
    if let Some(parent) = parent {
        load_ctx = load_ctx.with_parent(parent);
    }

    loader
        .load(source.as_ref(), args, &load_ctx)
        .await
        .map(C::from)
        .map_err(|e| to_graphql_error(&e, request.locale))
}

/// Localized message plus a stable `code` extension.
fn to_graphql_error(err: &PaginationError, locale: Locale) -> async_graphql::Error {
    let code = err.code();
    async_graphql::Error::new(render_message(err, locale)).extend_with(|_, ext| ext.set("code", code))
}

/// `first`/`last` are taken as raw JSON so that validation can report the
/// runtime type of a bad value. An explicit `null` counts as supplied.
fn limit_value(arg: MaybeUndefined<Json<Value>>) -> Option<Value> {
    match arg {
        MaybeUndefined::Undefined => None,
        MaybeUndefined::Null => Some(Value::Null),
        MaybeUndefined::Value(Json(value)) => Some(value),
    }
}

fn pagination_args(
    first: MaybeUndefined<Json<Value>>,
    last: MaybeUndefined<Json<Value>>,
    before: Option<String>,
    after: Option<String>,
    order_by: Option<OrderByInput>,
) -> PaginationArgs {
    PaginationArgs {
        first: limit_value(first),
        last: limit_value(last),
        before,
        after,
        order_by: order_by.map(OrderBy::from),
    }
}

// -----------------------------------------------------------------------------
// Input Types
// -----------------------------------------------------------------------------

/// Ordering direction.
#[derive(async_graphql::Enum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

impl From<Order> for OrderDirection {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => OrderDirection::Asc,
            Order::Desc => OrderDirection::Desc,
        }
    }
}

/// Ordering for a connection. Ties are broken by record key, ascending.
#[derive(InputObject, Clone, Debug)]
#[graphql(name = "OrderBy")]
pub struct OrderByInput {
    pub field: String,
    #[graphql(default)]
    pub direction: Order,
}

impl From<OrderByInput> for OrderBy {
    fn from(input: OrderByInput) -> Self {
        OrderBy::new(input.field, input.direction.into())
    }
}

// -----------------------------------------------------------------------------
// GraphQL Types
// -----------------------------------------------------------------------------

/// Organization type.
#[derive(async_graphql::SimpleObject)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub acronym: String,
    pub slug: String,
    pub domain_count: i64,
    pub verified: bool,
}

impl From<tracker_core::models::Organization> for Organization {
    fn from(o: tracker_core::models::Organization) -> Self {
        Self {
            id: o.key,
            name: o.name,
            acronym: o.acronym,
            slug: o.slug,
            domain_count: o.domain_count,
            verified: o.verified,
        }
    }
}

/// Guidance tag type.
#[derive(async_graphql::SimpleObject)]
pub struct GuidanceTag {
    pub id: String,
    pub tag_id: String,
    pub tag_name: String,
    pub guidance: String,
    pub ref_links: Vec<String>,
}

impl From<tracker_core::models::GuidanceTag> for GuidanceTag {
    fn from(t: tracker_core::models::GuidanceTag) -> Self {
        Self {
            id: t.key,
            tag_id: t.tag_id,
            tag_name: t.tag_name,
            guidance: t.guidance,
            ref_links: t.ref_links,
        }
    }
}

/// DMARC scan type.
#[derive(async_graphql::SimpleObject)]
pub struct DmarcScan {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub record: String,
    pub p_policy: String,
    pub sp_policy: String,
    pub pct: i32,
    pub guidance_tags: Vec<String>,
}

impl From<tracker_core::models::DmarcScan> for DmarcScan {
    fn from(s: tracker_core::models::DmarcScan) -> Self {
        Self {
            id: s.key,
            timestamp: s.timestamp,
            record: s.record,
            p_policy: s.p_policy,
            sp_policy: s.sp_policy,
            pct: s.pct,
            guidance_tags: s.guidance_tags,
        }
    }
}

/// SPF scan type.
#[derive(async_graphql::SimpleObject)]
pub struct SpfScan {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub lookups: i32,
    pub record: String,
    pub spf_default: String,
    pub guidance_tags: Vec<String>,
}

impl From<tracker_core::models::SpfScan> for SpfScan {
    fn from(s: tracker_core::models::SpfScan) -> Self {
        Self {
            id: s.key,
            timestamp: s.timestamp,
            lookups: s.lookups,
            record: s.record,
            spf_default: s.spf_default,
            guidance_tags: s.guidance_tags,
        }
    }
}

/// DKIM selector result type.
#[derive(async_graphql::SimpleObject)]
pub struct DkimResult {
    pub id: String,
    pub selector: String,
    pub record: String,
    pub key_length: i32,
    pub guidance_tags: Vec<String>,
}

impl From<tracker_core::models::DkimResult> for DkimResult {
    fn from(r: tracker_core::models::DkimResult) -> Self {
        Self {
            id: r.key,
            selector: r.selector,
            record: r.record,
            key_length: r.key_length,
            guidance_tags: r.guidance_tags,
        }
    }
}

// -----------------------------------------------------------------------------
// Connection Types (Relay-style pagination)
// -----------------------------------------------------------------------------

#[derive(async_graphql::SimpleObject)]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: String,
    pub end_cursor: String,
}

impl From<tracker_core::ports::PageInfo> for PageInfo {
    fn from(info: tracker_core::ports::PageInfo) -> Self {
        Self {
            has_next_page: info.has_next_page,
            has_previous_page: info.has_previous_page,
            start_cursor: info.start_cursor,
            end_cursor: info.end_cursor,
        }
    }
}

/// Generate Relay-style connection types (Edge + Connection) with From impl.
macro_rules! define_connection {
    ($node:ty, $core_model:ty, $edge:ident, $connection:ident) => {
        #[derive(async_graphql::SimpleObject)]
        pub struct $edge {
            pub node: $node,
            pub cursor: String,
        }

        #[derive(async_graphql::SimpleObject)]
        pub struct $connection {
            pub edges: Vec<$edge>,
            pub page_info: PageInfo,
            pub total_count: u64,
        }

        impl From<tracker_core::ports::Connection<$core_model>> for $connection {
            fn from(conn: tracker_core::ports::Connection<$core_model>) -> Self {
                Self {
                    edges: conn
                        .edges
                        .into_iter()
                        .map(|e| $edge {
                            node: <$node>::from(e.node),
                            cursor: e.cursor.value,
                        })
                        .collect(),
                    page_info: conn.page_info.into(),
                    total_count: conn.total_count,
                }
            }
        }
    };
}

define_connection!(
    Organization,
    tracker_core::models::Organization,
    OrganizationEdge,
    OrganizationConnection
);
define_connection!(
    GuidanceTag,
    tracker_core::models::GuidanceTag,
    GuidanceTagEdge,
    GuidanceTagConnection
);
define_connection!(DmarcScan, tracker_core::models::DmarcScan, DmarcScanEdge, DmarcScanConnection);
define_connection!(SpfScan, tracker_core::models::SpfScan, SpfScanEdge, SpfScanConnection);
define_connection!(
    DkimResult,
    tracker_core::models::DkimResult,
    DkimResultEdge,
    DkimResultConnection
);

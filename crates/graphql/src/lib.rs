//! GraphQL API for Tracker connections.
//!
//! Exposes one Relay connection field per record type. Arguments are
//! validated by the pagination engine in `tracker-core`; its errors are
//! rendered here in the caller's language with a stable `code` extension.
//!
//! # Building the Schema
//!
//! ```ignore
//! use tracker_graphql::{build_schema, serve_with_shutdown, ServerConfig};
//!
//! let loader = Arc::new(ConnectionLoader::with_tracing(LoaderConfig::default()));
//! let schema = build_schema(sources, loader);
//! serve_with_shutdown(schema, ServerConfig::default(), shutdown_signal()).await?;
//! ```

mod messages;
mod schema;
mod server;
mod types;

pub use messages::{render_message, Locale};
pub use schema::{
    build_schema, schema_builder, Order, OrderByInput, PageInfo, RequestContext, TrackerQuery,
    ANONYMOUS_USER, MAX_QUERY_COMPLEXITY, MAX_QUERY_DEPTH,
};
pub use server::{serve_with_shutdown, ServerConfig};
pub use types::TrackerSchema;

//! Record sources for Tracker.
//!
//! This crate provides implementations of the `RecordSource` and
//! `RecordSources` ports defined in `tracker-core`:
//!
//! - [`postgres`] - PostgreSQL keyset queries, connection pooling, migrations
//! - [`memory`] - Fixed in-memory record sets, used in tests and demos
//!
//! # Usage
//!
//! ```ignore
//! use tracker_storage::{Database, DatabaseConfig, PgSources};
//!
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let sources: Arc<dyn RecordSources> = Arc::new(PgSources::new(&db));
//! ```

pub mod memory;
pub mod postgres;

pub use memory::{MemoryRecordSource, MemorySources};
pub use postgres::{Database, DatabaseConfig, PgRecordSource, PgSources};

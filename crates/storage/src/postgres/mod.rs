//! PostgreSQL storage adapter.
//!
//! This module implements the record source ports defined in `tracker-core`
//! using PostgreSQL as the backing store.
//!
//! # Architecture
//!
//! - [`Database`] - Connection pool and migrations
//! - [`PgSources`] - Factory implementing the `RecordSources` trait
//! - [`PgRecordSource`] - Generic keyset window source, one per table
//!
//! # Usage
//!
//! ```ignore
//! let config = DatabaseConfig::for_api(&database_url);
//! let db = Database::connect(&config).await?;
//! db.migrate().await?;
//!
//! let sources = PgSources::new(&db);
//! ```

mod database;
mod helpers;
mod records;
mod source;

pub use database::{Database, DatabaseConfig};
pub use records::PgRecord;
pub use source::PgRecordSource;

use std::sync::Arc;

use sqlx::PgPool;

use tracker_core::models::{DkimResult, DmarcScan, GuidanceTag, Organization, SpfScan};
use tracker_core::ports::{RecordSource, RecordSources};

// =============================================================================
// Source Factory
// =============================================================================

/// PostgreSQL implementation of [`RecordSources`].
///
/// Sources are cheap to build; each holds a clone of the shared pool.
#[derive(Clone)]
pub struct PgSources {
    pool: PgPool,
}

impl PgSources {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}

impl RecordSources for PgSources {
    fn organizations(&self) -> Arc<dyn RecordSource<Organization>> {
        Arc::new(PgRecordSource::<Organization>::new(self.pool.clone()))
    }

    fn guidance_tags(&self) -> Arc<dyn RecordSource<GuidanceTag>> {
        Arc::new(PgRecordSource::<GuidanceTag>::new(self.pool.clone()))
    }

    fn dmarc_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<DmarcScan>> {
        Arc::new(PgRecordSource::<DmarcScan>::scoped(
            self.pool.clone(),
            domain_key,
        ))
    }

    fn spf_scans(&self, domain_key: &str) -> Arc<dyn RecordSource<SpfScan>> {
        Arc::new(PgRecordSource::<SpfScan>::scoped(self.pool.clone(), domain_key))
    }

    fn dkim_results(&self, dkim_scan_key: &str) -> Arc<dyn RecordSource<DkimResult>> {
        Arc::new(PgRecordSource::<DkimResult>::scoped(
            self.pool.clone(),
            dkim_scan_key,
        ))
    }
}

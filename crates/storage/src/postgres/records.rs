//! Table mappings for each record type.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;

use tracker_core::error::SourceResult;
use tracker_core::models::{DkimResult, DmarcScan, GuidanceTag, Organization, SpfScan};
use tracker_core::ports::Record;

use super::helpers::{checked_non_negative, checked_percentage};

/// A record type stored in its own PostgreSQL table.
///
/// Every table has a unique text `key` column used for keyset bounds and
/// as the tie-break.
pub trait PgRecord: Record {
    type Row: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin;

    const TABLE: &'static str;

    /// Column list used in `SELECT`.
    const COLUMNS: &'static str;

    /// Column holding the parent key for scoped tables.
    const PARENT_COLUMN: Option<&'static str> = None;

    /// Column backing an orderable field.
    fn column(field: &str) -> Option<&'static str>;

    fn from_row(row: Self::Row) -> SourceResult<Self>;
}

// =============================================================================
// Organizations
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct OrganizationRow {
    key: String,
    name: String,
    acronym: String,
    slug: String,
    domain_count: i64,
    verified: bool,
}

impl PgRecord for Organization {
    type Row = OrganizationRow;

    const TABLE: &'static str = "organizations";
    const COLUMNS: &'static str = "key, name, acronym, slug, domain_count, verified";

    fn column(field: &str) -> Option<&'static str> {
        match field {
            "name" => Some("name"),
            "acronym" => Some("acronym"),
            "domainCount" => Some("domain_count"),
            "verified" => Some("verified"),
            _ => None,
        }
    }

    fn from_row(row: OrganizationRow) -> SourceResult<Self> {
        Ok(Organization {
            domain_count: checked_non_negative(row.domain_count, "organization.domain_count")?,
            key: row.key,
            name: row.name,
            acronym: row.acronym,
            slug: row.slug,
            verified: row.verified,
        })
    }
}

// =============================================================================
// Guidance Tags
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct GuidanceTagRow {
    key: String,
    tag_id: String,
    tag_name: String,
    guidance: String,
    ref_links: Vec<String>,
}

impl PgRecord for GuidanceTag {
    type Row = GuidanceTagRow;

    const TABLE: &'static str = "guidance_tags";
    const COLUMNS: &'static str = "key, tag_id, tag_name, guidance, ref_links";

    fn column(field: &str) -> Option<&'static str> {
        match field {
            "tagId" => Some("tag_id"),
            "tagName" => Some("tag_name"),
            "guidance" => Some("guidance"),
            _ => None,
        }
    }

    fn from_row(row: GuidanceTagRow) -> SourceResult<Self> {
        Ok(GuidanceTag {
            key: row.key,
            tag_id: row.tag_id,
            tag_name: row.tag_name,
            guidance: row.guidance,
            ref_links: row.ref_links,
        })
    }
}

// =============================================================================
// DMARC Scans
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct DmarcScanRow {
    key: String,
    domain_key: String,
    timestamp: DateTime<Utc>,
    record: String,
    p_policy: String,
    sp_policy: String,
    pct: i32,
    guidance_tags: Vec<String>,
}

impl PgRecord for DmarcScan {
    type Row = DmarcScanRow;

    const TABLE: &'static str = "dmarc_scans";
    const COLUMNS: &'static str =
        "key, domain_key, timestamp, record, p_policy, sp_policy, pct, guidance_tags";
    const PARENT_COLUMN: Option<&'static str> = Some("domain_key");

    fn column(field: &str) -> Option<&'static str> {
        match field {
            "timestamp" => Some("timestamp"),
            "record" => Some("record"),
            "pPolicy" => Some("p_policy"),
            "spPolicy" => Some("sp_policy"),
            "pct" => Some("pct"),
            _ => None,
        }
    }

    fn from_row(row: DmarcScanRow) -> SourceResult<Self> {
        Ok(DmarcScan {
            pct: checked_percentage(row.pct, "dmarc_scan.pct")?,
            key: row.key,
            domain_key: row.domain_key,
            timestamp: row.timestamp,
            record: row.record,
            p_policy: row.p_policy,
            sp_policy: row.sp_policy,
            guidance_tags: row.guidance_tags,
        })
    }
}

// =============================================================================
// SPF Scans
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct SpfScanRow {
    key: String,
    domain_key: String,
    timestamp: DateTime<Utc>,
    lookups: i32,
    record: String,
    spf_default: String,
    guidance_tags: Vec<String>,
}

impl PgRecord for SpfScan {
    type Row = SpfScanRow;

    const TABLE: &'static str = "spf_scans";
    const COLUMNS: &'static str =
        "key, domain_key, timestamp, lookups, record, spf_default, guidance_tags";
    const PARENT_COLUMN: Option<&'static str> = Some("domain_key");

    fn column(field: &str) -> Option<&'static str> {
        match field {
            "timestamp" => Some("timestamp"),
            "lookups" => Some("lookups"),
            "record" => Some("record"),
            "spfDefault" => Some("spf_default"),
            _ => None,
        }
    }

    fn from_row(row: SpfScanRow) -> SourceResult<Self> {
        Ok(SpfScan {
            lookups: checked_non_negative(row.lookups, "spf_scan.lookups")?,
            key: row.key,
            domain_key: row.domain_key,
            timestamp: row.timestamp,
            record: row.record,
            spf_default: row.spf_default,
            guidance_tags: row.guidance_tags,
        })
    }
}

// =============================================================================
// DKIM Results
// =============================================================================

#[derive(sqlx::FromRow)]
pub struct DkimResultRow {
    key: String,
    dkim_scan_key: String,
    selector: String,
    record: String,
    key_length: i32,
    guidance_tags: Vec<String>,
}

impl PgRecord for DkimResult {
    type Row = DkimResultRow;

    const TABLE: &'static str = "dkim_results";
    const COLUMNS: &'static str =
        "key, dkim_scan_key, selector, record, key_length, guidance_tags";
    const PARENT_COLUMN: Option<&'static str> = Some("dkim_scan_key");

    fn column(field: &str) -> Option<&'static str> {
        match field {
            "selector" => Some("selector"),
            "record" => Some("record"),
            "keyLength" => Some("key_length"),
            _ => None,
        }
    }

    fn from_row(row: DkimResultRow) -> SourceResult<Self> {
        Ok(DkimResult {
            key_length: checked_non_negative(row.key_length, "dkim_result.key_length")?,
            key: row.key,
            dkim_scan_key: row.dkim_scan_key,
            selector: row.selector,
            record: row.record,
            guidance_tags: row.guidance_tags,
        })
    }
}

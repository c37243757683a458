//! Domain models served through connections.
//!
//! These models are storage-agnostic and represent the canonical form of
//! the data the API paginates over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::{Record, SortValue};

// =============================================================================
// Organizations
// =============================================================================

/// An organization owning a set of domains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub key: String,
    pub name: String,
    pub acronym: String,
    pub slug: String,
    pub domain_count: i64,
    pub verified: bool,
}

impl Record for Organization {
    const TYPE_NAME: &'static str = "organization";
    const LABEL: &'static str = "organizations";
    const ORDER_FIELDS: &'static [&'static str] = &["name", "acronym", "domainCount", "verified"];

    fn key(&self) -> &str {
        &self.key
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "name" => Some(self.name.as_str().into()),
            "acronym" => Some(self.acronym.as_str().into()),
            "domainCount" => Some(self.domain_count.into()),
            "verified" => Some(self.verified.into()),
            _ => None,
        }
    }
}

// =============================================================================
// Guidance Tags
// =============================================================================

/// Guidance attached to scan results (e.g. `dmarc1`, `spf7`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceTag {
    pub key: String,
    pub tag_id: String,
    pub tag_name: String,
    pub guidance: String,
    pub ref_links: Vec<String>,
}

impl Record for GuidanceTag {
    const TYPE_NAME: &'static str = "guidanceTag";
    const LABEL: &'static str = "guidance tags";
    const ORDER_FIELDS: &'static [&'static str] = &["tagId", "tagName", "guidance"];

    fn key(&self) -> &str {
        &self.key
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "tagId" => Some(self.tag_id.as_str().into()),
            "tagName" => Some(self.tag_name.as_str().into()),
            "guidance" => Some(self.guidance.as_str().into()),
            _ => None,
        }
    }
}

// =============================================================================
// Email Scans
// =============================================================================

/// Result of a DMARC scan of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcScan {
    pub key: String,
    pub domain_key: String,
    pub timestamp: DateTime<Utc>,
    pub record: String,
    pub p_policy: String,
    pub sp_policy: String,
    pub pct: i32,
    pub guidance_tags: Vec<String>,
}

impl Record for DmarcScan {
    const TYPE_NAME: &'static str = "dmarc";
    const LABEL: &'static str = "dmarc scans";
    const ORDER_FIELDS: &'static [&'static str] =
        &["timestamp", "record", "pPolicy", "spPolicy", "pct"];

    fn key(&self) -> &str {
        &self.key
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "timestamp" => Some(self.timestamp.into()),
            "record" => Some(self.record.as_str().into()),
            "pPolicy" => Some(self.p_policy.as_str().into()),
            "spPolicy" => Some(self.sp_policy.as_str().into()),
            "pct" => Some(self.pct.into()),
            _ => None,
        }
    }
}

/// Result of an SPF scan of one domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpfScan {
    pub key: String,
    pub domain_key: String,
    pub timestamp: DateTime<Utc>,
    pub lookups: i32,
    pub record: String,
    pub spf_default: String,
    pub guidance_tags: Vec<String>,
}

impl Record for SpfScan {
    const TYPE_NAME: &'static str = "spf";
    const LABEL: &'static str = "spf scans";
    const ORDER_FIELDS: &'static [&'static str] = &["timestamp", "lookups", "record", "spfDefault"];

    fn key(&self) -> &str {
        &self.key
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "timestamp" => Some(self.timestamp.into()),
            "lookups" => Some(self.lookups.into()),
            "record" => Some(self.record.as_str().into()),
            "spfDefault" => Some(self.spf_default.as_str().into()),
            _ => None,
        }
    }
}

/// One selector's result within a DKIM scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DkimResult {
    pub key: String,
    pub dkim_scan_key: String,
    pub selector: String,
    pub record: String,
    pub key_length: i32,
    pub guidance_tags: Vec<String>,
}

impl Record for DkimResult {
    const TYPE_NAME: &'static str = "dkimResult";
    const LABEL: &'static str = "dkim results";
    const ORDER_FIELDS: &'static [&'static str] = &["selector", "record", "keyLength"];

    fn key(&self) -> &str {
        &self.key
    }

    fn sort_value(&self, field: &str) -> Option<SortValue> {
        match field {
            "selector" => Some(self.selector.as_str().into()),
            "record" => Some(self.record.as_str().into()),
            "keyLength" => Some(self.key_length.into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Test critique: chaque champ annoncé est réellement triable
    #[test]
    fn test_order_fields_resolve() {
        let scan = SpfScan {
            key: "spf1".into(),
            domain_key: "domain1".into(),
            timestamp: Utc::now(),
            lookups: 5,
            record: "v=spf1 -all".into(),
            spf_default: "fail".into(),
            guidance_tags: vec![],
        };
        for field in SpfScan::ORDER_FIELDS {
            assert!(scan.sort_value(field).is_some(), "{field} not sortable");
        }
        assert!(scan.sort_value("domainKey").is_none());
    }

    #[test]
    fn test_cursor_tags_are_distinct() {
        let mut tags = [
            Organization::TYPE_NAME,
            GuidanceTag::TYPE_NAME,
            DmarcScan::TYPE_NAME,
            SpfScan::TYPE_NAME,
            DkimResult::TYPE_NAME,
        ];
        tags.sort_unstable();
        let before = tags.len();
        let mut dedup = tags.to_vec();
        dedup.dedup();
        assert_eq!(dedup.len(), before);
        assert!(tags.iter().all(|t| !t.contains(':')));
    }
}

//! Keyset window queries over PostgreSQL tables.

use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, instrument};

use tracker_core::error::SourceResult;
use tracker_core::ports::{
    BeyondBounds, OrderDirection, RecordSource, ScanDirection, WindowQuery,
};

use super::helpers::query_error;
use super::records::PgRecord;

// =============================================================================
// Query Building
// =============================================================================

/// SQL text with its positional text parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BoundSql {
    pub sql: String,
    pub binds: Vec<String>,
}

#[derive(Default)]
struct Params(Vec<String>);

impl Params {
    fn push(&mut self, value: &str) -> String {
        self.0.push(value.to_string());
        format!("${}", self.0.len())
    }
}

fn parent_condition<R: PgRecord>(parent: Option<&str>, params: &mut Params) -> Option<String> {
    match (R::PARENT_COLUMN, parent) {
        (Some(column), Some(parent)) => Some(format!("{column} = {}", params.push(parent))),
        _ => None,
    }
}

/// Side of the window a bound closes.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Side {
    After,
    Before,
}

/// Ordering column and direction, if `query` orders by a field.
fn order_column<R: PgRecord>(query: &WindowQuery) -> Option<(&'static str, OrderDirection)> {
    query
        .order_by
        .as_ref()
        .and_then(|o| R::column(&o.field).map(|column| (column, o.direction)))
}

/// Predicate locating a row relative to the bound record keyed by `p`.
///
/// With `inside` the row lies strictly between the bound and the window;
/// otherwise it lies at the bound or past it. The bound's field value is
/// looked up within `scope` only.
fn bound_condition<R: PgRecord>(
    order: Option<(&'static str, OrderDirection)>,
    scope: Option<&str>,
    p: &str,
    side: Side,
    inside: bool,
) -> String {
    let toward_end = (side == Side::After) == inside;
    let key_op = match (toward_end, inside) {
        (true, true) => ">",
        (true, false) => ">=",
        (false, true) => "<",
        (false, false) => "<=",
    };

    match order {
        None => format!("key {key_op} {p}"),
        Some((column, direction)) => {
            let op = if (direction == OrderDirection::Asc) == toward_end {
                ">"
            } else {
                "<"
            };
            let scope = scope.map(|c| format!(" AND {c}")).unwrap_or_default();
            let bound = format!("(SELECT {column} FROM {} WHERE key = {p}{scope})", R::TABLE);
            format!("({column} {op} {bound} OR ({column} = {bound} AND key {key_op} {p}))")
        }
    }
}

/// Build the window query for `query`.
///
/// Column names and operators come from [`PgRecord`] mappings and enums;
/// every caller-provided value is a bound parameter. A bound key that no
/// longer exists in scope makes the sub-select `NULL`, so a field-ordered
/// window comes back empty.
pub(crate) fn window_sql<R: PgRecord>(parent: Option<&str>, query: &WindowQuery) -> BoundSql {
    let mut params = Params::default();
    let scope = parent_condition::<R>(parent, &mut params);
    let order = order_column::<R>(query);
    let mut conditions: Vec<String> = scope.iter().cloned().collect();

    for (key, side) in [(&query.after, Side::After), (&query.before, Side::Before)] {
        let Some(key) = key else { continue };
        let p = params.push(key);
        conditions.push(bound_condition::<R>(order, scope.as_deref(), &p, side, true));
    }

    let backward = query.direction == ScanDirection::Backward;
    let key_dir = if backward { "DESC" } else { "ASC" };
    let order_clause = match order {
        None => format!("key {key_dir}"),
        Some((column, direction)) => {
            let ascending = (direction == OrderDirection::Asc) != backward;
            let dir = if ascending { "ASC" } else { "DESC" };
            format!("{column} {dir}, key {key_dir}")
        }
    };

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    BoundSql {
        sql: format!(
            "SELECT {} FROM {}{} ORDER BY {} LIMIT {}",
            R::COLUMNS,
            R::TABLE,
            where_clause,
            order_clause,
            query.fetch_size()
        ),
        binds: params.0,
    }
}

/// Build the query reporting whether rows lie at or past each bound.
///
/// Selects two booleans, `after` then `before`; an unset bound is `FALSE`.
pub(crate) fn beyond_bounds_sql<R: PgRecord>(
    parent: Option<&str>,
    query: &WindowQuery,
) -> BoundSql {
    let mut params = Params::default();
    let scope = parent_condition::<R>(parent, &mut params);
    let order = order_column::<R>(query);

    let mut exists = |key: &Option<String>, side: Side| match key {
        None => "FALSE".to_string(),
        Some(key) => {
            let p = params.push(key);
            let mut conditions: Vec<String> = scope.iter().cloned().collect();
            conditions.push(bound_condition::<R>(order, scope.as_deref(), &p, side, false));
            format!(
                "EXISTS (SELECT 1 FROM {} WHERE {})",
                R::TABLE,
                conditions.join(" AND ")
            )
        }
    };
    let after = exists(&query.after, Side::After);
    let before = exists(&query.before, Side::Before);

    BoundSql {
        sql: format!("SELECT {after}, {before}"),
        binds: params.0,
    }
}

/// Build the candidate count query.
pub(crate) fn count_sql<R: PgRecord>(parent: Option<&str>) -> BoundSql {
    let mut params = Params::default();
    let where_clause = parent_condition::<R>(parent, &mut params)
        .map(|c| format!(" WHERE {c}"))
        .unwrap_or_default();

    BoundSql {
        sql: format!("SELECT COUNT(*) FROM {}{}", R::TABLE, where_clause),
        binds: params.0,
    }
}

// =============================================================================
// Record Source
// =============================================================================

/// PostgreSQL record source for one table, optionally scoped to a parent.
pub struct PgRecordSource<R> {
    pool: PgPool,
    parent: Option<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R: PgRecord> PgRecordSource<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            parent: None,
            _record: PhantomData,
        }
    }

    /// Source restricted to children of `parent`.
    pub fn scoped(pool: PgPool, parent: impl Into<String>) -> Self {
        Self {
            pool,
            parent: Some(parent.into()),
            _record: PhantomData,
        }
    }
}

#[async_trait]
impl<R: PgRecord> RecordSource<R> for PgRecordSource<R> {
    #[instrument(skip_all, fields(table = R::TABLE))]
    async fn fetch_window(&self, query: &WindowQuery) -> SourceResult<Vec<R>> {
        let BoundSql { sql, binds } = window_sql::<R>(self.parent.as_deref(), query);
        debug!(sql = %sql, "Fetching window");

        let mut q = sqlx::query_as::<_, R::Row>(&sql);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        let rows = q.fetch_all(&self.pool).await.map_err(query_error)?;

        rows.into_iter().map(R::from_row).collect()
    }

    #[instrument(skip_all, fields(table = R::TABLE))]
    async fn fetch_beyond_bounds(&self, query: &WindowQuery) -> SourceResult<BeyondBounds> {
        let BoundSql { sql, binds } = beyond_bounds_sql::<R>(self.parent.as_deref(), query);

        let mut q = sqlx::query_as::<_, (bool, bool)>(&sql);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        let (after, before) = q.fetch_one(&self.pool).await.map_err(query_error)?;

        Ok(BeyondBounds { after, before })
    }

    #[instrument(skip_all, fields(table = R::TABLE))]
    async fn fetch_total_count(&self) -> SourceResult<u64> {
        let BoundSql { sql, binds } = count_sql::<R>(self.parent.as_deref());

        let mut q = sqlx::query_scalar::<_, i64>(&sql);
        for value in &binds {
            q = q.bind(value.as_str());
        }
        let count = q.fetch_one(&self.pool).await.map_err(query_error)?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use tracker_core::models::{DmarcScan, GuidanceTag};
    use tracker_core::ports::OrderBy;

    use super::*;

    fn query(direction: ScanDirection, limit: usize) -> WindowQuery {
        WindowQuery {
            direction,
            after: None,
            before: None,
            limit,
            order_by: None,
        }
    }

    #[test]
    fn test_plain_forward_window() {
        let bound = window_sql::<GuidanceTag>(None, &query(ScanDirection::Forward, 10));
        assert_eq!(
            bound.sql,
            "SELECT key, tag_id, tag_name, guidance, ref_links FROM guidance_tags \
             ORDER BY key ASC LIMIT 11"
        );
        assert!(bound.binds.is_empty());
    }

    #[test]
    fn test_scoped_key_bounds() {
        let q = WindowQuery {
            after: Some("agg1".into()),
            before: Some("agg3".into()),
            ..query(ScanDirection::Backward, 1)
        };
        let bound = window_sql::<DmarcScan>(Some("domain1"), &q);
        assert!(bound
            .sql
            .ends_with("FROM dmarc_scans WHERE domain_key = $1 AND key > $2 AND key < $3 ORDER BY key DESC LIMIT 2"));
        assert_eq!(bound.binds, ["domain1", "agg1", "agg3"]);
    }

    // Test critique: le départage par clé reste ascendant quel que soit le sens du tri
    #[test]
    fn test_field_order_uses_key_tie_break() {
        let q = WindowQuery {
            after: Some("k".into()),
            order_by: Some(OrderBy::new("timestamp", OrderDirection::Desc)),
            ..query(ScanDirection::Forward, 5)
        };
        let bound = window_sql::<DmarcScan>(None, &q);
        let sub = "(SELECT timestamp FROM dmarc_scans WHERE key = $1)";
        assert!(bound.sql.contains(&format!(
            "WHERE (timestamp < {sub} OR (timestamp = {sub} AND key > $1))"
        )));
        assert!(bound.sql.contains("ORDER BY timestamp DESC, key ASC LIMIT 6"));
        assert_eq!(bound.binds, ["k"]);

        let q = WindowQuery {
            after: None,
            before: Some("k".into()),
            order_by: Some(OrderBy::new("pct", OrderDirection::Asc)),
            ..query(ScanDirection::Backward, 5)
        };
        let bound = window_sql::<DmarcScan>(None, &q);
        assert!(bound.sql.contains("(pct < (SELECT pct FROM dmarc_scans WHERE key = $1) OR"));
        assert!(bound.sql.contains("AND key < $1))"));
        assert!(bound.sql.contains("ORDER BY pct DESC, key DESC"));
    }

    // Test critique: la valeur de borne n'est lue que dans le périmètre du parent
    #[test]
    fn test_scoped_bound_lookup_stays_in_parent() {
        let q = WindowQuery {
            after: Some("other_domain_scan".into()),
            order_by: Some(OrderBy::new("timestamp", OrderDirection::Asc)),
            ..query(ScanDirection::Forward, 5)
        };
        let bound = window_sql::<DmarcScan>(Some("domain1"), &q);
        let sub = "(SELECT timestamp FROM dmarc_scans WHERE key = $2 AND domain_key = $1)";
        assert!(bound.sql.contains(&format!(
            "WHERE domain_key = $1 AND (timestamp > {sub} OR (timestamp = {sub} AND key > $2))"
        )));
        assert_eq!(bound.binds, ["domain1", "other_domain_scan"]);
    }

    #[test]
    fn test_beyond_bounds_query() {
        let q = WindowQuery {
            before: Some("zzz".into()),
            ..query(ScanDirection::Forward, 10)
        };
        assert_eq!(
            beyond_bounds_sql::<DmarcScan>(Some("domain1"), &q),
            BoundSql {
                sql: "SELECT FALSE, EXISTS (SELECT 1 FROM dmarc_scans \
                      WHERE domain_key = $1 AND key >= $2)"
                    .into(),
                binds: vec!["domain1".into(), "zzz".into()],
            }
        );

        let q = WindowQuery {
            after: Some("k".into()),
            before: None,
            order_by: Some(OrderBy::new("pct", OrderDirection::Desc)),
            ..q
        };
        let bound = beyond_bounds_sql::<DmarcScan>(None, &q);
        let sub = "(SELECT pct FROM dmarc_scans WHERE key = $1)";
        assert_eq!(
            bound.sql,
            format!(
                "SELECT EXISTS (SELECT 1 FROM dmarc_scans WHERE \
                 (pct > {sub} OR (pct = {sub} AND key <= $1))), FALSE"
            )
        );
    }

    #[test]
    fn test_count_query() {
        assert_eq!(
            count_sql::<DmarcScan>(Some("domain1")),
            BoundSql {
                sql: "SELECT COUNT(*) FROM dmarc_scans WHERE domain_key = $1".into(),
                binds: vec!["domain1".into()],
            }
        );
        assert!(count_sql::<GuidanceTag>(Some("ignored")).binds.is_empty());
    }
}

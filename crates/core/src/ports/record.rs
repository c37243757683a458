//! The record abstraction the pagination engine operates on.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use super::pagination::{OrderBy, OrderDirection};

/// Value of an orderable record field.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Bool(_) => 0,
            SortValue::Int(_) => 1,
            SortValue::Float(_) => 2,
            SortValue::Timestamp(_) => 3,
            SortValue::Text(_) => 4,
        }
    }

    /// Total order over sort values. Floats use IEEE total ordering;
    /// mismatched variants order by variant.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Int(b)) => a.cmp(b),
            (SortValue::Float(a), SortValue::Float(b)) => a.total_cmp(b),
            (SortValue::Bool(a), SortValue::Bool(b)) => a.cmp(b),
            (SortValue::Timestamp(a), SortValue::Timestamp(b)) => a.cmp(b),
            (SortValue::Int(a), SortValue::Float(b)) => (*a as f64).total_cmp(b),
            (SortValue::Float(a), SortValue::Int(b)) => a.total_cmp(&(*b as f64)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_string())
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Int(v)
    }
}

impl From<i32> for SortValue {
    fn from(v: i32) -> Self {
        SortValue::Int(v.into())
    }
}

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        SortValue::Bool(v)
    }
}

impl From<DateTime<Utc>> for SortValue {
    fn from(v: DateTime<Utc>) -> Self {
        SortValue::Timestamp(v)
    }
}

/// An entity that can be paginated.
///
/// Implementors have a unique, stable string key and a fixed set of fields
/// they can be ordered by.
pub trait Record: Clone + Send + Sync + 'static {
    /// Type tag embedded in cursors (e.g. `"guidanceTag"`).
    const TYPE_NAME: &'static str;

    /// Plural label used in diagnostics and user-facing errors.
    const LABEL: &'static str;

    /// Fields accepted by `orderBy`.
    const ORDER_FIELDS: &'static [&'static str];

    /// Unique, stable key.
    fn key(&self) -> &str;

    /// Value of an orderable field, `None` for unknown fields.
    fn sort_value(&self, field: &str) -> Option<SortValue>;
}

/// Canonical ordering of two records.
///
/// Without `order_by` records sort by key ascending. With it they sort by the
/// field in the requested direction, then by key ascending.
pub fn compare_records<R: Record>(a: &R, b: &R, order_by: Option<&OrderBy>) -> Ordering {
    let primary = match order_by {
        Some(order) => {
            let ord = match (a.sort_value(&order.field), b.sort_value(&order.field)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (Some(_), None) => Ordering::Greater,
                (None, Some(_)) => Ordering::Less,
                (None, None) => Ordering::Equal,
            };
            match order.direction {
                OrderDirection::Asc => ord,
                OrderDirection::Desc => ord.reverse(),
            }
        }
        None => Ordering::Equal,
    };

    primary.then_with(|| a.key().cmp(b.key()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Row(&'static str, i64);

    impl Record for Row {
        const TYPE_NAME: &'static str = "row";
        const LABEL: &'static str = "rows";
        const ORDER_FIELDS: &'static [&'static str] = &["score"];

        fn key(&self) -> &str {
            self.0
        }

        fn sort_value(&self, field: &str) -> Option<SortValue> {
            match field {
                "score" => Some(self.1.into()),
                _ => None,
            }
        }
    }

    // Test critique: départage par clé même en ordre descendant
    #[test]
    fn test_ties_break_on_key_ascending() {
        let desc = OrderBy::new("score", OrderDirection::Desc);
        let mut rows = vec![Row("c", 1), Row("b", 2), Row("a", 1), Row("d", 2)];
        rows.sort_by(|a, b| compare_records(a, b, Some(&desc)));
        let keys: Vec<_> = rows.iter().map(|r| r.0).collect();
        assert_eq!(keys, ["b", "d", "a", "c"]);
    }

    #[test]
    fn test_default_order_is_key_ascending() {
        let mut rows = vec![Row("b", 0), Row("a", 9), Row("c", 5)];
        rows.sort_by(|a, b| compare_records(a, b, None));
        let keys: Vec<_> = rows.iter().map(|r| r.0).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn test_float_total_order() {
        let nan = SortValue::Float(f64::NAN);
        let one = SortValue::Float(1.0);
        assert_eq!(one.total_cmp(&one), Ordering::Equal);
        assert_ne!(nan.total_cmp(&one), Ordering::Equal);
        assert_eq!(SortValue::Int(2).total_cmp(&SortValue::Float(1.5)), Ordering::Greater);
    }
}

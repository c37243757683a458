//! Pagination types for connection queries.
//!
//! These types implement Relay-style cursor pagination, commonly used
//! with GraphQL but also applicable to other APIs.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Opaque cursor for pagination.
///
/// The cursor value is produced by [`crate::services::cursor::encode`] and
/// should be treated as an opaque token by clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor {
    pub value: String,
}

impl Cursor {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<String> for Cursor {
    fn from(value: String) -> Self {
        Self { value }
    }
}

/// Ordering direction for sorted queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

/// Caller-supplied ordering.
///
/// The record key is always used as a secondary ascending sort key, so
/// ordering by a non-unique field still yields a total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    #[serde(default)]
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }
}

/// Raw pagination arguments as received from a caller.
///
/// `first` and `last` are kept as JSON values so validation can report the
/// runtime type of a malformed limit. An explicit `null` counts as set.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationArgs {
    #[serde(default, deserialize_with = "present")]
    pub first: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub last: Option<Value>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
}

/// Keeps an explicit JSON `null` as `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PaginationArgs {
    /// Forward pagination taking `n` records.
    pub fn first(n: i64) -> Self {
        Self {
            first: Some(Value::from(n)),
            ..Default::default()
        }
    }

    /// Backward pagination taking `n` records.
    pub fn last(n: i64) -> Self {
        Self {
            last: Some(Value::from(n)),
            ..Default::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }
}

/// Validated page size and scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Take up to `n` records scanning forward.
    First(u32),
    /// Take up to `n` records scanning backward.
    Last(u32),
}

/// Pagination arguments that passed validation.
///
/// `after` and `before` hold decoded record keys, not cursors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: Limit,
    pub after: Option<String>,
    pub before: Option<String>,
    pub order_by: Option<OrderBy>,
}

/// Paginated result set with edges and page info.
///
/// This is the Relay connection pattern for cursor-based pagination.
#[derive(Debug, Clone)]
pub struct Connection<T> {
    /// List of edges (node + cursor pairs).
    pub edges: Vec<Edge<T>>,
    /// Information about the current page.
    pub page_info: PageInfo,
    /// Size of the full candidate set, independent of the window.
    pub total_count: u64,
}

impl<T> Connection<T> {
    /// The terminal state returned for an empty candidate set.
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
            total_count: 0,
        }
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|e| &e.node)
    }
}

/// A single item in a paginated result.
#[derive(Debug, Clone)]
pub struct Edge<T> {
    /// The actual item.
    pub node: T,
    /// Cursor for this item (used for pagination).
    pub cursor: Cursor,
}

/// Information about the current page in a paginated result.
///
/// Cursors are empty strings when the page has no edges.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Whether there are items before this page.
    pub has_previous_page: bool,
    /// Cursor of the first item in this page.
    pub start_cursor: String,
    /// Cursor of the last item in this page.
    pub end_cursor: String,
}

//! Query-string filter schemas for listing endpoints.
//!
//! Each listing operation accepts a loose JSON object of filters. A schema
//! names the keys it recognizes and how each value is normalized; keys
//! outside the schema, and values that fail normalization, are dropped.

use serde_json::Value;

use paygate_types::JsonObject;

/// Upper bound applied to any `limit` filter.
pub const MAX_LIMIT: i64 = 100;

/// Accepted values for the statistics `group_by` filter.
pub const GROUP_BY_VALUES: &[&str] = &["day", "week", "month", "year", "currency", "status"];

/// How a recognized filter value is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Scalar rendered as text
    Text,
    /// Text, uppercased
    Currency,
    /// Cast to an integer
    Integer,
    /// Integer clamped to [`MAX_LIMIT`]
    Limit,
    /// Text restricted to a fixed set of values
    OneOf(&'static [&'static str]),
}

/// Ordered list of recognized keys for one operation.
pub type FilterSchema = &'static [(&'static str, FilterKind)];

pub const LIST_PAYMENTS: FilterSchema = &[
    ("page", FilterKind::Integer),
    ("limit", FilterKind::Limit),
    ("status", FilterKind::Text),
    ("currency", FilterKind::Currency),
    ("customer_id", FilterKind::Text),
    ("order_id", FilterKind::Text),
    ("sort", FilterKind::Text),
    ("order", FilterKind::Text),
];

pub const PAYMENTS_BY_DATE_RANGE: FilterSchema = &[
    ("page", FilterKind::Integer),
    ("limit", FilterKind::Limit),
    ("status", FilterKind::Text),
    ("currency", FilterKind::Currency),
];

pub const PAYMENT_STATISTICS: FilterSchema = &[
    ("currency", FilterKind::Currency),
    ("status", FilterKind::Text),
    ("start_date", FilterKind::Text),
    ("end_date", FilterKind::Text),
    ("group_by", FilterKind::OneOf(GROUP_BY_VALUES)),
];

pub const LIST_CUSTOMERS: FilterSchema = &[
    ("page", FilterKind::Integer),
    ("limit", FilterKind::Limit),
    ("email", FilterKind::Text),
    ("search", FilterKind::Text),
];

pub const CUSTOMER_PAYMENTS: FilterSchema = &[
    ("page", FilterKind::Integer),
    ("limit", FilterKind::Limit),
    ("status", FilterKind::Text),
    ("currency", FilterKind::Currency),
];

impl FilterKind {
    /// Normalizes `value`, or returns `None` to drop it.
    pub fn apply(&self, value: &Value) -> Option<String> {
        match self {
            FilterKind::Text => as_text(value),
            FilterKind::Currency => as_text(value).map(|s| s.to_uppercase()),
            FilterKind::Integer => as_integer(value).map(|n| n.to_string()),
            FilterKind::Limit => as_integer(value).map(|n| n.min(MAX_LIMIT).to_string()),
            FilterKind::OneOf(allowed) => {
                as_text(value).filter(|s| allowed.contains(&s.as_str()))
            }
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Applies `schema` to `filters`, keeping schema order.
pub fn apply_schema(schema: FilterSchema, filters: &JsonObject) -> Vec<(&'static str, String)> {
    schema
        .iter()
        .filter_map(|(key, kind)| {
            let value = filters.get(*key)?;
            kind.apply(value).map(|v| (*key, v))
        })
        .collect()
}

/// Appends the url-encoded `params` to `path`. No `?` is added when empty.
pub fn with_query(path: &str, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish();
    format!("{}?{}", path, query)
}

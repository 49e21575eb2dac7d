//! Owned bind-value representation for runtime-constructed queries.
//!
//! The generic repository builds SQL strings at runtime, so the values to
//! bind have to be carried in a uniform, owned form until the statement is
//! ready. [`SqlValue`] covers exactly the column types the entity model
//! uses; [`bind_query`] and [`bind_query_as`] replay an ordered value list
//! onto an [`sqlx`] statement.

use agridata_types::ProductType;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgArguments;
use sqlx::query::{Query as SqlxQuery, QueryAs};
use sqlx::Postgres;

/// An owned value bound into a parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `BIGINT`.
    BigInt(i64),
    /// `DOUBLE PRECISION`.
    Double(f64),
    /// `TEXT`.
    Text(String),
    /// `BOOLEAN`.
    Bool(bool),
    /// `TEXT[]`.
    TextArray(Vec<String>),
    /// `JSONB`.
    Json(serde_json::Value),
    /// `TIMESTAMPTZ`.
    Timestamp(DateTime<Utc>),
    /// The `product_type` enum.
    ProductType(ProductType),
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<ProductType> for SqlValue {
    fn from(v: ProductType) -> Self {
        Self::ProductType(v)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

/// Bind one owned value onto an execute-style statement.
pub(crate) fn bind_query(
    query: SqlxQuery<'_, Postgres, PgArguments>,
    value: SqlValue,
) -> SqlxQuery<'_, Postgres, PgArguments> {
    match value {
        SqlValue::BigInt(v) => query.bind(v),
        SqlValue::Double(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::TextArray(v) => query.bind(v),
        SqlValue::Json(v) => query.bind(v),
        SqlValue::Timestamp(v) => query.bind(v),
        SqlValue::ProductType(v) => query.bind(v),
    }
}

/// Bind one owned value onto a fetch-style statement.
pub(crate) fn bind_query_as<'q, O>(
    query: QueryAs<'q, Postgres, O, PgArguments>,
    value: SqlValue,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match value {
        SqlValue::BigInt(v) => query.bind(v),
        SqlValue::Double(v) => query.bind(v),
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Bool(v) => query.bind(v),
        SqlValue::TextArray(v) => query.bind(v),
        SqlValue::Json(v) => query.bind(v),
        SqlValue::Timestamp(v) => query.bind(v),
        SqlValue::ProductType(v) => query.bind(v),
    }
}

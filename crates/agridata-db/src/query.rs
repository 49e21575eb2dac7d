//! Composable typed query specification and SQL rendering.
//!
//! A [`Query`] value carries everything a read operation can compose: a
//! [`Filter`] predicate tree, sort keys, eager-load relation names, and a
//! paging window. The repository renders it into a parameterized SQL string
//! plus an ordered bind list; predicates are always evaluated by the store,
//! never client-side.
//!
//! Two guarantees replace toggles found in other persistence stacks:
//! returned rows are always detached snapshots (no change tracking), and
//! eager loads always run as separate follow-up statements.

use crate::value::SqlValue;

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// A boolean predicate over entity columns, rendered to a parameterized
/// `WHERE` clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column = $n`
    Eq(&'static str, SqlValue),
    /// `column <> $n`
    Ne(&'static str, SqlValue),
    /// `column > $n`
    Gt(&'static str, SqlValue),
    /// `column >= $n`
    Ge(&'static str, SqlValue),
    /// `column < $n`
    Lt(&'static str, SqlValue),
    /// `column <= $n`
    Le(&'static str, SqlValue),
    /// `column LIKE $n`
    Like(&'static str, String),
    /// `column IS NULL`
    IsNull(&'static str),
    /// `column = ANY(...)`; an empty list matches nothing.
    In(&'static str, Vec<SqlValue>),
    /// Conjunction; an empty list matches everything.
    And(Vec<Filter>),
    /// Disjunction; an empty list matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    /// Equality predicate.
    pub fn eq(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Eq(column, value.into())
    }

    /// Inequality predicate.
    pub fn ne(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Ne(column, value.into())
    }

    /// Strictly-greater predicate.
    pub fn gt(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Gt(column, value.into())
    }

    /// Greater-or-equal predicate.
    pub fn ge(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Ge(column, value.into())
    }

    /// Strictly-less predicate.
    pub fn lt(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Lt(column, value.into())
    }

    /// Less-or-equal predicate.
    pub fn le(column: &'static str, value: impl Into<SqlValue>) -> Self {
        Self::Le(column, value.into())
    }

    /// Conjunction of this predicate with another.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction of this predicate with another.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Render this predicate into SQL, appending bind values to `args`.
    ///
    /// Placeholders continue from the current length of `args`, so a filter
    /// can be rendered into a statement that already carries binds.
    pub(crate) fn render(&self, args: &mut Vec<SqlValue>) -> String {
        match self {
            Self::Eq(column, value) => Self::binary(column, "=", value, args),
            Self::Ne(column, value) => Self::binary(column, "<>", value, args),
            Self::Gt(column, value) => Self::binary(column, ">", value, args),
            Self::Ge(column, value) => Self::binary(column, ">=", value, args),
            Self::Lt(column, value) => Self::binary(column, "<", value, args),
            Self::Le(column, value) => Self::binary(column, "<=", value, args),
            Self::Like(column, pattern) => {
                args.push(SqlValue::Text(pattern.clone()));
                format!("{column} LIKE ${}", args.len())
            }
            Self::IsNull(column) => format!("{column} IS NULL"),
            Self::In(column, values) => {
                if values.is_empty() {
                    return String::from("FALSE");
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|value| {
                        args.push(value.clone());
                        format!("${}", args.len())
                    })
                    .collect();
                format!("{column} IN ({})", placeholders.join(", "))
            }
            Self::And(parts) => {
                if parts.is_empty() {
                    return String::from("TRUE");
                }
                let rendered: Vec<String> =
                    parts.iter().map(|part| part.render(args)).collect();
                format!("({})", rendered.join(" AND "))
            }
            Self::Or(parts) => {
                if parts.is_empty() {
                    return String::from("FALSE");
                }
                let rendered: Vec<String> =
                    parts.iter().map(|part| part.render(args)).collect();
                format!("({})", rendered.join(" OR "))
            }
        }
    }

    fn binary(
        column: &str,
        operator: &str,
        value: &SqlValue,
        args: &mut Vec<SqlValue>,
    ) -> String {
        args.push(value.clone());
        format!("{column} {operator} ${}", args.len())
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Sort direction of one [`Order`] key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// One sort key of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column to sort by.
    pub column: &'static str,
    /// Sort direction.
    pub direction: Direction,
}

impl Order {
    /// Ascending sort on `column`.
    pub const fn asc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Asc,
        }
    }

    /// Descending sort on `column`.
    pub const fn desc(column: &'static str) -> Self {
        Self {
            column,
            direction: Direction::Desc,
        }
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A composable read specification: predicate, sort keys, eager loads and
/// paging window.
///
/// Ordering of results is deterministic only when at least one sort key is
/// given; otherwise the storage-defined order applies.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub(crate) filter: Option<Filter>,
    pub(crate) order: Vec<Order>,
    pub(crate) include: Vec<&'static str>,
    pub(crate) take: Option<i64>,
    pub(crate) skip: Option<i64>,
    pub(crate) debug: bool,
}

impl Query {
    /// An unconstrained query (full extent, storage order).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the predicate.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append a sort key.
    #[must_use]
    pub fn order_by(mut self, order: Order) -> Self {
        self.order.push(order);
        self
    }

    /// Request eager-loading of a named parent relation. The relation must
    /// be one of the entity's declared relation constants; unknown names
    /// fail the read with an `UnknownRelation` error.
    #[must_use]
    pub fn include(mut self, relation: &'static str) -> Self {
        self.include.push(relation);
        self
    }

    /// Limit the number of returned rows.
    #[must_use]
    pub const fn take(mut self, count: i64) -> Self {
        self.take = Some(count);
        self
    }

    /// Skip leading rows (applied before `take`).
    #[must_use]
    pub const fn skip(mut self, count: i64) -> Self {
        self.skip = Some(count);
        self
    }

    /// Log the rendered SQL at debug level when executed.
    #[must_use]
    pub const fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Render `SELECT * FROM table ...` for this specification.
    pub(crate) fn render_select(&self, table: &str) -> (String, Vec<SqlValue>) {
        let mut args = Vec::new();
        let mut sql = format!("SELECT * FROM {table}");
        if let Some(filter) = &self.filter {
            let clause = filter.render(&mut args);
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
        }
        if !self.order.is_empty() {
            let keys: Vec<String> = self
                .order
                .iter()
                .map(|order| format!("{} {}", order.column, order.direction.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }
        if let Some(take) = self.take {
            args.push(SqlValue::BigInt(take));
            sql.push_str(&format!(" LIMIT ${}", args.len()));
        }
        if let Some(skip) = self.skip {
            args.push(SqlValue::BigInt(skip));
            sql.push_str(&format!(" OFFSET ${}", args.len()));
        }
        (sql, args)
    }
}

// ---------------------------------------------------------------------------
// Write-side SQL rendering
// ---------------------------------------------------------------------------

/// Render a single-row `INSERT ... RETURNING id`.
pub(crate) fn render_insert(table: &str, columns: &[&str]) -> String {
    let placeholders: Vec<String> = (1..=columns.len())
        .map(|position| format!("${position}"))
        .collect();
    format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING id",
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Render a full-record `UPDATE ... WHERE id = $n`.
pub(crate) fn render_update(table: &str, columns: &[&str]) -> String {
    let assignments: Vec<String> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| format!("{column} = ${}", index + 1))
        .collect();
    format!(
        "UPDATE {table} SET {} WHERE id = ${}",
        assignments.join(", "),
        columns.len() + 1
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_renders_sequential_placeholders() {
        let filter = Filter::eq("population_id", 3i64)
            .and(Filter::gt("variable_costs", 0.0f64));
        let mut args = Vec::new();
        let sql = filter.render(&mut args);
        assert_eq!(sql, "(population_id = $1 AND variable_costs > $2)");
        assert_eq!(
            args,
            vec![SqlValue::BigInt(3), SqlValue::Double(0.0)]
        );
    }

    #[test]
    fn nested_or_keeps_parentheses() {
        let filter = Filter::eq("farm_code", "F001")
            .or(Filter::eq("farm_code", "F002").and(Filter::eq("population_id", 1i64)));
        let mut args = Vec::new();
        let sql = filter.render(&mut args);
        assert_eq!(
            sql,
            "(farm_code = $1 OR (farm_code = $2 AND population_id = $3))"
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn empty_in_matches_nothing() {
        let mut args = Vec::new();
        let sql = Filter::In("id", Vec::new()).render(&mut args);
        assert_eq!(sql, "FALSE");
        assert!(args.is_empty());
    }

    #[test]
    fn in_list_expands_placeholders() {
        let mut args = Vec::new();
        let sql = Filter::In(
            "id",
            vec![SqlValue::BigInt(1), SqlValue::BigInt(2), SqlValue::BigInt(3)],
        )
        .render(&mut args);
        assert_eq!(sql, "id IN ($1, $2, $3)");
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn select_composes_order_and_paging() {
        let query = Query::new()
            .filter(Filter::eq("population_id", 7i64))
            .order_by(Order::asc("id"))
            .take(10)
            .skip(5);
        let (sql, args) = query.render_select("farms");
        assert_eq!(
            sql,
            "SELECT * FROM farms WHERE population_id = $1 ORDER BY id ASC LIMIT $2 OFFSET $3"
        );
        assert_eq!(
            args,
            vec![
                SqlValue::BigInt(7),
                SqlValue::BigInt(10),
                SqlValue::BigInt(5)
            ]
        );
    }

    #[test]
    fn select_without_order_has_no_order_clause() {
        let (sql, args) = Query::new().render_select("years");
        assert_eq!(sql, "SELECT * FROM years");
        assert!(args.is_empty());
    }

    #[test]
    fn multi_key_ordering_renders_in_declaration_order() {
        let query = Query::new()
            .order_by(Order::asc("year_number"))
            .order_by(Order::desc("id"));
        let (sql, _) = query.render_select("years");
        assert_eq!(
            sql,
            "SELECT * FROM years ORDER BY year_number ASC, id DESC"
        );
    }

    #[test]
    fn insert_renders_columns_and_placeholders() {
        let sql = render_insert("years", &["year_number", "population_id"]);
        assert_eq!(
            sql,
            "INSERT INTO years (year_number, population_id) VALUES ($1, $2) RETURNING id"
        );
    }

    #[test]
    fn update_renders_assignments_and_id_guard() {
        let sql = render_update("years", &["year_number", "population_id"]);
        assert_eq!(
            sql,
            "UPDATE years SET year_number = $1, population_id = $2 WHERE id = $3"
        );
    }
}

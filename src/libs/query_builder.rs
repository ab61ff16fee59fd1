use std::fmt;

use crate::libs::row::RowValues;
use crate::libs::schema::TableSchema;

/// Join predicate fragments with `AND`. No fragments means no filter.
///
/// Fragments are passed through as written; they must already be valid,
/// escaped SQLite expressions.
pub fn build_filter<S: AsRef<str>>(conditions: &[S]) -> String {
    conditions
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" AND ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Like,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Like => "LIKE",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Caller-supplied predicate text, used verbatim.
    Raw(String),
    /// `column op ?`, with the value bound separately.
    Compare {
        column: String,
        op: Operator,
        value: String,
    },
}

impl Condition {
    fn fragment(&self) -> String {
        match self {
            Condition::Raw(text) => text.clone(),
            Condition::Compare { column, op, .. } => format!("{column} {op} ?"),
        }
    }
}

/// Conditions a delete or query is restricted by, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn raw(mut self, predicate: impl Into<String>) -> Self {
        self.conditions.push(Condition::Raw(predicate.into()));
        self
    }

    fn compare(mut self, column: &str, op: Operator, value: impl ToString) -> Self {
        self.conditions.push(Condition::Compare {
            column: column.to_string(),
            op,
            value: value.to_string(),
        });
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Eq, value)
    }

    pub fn ne(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Ne, value)
    }

    pub fn gt(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Gt, value)
    }

    pub fn ge(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Ge, value)
    }

    pub fn lt(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Lt, value)
    }

    pub fn le(self, column: &str, value: impl ToString) -> Self {
        self.compare(column, Operator::Le, value)
    }

    pub fn like(self, column: &str, pattern: impl ToString) -> Self {
        self.compare(column, Operator::Like, pattern)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The `WHERE` body, empty when the filter matches everything.
    pub fn clause(&self) -> String {
        let fragments: Vec<String> = self.conditions.iter().map(Condition::fragment).collect();
        build_filter(&fragments)
    }

    /// Values for the `?` placeholders of [`Filter::clause`], in order.
    pub fn binds(&self) -> Vec<String> {
        self.conditions
            .iter()
            .filter_map(|c| match c {
                Condition::Compare { value, .. } => Some(value.clone()),
                Condition::Raw(_) => None,
            })
            .collect()
    }
}

impl<S: AsRef<str>> From<&[S]> for Filter {
    fn from(conditions: &[S]) -> Self {
        conditions
            .iter()
            .fold(Filter::all(), |filter, c| filter.raw(c.as_ref()))
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for Filter {
    fn from(conditions: [S; N]) -> Self {
        Filter::from(&conditions[..])
    }
}

impl<S: AsRef<str>> From<Vec<S>> for Filter {
    fn from(conditions: Vec<S>) -> Self {
        Filter::from(conditions.as_slice())
    }
}

pub fn create_table_sql(schema: &TableSchema) -> String {
    format!("CREATE TABLE IF NOT EXISTS {} {}", schema.table, schema.columns)
}

pub fn delete_sql(table: &str, filter: &Filter) -> String {
    with_where(format!("DELETE FROM {table}"), filter)
}

pub fn select_sql(table: &str, filter: &Filter) -> String {
    with_where(format!("SELECT * FROM {table}"), filter)
}

/// `INSERT OR REPLACE` for the columns of `row`, with one placeholder each.
pub fn replace_sql(table: &str, row: &RowValues) -> (String, Vec<String>) {
    let (columns, values): (Vec<&str>, Vec<String>) =
        row.iter().map(|(k, v)| (k, v.to_string())).unzip();
    let placeholders = vec!["?"; columns.len()];
    let sql = format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders.join(", ")
    );
    (sql, values)
}

fn with_where(mut sql: String, filter: &Filter) -> String {
    if !filter.is_empty() {
        sql += &format!(" WHERE {}", filter.clause());
    }
    sql
}

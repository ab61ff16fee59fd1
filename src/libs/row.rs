use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row as _};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::libs::accessor::find_mutator;
use crate::libs::entity::{Entity, Mutator, Value, ValueShape};
use crate::libs::error::{Error, Result};
use crate::libs::schema::ColumnDescriptor;

/// Column name to text value, ready for an insert-or-replace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowValues(BTreeMap<String, String>);

impl RowValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.0.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// One result row, looked up by column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Row {
    columns: Map<String, JsonValue>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.columns.insert(name.into(), value.into());
        self
    }

    pub fn from_sqlite(row: &SqliteRow) -> Self {
        let mut columns = Map::new();
        for col in row.columns() {
            let col_name = col.name();
            let value = match row.try_get::<Option<i64>, _>(col_name) {
                Ok(Some(v)) => JsonValue::from(v),
                Ok(None) => JsonValue::Null,
                Err(_) => match row.try_get::<Option<f64>, _>(col_name) {
                    Ok(Some(v)) => JsonValue::from(v),
                    Ok(None) => JsonValue::Null,
                    Err(_) => match row.try_get::<Option<String>, _>(col_name) {
                        Ok(Some(v)) => JsonValue::from(v),
                        Ok(None) => JsonValue::Null,
                        Err(_) => JsonValue::Null,
                    },
                },
            };
            columns.insert(col_name.to_string(), value);
        }
        Self { columns }
    }

    fn column(&self, name: &str) -> Result<&JsonValue> {
        self.columns
            .get(name)
            .ok_or_else(|| Error::column(name, "not in result set"))
    }

    /// The column as text; `None` for SQL NULL.
    pub fn get_text(&self, name: &str) -> Result<Option<String>> {
        match self.column(name)? {
            JsonValue::Null => Ok(None),
            JsonValue::String(s) => Ok(Some(s.clone())),
            JsonValue::Number(n) => Ok(Some(n.to_string())),
            JsonValue::Bool(b) => Ok(Some(b.to_string())),
            other => Err(Error::column(name, format!("cannot read {other} as text"))),
        }
    }

    /// The column as a 32-bit integer; `None` for SQL NULL.
    pub fn get_int(&self, name: &str) -> Result<Option<i32>> {
        match self.column(name)? {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => match n.as_i64() {
                Some(v) => i32::try_from(v)
                    .map(Some)
                    .map_err(|_| Error::column(name, format!("{v} does not fit in i32"))),
                None => match n.as_f64() {
                    Some(f) if (f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&f.trunc()) => {
                        Ok(Some(f as i32))
                    }
                    Some(f) => Err(Error::column(name, format!("{f} does not fit in i32"))),
                    None => Ok(None),
                },
            },
            JsonValue::String(s) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::column(name, format!("`{s}` is not an integer"))),
            other => Err(Error::column(name, format!("cannot read {other} as integer"))),
        }
    }

    fn read(&self, column: &ColumnDescriptor) -> Result<Option<Value>> {
        Ok(match column.shape {
            ValueShape::Text => self.get_text(column.name)?.map(Value::Text),
            ValueShape::Integer => self.get_int(column.name)?.map(Value::Integer),
        })
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Turn the set fields of `entity` into row values.
///
/// Unset fields are left out so a replace never writes them as empty text.
/// Fails with [`Error::EmptyWrite`] when no field is set.
pub fn serialize<T: Entity>(entity: &T) -> Result<RowValues> {
    let mut row = RowValues::new();
    for column in T::columns() {
        if let Some(value) = entity.field_value(column.field) {
            row.insert(column.name, value.to_string());
        }
    }

    if row.is_empty() {
        return Err(Error::EmptyWrite {
            table: T::TABLE_NAME,
        });
    }

    for column in T::columns().iter().filter(|c| c.uuid) {
        if !row.contains(column.name) {
            row.insert(column.name, Uuid::new_v4().to_string());
        }
    }
    Ok(row)
}

/// Collects column values into a fresh entity; the value only escapes once
/// every column has been visited.
pub struct RowBuilder<T> {
    value: T,
}

impl<T: Entity> RowBuilder<T> {
    pub fn new() -> Self {
        Self {
            value: T::default(),
        }
    }

    fn apply(&mut self, mutator: &Mutator<T>, value: Value) {
        (mutator.apply)(&mut self.value, value);
    }

    pub fn finish(self) -> T {
        self.value
    }
}

impl<T: Entity> Default for RowBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a new `T` out of `row`.
///
/// Columns without a matching mutator, missing from the row, NULL, or not
/// decodable keep the field's default.
pub fn deserialize<T: Entity>(row: &Row) -> T {
    let mut builder = RowBuilder::<T>::new();
    for column in T::columns() {
        let mutator = match find_mutator::<T>(T::TABLE_NAME, column) {
            Ok(mutator) => mutator,
            Err(err) => {
                debug!(field = column.field, %err, "field not settable, skipped");
                continue;
            }
        };
        match row.read(column) {
            Ok(Some(value)) => builder.apply(mutator, value),
            Ok(None) => {}
            Err(err) => warn!(table = T::TABLE_NAME, %err, "column unreadable, skipped"),
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::fixtures::{Note, User};

    fn kiven() -> User {
        User {
            mUserId: Some(7),
            name: Some("Kiven".into()),
            ..User::default()
        }
    }

    #[test]
    fn serializes_set_fields_as_text() {
        let row = serialize(&kiven()).unwrap();
        assert_eq!(row.len(), 2);
        assert_eq!(row.get("mUserId"), Some("7"));
        assert_eq!(row.get("name"), Some("Kiven"));
        assert!(!row.contains("mail"));
    }

    #[test]
    fn uses_stored_column_names() {
        let user = User {
            email: Some("k@example.com".into()),
            ..User::default()
        };
        let row = serialize(&user).unwrap();
        assert_eq!(row.get("mail"), Some("k@example.com"));
        assert!(!row.contains("email"));
    }

    #[test]
    fn unannotated_fields_are_not_written() {
        let user = User {
            session: Some("token".into()),
            ..kiven()
        };
        let row = serialize(&user).unwrap();
        assert!(!row.contains("session"));
    }

    #[test]
    fn all_unset_is_an_empty_write() {
        let err = serialize(&User::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyWrite { table: "user" }));
    }

    #[test]
    fn fills_unset_uuid_columns() {
        let note = Note {
            body: Some("hello".into()),
            ..Note::default()
        };
        let row = serialize(&note).unwrap();
        let id = row.get("id").unwrap();
        assert!(Uuid::parse_str(id).is_ok());

        let kept = serialize(&Note {
            id: Some("fixed".into()),
            ..note
        })
        .unwrap();
        assert_eq!(kept.get("id"), Some("fixed"));
    }

    #[test]
    fn round_trips_settable_fields() {
        let original = User {
            email: Some("k@example.com".into()),
            age: Some(30),
            ..kiven()
        };
        let row: Row = serialize(&original)
            .unwrap()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let read: User = deserialize(&row);
        assert_eq!(read.mUserId, Some(7));
        assert_eq!(read.name.as_deref(), Some("Kiven"));
        assert_eq!(read.email.as_deref(), Some("k@example.com"));
        // setAge takes text, so the integer column stays at its default.
        assert_eq!(read.age, None);
    }

    #[test]
    fn lookup_is_by_name_not_position() {
        let row = Row::new()
            .with_column("mail", "a@b.c")
            .with_column("name", "Ada")
            .with_column("mUserId", 1);
        let read: User = deserialize(&row);
        assert_eq!(read.mUserId, Some(1));
        assert_eq!(read.name.as_deref(), Some("Ada"));
        assert_eq!(read.email.as_deref(), Some("a@b.c"));
    }

    #[test]
    fn missing_null_and_bad_columns_keep_defaults() {
        let row = Row::new()
            .with_column("mUserId", "not a number")
            .with_column("name", JsonValue::Null);
        let read: User = deserialize(&row);
        assert_eq!(read, User::default());
    }

    #[test]
    fn single_character_fields_resolve() {
        let row = Row::new().with_column("x", 4).with_column("body", "b");
        let read: Note = deserialize(&row);
        assert_eq!(read.x, 4);
        assert_eq!(read.body.as_deref(), Some("b"));
        assert_eq!(read.id, None);
    }

    #[test]
    fn text_reads_accept_numbers() {
        let row = Row::new().with_column("n", 12).with_column("f", 1.5);
        assert_eq!(row.get_text("n").unwrap().as_deref(), Some("12"));
        assert_eq!(row.get_text("f").unwrap().as_deref(), Some("1.5"));
    }

    #[test]
    fn integer_reads() {
        let row = Row::new()
            .with_column("text", " 42 ")
            .with_column("real", 3.9)
            .with_column("big", i64::from(i32::MAX) + 1);
        assert_eq!(row.get_int("text").unwrap(), Some(42));
        assert_eq!(row.get_int("real").unwrap(), Some(3));
        assert!(matches!(row.get_int("big"), Err(Error::ColumnAccess { .. })));
        assert!(matches!(row.get_int("absent"), Err(Error::ColumnAccess { .. })));
    }

    #[test]
    fn real_reads_outside_i32_are_rejected() {
        let row = Row::new()
            .with_column("huge", 1e12)
            .with_column("tiny", -3.0e10)
            .with_column("edge", -2147483648.5);
        assert!(matches!(row.get_int("huge"), Err(Error::ColumnAccess { .. })));
        assert!(matches!(row.get_int("tiny"), Err(Error::ColumnAccess { .. })));
        assert_eq!(row.get_int("edge").unwrap(), Some(i32::MIN));
    }
}

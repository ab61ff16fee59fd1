use tracing::{debug, warn};

use crate::libs::entity::{Entity, ValueShape};

/// Metadata for one persisted field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Field name as declared on the type.
    pub field: &'static str,
    /// Stored column name.
    pub name: &'static str,
    pub sql_type: &'static str,
    pub primary: bool,
    /// Filled with a fresh v4 UUID on upsert when the field is unset.
    pub uuid: bool,
    pub shape: ValueShape,
}

impl ColumnDescriptor {
    pub const fn new(field: &'static str, shape: ValueShape) -> Self {
        Self {
            field,
            name: field,
            sql_type: shape.sql_type(),
            primary: false,
            uuid: false,
            shape,
        }
    }

    pub const fn named(self, name: &'static str) -> Self {
        Self { name, ..self }
    }

    pub const fn sql_type(self, sql_type: &'static str) -> Self {
        Self { sql_type, ..self }
    }

    pub const fn primary(self) -> Self {
        Self {
            primary: true,
            ..self
        }
    }

    pub const fn uuid(self) -> Self {
        Self { uuid: true, ..self }
    }

    /// `name type`, with `PRIMARY KEY` appended for primary columns.
    pub fn definition(&self) -> String {
        let mut def = format!("{} {}", self.name, self.sql_type);
        if self.primary {
            def.push_str(" PRIMARY KEY");
        }
        def
    }
}

/// Where an entity lives and how to create its table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableSchema {
    pub database: String,
    pub table: String,
    /// Parenthesized column list, e.g. `(id INTEGER PRIMARY KEY, name TEXT)`.
    pub columns: String,
}

impl TableSchema {
    pub fn of<T: Entity>() -> Self {
        let columns = T::columns();

        let primaries = columns.iter().filter(|c| c.primary).count();
        if primaries > 1 {
            warn!(
                table = T::TABLE_NAME,
                primaries, "several primary columns, table creation will reject the clause"
            );
        }

        let schema = Self {
            database: T::DATABASE.to_string(),
            table: T::TABLE_NAME.to_string(),
            columns: column_clause(columns),
        };
        debug!(table = %schema.table, sql = %schema.columns, "derived table schema");
        schema
    }
}

/// Derive the schema of `T`. Recomputed on every call.
pub fn derive_schema<T: Entity>() -> TableSchema {
    TableSchema::of::<T>()
}

pub(crate) fn column_clause(columns: &[ColumnDescriptor]) -> String {
    let defs: Vec<String> = columns.iter().map(ColumnDescriptor::definition).collect();
    format!("({})", defs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::fixtures::{Note, User};

    #[test]
    fn derives_one_entry_per_column() {
        let schema = derive_schema::<User>();
        assert_eq!(schema.database, "users.db");
        assert_eq!(schema.table, "user");
        assert_eq!(
            schema.columns,
            "(mUserId INTEGER PRIMARY KEY, name TEXT, mail TEXT, age INTEGER)"
        );
        assert_eq!(schema.columns.split(", ").count(), User::columns().len());
    }

    #[test]
    fn primary_key_only_on_flagged_columns() {
        for column in User::columns() {
            assert_eq!(column.definition().ends_with(" PRIMARY KEY"), column.primary);
            assert!(column.definition().starts_with(column.name));
            assert!(column.definition().contains(column.sql_type));
        }
    }

    #[test]
    fn defaults_table_and_database_names() {
        let schema = derive_schema::<Note>();
        assert_eq!(schema.table, "note");
        assert_eq!(schema.database, "rowkit.db");
    }

    #[test]
    fn empty_descriptor_set_degenerates() {
        assert_eq!(column_clause(&[]), "()");
    }

    #[test]
    fn repeated_derivations_agree() {
        assert_eq!(derive_schema::<User>(), derive_schema::<User>());
    }

    #[test]
    fn several_primaries_are_kept_in_the_clause() {
        let columns = [
            ColumnDescriptor::new("a", ValueShape::Integer).primary(),
            ColumnDescriptor::new("b", ValueShape::Text).primary(),
        ];
        assert_eq!(
            column_clause(&columns),
            "(a INTEGER PRIMARY KEY, b TEXT PRIMARY KEY)"
        );
    }
}

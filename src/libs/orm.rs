use tracing::{debug, info, warn};

use crate::libs::config::StoreConfig;
use crate::libs::entity::Entity;
use crate::libs::error::Result;
use crate::libs::query_builder::{Filter, delete_sql, select_sql};
use crate::libs::row::{deserialize, serialize};
use crate::libs::schema::TableSchema;
use crate::libs::sqlite::SqliteProvisioner;
use crate::libs::storage::{Provisioner, StorageHandle};
use crate::libs::table::Table;

/// Entry point for persisting entities.
///
/// Every call opens its own handle and closes it before returning, so calls
/// are independent; concurrent writers to one table need outside coordination.
#[derive(Debug)]
pub struct Store<P = SqliteProvisioner> {
    provisioner: P,
}

impl Store<SqliteProvisioner> {
    pub fn new(config: StoreConfig) -> Self {
        info!(data_dir = %config.data_dir.display(), "opening store");
        Self::with_provisioner(SqliteProvisioner::new(config))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(StoreConfig::from_env()?))
    }
}

impl<P: Provisioner> Store<P> {
    pub fn with_provisioner(provisioner: P) -> Self {
        Self { provisioner }
    }

    pub fn provisioner(&self) -> &P {
        &self.provisioner
    }

    /// Typed handle for one entity type.
    pub fn table<T: Entity>(&self) -> Table<'_, T, P> {
        Table::new(self)
    }

    // -------- Insert or replace --------
    /// Write `entity`, replacing any row with the same primary key.
    ///
    /// Returns the row id, or `None` when the engine wrote no row. An entity
    /// with every column unset fails with `EmptyWrite` before storage is touched.
    pub async fn upsert<T: Entity>(&self, entity: &T) -> Result<Option<i64>> {
        let schema = TableSchema::of::<T>();
        let row = serialize(entity)?;

        let mut handle = self.provisioner.open_writable(&schema).await?;
        let outcome = handle.replace_row(&schema.table, &row).await;
        let closed = handle.close().await;

        let id = outcome?;
        closed?;
        debug!(table = %schema.table, ?id, "upserted");
        Ok(id)
    }

    // -------- Delete --------
    /// Delete the rows matching `filter`; an empty filter clears the table.
    pub async fn delete<T: Entity>(&self, filter: impl Into<Filter>) -> Result<()> {
        let schema = TableSchema::of::<T>();
        let filter = filter.into();
        let sql = delete_sql(&schema.table, &filter);

        let mut handle = self.provisioner.open_writable(&schema).await?;
        let outcome = handle.execute(&sql, &filter.binds()).await;
        let closed = handle.close().await;

        let removed = outcome?;
        closed?;
        debug!(table = %schema.table, removed, "deleted");
        Ok(())
    }

    // -------- Query --------
    /// Every row matching `filter`, read into fresh entities.
    ///
    /// When storage cannot be opened the result is empty rather than an error.
    pub async fn query<T: Entity>(&self, filter: impl Into<Filter>) -> Result<Vec<T>> {
        let schema = TableSchema::of::<T>();
        let mut handle = match self.provisioner.open_readable(&schema).await {
            Ok(Some(handle)) => handle,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                warn!(table = %schema.table, %err, "storage unavailable, empty result");
                return Ok(Vec::new());
            }
        };

        let filter = filter.into();
        let sql = select_sql(&schema.table, &filter);
        let outcome = handle.query(&sql, &filter.binds()).await;
        let closed = handle.close().await;

        let rows = outcome?;
        closed?;
        Ok(rows.iter().map(deserialize::<T>).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::libs::error::Error;
    use crate::libs::fixtures::User;
    use crate::libs::row::{Row, RowValues};

    /// Records every call instead of touching a database.
    #[derive(Debug, Default, Clone)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
        rows: Vec<Row>,
        readable: bool,
    }

    impl Recorder {
        fn readable(rows: Vec<Row>) -> Self {
            Self {
                rows,
                readable: true,
                ..Self::default()
            }
        }

        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Provisioner for Recorder {
        type Handle = Recorder;

        async fn open_writable(&self, schema: &TableSchema) -> Result<Recorder> {
            self.log(format!("open {}", schema.table));
            Ok(self.clone())
        }

        async fn open_readable(&self, schema: &TableSchema) -> Result<Option<Recorder>> {
            self.log(format!("open {}", schema.table));
            Ok(self.readable.then(|| self.clone()))
        }
    }

    #[async_trait]
    impl StorageHandle for Recorder {
        async fn replace_row(&mut self, table: &str, row: &RowValues) -> Result<Option<i64>> {
            self.log(format!("replace {table} {}", row.len()));
            Ok(Some(1))
        }

        async fn execute(&mut self, sql: &str, binds: &[String]) -> Result<u64> {
            self.log(format!("{sql} {binds:?}"));
            Ok(0)
        }

        async fn query(&mut self, sql: &str, _binds: &[String]) -> Result<Vec<Row>> {
            self.log(sql);
            Ok(self.rows.clone())
        }

        async fn close(self) -> Result<()> {
            self.log("close");
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_write_never_opens_storage() {
        let recorder = Recorder::default();
        let store = Store::with_provisioner(recorder.clone());

        let err = store.upsert(&User::default()).await.unwrap_err();
        assert!(matches!(err, Error::EmptyWrite { table: "user" }));
        assert!(recorder.calls().is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_then_closes() {
        let recorder = Recorder::default();
        let store = Store::with_provisioner(recorder.clone());
        let user = User {
            mUserId: Some(7),
            name: Some("Kiven".into()),
            ..User::default()
        };

        assert_eq!(store.upsert(&user).await.unwrap(), Some(1));
        assert_eq!(recorder.calls(), vec!["open user", "replace user 2", "close"]);
    }

    #[tokio::test]
    async fn delete_without_conditions_clears_table() {
        let recorder = Recorder::default();
        let store = Store::with_provisioner(recorder.clone());

        store.delete::<User>(Filter::all()).await.unwrap();
        store.delete::<User>(["mUserId = 7", "name = 'Kiven'"]).await.unwrap();
        assert_eq!(
            recorder.calls(),
            vec![
                "open user",
                "DELETE FROM user []",
                "close",
                "open user",
                "DELETE FROM user WHERE mUserId = 7 AND name = 'Kiven' []",
                "close",
            ]
        );
    }

    #[tokio::test]
    async fn query_degrades_to_empty_without_storage() {
        let recorder = Recorder::default();
        let store = Store::with_provisioner(recorder.clone());

        let users = store.query::<User>(Filter::all()).await.unwrap();
        assert!(users.is_empty());
        assert_eq!(recorder.calls(), vec!["open user"]);
    }

    #[tokio::test]
    async fn query_maps_every_row() {
        let rows = vec![
            Row::new().with_column("mUserId", 1).with_column("name", "Ada"),
            Row::new().with_column("mUserId", 2).with_column("name", "Bob"),
        ];
        let recorder = Recorder::readable(rows);
        let store = Store::with_provisioner(recorder.clone());

        let users = store
            .query::<User>(Filter::all().gt("mUserId", 0))
            .await
            .unwrap();
        let names: Vec<_> = users.iter().filter_map(|u| u.name.as_deref()).collect();
        assert_eq!(names, vec!["Ada", "Bob"]);
        assert_eq!(
            recorder.calls(),
            vec!["open user", "SELECT * FROM user WHERE mUserId > ?", "close"]
        );
    }
}

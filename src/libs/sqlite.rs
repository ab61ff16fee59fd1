use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use tracing::{debug, warn};

use crate::libs::config::StoreConfig;
use crate::libs::error::{Error, Result};
use crate::libs::query_builder::{create_table_sql, replace_sql};
use crate::libs::row::{Row, RowValues};
use crate::libs::schema::TableSchema;
use crate::libs::storage::{Provisioner, StorageHandle};

/// Opens one SQLite file per database identifier under the configured
/// data directory.
///
/// Tables are created once per process and remembered; the memory for a
/// database is dropped whenever its file is found missing at open time, so a
/// removed file gets its tables back on the next call.
#[derive(Debug)]
pub struct SqliteProvisioner {
    config: StoreConfig,
    // (database, table, columns) already created in this process.
    created: Mutex<HashSet<TableSchema>>,
}

impl SqliteProvisioner {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            created: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn unavailable(schema: &TableSchema, source: impl std::error::Error + Send + Sync + 'static) -> Error {
        Error::StorageUnavailable {
            database: schema.database.clone(),
            source: Box::new(source),
        }
    }

    fn is_created(&self, schema: &TableSchema) -> bool {
        self.created
            .lock()
            .map(|created| created.contains(schema))
            .unwrap_or(false)
    }

    fn mark_created(&self, schema: &TableSchema) {
        if let Ok(mut created) = self.created.lock() {
            created.insert(schema.clone());
        }
    }

    fn forget_database(&self, database: &str) {
        if let Ok(mut created) = self.created.lock() {
            created.retain(|schema| schema.database != database);
        }
    }

    async fn open(&self, schema: &TableSchema) -> Result<SqliteHandle> {
        if self.config.create_data_dir {
            tokio::fs::create_dir_all(&self.config.data_dir)
                .await
                .map_err(|e| Self::unavailable(schema, e))?;
        }

        let path = self.config.database_path(&schema.database);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            self.forget_database(&schema.database);
        }
        let mut conn = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .busy_timeout(self.config.busy_timeout())
            .connect()
            .await
            .map_err(|e| Self::unavailable(schema, e))?;

        if !self.is_created(schema) {
            let sql = create_table_sql(schema);
            debug!(database = %schema.database, %sql, "ensuring table");
            if let Err(err) = sqlx::query(&sql).execute(&mut conn).await {
                let _ = conn.close().await;
                return Err(err.into());
            }
            self.mark_created(schema);
        }

        Ok(SqliteHandle { conn })
    }
}

#[async_trait]
impl Provisioner for SqliteProvisioner {
    type Handle = SqliteHandle;

    async fn open_writable(&self, schema: &TableSchema) -> Result<SqliteHandle> {
        self.open(schema).await
    }

    async fn open_readable(&self, schema: &TableSchema) -> Result<Option<SqliteHandle>> {
        match self.open(schema).await {
            Ok(handle) => Ok(Some(handle)),
            Err(err) => {
                warn!(database = %schema.database, table = %schema.table, %err, "no readable handle");
                Ok(None)
            }
        }
    }
}

#[derive(Debug)]
pub struct SqliteHandle {
    conn: SqliteConnection,
}

fn bind_all<'q>(
    sql: &'q str,
    binds: &'q [String],
) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    let mut query = sqlx::query(sql);
    for value in binds {
        query = query.bind(value.as_str());
    }
    query
}

#[async_trait]
impl StorageHandle for SqliteHandle {
    async fn replace_row(&mut self, table: &str, row: &RowValues) -> Result<Option<i64>> {
        let (sql, binds) = replace_sql(table, row);
        debug!(%sql, "replace");

        // Dropping the transaction before commit rolls it back.
        let mut tx = self.conn.begin().await?;
        let result = bind_all(&sql, &binds).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok((result.rows_affected() > 0).then(|| result.last_insert_rowid()))
    }

    async fn execute(&mut self, sql: &str, binds: &[String]) -> Result<u64> {
        debug!(%sql, "execute");
        let result = bind_all(sql, binds).execute(&mut self.conn).await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, sql: &str, binds: &[String]) -> Result<Vec<Row>> {
        debug!(%sql, "query");
        let rows = bind_all(sql, binds).fetch_all(&mut self.conn).await?;
        Ok(rows.iter().map(Row::from_sqlite).collect())
    }

    async fn close(self) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}

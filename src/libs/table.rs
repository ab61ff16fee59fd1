use std::marker::PhantomData;

use crate::libs::entity::Entity;
use crate::libs::error::Result;
use crate::libs::orm::Store;
use crate::libs::query_builder::Filter;
use crate::libs::sqlite::SqliteProvisioner;
use crate::libs::storage::Provisioner;

/// A typed handle to the table of one entity type.
pub struct Table<'a, T, P = SqliteProvisioner> {
    store: &'a Store<P>,
    _marker: PhantomData<T>,
}

impl<'a, T, P> Table<'a, T, P>
where
    T: Entity,
    P: Provisioner,
{
    /// Create a new table handle.
    /// ```ignore
    /// let users = Table::<User>::new(&store);
    /// ```
    pub fn new(store: &'a Store<P>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        T::TABLE_NAME
    }

    /// Insert or replace a record.
    ///
    /// # Example
    /// ```ignore
    /// store.table::<User>().upsert(&user).await?;
    /// ```
    pub async fn upsert(&self, item: &T) -> Result<Option<i64>> {
        self.store.upsert(item).await
    }

    /// Delete the records matching `filter`.
    ///
    /// # Example
    /// ```ignore
    /// users.delete(Filter::all().eq("name", "Kiven")).await?;
    /// ```
    pub async fn delete(&self, filter: impl Into<Filter>) -> Result<()> {
        self.store.delete::<T>(filter).await
    }

    pub async fn query(&self, filter: impl Into<Filter>) -> Result<Vec<T>> {
        self.store.query::<T>(filter).await
    }

    /// Get all records from the table.
    pub async fn all(&self) -> Result<Vec<T>> {
        self.query(Filter::all()).await
    }

    /// First record matching `filter`, if any.
    pub async fn first(&self, filter: impl Into<Filter>) -> Result<Option<T>> {
        Ok(self.query(filter).await?.into_iter().next())
    }
}

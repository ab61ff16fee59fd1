use thiserror::Error;

use crate::libs::entity::ValueShape;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while mapping entities to rows and back.
///
/// Mapping-layer variants are kept apart from [`Error::Storage`], which
/// carries whatever the SQLite engine reported, untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Every persisted field of the entity was unset, so there is nothing to write.
    #[error("nothing to write into `{table}`: every column is unset")]
    EmptyWrite { table: &'static str },

    /// No public mutator with the expected name accepts the column's shape.
    #[error("`{table}` has no mutator `{mutator}` taking {shape}")]
    AccessorNotFound {
        table: &'static str,
        mutator: String,
        shape: ValueShape,
    },

    /// A column could not be read out of a result row.
    #[error("column `{column}`: {reason}")]
    ColumnAccess { column: String, reason: String },

    #[error("storage unavailable for `{database}`: {source}")]
    StorageUnavailable {
        database: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error(transparent)]
    Storage(#[from] sqlx::Error),

    #[error("invalid configuration `{key}`: {reason}")]
    Config { key: &'static str, reason: String },
}

impl Error {
    pub(crate) fn column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ColumnAccess {
            column: column.into(),
            reason: reason.into(),
        }
    }
}

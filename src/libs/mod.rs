pub mod accessor;
pub mod config;
pub mod entity;
pub mod error;
pub mod orm;
pub mod query_builder;
pub mod row;
pub mod schema;
pub mod sqlite;
pub mod storage;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-export them for easier access from lib.rs
pub use accessor::*;
pub use config::*;
pub use entity::*;
pub use error::*;
pub use orm::*;
pub use query_builder::*;
pub use row::*;
pub use schema::*;
pub use sqlite::*;
pub use storage::*;
pub use table::*;

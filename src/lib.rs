//! # rowkit
//!
//! A small ORM that persists annotated structs into SQLite.
//!
//! `#[derive(Entity)]` turns `#[column]` fields into a table schema, and
//! `#[mutators]` publishes the setters used to read rows back. A [`Store`]
//! then offers upsert, delete and query for any entity type.
//!
//! ```ignore
//! use rowkit::{Entity, Filter, Store, StoreConfig, mutators};
//!
//! #[derive(Debug, Default, Entity)]
//! #[entity(table_name = "user", database = "users.db")]
//! pub struct User {
//!     #[column(primary)]
//!     id: Option<i32>,
//!     #[column]
//!     name: Option<String>,
//! }
//!
//! #[mutators]
//! impl User {
//!     pub fn setId(&mut self, id: i32) { self.id = Some(id); }
//!     pub fn setName(&mut self, name: String) { self.name = Some(name); }
//! }
//!
//! let store = Store::new(StoreConfig::new("data"));
//! store.upsert(&User { id: Some(7), name: Some("Kiven".into()) }).await?;
//! let users: Vec<User> = store.query(Filter::all().eq("id", 7)).await?;
//! ```

// Lets the derive output's `::rowkit` paths resolve inside this crate too.
extern crate self as rowkit;

mod libs;

pub use libs::*;
pub use rowkit_derive::{Entity, mutators};

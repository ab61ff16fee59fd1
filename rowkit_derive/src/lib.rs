//! Derive macros for `rowkit` entities.

use proc_macro::TokenStream;

mod entity;
mod mutators;

/// Implements `rowkit::Entity` from `#[entity(..)]` and `#[column(..)]` attributes.
///
/// ```ignore
/// #[derive(Default, Entity)]
/// #[entity(table_name = "user", database = "users.db")]
/// pub struct User {
///     #[column(primary, sql_type = "INTEGER")]
///     id: Option<i32>,
///     #[column(name = "user_name")]
///     name: Option<String>,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input.into()).into()
}

/// Publishes the public `&mut self` operations taking a single `String` or
/// `i32` as the type's `rowkit::Mutators` table.
#[proc_macro_attribute]
pub fn mutators(attr: TokenStream, item: TokenStream) -> TokenStream {
    mutators::expand(attr.into(), item.into()).into()
}

use crate::libs::entity::{Mutator, Mutators};
use crate::libs::error::{Error, Result};
use crate::libs::schema::ColumnDescriptor;

/// Name of the mutator expected for `field`.
///
/// A Hungarian `m` prefix is kept as is (`mUserId` -> `setmUserId`); any
/// other name gets its first character uppercased (`name` -> `setName`).
pub fn setter_name(field: &str) -> String {
    let mut chars = field.chars();
    let Some(first) = chars.next() else {
        return "set".to_string();
    };
    let rest = chars.as_str();

    match rest.chars().next() {
        Some(second) if first == 'm' && second.is_uppercase() => format!("setm{rest}"),
        _ => {
            let mut name = String::from("set");
            name.extend(first.to_uppercase());
            name.push_str(rest);
            name
        }
    }
}

/// Find the mutator of `T` for `column`, matching both name and value shape.
pub fn find_mutator<T: Mutators>(
    table: &'static str,
    column: &ColumnDescriptor,
) -> Result<&'static Mutator<T>> {
    let expected = setter_name(column.field);
    T::mutators()
        .iter()
        .find(|m| m.name == expected && m.shape == column.shape)
        .ok_or(Error::AccessorNotFound {
            table,
            mutator: expected,
            shape: column.shape,
        })
}

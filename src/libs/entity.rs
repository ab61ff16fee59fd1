use std::fmt;

use crate::libs::schema::ColumnDescriptor;

/// The two value representations a column can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueShape {
    Text,
    Integer,
}

impl ValueShape {
    /// SQL type keyword used when a column does not name one.
    pub const fn sql_type(self) -> &'static str {
        match self {
            ValueShape::Text => "TEXT",
            ValueShape::Integer => "INTEGER",
        }
    }
}

impl fmt::Display for ValueShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueShape::Text => f.write_str("text"),
            ValueShape::Integer => f.write_str("integer"),
        }
    }
}

/// A single field value read from, or written to, an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Integer(i32),
}

impl Value {
    pub fn shape(&self) -> ValueShape {
        match self {
            Value::Text(_) => ValueShape::Text,
            Value::Integer(_) => ValueShape::Integer,
        }
    }
}

// Rows are written as text regardless of the declared SQL type.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => f.write_str(text),
            Value::Integer(number) => write!(f, "{number}"),
        }
    }
}

/// Field types that may back a persisted column.
///
/// `None` from [`ColumnValue::to_value`] means the field is unset and is left
/// out of the written row.
pub trait ColumnValue {
    const SHAPE: ValueShape;

    fn to_value(&self) -> Option<Value>;
}

impl ColumnValue for String {
    const SHAPE: ValueShape = ValueShape::Text;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Text(self.clone()))
    }
}

impl ColumnValue for i32 {
    const SHAPE: ValueShape = ValueShape::Integer;

    fn to_value(&self) -> Option<Value> {
        Some(Value::Integer(*self))
    }
}

impl<T: ColumnValue> ColumnValue for Option<T> {
    const SHAPE: ValueShape = T::SHAPE;

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(ColumnValue::to_value)
    }
}

/// One public operation of an entity that accepts a single column value.
pub struct Mutator<T> {
    pub name: &'static str,
    pub shape: ValueShape,
    pub apply: fn(&mut T, Value),
}

impl<T> fmt::Debug for Mutator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutator")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

/// The mutator table of a type, normally generated by `#[rowkit::mutators]`.
pub trait Mutators: Sized + 'static {
    fn mutators() -> &'static [Mutator<Self>];
}

/// A data object that can be persisted, normally via `#[derive(rowkit::Entity)]`.
///
/// Rows are read back by default-constructing the type and applying the
/// mutators the accessor resolver finds for each column.
pub trait Entity: Mutators + Default + Send + Sync {
    const TABLE_NAME: &'static str;
    const DATABASE: &'static str;

    /// Persisted columns, in declaration order.
    fn columns() -> &'static [ColumnDescriptor];

    /// Current value of the named field, `None` when unset or unknown.
    fn field_value(&self, field: &str) -> Option<Value>;
}

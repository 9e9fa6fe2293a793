/// Database storage type of a column.
///
/// Union arms cast NULLs to the type of the leaf column they stand in for, so
/// the type must survive the trip through synthesis unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    /// A boolean value
    Boolean,

    /// A signed integer of `n` bytes
    Integer(u8),

    /// Unconstrained text type
    Text,

    /// Text type with an explicit maximum length
    VarChar(u64),

    /// Arbitrary precision number
    Numeric,
}

impl Type {
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer(_))
    }
}

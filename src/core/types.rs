use std::fmt;
use serde::{Serialize, Deserialize};

/// Literal Python types that can appear as candidates in a
/// [`TypeSet`](crate::core::TypeSet) next to composite values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
}

/// Runtime type tag of a value, used to reconcile what a composite "is".
///
/// `Unknown` is the neutral element: it never conflicts with anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeTag {
    #[default]
    Unknown,
    Function,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    MatMul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    Invert,
    Not,
    UAdd,
    USub,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::None => "None",
            Type::Bool => "bool",
            Type::Int => "int",
            Type::Float => "float",
            Type::Str => "str",
            Type::Bytes => "bytes",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Type::Int.to_string(), "int");
        assert_eq!(Type::None.to_string(), "None");
        assert_eq!(Type::Bytes.to_string(), "bytes");
    }

    #[test]
    fn test_default_tag_is_unknown() {
        assert_eq!(TypeTag::default(), TypeTag::Unknown);
    }
}

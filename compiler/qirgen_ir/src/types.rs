//! Resolved types.
//!
//! `ResolvedType` is closed: the backend matches it exhaustively, so adding
//! a variant is a compile error everywhere lowering must learn about it.

use std::fmt;

use crate::QualifiedName;

/// A fully resolved source-level type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolvedType {
    Unit,
    Bool,
    Int,
    BigInt,
    Double,
    String,
    Qubit,
    Result,
    Pauli,
    Range,
    Array(Box<ResolvedType>),
    Tuple(Vec<ResolvedType>),
    UserDefinedType(QualifiedName),
    Callable(Box<CallableSignature>),
    /// A type parameter of a generic callable, identified by its owner and name.
    TypeParameter {
        origin: QualifiedName,
        name: String,
    },
}

/// Input and output type of a callable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CallableSignature {
    pub argument: ResolvedType,
    pub result: ResolvedType,
}

impl CallableSignature {
    pub fn new(argument: ResolvedType, result: ResolvedType) -> Self {
        Self { argument, result }
    }
}

impl ResolvedType {
    /// `Array(elem)` shorthand.
    pub fn array_of(elem: ResolvedType) -> Self {
        ResolvedType::Array(Box::new(elem))
    }

    /// `Callable(arg -> result)` shorthand.
    pub fn callable(argument: ResolvedType, result: ResolvedType) -> Self {
        ResolvedType::Callable(Box::new(CallableSignature::new(argument, result)))
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        matches!(self, ResolvedType::Unit)
    }

    /// Items of a tuple type, `None` for anything else.
    pub fn tuple_items(&self) -> Option<&[ResolvedType]> {
        match self {
            ResolvedType::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolvedType::Unit => f.write_str("Unit"),
            ResolvedType::Bool => f.write_str("Bool"),
            ResolvedType::Int => f.write_str("Int"),
            ResolvedType::BigInt => f.write_str("BigInt"),
            ResolvedType::Double => f.write_str("Double"),
            ResolvedType::String => f.write_str("String"),
            ResolvedType::Qubit => f.write_str("Qubit"),
            ResolvedType::Result => f.write_str("Result"),
            ResolvedType::Pauli => f.write_str("Pauli"),
            ResolvedType::Range => f.write_str("Range"),
            ResolvedType::Array(elem) => write!(f, "{elem}[]"),
            ResolvedType::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
            ResolvedType::UserDefinedType(name) => write!(f, "{name}"),
            ResolvedType::Callable(sig) => write!(f, "({} -> {})", sig.argument, sig.result),
            ResolvedType::TypeParameter { name, .. } => write!(f, "'{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_nested() {
        let ty = ResolvedType::Tuple(vec![
            ResolvedType::array_of(ResolvedType::Qubit),
            ResolvedType::callable(ResolvedType::Int, ResolvedType::Unit),
        ]);
        assert_eq!(ty.to_string(), "(Qubit[], (Int -> Unit))");
    }

    #[test]
    fn tuple_items_only_for_tuples() {
        assert!(ResolvedType::Int.tuple_items().is_none());
        let pair = ResolvedType::Tuple(vec![ResolvedType::Int, ResolvedType::Bool]);
        assert_eq!(pair.tuple_items().map(<[_]>::len), Some(2));
    }
}

//! qirgen IR - Resolved Program Model
//!
//! This crate holds the immutable, fully type-checked program that the code
//! generator consumes:
//! - Qualified names for callables and user-defined types
//! - Resolved types (a closed sum, matched exhaustively downstream)
//! - Callables with their argument-tuple shapes and specializations
//! - The program: namespaces plus name-indexed lookups
//!
//! # Design Philosophy
//!
//! - **Resolved only**: no unresolved or invalid type variants exist here.
//!   Front-end errors never reach code generation.
//! - **Hashable everything**: every type is `Clone + Eq + Hash` so the
//!   backend can memoize on it.
//! - **No LLVM**: this crate knows nothing about IR emission.

mod callable;
mod names;
mod program;
mod types;

pub use callable::{
    ArgTuple, Attribute, Callable, CallableKind, LocalItem, Specialization, SpecializationBody,
    SpecializationKind, ENTRY_POINT_ATTRIBUTE, INTRINSIC_ATTRIBUTE,
};
pub use names::QualifiedName;
pub use program::{Namespace, Program, UserDefinedType};
pub use types::{CallableSignature, ResolvedType};

//! Generation errors.
//!
//! Every variant is fatal: the input program is assumed correct, so any of
//! these means the generator or its caller broke an invariant. Verifier
//! diagnostics are not errors; they go to the log file instead.

use std::fmt;
use std::path::Path;

use qirgen_ir::{QualifiedName, SpecializationKind};

pub type Result<T> = std::result::Result<T, GenerationError>;

/// Error type for IR generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// An emission operation ran with no current function or block.
    MissingCursor { operation: &'static str },
    /// A scope lookup found no binding.
    NameNotFound { name: String },
    /// A mutable-pointer request named an immutable binding.
    NotMutable { name: String },
    /// A callable referenced by name is not in the program.
    UnknownCallable { name: QualifiedName },
    /// A user-defined type referenced by name is not in the program.
    UnknownUserDefinedType { name: QualifiedName },
    /// A library function name outside the runtime catalogue or instruction set.
    UnknownFunction { name: String },
    /// A callable has no specialization of the requested kind.
    MissingSpecialization {
        name: QualifiedName,
        kind: SpecializationKind,
    },
    /// A value or type stack was popped while empty.
    StackUnderflow { stack: &'static str },
    /// A type shape the lowering cannot represent.
    Unrepresentable { reason: String },
    /// A mapping the interop bridge does not implement.
    Unsupported { what: String },
    /// The builder skipped instructions whose operands had the wrong shape.
    MalformedIr { count: u32 },
    /// Writing an output file failed.
    Io { path: String, message: String },
}

impl GenerationError {
    pub(crate) fn io(path: &Path, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.to_string_lossy().into_owned(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCursor { operation } => {
                write!(f, "{operation} requires a current function and block")
            }
            Self::NameNotFound { name } => write!(f, "no binding named '{name}' is in scope"),
            Self::NotMutable { name } => write!(f, "binding '{name}' is not mutable"),
            Self::UnknownCallable { name } => write!(f, "unknown callable '{name}'"),
            Self::UnknownUserDefinedType { name } => {
                write!(f, "unknown user-defined type '{name}'")
            }
            Self::UnknownFunction { name } => {
                write!(f, "'{name}' is not a runtime or instruction-set function")
            }
            Self::MissingSpecialization { name, kind } => {
                write!(f, "callable '{name}' has no {} specialization", kind.suffix())
            }
            Self::StackUnderflow { stack } => write!(f, "{stack} stack is empty"),
            Self::Unrepresentable { reason } => write!(f, "cannot lower type: {reason}"),
            Self::Unsupported { what } => write!(f, "unsupported: {what}"),
            Self::MalformedIr { count } => {
                write!(f, "{count} malformed instruction(s) skipped during generation")
            }
            Self::Io { path, message } => write!(f, "failed to write '{path}': {message}"),
        }
    }
}

impl std::error::Error for GenerationError {}

//! Code generation engine.
//!
//! # Module Organization
//!
//! ```text
//! codegen/
//! ├── value_id.rs           : Opaque ID newtypes + ValueArena
//! ├── ir_builder.rs         : ID-based LLVM instruction builder
//! ├── low_type.rs           : LowType + TypeLowering
//! ├── function_library.rs   : Runtime and instruction-set declarations
//! ├── scope.rs              : Persistent-map scoping and name generation
//! ├── generation_context.rs : GenerationContext: stacks, cursor, names, output
//! ├── refcount.rs           : Reference counting, tuple and string helpers
//! ├── specialization.rs     : Headers, body bracketing, UDT constructors
//! ├── wrappers.rs           : Dispatch tables and wrapper bodies
//! └── interop.rs            : Native entry points and the bridge module
//! ```

// -- Core infrastructure --
pub mod ir_builder;
pub mod low_type;
pub mod scope;
pub mod value_id;

// -- Libraries --
pub mod function_library;

// -- Generation --
pub mod generation_context;
pub mod interop;
mod refcount;
mod specialization;
mod wrappers;

#[cfg(test)]
pub(crate) mod test_support;

// -- Public re-exports --
pub use function_library::{FunctionLibrary, FunctionSignature};
pub use generation_context::{Cursor, GeneratedFiles, GenerationContext, NO_ERRORS};
pub use interop::{parse_native_type, BridgeOutput, BRIDGE_MODULE_NAME};
pub use ir_builder::{IrBuilder, Position};
pub use low_type::{HandleKind, LowType, TypeLowering, TypedValue};
pub use scope::{NameGenerator, ScopeBinding, ScopeStack};
pub use value_id::{BlockId, FunctionId, ValueId};

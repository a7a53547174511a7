//! QIR generation for resolved quantum programs.
//!
//! This crate turns a fully resolved [`qirgen_ir::Program`] into LLVM IR
//! following the QIR runtime convention: runtime calls under
//! `__quantum__rt__`, instructions under `__quantum__qis__`, reference
//! counted heap tuples with a `%TupleHeader`, and four-entry dispatch
//! tables for callables used as values.
//!
//! The statement and expression visitor is not part of this crate. It
//! drives a [`GenerationContext`] through the operations exposed here.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=qirgen_llvm=debug`: declarations, specializations, wrappers
//!   and interop.
//! - `RUST_LOG=qirgen_llvm=trace`: every lowered type, registered name and
//!   emitted wrapper (very verbose).
//!
//! # Clippy Configuration
//!
//! - Cast warnings: LLVM uses `u32` for struct and parameter indices
//! - Missing panic docs: builder panics are LLVM state corruption, not API concerns

#![allow(
    // LLVM uses u32 for struct/parameter indices, we use usize in Rust
    clippy::cast_possible_truncation,
    // Byte sizes are u64, LLVM integer constants take i64
    clippy::cast_possible_wrap,
    // Internal functions - panics are invariant violations
    clippy::missing_panics_doc,
    // Most Result returns are for fatal generation errors
    clippy::missing_errors_doc,
)]
//!
//! # Example
//!
//! ```ignore
//! use inkwell::context::Context;
//! use qirgen_llvm::{GenerationConfig, GenerationContext, SimpleCx};
//!
//! let context = Context::create();
//! let scx = SimpleCx::new(&context, "qrng");
//! let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::new("qrng"))?;
//!
//! gen.start_specialization();
//! gen.generate_header(callable, SpecializationKind::Body)?;
//! // ... visitor lowers the body ...
//! gen.end_specialization()?;
//!
//! gen.finish()?;
//! gen.write_outputs(out_dir)?;
//! ```

pub mod codegen;
pub mod config;
pub mod context;
pub mod error;
pub mod mangle;

#[cfg(test)]
mod tests;

pub use codegen::{
    BridgeOutput, Cursor, FunctionLibrary, FunctionSignature, GeneratedFiles, GenerationContext,
    HandleKind, IrBuilder, LowType, ScopeBinding, TypeLowering, TypedValue,
};
pub use config::GenerationConfig;
pub use context::SimpleCx;
pub use error::{GenerationError, Result};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=qirgen_llvm=debug` or `RUST_LOG=qirgen_llvm=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

//! Tests that execute generated code.
//!
//! Modules are compiled with the MCJIT and linked against
//! [`stub_runtime`], which records every runtime call it receives.


use inkwell::execution_engine::ExecutionEngine;
use inkwell::OptimizationLevel;

use crate::context::SimpleCx;

/// JIT engine for `scx`'s module with the stub runtime mapped in.
pub(crate) fn execution_engine<'ctx>(scx: &SimpleCx<'ctx>) -> ExecutionEngine<'ctx> {
    stub_runtime::reset();
    let engine = scx
        .llmod
        .create_jit_execution_engine(OptimizationLevel::None)
        .unwrap_or_else(|err| panic!("failed to create execution engine: {err}"));
    stub_runtime::map_runtime(&scx.llmod, &engine);
    engine
}

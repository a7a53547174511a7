//! The generation context: all mutable state of one generation run.
//!
//! The tree visitor drives lowering through this type: it opens a
//! specialization, pushes and pops operand values and expression types,
//! registers and looks up names, and calls library functions. The
//! specialization, wrapper, interop and reference-count operations live
//! in sibling modules as further `impl` blocks.
//!
//! The cursor (current function, block, inlining depth) is saved and
//! restored explicitly around every nested emission; nothing assumes a
//! particular position on entry.

use std::path::{Path, PathBuf};

use qirgen_ir::{Program, ResolvedType};

use crate::config::{GenerationConfig, BRIDGE_FILE_NAME};
use crate::context::SimpleCx;
use crate::error::{GenerationError, Result};

use super::function_library::FunctionLibrary;
use super::ir_builder::{IrBuilder, Position};
use super::low_type::{LowType, TypeLowering, TypedValue};
use super::scope::{ScopeBinding, ScopeStack};
use super::value_id::{BlockId, FunctionId, ValueId};
use super::wrappers::WrapperQueue;

/// Log text written when verification finds nothing.
pub const NO_ERRORS: &str = "No errors";

/// Saved emission position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    position: Position,
    inlining_depth: u32,
}

/// Paths written by [`GenerationContext::write_outputs`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub ir: PathBuf,
    pub log: PathBuf,
    pub bridge: Option<PathBuf>,
}

pub struct GenerationContext<'a, 'ctx> {
    pub(crate) program: &'a Program,
    pub(crate) config: GenerationConfig,
    pub(crate) builder: IrBuilder<'a, 'ctx>,
    pub(crate) types: TypeLowering<'a>,
    pub(crate) runtime: FunctionLibrary,
    pub(crate) quantum: FunctionLibrary,
    pub(crate) scopes: ScopeStack,
    pub(crate) wrappers: WrapperQueue,
    values: Vec<TypedValue>,
    expression_types: Vec<ResolvedType>,
}

impl<'a, 'ctx> GenerationContext<'a, 'ctx> {
    /// Create a context generating into `scx`'s module.
    ///
    /// Scans the program for instruction-set callables up front.
    pub fn new(scx: &'a SimpleCx<'ctx>, program: &'a Program, config: GenerationConfig) -> Result<Self> {
        let types = TypeLowering::new(program);
        let quantum = FunctionLibrary::quantum_instructions(program, &types)?;
        tracing::debug!(
            module = %scx.llmod.get_name().to_string_lossy(),
            instructions = quantum.names().count(),
            "created generation context"
        );
        Ok(Self {
            program,
            config,
            builder: IrBuilder::new(scx),
            types,
            runtime: FunctionLibrary::runtime(),
            quantum,
            scopes: ScopeStack::new(),
            wrappers: WrapperQueue::default(),
            values: Vec::new(),
            expression_types: Vec::new(),
        })
    }

    #[inline]
    pub fn scx(&self) -> &'a SimpleCx<'ctx> {
        self.builder.scx()
    }

    #[inline]
    pub fn program(&self) -> &'a Program {
        self.program
    }

    #[inline]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// The instruction builder, for the visitor's own emission.
    pub fn builder(&mut self) -> &mut IrBuilder<'a, 'ctx> {
        &mut self.builder
    }

    // -----------------------------------------------------------------------
    // Types
    // -----------------------------------------------------------------------

    pub fn lower_type(&self, ty: &ResolvedType) -> Result<LowType> {
        self.types.lower(ty)
    }

    pub fn lower_as_structure(&self, ty: &ResolvedType) -> Result<LowType> {
        self.types.lower_as_structure(ty)
    }

    /// Size in bytes of a lowered type, as an `i64` constant.
    pub fn size_of(&mut self, ty: &LowType) -> ValueId {
        self.builder.size_of(ty)
    }

    // -----------------------------------------------------------------------
    // Value and expression-type stacks
    // -----------------------------------------------------------------------

    pub fn push_value(&mut self, value: TypedValue) {
        self.values.push(value);
    }

    pub fn pop_value(&mut self) -> Result<TypedValue> {
        self.values
            .pop()
            .ok_or(GenerationError::StackUnderflow { stack: "value" })
    }

    pub fn push_expression_type(&mut self, ty: ResolvedType) {
        self.expression_types.push(ty);
    }

    pub fn pop_expression_type(&mut self) -> Result<ResolvedType> {
        self.expression_types
            .pop()
            .ok_or(GenerationError::StackUnderflow { stack: "expression type" })
    }

    /// Type of the expression currently being lowered.
    pub fn current_expression_type(&self) -> Option<&ResolvedType> {
        self.expression_types.last()
    }

    // -----------------------------------------------------------------------
    // Cursor
    // -----------------------------------------------------------------------

    pub fn save_cursor(&self) -> Cursor {
        Cursor {
            position: self.builder.save_position(),
            inlining_depth: self.scopes.inlining_depth(),
        }
    }

    pub fn restore_cursor(&mut self, cursor: Cursor) {
        self.builder.restore_position(cursor.position);
        self.scopes.set_inlining_depth(cursor.inlining_depth);
    }

    /// Current function and block, or `MissingCursor`.
    pub fn require_cursor(&self, operation: &'static str) -> Result<(FunctionId, BlockId)> {
        match (self.builder.current_function(), self.builder.current_block()) {
            (Some(func), Some(block)) => Ok((func, block)),
            _ => Err(GenerationError::MissingCursor { operation }),
        }
    }

    // -----------------------------------------------------------------------
    // Libraries
    // -----------------------------------------------------------------------

    /// Runtime function by short name (`array_create_1d`).
    pub fn runtime_function(&mut self, name: &str) -> Result<FunctionId> {
        self.runtime.get_function(&mut self.builder, name)
    }

    /// Instruction-set function by instruction name (`h`).
    pub fn quantum_instruction(&mut self, name: &str) -> Result<FunctionId> {
        self.quantum.get_function(&mut self.builder, name)
    }

    /// Call a runtime function at the cursor.
    pub fn call_runtime(&mut self, name: &str, args: &[ValueId]) -> Result<Option<ValueId>> {
        self.require_cursor("runtime call")?;
        let func = self.runtime_function(name)?;
        Ok(self.builder.call(func, args, name))
    }

    // -----------------------------------------------------------------------
    // Names and scopes
    // -----------------------------------------------------------------------

    pub fn open_scope(&mut self) {
        self.scopes.open_scope();
    }

    /// Close the top scope, unreferencing its pending releases unless the
    /// current block already ended.
    ///
    /// A block ended by a return has already released everything through
    /// [`emit_return`](Self::emit_return); one ended by `unreachable`
    /// never needs to.
    pub fn close_scope(&mut self) -> Result<()> {
        let Some(releases) = self.scopes.close_scope() else {
            return Ok(());
        };
        if releases.is_empty() || self.builder.current_block_terminated() {
            return Ok(());
        }
        for value in &releases {
            self.remove_reference_if_heap_handle(value)?;
        }
        Ok(())
    }

    /// Unreference the pending releases of every open scope at the cursor.
    /// The scopes stay open.
    pub fn emit_pending_releases(&mut self) -> Result<()> {
        self.require_cursor("scope release")?;
        for value in &self.scopes.pending_releases() {
            self.remove_reference_if_heap_handle(value)?;
        }
        Ok(())
    }

    /// Return from the current specialization: release every open scope,
    /// then `ret`. A returned heap value must own the reference it hands
    /// to the caller.
    pub fn emit_return(&mut self, value: Option<ValueId>) -> Result<()> {
        self.emit_pending_releases()?;
        match value {
            Some(value) => self.builder.ret(value),
            None => self.builder.ret_void(),
        }
        Ok(())
    }

    /// Drop one reference of `value` when the current scope closes.
    pub fn register_release(&mut self, value: TypedValue) {
        self.scopes.add_release(value);
    }

    /// Bind `name` in the current scope.
    ///
    /// A mutable binding's value is the pointer to its slot; `value.ty` is
    /// the type of the stored value. Unnamed values get a generated display
    /// name.
    pub fn register(&mut self, name: &str, value: TypedValue, is_mutable: bool) {
        if self.builder.value_name(value.value).is_empty() {
            let display = self
                .scopes
                .unique_name(&format!("{}{name}", self.scopes.inlining_prefix()));
            self.builder.set_value_name(value.value, &display);
        }
        let binding = if is_mutable {
            ScopeBinding::Mutable {
                ptr: value.value,
                ty: value.ty,
            }
        } else {
            ScopeBinding::Immutable(value)
        };
        tracing::trace!(name, is_mutable, "registered name");
        self.scopes.bind(name, binding);
    }

    /// Current value of `name`, loading through mutable bindings.
    pub fn lookup(&mut self, name: &str) -> Result<TypedValue> {
        let binding = self
            .scopes
            .lookup(name)
            .cloned()
            .ok_or_else(|| GenerationError::NameNotFound {
                name: name.to_string(),
            })?;
        match binding {
            ScopeBinding::Immutable(value) => Ok(value),
            ScopeBinding::Mutable { ptr, ty } => {
                self.require_cursor("load of mutable binding")?;
                let loaded = self.builder.load(&ty, ptr, name);
                Ok(TypedValue::new(loaded, ty))
            }
        }
    }

    /// Slot pointer of a mutable binding, with the stored value type.
    pub fn get_mutable_pointer(&self, name: &str) -> Result<TypedValue> {
        match self.scopes.lookup(name) {
            Some(ScopeBinding::Mutable { ptr, ty }) => Ok(TypedValue::new(*ptr, ty.clone())),
            Some(ScopeBinding::Immutable(_)) => Err(GenerationError::NotMutable {
                name: name.to_string(),
            }),
            None => Err(GenerationError::NameNotFound {
                name: name.to_string(),
            }),
        }
    }

    /// Generation-unique `prefix__n` name.
    pub fn unique_name(&mut self, prefix: &str) -> String {
        self.scopes.unique_name(prefix)
    }

    pub fn start_inlining(&mut self) {
        self.scopes.start_inlining();
    }

    pub fn stop_inlining(&mut self) -> Result<()> {
        let Some(releases) = self.scopes.stop_inlining() else {
            return Ok(());
        };
        if self.builder.current_block_terminated() {
            return Ok(());
        }
        for value in &releases {
            self.remove_reference_if_heap_handle(value)?;
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Finishing and output
    // -----------------------------------------------------------------------

    /// Emit everything deferred until the whole program is known: queued
    /// wrapper bodies, then the entry points.
    ///
    /// Fails with `MalformedIr` if the builder had to skip any instruction.
    pub fn finish(&mut self) -> Result<()> {
        self.emit_queued_wrappers()?;
        let program = self.program;
        for callable in program.entry_points() {
            self.generate_entry_point(callable)?;
        }
        match self.builder.codegen_error_count() {
            0 => Ok(()),
            count => Err(GenerationError::MalformedIr { count }),
        }
    }

    /// Run the LLVM verifier on the primary module. Instructions the
    /// builder skipped count as a failure even if the module verifies.
    pub fn verify(&self) -> std::result::Result<(), String> {
        let verified = self.scx().llmod.verify().map_err(|msg| msg.to_string());
        match self.builder.codegen_error_count() {
            0 => verified,
            count => {
                let malformed = GenerationError::MalformedIr { count }.to_string();
                Err(match verified {
                    Ok(()) => malformed,
                    Err(diagnostic) => format!("{malformed}\n{diagnostic}"),
                })
            }
        }
    }

    /// Textual IR of the primary module.
    pub fn emit_ir(&self) -> String {
        self.scx().llmod.print_to_string().to_string()
    }

    /// Write `<base>.ll`, `<base>.log` and, with interop enabled, the
    /// bridge module into `dir`.
    ///
    /// Everything is built before the first file is written, so a failing
    /// bridge leaves no partial output. Verification failures are logged,
    /// not returned; the IR is written either way. Failing to write any
    /// file is an error.
    pub fn write_outputs(&self, dir: &Path) -> Result<GeneratedFiles> {
        let bridge = if self.config.emit_interop {
            Some(self.emit_interop_bridge()?)
        } else {
            None
        };

        let mut log = match self.verify() {
            Ok(()) => NO_ERRORS.to_string(),
            Err(diagnostic) => {
                tracing::warn!(%diagnostic, "module verification failed");
                diagnostic
            }
        };
        log.push('\n');
        if let Some(output) = &bridge {
            log.push_str("bridge: ");
            log.push_str(output.verification.as_ref().err().map_or(NO_ERRORS, String::as_str));
            log.push('\n');
        }

        let ir = dir.join(self.config.ir_file_name());
        write_file(&ir, &self.emit_ir())?;
        let bridge = match bridge {
            Some(output) => {
                let path = dir.join(BRIDGE_FILE_NAME);
                write_file(&path, &output.ir)?;
                Some(path)
            }
            None => None,
        };
        let log_path = dir.join(self.config.log_file_name());
        write_file(&log_path, &log)?;
        tracing::debug!(ir = %ir.display(), "wrote generation outputs");
        Ok(GeneratedFiles {
            ir,
            log: log_path,
            bridge,
        })
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| GenerationError::io(path, &err))
}

//! Dispatch tables and uniform-signature wrappers.
//!
//! A callable used as a first-class value is reached through a constant
//! table of four wrapper pointers, one per specialization kind in the
//! order body, adjoint, controlled, controlled-adjoint (null when absent).
//! Every wrapper has the signature
//!
//! ```text
//! void <spec>__wrapper(ptr capture, ptr args, ptr result)
//! ```
//!
//! and unpacks `args` one level deep, calls the specialization, and stores
//! its result into `result`.
//!
//! Tables are created on demand during tree lowering. Wrapper bodies are
//! deferred to `emit_queued_wrappers`, when every specialization they may
//! call is known.

use qirgen_ir::{Callable, QualifiedName, SpecializationBody, SpecializationKind};
use rustc_hash::FxHashMap;

use crate::error::{GenerationError, Result};
use crate::mangle::{dispatch_table_name, specialization_name, wrapper_name};

use super::generation_context::GenerationContext;
use super::low_type::{HandleKind, LowType, TypedValue};
use super::value_id::{FunctionId, ValueId};

/// Wrapper parameter indices.
const ARGS_PARAM: u32 = 1;
const RESULT_PARAM: u32 = 2;

/// Created dispatch tables and the callables whose wrappers still need
/// bodies.
#[derive(Default)]
pub(crate) struct WrapperQueue {
    tables: FxHashMap<String, ValueId>,
    queue: Vec<QualifiedName>,
    /// Queue entries before this index have been emitted.
    emitted: usize,
}

impl WrapperQueue {
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn pending(&self) -> usize {
        self.queue.len() - self.emitted
    }
}

impl GenerationContext<'_, '_> {
    /// The dispatch table of a callable, creating it (and declaring its
    /// wrappers) on first request.
    pub fn get_or_create_dispatch_table(&mut self, name: &QualifiedName) -> Result<ValueId> {
        let key = dispatch_table_name(name);
        if let Some(&table) = self.wrappers.tables.get(&key) {
            return Ok(table);
        }
        let program = self.program;
        let callable = program
            .callable(name)
            .ok_or_else(|| GenerationError::UnknownCallable { name: name.clone() })?;

        let handle = LowType::Handle(HandleKind::Tuple);
        let params = [handle.clone(), handle.clone(), handle];
        let mut entries: [Option<FunctionId>; 4] = [None; 4];
        for spec in callable.specializations() {
            let wrapper = self
                .builder
                .declare_function(&wrapper_name(name, spec.kind), &params, &LowType::Void);
            self.builder.set_internal_linkage(wrapper);
            entries[spec.kind.index()] = Some(wrapper);
        }

        let table = self.builder.const_pointer_table(&key, &entries);
        self.wrappers.tables.insert(key.clone(), table);
        self.wrappers.queue.push(name.clone());
        tracing::debug!(table = %key, queued = self.wrappers.len(), "created dispatch table");
        Ok(table)
    }

    /// A runtime callable value for `name` with no capture.
    pub fn create_callable_value(&mut self, name: &QualifiedName) -> Result<TypedValue> {
        self.require_cursor("callable creation")?;
        let table = self.get_or_create_dispatch_table(name)?;
        let capture = self.builder.const_null_ptr();
        let value = self.call_runtime("callable_create", &[table, capture])?;
        let value = value.unwrap_or(capture);
        Ok(TypedValue::new(value, LowType::Handle(HandleKind::Callable)))
    }

    /// Emit the bodies of every queued wrapper. Each body is emitted once;
    /// calling this again only handles callables queued since.
    pub fn emit_queued_wrappers(&mut self) -> Result<()> {
        let program = self.program;
        while self.wrappers.pending() > 0 {
            let name = self.wrappers.queue[self.wrappers.emitted].clone();
            self.wrappers.emitted += 1;
            let callable = program
                .callable(&name)
                .ok_or_else(|| GenerationError::UnknownCallable { name: name.clone() })?;
            for spec in callable.specializations() {
                self.emit_wrapper(callable, spec.kind)?;
            }
        }
        Ok(())
    }

    fn emit_wrapper(&mut self, callable: &Callable, kind: SpecializationKind) -> Result<()> {
        let name = wrapper_name(&callable.name, kind);
        let wrapper = self
            .builder
            .get_function(&name)
            .ok_or_else(|| GenerationError::UnknownFunction { name: name.clone() })?;
        if self.builder.is_defined(wrapper) {
            return Ok(());
        }

        let cursor = self.save_cursor();
        self.builder.set_current_function(wrapper);
        let entry = self.builder.append_block(wrapper, "entry");
        self.builder.position_at_end(entry);

        // One-level decomposition of the argument tuple.
        let params = self.parameter_types(&callable.specialization_arguments(kind))?;
        let mut args = Vec::with_capacity(params.len());
        if !params.is_empty() {
            let args_ptr = self.builder.get_param(wrapper, ARGS_PARAM);
            self.builder.set_value_name(args_ptr, "args");
            let structure = LowType::tuple(params.clone());
            let structure = structure.heap_structure().cloned().unwrap_or(structure);
            for (i, ty) in params.iter().enumerate() {
                let field = self
                    .builder
                    .struct_gep(&structure, args_ptr, i as u32 + 1, &format!("arg{}.ptr", i + 1));
                args.push(self.builder.load(ty, field, &format!("arg{}", i + 1)));
            }
        }

        let result_ty = callable.signature.result.clone();
        let ret = self.lower_type(&result_ty)?;
        let target = self.wrapper_target(callable, kind)?;
        let result = match target {
            Some(func) => self.builder.call(func, &args, "result"),
            None => {
                tracing::warn!(wrapper = %name, "specialization not generated, wrapper result is undefined");
                (!ret.is_void()).then(|| self.builder.undef(&ret))
            }
        };

        if let Some(value) = result.filter(|_| !ret.is_void()) {
            let result_ptr = self.builder.get_param(wrapper, RESULT_PARAM);
            self.builder.set_value_name(result_ptr, "result.tuple");
            let structure = self.lower_as_structure(&result_ty)?;
            if ret.is_heap_handle() {
                if target.is_some() {
                    self.copy_tuple_fields(&structure, value, result_ptr)?;
                    self.remove_reference_if_heap_handle(&TypedValue::new(value, ret))?;
                }
            } else {
                let field = self.builder.struct_gep(&structure, result_ptr, 1, "result.ptr");
                self.builder.store(value, field);
            }
        }
        self.builder.ret_void();

        self.restore_cursor(cursor);
        tracing::trace!(wrapper = %name, "emitted wrapper");
        Ok(())
    }

    /// Function a wrapper forwards to: the instruction for an intrinsic
    /// body, a declaration for an external one, otherwise whatever the
    /// tree lowering emitted.
    fn wrapper_target(&mut self, callable: &Callable, kind: SpecializationKind) -> Result<Option<FunctionId>> {
        let body = callable.specialization(kind).map(|spec| spec.body);
        match (body, callable.intrinsic_instruction()) {
            (Some(SpecializationBody::Intrinsic), Some(instr)) if kind == SpecializationKind::Body => {
                self.quantum_instruction(instr).map(Some)
            }
            (Some(SpecializationBody::External), _) => self.register_function(callable, kind).map(Some),
            _ => Ok(self
                .builder
                .get_function(&specialization_name(&callable.name, kind))),
        }
    }

    /// Copy fields `1..` of the tuple `src` into `dest`, referencing every
    /// copied heap handle.
    fn copy_tuple_fields(&mut self, structure: &LowType, src: ValueId, dest: ValueId) -> Result<()> {
        for (i, field_ty) in structure.fields().iter().enumerate().skip(1) {
            let index = i as u32;
            let from = self.builder.struct_gep(structure, src, index, "");
            let item = self.builder.load(field_ty, from, &format!("item{i}"));
            let to = self.builder.struct_gep(structure, dest, index, "");
            self.builder.store(item, to);
            self.add_reference_if_heap_handle(&TypedValue::new(item, field_ty.clone()))?;
        }
        Ok(())
    }
}

//! ID-based LLVM instruction builder.
//!
//! `IrBuilder` wraps inkwell's `Builder`, stores all LLVM values in a
//! `ValueArena`, and exposes only opaque ID types to callers. Types are
//! passed as [`LowType`] and resolved to LLVM types here, so the `'ctx`
//! lifetime never reaches the generation context.
//!
//! # Method Organization
//!
//! | Category | Methods |
//! |----------|---------|
//! | Constants | `const_i32`, `const_i64`, `const_f64`, `const_bool`, `const_null_ptr`, `undef`, `size_of` |
//! | Memory | `load`, `store`, `struct_gep`, `gep`, `memcpy` |
//! | Arithmetic | `mul`, `icmp_sgt` |
//! | Conversions | `bitcast`, `trunc`, `ptr_to_int`, `int_to_ptr` |
//! | Control flow | `br`, `cond_br`, `ret`, `ret_void`, `unreachable` |
//! | Calls | `call` |
//! | Blocks | `append_block`, `position_at_end`, `remove_block`, `is_branch_target`, ... |
//! | Functions | `declare_function`, `get_function`, `get_param`, attributes |
//! | Globals | `global_string_ptr`, `const_pointer_table`, `add_alias` |

use std::cell::Cell;
use std::ffi::CString;

use inkwell::attributes::{Attribute, AttributeLoc};
use inkwell::basic_block::BasicBlock;
use inkwell::builder::Builder as InkwellBuilder;
use inkwell::module::Linkage;
use inkwell::types::{AsTypeRef, BasicMetadataTypeEnum, BasicType, BasicTypeEnum};
use inkwell::values::{AsValueRef, BasicMetadataValueEnum, BasicValueEnum, FunctionValue, IntValue, PointerValue};
use inkwell::IntPredicate;

use crate::context::SimpleCx;

use super::low_type::{llvm_type, LowType};
use super::value_id::{BlockId, FunctionId, ValueArena, ValueId};

/// Saved builder position: the active function and block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Position {
    pub function: Option<FunctionId>,
    pub block: Option<BlockId>,
}

/// ID-based LLVM IR builder.
///
/// Two lifetimes:
/// - `'ctx`: The LLVM context lifetime (from `Context::create()`).
/// - `'scx`: The borrow lifetime of the `SimpleCx` reference.
///
/// These are separate to avoid drop-checker issues where `IrBuilder`
/// and `SimpleCx` are local variables in the same scope.
pub struct IrBuilder<'scx, 'ctx> {
    builder: InkwellBuilder<'ctx>,
    scx: &'scx SimpleCx<'ctx>,
    arena: ValueArena<'ctx>,
    current_function: Option<FunctionId>,
    current_block: Option<BlockId>,
    /// `(source, target)` for every branch built through this builder.
    branch_edges: Vec<(BasicBlock<'ctx>, BasicBlock<'ctx>)>,
    /// Count of type-mismatch errors during IR construction.
    ///
    /// Incremented by defensive fallback paths. When > 0 the module is
    /// malformed; verification will report it.
    codegen_errors: Cell<u32>,
}

impl<'scx, 'ctx> IrBuilder<'scx, 'ctx> {
    pub fn new(scx: &'scx SimpleCx<'ctx>) -> Self {
        Self {
            builder: scx.llcx.create_builder(),
            scx,
            arena: ValueArena::new(),
            current_function: None,
            current_block: None,
            branch_edges: Vec::new(),
            codegen_errors: Cell::new(0),
        }
    }

    #[inline]
    pub fn scx(&self) -> &'scx SimpleCx<'ctx> {
        self.scx
    }

    pub(crate) fn record_codegen_error(&self) {
        self.codegen_errors.set(self.codegen_errors.get() + 1);
    }

    /// Number of type-mismatch errors recorded during IR construction.
    pub fn codegen_error_count(&self) -> u32 {
        self.codegen_errors.get()
    }

    /// Resolve a `LowType` to an LLVM basic type. `Void` has none.
    pub(crate) fn basic_type(&self, ty: &LowType) -> Option<BasicTypeEnum<'ctx>> {
        llvm_type(self.scx, ty)
    }

    /// Resolve a `LowType` that must have a value representation.
    /// `Void` falls back to the opaque pointer (a null tuple handle).
    fn value_type(&self, ty: &LowType) -> BasicTypeEnum<'ctx> {
        self.basic_type(ty)
            .unwrap_or_else(|| self.scx.type_ptr().into())
    }

    // -----------------------------------------------------------------------
    // Constants
    // -----------------------------------------------------------------------

    #[inline]
    pub fn const_i32(&mut self, val: i32) -> ValueId {
        let v = self.scx.type_i32().const_int(val as u64, val < 0);
        self.arena.push_value(v.into())
    }

    #[inline]
    pub fn const_i64(&mut self, val: i64) -> ValueId {
        let v = self.scx.type_i64().const_int(val as u64, val < 0);
        self.arena.push_value(v.into())
    }

    /// Create an integer constant of arbitrary width (e.g. `i2` Pauli values).
    pub fn const_int(&mut self, bits: u32, val: u64) -> ValueId {
        let v = self.scx.type_int(bits).const_int(val, false);
        self.arena.push_value(v.into())
    }

    #[inline]
    pub fn const_f64(&mut self, val: f64) -> ValueId {
        let v = self.scx.type_f64().const_float(val);
        self.arena.push_value(v.into())
    }

    #[inline]
    pub fn const_bool(&mut self, val: bool) -> ValueId {
        let v = self.scx.type_i1().const_int(u64::from(val), false);
        self.arena.push_value(v.into())
    }

    #[inline]
    pub fn const_null_ptr(&mut self) -> ValueId {
        let v = self.scx.type_ptr().const_null();
        self.arena.push_value(v.into())
    }

    /// Create an `undef` value of the given type.
    pub fn undef(&mut self, ty: &LowType) -> ValueId {
        let v: BasicValueEnum<'ctx> = match self.value_type(ty) {
            BasicTypeEnum::IntType(t) => t.get_undef().into(),
            BasicTypeEnum::FloatType(t) => t.get_undef().into(),
            BasicTypeEnum::StructType(t) => t.get_undef().into(),
            BasicTypeEnum::PointerType(t) => t.get_undef().into(),
            BasicTypeEnum::ArrayType(t) => t.get_undef().into(),
            BasicTypeEnum::VectorType(t) => t.get_undef().into(),
            BasicTypeEnum::ScalableVectorType(_) => self.scx.type_ptr().get_undef().into(),
        };
        self.arena.push_value(v)
    }

    /// Size in bytes of a `LowType` as an `i64` constant.
    ///
    /// Statically sized types fold to a plain integer. Aggregates use the
    /// offset of element one from a null base, leaving the target layout
    /// to LLVM.
    pub fn size_of(&mut self, ty: &LowType) -> ValueId {
        if let Some(size) = ty.fixed_size() {
            return self.const_i64(size as i64);
        }
        let llvm_ty = self.value_type(ty);
        let i64_ty = self.scx.type_i64();
        let one = i64_ty.const_int(1, false);
        // SAFETY: a one-element offset from null never dereferences memory;
        // the result is a constant expression.
        let end = unsafe { self.scx.type_ptr().const_null().const_gep(llvm_ty, &[one]) };
        let size = end.const_to_int(i64_ty);
        self.arena.push_value(size.into())
    }

    // -----------------------------------------------------------------------
    // Memory
    // -----------------------------------------------------------------------

    /// Build a load from a pointer.
    ///
    /// Defensive: if `ptr` is not a pointer value, records a codegen error
    /// and returns `undef` instead of panicking.
    pub fn load(&mut self, ty: &LowType, ptr: ValueId, name: &str) -> ValueId {
        let llvm_ty = self.value_type(ty);
        let raw = self.arena.get_value(ptr);
        if !raw.is_pointer_value() {
            tracing::error!(val_type = ?raw.get_type(), "load from non-pointer");
            self.record_codegen_error();
            return self.undef(ty);
        }
        let v = self
            .builder
            .build_load(llvm_ty, raw.into_pointer_value(), name)
            .expect("load");
        self.arena.push_value(v)
    }

    /// Build a store to a pointer.
    pub fn store(&mut self, val: ValueId, ptr: ValueId) {
        let v = self.arena.get_value(val);
        let raw = self.arena.get_value(ptr);
        if !raw.is_pointer_value() {
            tracing::error!(val_type = ?raw.get_type(), "store to non-pointer");
            self.record_codegen_error();
            return;
        }
        self.builder
            .build_store(raw.into_pointer_value(), v)
            .expect("store");
    }

    /// Build a struct GEP (field access by index).
    ///
    /// `struct_ty` must be a `LowType::Struct`. Defensive: on any other
    /// type records a codegen error and returns a null pointer.
    pub fn struct_gep(&mut self, struct_ty: &LowType, ptr: ValueId, index: u32, name: &str) -> ValueId {
        let Some(BasicTypeEnum::StructType(struct_t)) = self.basic_type(struct_ty) else {
            tracing::error!(%struct_ty, "struct_gep on non-struct type");
            self.record_codegen_error();
            return self.const_null_ptr();
        };
        let raw = self.arena.get_value(ptr);
        if !raw.is_pointer_value() {
            tracing::error!(?raw, "struct_gep on non-pointer value");
            self.record_codegen_error();
            return self.const_null_ptr();
        }
        let v = self
            .builder
            .build_struct_gep(struct_t, raw.into_pointer_value(), index, name)
            .expect("struct_gep");
        self.arena.push_value(v.into())
    }

    /// Build an in-bounds GEP over elements of `elem_ty`.
    pub fn gep(&mut self, elem_ty: &LowType, ptr: ValueId, indices: &[ValueId], name: &str) -> ValueId {
        let llvm_ty = self.value_type(elem_ty);
        let ptr_val = self.arena.get_value(ptr).into_pointer_value();
        let idx_vals: Vec<IntValue<'ctx>> = indices
            .iter()
            .map(|&id| self.arena.get_value(id).into_int_value())
            .collect();
        // SAFETY: Caller ensures indices are valid for the pointee type.
        let v = unsafe {
            self.builder
                .build_in_bounds_gep(llvm_ty, ptr_val, &idx_vals, name)
                .expect("gep")
        };
        self.arena.push_value(v.into())
    }

    /// Copy `size` bytes from `src` to `dest` (byte-aligned).
    pub fn memcpy(&mut self, dest: ValueId, src: ValueId, size: ValueId) {
        let dest = self.arena.get_value(dest).into_pointer_value();
        let src = self.arena.get_value(src).into_pointer_value();
        let size = self.arena.get_value(size).into_int_value();
        self.builder
            .build_memcpy(dest, 1, src, 1, size)
            .expect("memcpy");
    }

    // -----------------------------------------------------------------------
    // Arithmetic and comparisons
    // -----------------------------------------------------------------------

    pub fn mul(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> ValueId {
        let l = self.arena.get_value(lhs).into_int_value();
        let r = self.arena.get_value(rhs).into_int_value();
        let v = self.builder.build_int_mul(l, r, name).expect("mul");
        self.arena.push_value(v.into())
    }

    pub fn icmp_sgt(&mut self, lhs: ValueId, rhs: ValueId, name: &str) -> ValueId {
        let l = self.arena.get_value(lhs).into_int_value();
        let r = self.arena.get_value(rhs).into_int_value();
        let v = self
            .builder
            .build_int_compare(IntPredicate::SGT, l, r, name)
            .expect("icmp_sgt");
        self.arena.push_value(v.into())
    }

    // -----------------------------------------------------------------------
    // Conversions
    // -----------------------------------------------------------------------

    /// Reinterpret a value as another same-size type. Identity when the
    /// types already match.
    pub fn bitcast(&mut self, val: ValueId, ty: &LowType, name: &str) -> ValueId {
        let v = self.arena.get_value(val);
        let target = self.value_type(ty);
        if v.get_type() == target {
            return val;
        }
        let cast = self
            .builder
            .build_bit_cast(v, target, name)
            .expect("bitcast");
        self.arena.push_value(cast)
    }

    pub fn trunc(&mut self, val: ValueId, ty: &LowType, name: &str) -> ValueId {
        let v = self.arena.get_value(val).into_int_value();
        let BasicTypeEnum::IntType(target) = self.value_type(ty) else {
            tracing::error!(%ty, "trunc to non-integer type");
            self.record_codegen_error();
            return val;
        };
        let t = self
            .builder
            .build_int_truncate(v, target, name)
            .expect("trunc");
        self.arena.push_value(t.into())
    }

    pub fn ptr_to_int(&mut self, ptr: ValueId, ty: &LowType, name: &str) -> ValueId {
        let p = self.arena.get_value(ptr).into_pointer_value();
        let BasicTypeEnum::IntType(target) = self.value_type(ty) else {
            tracing::error!(%ty, "ptr_to_int to non-integer type");
            self.record_codegen_error();
            return ptr;
        };
        let v = self
            .builder
            .build_ptr_to_int(p, target, name)
            .expect("ptr_to_int");
        self.arena.push_value(v.into())
    }

    pub fn int_to_ptr(&mut self, val: ValueId, name: &str) -> ValueId {
        let v = self.arena.get_value(val).into_int_value();
        let p = self
            .builder
            .build_int_to_ptr(v, self.scx.type_ptr(), name)
            .expect("int_to_ptr");
        self.arena.push_value(p.into())
    }

    // -----------------------------------------------------------------------
    // Control flow
    // -----------------------------------------------------------------------

    fn record_edge(&mut self, target: BasicBlock<'ctx>) {
        if let Some(source) = self.builder.get_insert_block() {
            self.branch_edges.push((source, target));
        }
    }

    pub fn br(&mut self, dest: BlockId) {
        let bb = self.arena.get_block(dest);
        self.record_edge(bb);
        self.builder
            .build_unconditional_branch(bb)
            .expect("build_br");
    }

    /// Build a conditional branch.
    ///
    /// Defensive: if `cond` is not an integer value, falls back to an
    /// unconditional branch to the else block.
    pub fn cond_br(&mut self, cond: ValueId, then_bb: BlockId, else_bb: BlockId) {
        let raw = self.arena.get_value(cond);
        if !raw.is_int_value() {
            tracing::error!(val_type = ?raw.get_type(), "cond_br on non-int, branching to else");
            self.record_codegen_error();
            self.br(else_bb);
            return;
        }
        let then_block = self.arena.get_block(then_bb);
        let else_block = self.arena.get_block(else_bb);
        self.record_edge(then_block);
        self.record_edge(else_block);
        self.builder
            .build_conditional_branch(raw.into_int_value(), then_block, else_block)
            .expect("build_cond_br");
    }

    pub fn ret(&mut self, val: ValueId) {
        let v = self.arena.get_value(val);
        self.builder.build_return(Some(&v)).expect("ret");
    }

    pub fn ret_void(&mut self) {
        self.builder.build_return(None).expect("ret_void");
    }

    pub fn unreachable(&mut self) {
        self.builder.build_unreachable().expect("unreachable");
    }

    // -----------------------------------------------------------------------
    // Calls
    // -----------------------------------------------------------------------

    /// Build a direct function call.
    ///
    /// Returns `None` for void-returning functions.
    pub fn call(&mut self, callee: FunctionId, args: &[ValueId], name: &str) -> Option<ValueId> {
        let func = self.arena.get_function(callee);
        let arg_vals: Vec<BasicMetadataValueEnum<'ctx>> = args
            .iter()
            .map(|&id| self.arena.get_value(id).into())
            .collect();
        // Void calls cannot carry a name.
        let name = if func.get_type().get_return_type().is_some() {
            name
        } else {
            ""
        };
        let call_val = self
            .builder
            .build_call(func, &arg_vals, name)
            .expect("call");
        call_val
            .try_as_basic_value()
            .basic()
            .map(|v| self.arena.push_value(v))
    }

    // -----------------------------------------------------------------------
    // Blocks and position
    // -----------------------------------------------------------------------

    pub fn append_block(&mut self, function: FunctionId, name: &str) -> BlockId {
        let func = self.arena.get_function(function);
        let bb = self.scx.llcx.append_basic_block(func, name);
        self.arena.push_block(bb)
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        let bb = self.arena.get_block(block);
        self.builder.position_at_end(bb);
        self.current_block = Some(block);
    }

    #[inline]
    pub fn current_block(&self) -> Option<BlockId> {
        self.current_block
    }

    pub fn current_block_terminated(&self) -> bool {
        self.current_block
            .is_some_and(|id| self.arena.get_block(id).get_terminator().is_some())
    }

    pub fn block_has_terminator(&self, block: BlockId) -> bool {
        self.arena.get_block(block).get_terminator().is_some()
    }

    pub fn block_is_empty(&self, block: BlockId) -> bool {
        self.arena.get_block(block).get_first_instruction().is_none()
    }

    /// True if `block` is the first block of its function.
    pub fn is_entry_block(&self, block: BlockId) -> bool {
        let bb = self.arena.get_block(block);
        bb.get_parent()
            .and_then(|f| f.get_first_basic_block())
            .is_some_and(|entry| entry == bb)
    }

    /// True if any block of the enclosing function branches to `block`.
    pub fn is_branch_target(&self, block: BlockId) -> bool {
        let target = self.arena.get_block(block);
        let Some(func) = target.get_parent() else {
            return false;
        };
        func.get_basic_blocks().iter().any(|&bb| {
            self.branch_edges
                .iter()
                .any(|&(src, dst)| src == bb && dst == target)
        })
    }

    /// Delete a block that nothing references.
    pub fn remove_block(&mut self, block: BlockId) {
        let bb = self.arena.get_block(block);
        if self.builder.get_insert_block() == Some(bb) {
            self.builder.clear_insertion_position();
            self.current_block = None;
        }
        self.branch_edges.retain(|&(src, dst)| src != bb && dst != bb);
        // SAFETY: the caller checked the block is empty and not a branch target.
        if unsafe { bb.delete() }.is_err() {
            tracing::error!("failed to delete basic block");
            self.record_codegen_error();
        }
    }

    /// Save the active function and block.
    #[inline]
    pub fn save_position(&self) -> Position {
        Position {
            function: self.current_function,
            block: self.current_block,
        }
    }

    /// Restore a previously saved position. A position without a block
    /// clears the insertion point.
    pub fn restore_position(&mut self, saved: Position) {
        self.current_function = saved.function;
        match saved.block {
            Some(block) => self.position_at_end(block),
            None => {
                self.builder.clear_insertion_position();
                self.current_block = None;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Functions
    // -----------------------------------------------------------------------

    pub fn set_current_function(&mut self, func: FunctionId) {
        self.current_function = Some(func);
    }

    #[inline]
    pub fn current_function(&self) -> Option<FunctionId> {
        self.current_function
    }

    /// Declare a function with external linkage, reusing an existing
    /// declaration of the same name.
    pub fn declare_function(&mut self, name: &str, params: &[LowType], ret: &LowType) -> FunctionId {
        if let Some(func) = self.scx.llmod.get_function(name) {
            return self.arena.push_function(func);
        }
        let param_tys: Vec<BasicMetadataTypeEnum<'ctx>> = params
            .iter()
            .map(|p| self.value_type(p).into())
            .collect();
        let fn_type = match self.basic_type(ret) {
            Some(ret_ty) => ret_ty.fn_type(&param_tys, false),
            None => self.scx.type_void_func(&param_tys),
        };
        let func = self
            .scx
            .llmod
            .add_function(name, fn_type, Some(Linkage::External));
        self.arena.push_function(func)
    }

    /// Look up a function already in the module.
    pub fn get_function(&mut self, name: &str) -> Option<FunctionId> {
        let func = self.scx.llmod.get_function(name)?;
        Some(self.arena.push_function(func))
    }

    pub fn function_name(&self, func: FunctionId) -> String {
        self.arena
            .get_function(func)
            .get_name()
            .to_string_lossy()
            .into_owned()
    }

    /// True if the function has a body.
    pub fn is_defined(&self, func: FunctionId) -> bool {
        self.arena.get_function(func).count_basic_blocks() > 0
    }

    pub fn returns_void(&self, func: FunctionId) -> bool {
        self.arena
            .get_function(func)
            .get_type()
            .get_return_type()
            .is_none()
    }

    /// Get a function parameter as a `ValueId`.
    pub fn get_param(&mut self, func: FunctionId, index: u32) -> ValueId {
        let func_val = self.arena.get_function(func);
        let Some(param) = func_val.get_nth_param(index) else {
            tracing::error!(
                func = %func_val.get_name().to_string_lossy(),
                index,
                param_count = func_val.count_params(),
                "parameter index out of bounds"
            );
            self.record_codegen_error();
            return self.const_null_ptr();
        };
        self.arena.push_value(param)
    }

    /// Address of a function, for storing in tables.
    pub fn function_pointer(&mut self, func: FunctionId) -> ValueId {
        let ptr = self
            .arena
            .get_function(func)
            .as_global_value()
            .as_pointer_value();
        self.arena.push_value(ptr.into())
    }

    pub fn set_internal_linkage(&mut self, func: FunctionId) {
        self.arena.get_function(func).set_linkage(Linkage::Internal);
    }

    /// Attach a string attribute (`"key"="value"`) to a function.
    pub fn add_string_attribute(&mut self, func: FunctionId, key: &str, value: &str) {
        let attr = self.scx.llcx.create_string_attribute(key, value);
        self.arena
            .get_function(func)
            .add_attribute(AttributeLoc::Function, attr);
    }

    /// True if the function carries the string attribute `key`.
    pub fn has_string_attribute(&self, func: FunctionId, key: &str) -> bool {
        self.arena
            .get_function(func)
            .get_string_attribute(AttributeLoc::Function, key)
            .is_some()
    }

    /// Attach an enum attribute such as `cold` or `noreturn`.
    pub fn add_enum_attribute(&mut self, func: FunctionId, name: &str) {
        let kind = Attribute::get_named_enum_kind_id(name);
        let attr = self.scx.llcx.create_enum_attribute(kind, 0);
        self.arena
            .get_function(func)
            .add_attribute(AttributeLoc::Function, attr);
    }

    // -----------------------------------------------------------------------
    // Globals
    // -----------------------------------------------------------------------

    /// Create a private null-terminated string global and return its address.
    pub fn global_string_ptr(&mut self, value: &str, name: &str) -> ValueId {
        let v = self
            .builder
            .build_global_string_ptr(value, name)
            .expect("global_string_ptr")
            .as_pointer_value();
        self.arena.push_value(v.into())
    }

    /// Create an internal constant `[N x ptr]` global of function
    /// addresses, with null for absent entries.
    pub fn const_pointer_table(&mut self, name: &str, entries: &[Option<FunctionId>]) -> ValueId {
        let ptr_ty = self.scx.type_ptr();
        let ptrs: Vec<PointerValue<'ctx>> = entries
            .iter()
            .map(|entry| match entry {
                Some(func) => self
                    .arena
                    .get_function(*func)
                    .as_global_value()
                    .as_pointer_value(),
                None => ptr_ty.const_null(),
            })
            .collect();
        let init = ptr_ty.const_array(&ptrs);
        let global = self
            .scx
            .llmod
            .add_global(ptr_ty.array_type(entries.len() as u32), None, name);
        global.set_initializer(&init);
        global.set_constant(true);
        global.set_linkage(Linkage::Internal);
        self.arena.push_value(global.as_pointer_value().into())
    }

    /// Add an external global alias `name` for `aliasee`.
    pub fn add_alias(&mut self, name: &str, aliasee: FunctionId) {
        let func = self.arena.get_function(aliasee);
        let Ok(c_name) = CString::new(name) else {
            tracing::error!(name, "alias name contains a NUL byte");
            self.record_codegen_error();
            return;
        };
        // SAFETY: module, function type and aliasee all belong to the same
        // live context; the name is a valid C string.
        unsafe {
            llvm_sys::core::LLVMAddAlias2(
                self.scx.llmod.as_mut_ptr(),
                func.get_type().as_type_ref(),
                0,
                func.as_value_ref(),
                c_name.as_ptr(),
            );
        }
    }

    // -----------------------------------------------------------------------
    // Value names
    // -----------------------------------------------------------------------

    /// Set the display name of a value. Constants ignore names.
    pub fn set_value_name(&self, val: ValueId, name: &str) {
        self.arena.get_value(val).set_name(name);
    }

    /// Current display name of a value, empty if unnamed.
    pub fn value_name(&self, val: ValueId) -> String {
        let raw = self.arena.get_value(val);
        let mut len = 0usize;
        // SAFETY: the value is alive for `'ctx`; LLVM returns a pointer to
        // `len` bytes owned by the value.
        unsafe {
            let ptr = llvm_sys::core::LLVMGetValueName2(raw.as_value_ref(), &mut len);
            if ptr.is_null() || len == 0 {
                return String::new();
            }
            let bytes = std::slice::from_raw_parts(ptr.cast::<u8>(), len);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    // -----------------------------------------------------------------------
    // Raw access
    // -----------------------------------------------------------------------

    pub fn raw_value(&self, id: ValueId) -> BasicValueEnum<'ctx> {
        self.arena.get_value(id)
    }

    pub fn raw_block(&self, id: BlockId) -> BasicBlock<'ctx> {
        self.arena.get_block(id)
    }

    pub fn function_value(&self, id: FunctionId) -> FunctionValue<'ctx> {
        self.arena.get_function(id)
    }

    pub fn intern_function(&mut self, func: FunctionValue<'ctx>) -> FunctionId {
        self.arena.push_function(func)
    }
}

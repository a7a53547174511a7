//! Minimal LLVM context for QIR generation.
//!
//! `SimpleCx` owns one LLVM module and the handful of types every part of
//! the generator needs. The primary program module and the interop bridge
//! module each get their own `SimpleCx` over the same `Context`.
//!
//! With LLVM 17 opaque pointers, every runtime handle (`%Array*`,
//! `%Qubit*`, ...) is the single `ptr` type. The only named structs are
//! the tuple header and the range triple.

use inkwell::context::Context;
use inkwell::module::Module;
use inkwell::types::{BasicMetadataTypeEnum, BasicTypeEnum, FunctionType, IntType, PointerType, StructType};
use inkwell::AddressSpace;

/// Name of the tuple header struct, `{ i32 }`.
pub const TUPLE_HEADER: &str = "TupleHeader";

/// Name of the range struct, `{ i64, i64, i64 }` (start, step, end).
pub const RANGE: &str = "Range";

pub struct SimpleCx<'ll> {
    /// The LLVM context (owns all LLVM types and values).
    pub llcx: &'ll Context,
    /// The LLVM module being generated.
    pub llmod: Module<'ll>,
    /// Opaque pointer type shared by all runtime handles.
    pub ptr_type: PointerType<'ll>,
    /// Machine word size type (i64 on 64-bit).
    pub isize_ty: IntType<'ll>,
    /// `%TupleHeader = type { i32 }`.
    pub tuple_header: StructType<'ll>,
    /// `%Range = type { i64, i64, i64 }`.
    pub range: StructType<'ll>,
}

impl<'ll> SimpleCx<'ll> {
    #[must_use]
    pub fn new(context: &'ll Context, module_name: &str) -> Self {
        let llmod = context.create_module(module_name);
        let ptr_type = context.ptr_type(AddressSpace::default());
        let isize_ty = context.i64_type();

        // Named structs are per-context; a second module reuses them.
        let tuple_header = context.get_struct_type(TUPLE_HEADER).unwrap_or_else(|| {
            let ty = context.opaque_struct_type(TUPLE_HEADER);
            ty.set_body(&[context.i32_type().into()], false);
            ty
        });
        let range = context.get_struct_type(RANGE).unwrap_or_else(|| {
            let i64_ty = context.i64_type();
            let ty = context.opaque_struct_type(RANGE);
            ty.set_body(&[i64_ty.into(), i64_ty.into(), i64_ty.into()], false);
            ty
        });

        Self {
            llcx: context,
            llmod,
            ptr_type,
            isize_ty,
            tuple_header,
            range,
        }
    }

    /// Get the i1 (boolean) type.
    #[inline]
    pub fn type_i1(&self) -> IntType<'ll> {
        self.llcx.bool_type()
    }

    /// Get the i8 type.
    #[inline]
    pub fn type_i8(&self) -> IntType<'ll> {
        self.llcx.i8_type()
    }

    /// Get the i32 type.
    #[inline]
    pub fn type_i32(&self) -> IntType<'ll> {
        self.llcx.i32_type()
    }

    /// Get the i64 type.
    #[inline]
    pub fn type_i64(&self) -> IntType<'ll> {
        self.llcx.i64_type()
    }

    /// Get an integer type of arbitrary width.
    #[inline]
    pub fn type_int(&self, bits: u32) -> IntType<'ll> {
        self.llcx.custom_width_int_type(bits)
    }

    /// Get the f64 type.
    #[inline]
    pub fn type_f64(&self) -> inkwell::types::FloatType<'ll> {
        self.llcx.f64_type()
    }

    /// Get the pointer type.
    #[inline]
    pub fn type_ptr(&self) -> PointerType<'ll> {
        self.ptr_type
    }

    /// Create a literal struct type from fields.
    pub fn type_struct(&self, fields: &[BasicTypeEnum<'ll>], packed: bool) -> StructType<'ll> {
        self.llcx.struct_type(fields, packed)
    }

    /// Create a function type returning void.
    pub fn type_void_func(&self, params: &[BasicMetadataTypeEnum<'ll>]) -> FunctionType<'ll> {
        self.llcx.void_type().fn_type(params, false)
    }
}

//! Native interop: entry points callable from native hosts, and the bridge
//! module linking runtime calls to a natively compiled runtime.
//!
//! # Entry points
//!
//! An entry-point callable is exposed as `<ns_with_underscores>_<name>`.
//! With interop enabled, each array parameter becomes a
//! `(i64 length, ptr data)` pair: the entry point builds a runtime array,
//! copies `data` into it when `length > 0`, calls the body and releases
//! the array. Without arrays, or with interop disabled, the entry point is
//! an alias of the body.
//!
//! # Bridge
//!
//! For every library function the primary module declared, the bridge
//! defines a function of the same name and runtime signature that converts
//! handles to the configured native types, calls the native symbol (the
//! name without its leading underscores) and converts the result back.

use qirgen_ir::{Callable, ResolvedType, SpecializationKind, ENTRY_POINT_ATTRIBUTE};

use crate::context::SimpleCx;
use crate::error::{GenerationError, Result};
use crate::mangle::{entry_point_name, native_name};

use super::function_library::FunctionSignature;
use super::generation_context::GenerationContext;
use super::ir_builder::IrBuilder;
use super::low_type::{HandleKind, LowType};
use super::value_id::{FunctionId, ValueId};

/// Module name of the bridge.
pub const BRIDGE_MODULE_NAME: &str = "bridge";

/// Textual bridge module and its verification result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BridgeOutput {
    pub ir: String,
    pub verification: std::result::Result<(), String>,
}

/// Parse a native type name from the interop type map.
///
/// LLVM primitive names map to that primitive; anything else names a
/// native struct passed by pointer.
pub fn parse_native_type(name: &str) -> LowType {
    match name {
        "i8" => LowType::I8,
        "i16" => LowType::Int { bits: 16 },
        "i32" => LowType::I32,
        "i64" => LowType::I64,
        "double" => LowType::Double,
        _ => LowType::Pointer(Box::new(LowType::Struct(Vec::new()))),
    }
}

fn is_pointer(ty: &LowType) -> bool {
    matches!(ty, LowType::Handle(_) | LowType::Pointer(_) | LowType::FunctionPointer)
}

fn bit_width(ty: &LowType) -> Option<u32> {
    match ty {
        LowType::Int { bits } => Some(*bits),
        LowType::Double => Some(64),
        _ => None,
    }
}

/// Convert `value` from `from` to `to` for the bridge.
fn convert(builder: &mut IrBuilder<'_, '_>, value: ValueId, from: &LowType, to: &LowType) -> Result<ValueId> {
    if from == to || (is_pointer(from) && is_pointer(to)) {
        return Ok(value);
    }
    if is_pointer(from) && *to == LowType::I64 {
        return Ok(builder.ptr_to_int(value, to, "native"));
    }
    if *from == LowType::I64 && is_pointer(to) {
        return Ok(builder.int_to_ptr(value, "native"));
    }
    match (bit_width(from), bit_width(to)) {
        (Some(a), Some(b)) if a == b => Ok(builder.bitcast(value, to, "native")),
        _ => Err(GenerationError::Unsupported {
            what: format!("interop conversion from {from} to {to}"),
        }),
    }
}

impl GenerationContext<'_, '_> {
    /// Configured native counterpart of a runtime handle type.
    pub fn native_type(&self, ty: &LowType) -> Option<LowType> {
        let runtime = match ty {
            LowType::Handle(kind) => kind.name(),
            _ if ty.is_heap_handle() => HandleKind::Tuple.name(),
            _ => return None,
        };
        self.config.native_type(runtime).map(parse_native_type)
    }

    /// Expose an entry-point callable under its native name.
    ///
    /// Returns the function carrying the `EntryPoint` attribute: the
    /// generated wrapper, or the body when the entry point is an alias.
    pub fn generate_entry_point(&mut self, callable: &Callable) -> Result<FunctionId> {
        let body = self.register_function(callable, SpecializationKind::Body)?;
        let entry_name = entry_point_name(&callable.name);
        let arg_types: Vec<ResolvedType> = callable
            .arguments
            .top_level()
            .into_iter()
            .map(|arg| arg.resolved_type())
            .collect();
        let result_ty = &callable.signature.result;
        let interop = self.config.emit_interop;

        if interop {
            if let Some(tuple) = arg_types.iter().find(|ty| matches!(ty, ResolvedType::Tuple(_))) {
                return Err(GenerationError::Unsupported {
                    what: format!("tuple parameter {tuple} of entry point {}", callable.name),
                });
            }
            if matches!(result_ty, ResolvedType::Tuple(items) if !items.is_empty()) {
                return Err(GenerationError::Unsupported {
                    what: format!("tuple result {result_ty} of entry point {}", callable.name),
                });
            }
        }

        let needs_wrapper = interop && arg_types.iter().any(|ty| matches!(ty, ResolvedType::Array(_)));
        if !needs_wrapper {
            self.builder.add_string_attribute(body, ENTRY_POINT_ATTRIBUTE, "");
            self.builder.add_alias(&entry_name, body);
            tracing::debug!(entry_point = %entry_name, "aliased entry point");
            return Ok(body);
        }

        let mut params = Vec::with_capacity(arg_types.len() + 1);
        for ty in &arg_types {
            if matches!(ty, ResolvedType::Array(_)) {
                params.push(LowType::I64);
                params.push(LowType::Pointer(Box::new(LowType::I8)));
            } else {
                params.push(self.types.lower_value(ty)?);
            }
        }
        let ret = self.lower_type(result_ty)?;
        let wrapper = self.builder.declare_function(&entry_name, &params, &ret);
        if self.builder.is_defined(wrapper) {
            return Ok(wrapper);
        }

        let cursor = self.save_cursor();
        self.builder.set_current_function(wrapper);
        let entry = self.builder.append_block(wrapper, "entry");
        self.builder.position_at_end(entry);

        let mut args = Vec::with_capacity(arg_types.len());
        let mut arrays = Vec::new();
        let mut index = 0;
        for ty in &arg_types {
            if let ResolvedType::Array(elem) = ty {
                let len = self.builder.get_param(wrapper, index);
                let data = self.builder.get_param(wrapper, index + 1);
                self.builder.set_value_name(len, "len");
                self.builder.set_value_name(data, "data");
                index += 2;
                let array = self.copy_native_array(elem, len, data)?;
                args.push(array);
                arrays.push(array);
            } else {
                args.push(self.builder.get_param(wrapper, index));
                index += 1;
            }
        }

        let result = self.builder.call(body, &args, "result");
        for array in arrays {
            self.call_runtime("array_unreference", &[array])?;
        }
        match result {
            Some(value) => self.builder.ret(value),
            None => self.builder.ret_void(),
        }
        self.builder.add_string_attribute(wrapper, ENTRY_POINT_ATTRIBUTE, "");

        self.restore_cursor(cursor);
        tracing::debug!(entry_point = %entry_name, params = params.len(), "generated entry point wrapper");
        Ok(wrapper)
    }

    /// Build a runtime array of `len` elements copied from native `data`.
    /// Leaves the cursor in the join block.
    fn copy_native_array(&mut self, elem: &ResolvedType, len: ValueId, data: ValueId) -> Result<ValueId> {
        let (func, _) = self.require_cursor("native array copy")?;
        let elem_ty = self.types.lower_value(elem)?;
        let elem_size = self.builder.size_of(&elem_ty);
        let elem_size32 = self.builder.trunc(elem_size, &LowType::I32, "elem.size");
        let array = match self.call_runtime("array_create_1d", &[elem_size32, len])? {
            Some(array) => array,
            None => self.builder.const_null_ptr(),
        };

        let zero = self.builder.const_i64(0);
        let has_items = self.builder.icmp_sgt(len, zero, "has.items");
        let copy = self.builder.append_block(func, "copy");
        let skip = self.builder.append_block(func, "skip");
        self.builder.cond_br(has_items, copy, skip);

        self.builder.position_at_end(copy);
        let dest = match self.call_runtime("array_get_element_ptr_1d", &[array, zero])? {
            Some(dest) => dest,
            None => self.builder.const_null_ptr(),
        };
        let bytes = self.builder.mul(len, elem_size, "bytes");
        self.builder.memcpy(dest, data, bytes);
        self.builder.br(skip);

        self.builder.position_at_end(skip);
        Ok(array)
    }

    /// Build the bridge module for every library function declared so far.
    pub fn emit_interop_bridge(&self) -> Result<BridgeOutput> {
        let scx = SimpleCx::new(self.scx().llcx, BRIDGE_MODULE_NAME);
        let mut bridge = IrBuilder::new(&scx);
        let functions: Vec<(String, FunctionSignature)> = self
            .runtime
            .declared()
            .into_iter()
            .chain(self.quantum.declared())
            .map(|(name, sig)| (name, sig.clone()))
            .collect();
        for (name, sig) in &functions {
            self.emit_bridge_function(&mut bridge, name, sig)?;
        }
        drop(bridge);

        let verification = scx.llmod.verify().map_err(|msg| msg.to_string());
        tracing::debug!(functions = functions.len(), ok = verification.is_ok(), "built interop bridge");
        Ok(BridgeOutput {
            ir: scx.llmod.print_to_string().to_string(),
            verification,
        })
    }

    fn emit_bridge_function(&self, bridge: &mut IrBuilder<'_, '_>, name: &str, sig: &FunctionSignature) -> Result<()> {
        let native_params: Vec<LowType> = sig
            .params
            .iter()
            .map(|param| self.native_type(param).unwrap_or_else(|| param.clone()))
            .collect();
        let native_ret = self.native_type(&sig.ret).unwrap_or_else(|| sig.ret.clone());
        let native = bridge.declare_function(native_name(name), &native_params, &native_ret);
        let shim = bridge.declare_function(name, &sig.params, &sig.ret);

        bridge.set_current_function(shim);
        let entry = bridge.append_block(shim, "entry");
        bridge.position_at_end(entry);

        let mut args = Vec::with_capacity(sig.params.len());
        for (i, (from, to)) in sig.params.iter().zip(&native_params).enumerate() {
            let param = bridge.get_param(shim, i as u32);
            args.push(convert(bridge, param, from, to)?);
        }
        match bridge.call(native, &args, "native") {
            Some(value) => {
                let back = convert(bridge, value, &native_ret, &sig.ret)?;
                bridge.ret(back);
            }
            None => bridge.ret_void(),
        }
        tracing::trace!(function = name, "bridged library function");
        Ok(())
    }
}

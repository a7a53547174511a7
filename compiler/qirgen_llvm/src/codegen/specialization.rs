//! Specialization emission: declarations, headers, body bracketing, and
//! default constructors of user-defined types.
//!
//! A specialization goes through `start_specialization`, `generate_header`,
//! the visitor's body lowering, then `end_specialization`. Declarations are
//! idempotent, so a callee can be declared before or after its body is
//! generated.

use qirgen_ir::{ArgTuple, Callable, ResolvedType, SpecializationKind, UserDefinedType};

use crate::error::{GenerationError, Result};
use crate::mangle::specialization_name;

use super::generation_context::GenerationContext;
use super::ir_builder::Position;
use super::low_type::{LowType, TypedValue};
use super::value_id::FunctionId;

impl GenerationContext<'_, '_> {
    /// Lowered parameter types of an argument shape: one per top-level item.
    pub fn parameter_types(&self, shape: &ArgTuple) -> Result<Vec<LowType>> {
        shape
            .top_level()
            .into_iter()
            .map(|arg| self.types.lower_value(&arg.resolved_type()))
            .collect()
    }

    /// Declare the function of one specialization without a body.
    pub fn register_function(&mut self, callable: &Callable, kind: SpecializationKind) -> Result<FunctionId> {
        if callable.specialization(kind).is_none() {
            return Err(GenerationError::MissingSpecialization {
                name: callable.name.clone(),
                kind,
            });
        }
        let name = specialization_name(&callable.name, kind);
        let params = self.parameter_types(&callable.specialization_arguments(kind))?;
        let ret = self.lower_type(&callable.signature.result)?;
        let func = self.builder.declare_function(&name, &params, &ret);
        tracing::debug!(function = %name, params = params.len(), "registered specialization");
        Ok(func)
    }

    /// Reset per-specialization state before a new body.
    pub fn start_specialization(&mut self) {
        self.scopes.reset();
    }

    /// Declare a specialization, open its `entry` block and bind every
    /// argument name in a fresh top scope.
    ///
    /// Unnamed arguments get an `arg__n` name. Items of nested argument
    /// tuples are loaded from the tuple and bound by their own names.
    pub fn generate_header(&mut self, callable: &Callable, kind: SpecializationKind) -> Result<FunctionId> {
        let func = self.register_function(callable, kind)?;
        self.builder.set_current_function(func);
        let entry = self.builder.append_block(func, "entry");
        self.builder.position_at_end(entry);
        self.open_scope();

        let shape = callable.specialization_arguments(kind);
        for (i, arg) in shape.top_level().into_iter().enumerate() {
            let ty = self.types.lower_value(&arg.resolved_type())?;
            let param = self.builder.get_param(func, i as u32);
            self.bind_argument(arg, TypedValue::new(param, ty))?;
        }
        Ok(func)
    }

    fn bind_argument(&mut self, shape: &ArgTuple, value: TypedValue) -> Result<()> {
        match shape {
            ArgTuple::Item(item) => {
                let name = match &item.name {
                    Some(name) => name.clone(),
                    None => {
                        let name = self.unique_name("arg");
                        self.builder.set_value_name(value.value, &name);
                        name
                    }
                };
                self.register(&name, value, false);
                Ok(())
            }
            ArgTuple::Tuple(items) => match items.as_slice() {
                [] => Ok(()),
                [single] => self.bind_argument(single, value),
                _ => {
                    let structure = value.ty.heap_structure().cloned().ok_or_else(|| {
                        GenerationError::Unrepresentable {
                            reason: format!("argument tuple lowered to {}", value.ty),
                        }
                    })?;
                    for (i, item) in items.iter().enumerate() {
                        let index = i as u32 + 1;
                        let field_ty = structure.fields().get(index as usize).cloned().ok_or_else(|| {
                            GenerationError::Unrepresentable {
                                reason: format!("argument tuple {structure} has no field {index}"),
                            }
                        })?;
                        let ptr = self.builder.struct_gep(&structure, value.value, index, "");
                        let loaded = self.builder.load(&field_ty, ptr, "");
                        self.bind_argument(item, TypedValue::new(loaded, field_ty))?;
                    }
                    Ok(())
                }
            },
        }
    }

    /// Finish the current specialization.
    ///
    /// Closes every open scope, emitting pending releases. Then a trailing
    /// empty block nobody branches to is deleted (never the entry block),
    /// and an unterminated block gets `ret void`, or `unreachable` in a
    /// non-void function.
    pub fn end_specialization(&mut self) -> Result<()> {
        let func = self
            .builder
            .current_function()
            .ok_or(GenerationError::MissingCursor {
                operation: "end of specialization",
            })?;
        while self.scopes.depth() > 0 {
            self.close_scope()?;
        }

        if let Some(block) = self.builder.current_block() {
            if !self.builder.block_has_terminator(block) {
                let removable = self.builder.block_is_empty(block)
                    && !self.builder.is_entry_block(block)
                    && !self.builder.is_branch_target(block);
                if removable {
                    tracing::trace!(function = %self.builder.function_name(func), "dropped trailing block");
                    self.builder.remove_block(block);
                } else if self.builder.returns_void(func) {
                    self.builder.ret_void();
                } else {
                    self.builder.unreachable();
                }
            }
        }

        self.builder.restore_position(Position {
            function: None,
            block: None,
        });
        self.scopes.reset();
        Ok(())
    }

    /// Emit the default constructor `<ns>__<Name>__body` of a user-defined
    /// type. Idempotent.
    ///
    /// The constructor allocates one tuple, stores argument `i` into field
    /// `i + 1` and adds one reference per stored heap handle. A type
    /// wrapping `Unit` constructs a null handle.
    pub fn generate_constructor(&mut self, udt: &UserDefinedType) -> Result<FunctionId> {
        let name = specialization_name(&udt.name, SpecializationKind::Body);
        let params = udt
            .fields()
            .iter()
            .map(|field| self.types.lower_value(field))
            .collect::<Result<Vec<_>>>()?;
        let ret = self.lower_type(&ResolvedType::UserDefinedType(udt.name.clone()))?;
        let func = self.builder.declare_function(&name, &params, &ret);
        if self.builder.is_defined(func) {
            return Ok(func);
        }

        let cursor = self.save_cursor();
        self.builder.set_current_function(func);
        let entry = self.builder.append_block(func, "entry");
        self.builder.position_at_end(entry);

        let result = if ret.is_heap_handle() {
            let mut items = Vec::with_capacity(params.len());
            for (i, ty) in params.iter().enumerate() {
                let param = self.builder.get_param(func, i as u32);
                self.builder.set_value_name(param, &format!("item{}", i + 1));
                items.push(TypedValue::new(param, ty.clone()));
            }
            let tuple = self.allocate_tuple(&ret)?;
            self.fill_tuple(&ret, tuple, &items)?;
            tuple
        } else {
            self.builder.const_null_ptr()
        };
        self.builder.ret(result);

        self.restore_cursor(cursor);
        tracing::debug!(constructor = %name, fields = params.len(), "generated constructor");
        Ok(func)
    }
}

#[cfg(test)]
mod tests;

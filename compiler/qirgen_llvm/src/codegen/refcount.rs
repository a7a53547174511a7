//! Reference counting and heap-value helpers.
//!
//! Counts only change at run time through emitted runtime calls. Which
//! function applies is decided by the closed table in
//! [`HandleKind::ref_count_stem`]; every header-prefixed tuple pointer is a
//! `tuple`. Qubits and by-value types are never counted.

use crate::error::Result;

use super::generation_context::GenerationContext;
use super::low_type::{HandleKind, LowType, TypedValue};
use super::value_id::ValueId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CountChange {
    Add,
    Remove,
}

impl CountChange {
    fn suffix(self) -> &'static str {
        match self {
            CountChange::Add => "reference",
            CountChange::Remove => "unreference",
        }
    }
}

impl GenerationContext<'_, '_> {
    /// Add one reference to `value` if its type is counted.
    pub fn add_reference_if_heap_handle(&mut self, value: &TypedValue) -> Result<()> {
        self.change_count(value, CountChange::Add)
    }

    /// Drop one reference of `value` if its type is counted.
    pub fn remove_reference_if_heap_handle(&mut self, value: &TypedValue) -> Result<()> {
        self.change_count(value, CountChange::Remove)
    }

    fn change_count(&mut self, value: &TypedValue, change: CountChange) -> Result<()> {
        let Some(stem) = value.ty.ref_count_kind().and_then(HandleKind::ref_count_stem) else {
            return Ok(());
        };
        let name = format!("{stem}_{}", change.suffix());
        self.call_runtime(&name, &[value.value])?;
        Ok(())
    }

    /// Allocate a heap tuple holding `items` in fields `1..`.
    ///
    /// Every stored heap handle gains one reference. No items gives a null
    /// tuple handle.
    pub fn create_tuple(&mut self, items: &[TypedValue]) -> Result<TypedValue> {
        self.require_cursor("tuple creation")?;
        if items.is_empty() {
            let null = self.builder.const_null_ptr();
            return Ok(TypedValue::new(null, LowType::Handle(HandleKind::Tuple)));
        }
        let ty = LowType::tuple(items.iter().map(|item| item.ty.clone()).collect());
        let tuple = self.allocate_tuple(&ty)?;
        self.fill_tuple(&ty, tuple, items)?;
        Ok(TypedValue::new(tuple, ty))
    }

    /// `tuple_create` sized for the pointee of a heap tuple type.
    pub(crate) fn allocate_tuple(&mut self, ty: &LowType) -> Result<ValueId> {
        let structure = ty.heap_structure().cloned().unwrap_or_else(|| ty.clone());
        let size = self.builder.size_of(&structure);
        let tuple = self.call_runtime("tuple_create", &[size])?;
        Ok(tuple.unwrap_or_else(|| self.builder.const_null_ptr()))
    }

    /// Store `items` into fields `1..` of `tuple`, referencing heap handles.
    pub(crate) fn fill_tuple(&mut self, ty: &LowType, tuple: ValueId, items: &[TypedValue]) -> Result<()> {
        let structure = ty.heap_structure().cloned().unwrap_or_else(|| ty.clone());
        for (i, item) in items.iter().enumerate() {
            let field = self
                .builder
                .struct_gep(&structure, tuple, i as u32 + 1, &format!("item{}.ptr", i + 1));
            self.builder.store(item.value, field);
            self.add_reference_if_heap_handle(item)?;
        }
        Ok(())
    }

    /// Create a runtime string from a literal.
    pub fn create_string(&mut self, literal: &str) -> Result<TypedValue> {
        self.require_cursor("string creation")?;
        let name = self.unique_name("str");
        let data = self.builder.global_string_ptr(literal, &name);
        let string = self.call_runtime("string_create", &[data])?;
        let value = string.unwrap_or_else(|| self.builder.const_null_ptr());
        Ok(TypedValue::new(value, LowType::Handle(HandleKind::String)))
    }

    /// Emit a runtime failure with `message`. Ends the current block.
    pub fn emit_fail(&mut self, message: &str) -> Result<()> {
        let text = self.create_string(message)?;
        self.call_runtime("fail", &[text.value])?;
        self.builder.unreachable();
        Ok(())
    }
}

//! Opaque ID newtypes and `ValueArena` for the `IrBuilder`.
//!
//! These IDs decouple callers from inkwell's `'ctx` lifetime. All LLVM
//! values, blocks, and functions are stored in a `ValueArena` and
//! referenced by `Copy` ID handles. Types need no arena: callers describe
//! them with [`LowType`](super::low_type::LowType), which is lifetime-free.

use inkwell::basic_block::BasicBlock;
use inkwell::values::{BasicValueEnum, FunctionValue};

/// Opaque handle to an LLVM value stored in a `ValueArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueId(u32);

/// Opaque handle to an LLVM basic block stored in a `ValueArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(u32);

/// Opaque handle to an LLVM function stored in a `ValueArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(u32);

impl ValueId {
    /// Sentinel for "no value".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl BlockId {
    /// Sentinel for "no block".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

impl FunctionId {
    /// Sentinel for "no function".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

/// Stores LLVM values behind opaque IDs, hiding the `'ctx` lifetime.
///
/// Internal to `IrBuilder`. Each `push_*` allocates a slot and returns an
/// ID; each `get_*` retrieves the stored value by ID.
pub(crate) struct ValueArena<'ctx> {
    values: Vec<BasicValueEnum<'ctx>>,
    blocks: Vec<BasicBlock<'ctx>>,
    functions: Vec<FunctionValue<'ctx>>,
}

impl<'ctx> ValueArena<'ctx> {
    pub(crate) fn new() -> Self {
        Self {
            values: Vec::new(),
            blocks: Vec::new(),
            functions: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn push_value(&mut self, val: BasicValueEnum<'ctx>) -> ValueId {
        let id = self.values.len();
        self.values.push(val);
        ValueId(id as u32)
    }

    #[inline]
    pub(crate) fn get_value(&self, id: ValueId) -> BasicValueEnum<'ctx> {
        debug_assert!(!id.is_none(), "ValueId::NONE dereferenced");
        self.values[id.0 as usize]
    }

    #[inline]
    pub(crate) fn push_block(&mut self, bb: BasicBlock<'ctx>) -> BlockId {
        let id = self.blocks.len();
        self.blocks.push(bb);
        BlockId(id as u32)
    }

    #[inline]
    pub(crate) fn get_block(&self, id: BlockId) -> BasicBlock<'ctx> {
        debug_assert!(!id.is_none(), "BlockId::NONE dereferenced");
        self.blocks[id.0 as usize]
    }

    /// Store a function, reusing the existing ID if it was stored before.
    pub(crate) fn push_function(&mut self, func: FunctionValue<'ctx>) -> FunctionId {
        if let Some(idx) = self.functions.iter().position(|&f| f == func) {
            return FunctionId(idx as u32);
        }
        let id = self.functions.len();
        self.functions.push(func);
        FunctionId(id as u32)
    }

    #[inline]
    pub(crate) fn get_function(&self, id: FunctionId) -> FunctionValue<'ctx> {
        debug_assert!(!id.is_none(), "FunctionId::NONE dereferenced");
        self.functions[id.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_none() {
        assert!(ValueId::NONE.is_none());
        assert!(BlockId::NONE.is_none());
        assert!(FunctionId::NONE.is_none());
    }
}

//! Type lowering: `ResolvedType` → `LowType` → LLVM type.
//!
//! `LowType` is the structural IR-level type. LLVM 17 only has opaque
//! pointers, so LLVM types alone can no longer say "pointer to a tuple
//! with a header"; `LowType` keeps that shape for reference counting,
//! sizing and wrapper decomposition.
//!
//! # Mapping
//!
//! | Resolved | Lowered |
//! |----------|---------|
//! | `Unit` | `void` (a null tuple handle where a value is needed) |
//! | `Bool` / `Pauli` / `Int` | `i1` / `i2` / `i64` |
//! | `Double` | `double` |
//! | `Range` | `%Range = { i64, i64, i64 }` by value |
//! | `String`, `BigInt`, `Result`, `Qubit`, `Array`, `Callable` | opaque handle |
//! | `Tuple(ts)` | `{ %TupleHeader, ts.. }*` |
//! | UDT | `{ %TupleHeader, fields.. }*`, generic tuple handle if it wraps `Unit` |
//! | type parameter | generic tuple handle |

use std::cell::RefCell;
use std::fmt;

use inkwell::types::BasicTypeEnum;
use qirgen_ir::{Program, ResolvedType};
use rustc_hash::FxHashMap;

use crate::context::SimpleCx;
use crate::error::{GenerationError, Result};

use super::value_id::ValueId;

/// Pointer width of the generation target.
pub const POINTER_SIZE: u64 = 8;

/// Nesting limit for type lowering; deeper means a cyclic type definition.
const MAX_DEPTH: u32 = 64;

/// Runtime-owned opaque handle kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HandleKind {
    Result,
    Qubit,
    String,
    BigInt,
    Array,
    Callable,
    /// A tuple whose layout is not statically known.
    Tuple,
}

impl HandleKind {
    /// Runtime type name, as used in the interop type map.
    pub fn name(self) -> &'static str {
        match self {
            HandleKind::Result => "Result",
            HandleKind::Qubit => "Qubit",
            HandleKind::String => "String",
            HandleKind::BigInt => "BigInt",
            HandleKind::Array => "Array",
            HandleKind::Callable => "Callable",
            HandleKind::Tuple => "Tuple",
        }
    }

    /// Runtime name stem of the reference-count functions
    /// (`<stem>_reference` / `<stem>_unreference`). Qubits are released
    /// explicitly and are not reference counted.
    pub fn ref_count_stem(self) -> Option<&'static str> {
        match self {
            HandleKind::Result => Some("result"),
            HandleKind::String => Some("string"),
            HandleKind::BigInt => Some("bigint"),
            HandleKind::Array => Some("array"),
            HandleKind::Callable => Some("callable"),
            HandleKind::Tuple => Some("tuple"),
            HandleKind::Qubit => None,
        }
    }
}

/// IR-level type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum LowType {
    Void,
    Int { bits: u32 },
    Double,
    Handle(HandleKind),
    Range,
    /// `%TupleHeader = { i32 }`, first field of every heap tuple.
    Header,
    Struct(Vec<LowType>),
    Pointer(Box<LowType>),
    FunctionPointer,
}

impl LowType {
    pub const BOOL: LowType = LowType::Int { bits: 1 };
    pub const PAULI: LowType = LowType::Int { bits: 2 };
    pub const I8: LowType = LowType::Int { bits: 8 };
    pub const I32: LowType = LowType::Int { bits: 32 };
    pub const I64: LowType = LowType::Int { bits: 64 };

    /// Heap tuple pointer `{ %TupleHeader, fields.. }*`.
    pub fn tuple(fields: Vec<LowType>) -> LowType {
        let mut all = Vec::with_capacity(fields.len() + 1);
        all.push(LowType::Header);
        all.extend(fields);
        LowType::Pointer(Box::new(LowType::Struct(all)))
    }

    /// The single structural heap-handle predicate: a pointer to a struct
    /// whose first field is the tuple header.
    pub fn is_heap_handle(&self) -> bool {
        match self {
            LowType::Pointer(pointee) => {
                matches!(&**pointee, LowType::Struct(fields) if fields.first() == Some(&LowType::Header))
            }
            _ => false,
        }
    }

    /// Pointee structure of a heap handle.
    pub fn heap_structure(&self) -> Option<&LowType> {
        match self {
            LowType::Pointer(pointee) if self.is_heap_handle() => Some(pointee),
            _ => None,
        }
    }

    /// Fields of a struct type.
    pub fn fields(&self) -> &[LowType] {
        match self {
            LowType::Struct(fields) => fields,
            _ => &[],
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, LowType::Void)
    }

    /// Value form: `Void` becomes the generic tuple handle (passed as null).
    pub fn or_unit_handle(self) -> LowType {
        if self.is_void() {
            LowType::Handle(HandleKind::Tuple)
        } else {
            self
        }
    }

    /// Runtime handle kind whose reference-count functions apply.
    pub fn ref_count_kind(&self) -> Option<HandleKind> {
        match self {
            LowType::Handle(kind) if kind.ref_count_stem().is_some() => Some(*kind),
            _ if self.is_heap_handle() => Some(HandleKind::Tuple),
            _ => None,
        }
    }

    /// Size in bytes when it does not depend on target struct layout.
    ///
    /// Integers take `ceil(bits / 8)`, doubles and pointers 8. Aggregates
    /// return `None`.
    pub fn fixed_size(&self) -> Option<u64> {
        match self {
            LowType::Void => Some(0),
            LowType::Int { bits } => Some(u64::from(bits.div_ceil(8))),
            LowType::Double => Some(8),
            LowType::Handle(_) | LowType::Pointer(_) | LowType::FunctionPointer => Some(POINTER_SIZE),
            LowType::Range | LowType::Header | LowType::Struct(_) => None,
        }
    }
}

impl fmt::Display for LowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowType::Void => f.write_str("void"),
            LowType::Int { bits } => write!(f, "i{bits}"),
            LowType::Double => f.write_str("double"),
            LowType::Handle(kind) => write!(f, "%{}*", kind.name()),
            LowType::Range => f.write_str("%Range"),
            LowType::Header => f.write_str("%TupleHeader"),
            LowType::Struct(fields) => {
                f.write_str("{ ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{field}")?;
                }
                f.write_str(" }")
            }
            LowType::Pointer(pointee) => write!(f, "{pointee}*"),
            LowType::FunctionPointer => f.write_str("fn*"),
        }
    }
}

/// A generated value together with its lowered type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedValue {
    pub value: ValueId,
    pub ty: LowType,
}

impl TypedValue {
    pub fn new(value: ValueId, ty: LowType) -> Self {
        Self { value, ty }
    }
}

/// Resolve a `LowType` to its LLVM type. `Void` has none.
pub(crate) fn llvm_type<'ll>(scx: &SimpleCx<'ll>, ty: &LowType) -> Option<BasicTypeEnum<'ll>> {
    let llty = match ty {
        LowType::Void => return None,
        LowType::Int { bits } => scx.type_int(*bits).into(),
        LowType::Double => scx.type_f64().into(),
        LowType::Handle(_) | LowType::Pointer(_) | LowType::FunctionPointer => scx.type_ptr().into(),
        LowType::Range => scx.range.into(),
        LowType::Header => scx.tuple_header.into(),
        LowType::Struct(fields) => {
            let field_tys: Vec<BasicTypeEnum<'ll>> = fields
                .iter()
                .map(|field| llvm_type(scx, field).unwrap_or_else(|| scx.type_ptr().into()))
                .collect();
            scx.type_struct(&field_tys, false).into()
        }
    };
    Some(llty)
}

/// Lowers resolved types, memoizing per distinct type.
pub struct TypeLowering<'a> {
    program: &'a Program,
    cache: RefCell<FxHashMap<ResolvedType, LowType>>,
}

impl<'a> TypeLowering<'a> {
    pub fn new(program: &'a Program) -> Self {
        Self {
            program,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Lower a resolved type to its IR-level representation.
    pub fn lower(&self, ty: &ResolvedType) -> Result<LowType> {
        self.lower_at(ty, 0)
    }

    /// Lower a type where a value is required (parameters, fields):
    /// `Unit` becomes the generic tuple handle.
    pub fn lower_value(&self, ty: &ResolvedType) -> Result<LowType> {
        Ok(self.lower(ty)?.or_unit_handle())
    }

    /// The struct-with-header form of a type: the pointee of a heap tuple,
    /// or `{ %TupleHeader, T }` wrapping any other type.
    pub fn lower_as_structure(&self, ty: &ResolvedType) -> Result<LowType> {
        let lowered = self.lower(ty)?;
        if let Some(structure) = lowered.heap_structure() {
            return Ok(structure.clone());
        }
        Ok(match lowered {
            LowType::Void => LowType::Struct(vec![LowType::Header]),
            other => LowType::Struct(vec![LowType::Header, other]),
        })
    }

    fn lower_at(&self, ty: &ResolvedType, depth: u32) -> Result<LowType> {
        if depth > MAX_DEPTH {
            return Err(GenerationError::Unrepresentable {
                reason: format!("type nesting exceeds {MAX_DEPTH} levels at {ty}"),
            });
        }
        if let Some(cached) = self.cache.borrow().get(ty) {
            return Ok(cached.clone());
        }

        let lowered = match ty {
            ResolvedType::Unit => LowType::Void,
            ResolvedType::Bool => LowType::BOOL,
            ResolvedType::Int => LowType::I64,
            ResolvedType::Pauli => LowType::PAULI,
            ResolvedType::Double => LowType::Double,
            ResolvedType::Range => LowType::Range,
            ResolvedType::String => LowType::Handle(HandleKind::String),
            ResolvedType::BigInt => LowType::Handle(HandleKind::BigInt),
            ResolvedType::Result => LowType::Handle(HandleKind::Result),
            ResolvedType::Qubit => LowType::Handle(HandleKind::Qubit),
            ResolvedType::Array(_) => LowType::Handle(HandleKind::Array),
            ResolvedType::Callable(_) => LowType::Handle(HandleKind::Callable),
            ResolvedType::TypeParameter { .. } => LowType::Handle(HandleKind::Tuple),
            ResolvedType::Tuple(items) if items.is_empty() => LowType::Void,
            ResolvedType::Tuple(items) => LowType::tuple(self.lower_fields(items, depth)?),
            ResolvedType::UserDefinedType(name) => {
                let udt = self.program.user_defined_type(name).ok_or_else(|| {
                    GenerationError::UnknownUserDefinedType { name: name.clone() }
                })?;
                let fields = udt.fields();
                if fields.is_empty() {
                    LowType::Handle(HandleKind::Tuple)
                } else {
                    LowType::tuple(self.lower_fields(&fields, depth)?)
                }
            }
        };

        tracing::trace!(%ty, %lowered, "lowered type");
        self.cache.borrow_mut().insert(ty.clone(), lowered.clone());
        Ok(lowered)
    }

    fn lower_fields(&self, items: &[ResolvedType], depth: u32) -> Result<Vec<LowType>> {
        items
            .iter()
            .map(|item| Ok(self.lower_at(item, depth + 1)?.or_unit_handle()))
            .collect()
    }
}

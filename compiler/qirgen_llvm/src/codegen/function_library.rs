//! Runtime and quantum-instruction function libraries.
//!
//! A `FunctionLibrary` maps short names (`array_create_1d`, `h`) to
//! external declarations carrying the library prefix
//! (`__quantum__rt__`, `__quantum__qis__`). Declarations are created on
//! first access and reused afterwards.
//!
//! The runtime library declares its whole catalogue in one fixed order on
//! first access, so every generated module lists the runtime API
//! identically. The instruction library is built by scanning the program
//! for `Intrinsic("<instr>")` callables and declares lazily per name.

use qirgen_ir::{Program, ResolvedType};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{GenerationError, Result};
use crate::mangle::{QIS_PREFIX, RUNTIME_PREFIX};

use super::ir_builder::IrBuilder;
use super::low_type::{HandleKind, LowType, TypeLowering};
use super::value_id::FunctionId;

/// Parameter and return types of a library function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSignature {
    pub params: Vec<LowType>,
    pub ret: LowType,
    /// Enum attributes (`cold`, `noreturn`) added to the declaration.
    pub attributes: &'static [&'static str],
}

impl FunctionSignature {
    fn new(params: Vec<LowType>, ret: LowType) -> Self {
        Self {
            params,
            ret,
            attributes: &[],
        }
    }
}

/// A prefixed registry of external function declarations.
pub struct FunctionLibrary {
    prefix: &'static str,
    /// Catalogue in declaration order.
    catalogue: Vec<(String, FunctionSignature)>,
    index: FxHashMap<String, usize>,
    declared: FxHashMap<String, FunctionId>,
    /// Declare the whole catalogue on first access.
    eager: bool,
}

impl FunctionLibrary {
    fn with_catalogue(prefix: &'static str, catalogue: Vec<(String, FunctionSignature)>, eager: bool) -> Self {
        let index = catalogue
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();
        Self {
            prefix,
            catalogue,
            index,
            declared: FxHashMap::default(),
            eager,
        }
    }

    /// The runtime library (`__quantum__rt__*`).
    pub fn runtime() -> Self {
        Self::with_catalogue(RUNTIME_PREFIX, runtime_catalogue(), true)
    }

    /// The instruction set (`__quantum__qis__*`), one entry per callable
    /// carrying an `Intrinsic("<instr>")` attribute. Callables sharing an
    /// instruction share its entry; the first one found fixes the signature.
    pub fn quantum_instructions(program: &Program, types: &TypeLowering<'_>) -> Result<Self> {
        let mut catalogue = Vec::new();
        let mut seen = FxHashSet::default();
        for callable in program.callables() {
            let Some(instr) = callable.intrinsic_instruction() else {
                continue;
            };
            if !seen.insert(instr) {
                tracing::trace!(instr, callable = %callable.name, "instruction already registered");
                continue;
            }
            let params = match &callable.signature.argument {
                ResolvedType::Unit => Vec::new(),
                ResolvedType::Tuple(items) => items
                    .iter()
                    .map(|item| types.lower_value(item))
                    .collect::<Result<_>>()?,
                single => vec![types.lower_value(single)?],
            };
            let ret = types.lower(&callable.signature.result)?;
            tracing::debug!(instr, callable = %callable.name, "registered instruction");
            catalogue.push((instr.to_string(), FunctionSignature::new(params, ret)));
        }
        Ok(Self::with_catalogue(QIS_PREFIX, catalogue, false))
    }

    /// Full symbol name for a short name.
    pub fn full_name(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn signature(&self, name: &str) -> Option<&FunctionSignature> {
        self.index.get(name).map(|&i| &self.catalogue[i].1)
    }

    /// Short names in catalogue order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.catalogue.iter().map(|(name, _)| name.as_str())
    }

    /// Full names and signatures of every function declared so far, in
    /// catalogue order.
    pub fn declared(&self) -> Vec<(String, &FunctionSignature)> {
        self.catalogue
            .iter()
            .filter(|(name, _)| self.declared.contains_key(name))
            .map(|(name, sig)| (self.full_name(name), sig))
            .collect()
    }

    /// Get the declaration for `name`, creating it on first access.
    pub fn get_function(&mut self, builder: &mut IrBuilder<'_, '_>, name: &str) -> Result<FunctionId> {
        if let Some(&func) = self.declared.get(name) {
            return Ok(func);
        }
        if !self.contains(name) {
            return Err(GenerationError::UnknownFunction {
                name: self.full_name(name),
            });
        }
        if self.eager && self.declared.is_empty() {
            tracing::debug!(prefix = self.prefix, count = self.catalogue.len(), "declaring library");
            for i in 0..self.catalogue.len() {
                self.declare_entry(builder, i);
            }
        } else {
            let i = self.index[name];
            self.declare_entry(builder, i);
        }
        self.declared
            .get(name)
            .copied()
            .ok_or_else(|| GenerationError::UnknownFunction {
                name: self.full_name(name),
            })
    }

    fn declare_entry(&mut self, builder: &mut IrBuilder<'_, '_>, i: usize) {
        let (name, sig) = &self.catalogue[i];
        let full = format!("{}{name}", self.prefix);
        let func = builder.declare_function(&full, &sig.params, &sig.ret);
        for attr in sig.attributes {
            builder.add_enum_attribute(func, attr);
        }
        tracing::trace!(function = %full, "declared library function");
        self.declared.insert(name.clone(), func);
    }
}

/// The runtime catalogue, in declaration order.
fn runtime_catalogue() -> Vec<(String, FunctionSignature)> {
    use HandleKind as H;

    let int = || LowType::I64;
    let int32 = || LowType::I32;
    let flag = || LowType::BOOL;
    let void = || LowType::Void;
    let h = LowType::Handle;
    let ptr = || LowType::Pointer(Box::new(LowType::I8));

    let mut entries: Vec<(&str, Vec<LowType>, LowType)> = vec![("int_power", vec![int(), int()], int())];

    // Results
    entries.extend([
        ("result_reference", vec![h(H::Result)], void()),
        ("result_unreference", vec![h(H::Result)], void()),
        ("result_equal", vec![h(H::Result), h(H::Result)], flag()),
        ("result_get_zero", vec![], h(H::Result)),
        ("result_get_one", vec![], h(H::Result)),
    ]);

    // Strings
    entries.extend([
        ("string_create", vec![ptr()], h(H::String)),
        ("string_reference", vec![h(H::String)], void()),
        ("string_unreference", vec![h(H::String)], void()),
        ("string_concatenate", vec![h(H::String), h(H::String)], h(H::String)),
        ("string_equal", vec![h(H::String), h(H::String)], flag()),
    ]);

    // To-string conversions
    entries.extend([
        ("int_to_string", vec![int()], h(H::String)),
        ("double_to_string", vec![LowType::Double], h(H::String)),
        ("bool_to_string", vec![flag()], h(H::String)),
        ("result_to_string", vec![h(H::Result)], h(H::String)),
        ("pauli_to_string", vec![LowType::PAULI], h(H::String)),
        ("qubit_to_string", vec![h(H::Qubit)], h(H::String)),
        ("range_to_string", vec![LowType::Range], h(H::String)),
        ("bigint_to_string", vec![h(H::BigInt)], h(H::String)),
    ]);

    // Big integers
    let big = || h(H::BigInt);
    entries.extend([
        ("bigint_create_i64", vec![int()], big()),
        ("bigint_create_array", vec![int32(), ptr()], big()),
        ("bigint_reference", vec![big()], void()),
        ("bigint_unreference", vec![big()], void()),
        ("bigint_negate", vec![big()], big()),
    ]);
    for op in [
        "bigint_add",
        "bigint_subtract",
        "bigint_multiply",
        "bigint_divide",
        "bigint_modulus",
    ] {
        entries.push((op, vec![big(), big()], big()));
    }
    entries.push(("bigint_power", vec![big(), int32()], big()));
    for op in ["bigint_bitand", "bigint_bitor", "bigint_bitxor"] {
        entries.push((op, vec![big(), big()], big()));
    }
    entries.extend([
        ("bigint_bitnot", vec![big()], big()),
        ("bigint_shiftleft", vec![big(), int()], big()),
        ("bigint_shiftright", vec![big(), int()], big()),
        ("bigint_equal", vec![big(), big()], flag()),
        ("bigint_greater", vec![big(), big()], flag()),
        ("bigint_greater_eq", vec![big(), big()], flag()),
    ]);

    // Tuples
    entries.extend([
        ("tuple_create", vec![int()], h(H::Tuple)),
        ("tuple_reference", vec![h(H::Tuple)], void()),
        ("tuple_unreference", vec![h(H::Tuple)], void()),
    ]);

    // Arrays
    let arr = || h(H::Array);
    entries.extend([
        ("array_create_1d", vec![int32(), int()], arr()),
        ("array_get_length", vec![arr(), int32()], int()),
        ("array_get_element_ptr_1d", vec![arr(), int()], ptr()),
        ("array_slice", vec![arr(), int32(), LowType::Range], arr()),
        ("array_concatenate", vec![arr(), arr()], arr()),
        ("array_reference", vec![arr()], void()),
        ("array_unreference", vec![arr()], void()),
        ("array_copy", vec![arr()], arr()),
    ]);

    // Callables
    let callable = || h(H::Callable);
    entries.extend([
        ("callable_create", vec![LowType::FunctionPointer, h(H::Tuple)], callable()),
        ("callable_invoke", vec![callable(), h(H::Tuple), h(H::Tuple)], void()),
        ("callable_copy", vec![callable()], callable()),
        ("callable_make_adjoint", vec![callable()], void()),
        ("callable_make_controlled", vec![callable()], void()),
        ("callable_reference", vec![callable()], void()),
        ("callable_unreference", vec![callable()], void()),
    ]);

    // Qubits
    entries.extend([
        ("qubit_allocate", vec![], h(H::Qubit)),
        ("qubit_allocate_array", vec![int()], arr()),
        ("qubit_release", vec![h(H::Qubit)], void()),
        ("qubit_release_array", vec![arr()], void()),
    ]);

    let mut catalogue: Vec<(String, FunctionSignature)> = entries
        .into_iter()
        .map(|(name, params, ret)| (name.to_string(), FunctionSignature::new(params, ret)))
        .collect();

    // Diagnostics
    catalogue.push((
        "fail".to_string(),
        FunctionSignature {
            params: vec![h(H::String)],
            ret: void(),
            attributes: &["cold", "noreturn"],
        },
    ));
    catalogue.push(("message".to_string(), FunctionSignature::new(vec![h(H::String)], void())));
    catalogue
}

#[cfg(test)]
mod tests;

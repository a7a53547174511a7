//! The resolved program: namespaces plus name-indexed lookups.

use rustc_hash::FxHashMap;

use crate::{Callable, QualifiedName, ResolvedType};

/// A user-defined type: a named wrapper around an underlying type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserDefinedType {
    pub name: QualifiedName,
    pub underlying: ResolvedType,
}

impl UserDefinedType {
    pub fn new(name: QualifiedName, underlying: ResolvedType) -> Self {
        Self { name, underlying }
    }

    /// Constructor argument types: the items of a tuple underlying type,
    /// nothing for `Unit`, or the single underlying type.
    pub fn fields(&self) -> Vec<ResolvedType> {
        match &self.underlying {
            ResolvedType::Unit => Vec::new(),
            ResolvedType::Tuple(items) => items.clone(),
            other => vec![other.clone()],
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Namespace {
    pub name: String,
    pub callables: Vec<Callable>,
    pub types: Vec<UserDefinedType>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            callables: Vec::new(),
            types: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_callable(mut self, callable: Callable) -> Self {
        self.callables.push(callable);
        self
    }

    #[must_use]
    pub fn with_type(mut self, udt: UserDefinedType) -> Self {
        self.types.push(udt);
        self
    }
}

/// The whole resolved program.
///
/// Lookups are by qualified name; iteration follows declaration order so
/// generated output is deterministic.
#[derive(Clone, Debug, Default)]
pub struct Program {
    namespaces: Vec<Namespace>,
    callable_index: FxHashMap<QualifiedName, (usize, usize)>,
    type_index: FxHashMap<QualifiedName, (usize, usize)>,
}

impl Program {
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        let mut callable_index = FxHashMap::default();
        let mut type_index = FxHashMap::default();
        for (ns_idx, ns) in namespaces.iter().enumerate() {
            for (idx, callable) in ns.callables.iter().enumerate() {
                callable_index.insert(callable.name.clone(), (ns_idx, idx));
            }
            for (idx, udt) in ns.types.iter().enumerate() {
                type_index.insert(udt.name.clone(), (ns_idx, idx));
            }
        }
        Self {
            namespaces,
            callable_index,
            type_index,
        }
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn callable(&self, name: &QualifiedName) -> Option<&Callable> {
        let &(ns, idx) = self.callable_index.get(name)?;
        Some(&self.namespaces[ns].callables[idx])
    }

    pub fn user_defined_type(&self, name: &QualifiedName) -> Option<&UserDefinedType> {
        let &(ns, idx) = self.type_index.get(name)?;
        Some(&self.namespaces[ns].types[idx])
    }

    /// All callables in declaration order.
    pub fn callables(&self) -> impl Iterator<Item = &Callable> {
        self.namespaces.iter().flat_map(|ns| ns.callables.iter())
    }

    /// All user-defined types in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &UserDefinedType> {
        self.namespaces.iter().flat_map(|ns| ns.types.iter())
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &Callable> {
        self.callables().filter(|c| c.is_entry_point())
    }
}

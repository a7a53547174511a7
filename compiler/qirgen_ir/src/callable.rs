//! Callables, their argument shapes, and specializations.

use crate::{CallableSignature, QualifiedName, ResolvedType};

/// Attribute marking a callable as a hardware instruction. Its argument is
/// the instruction name (`Intrinsic("h")`).
pub const INTRINSIC_ATTRIBUTE: &str = "Intrinsic";

/// Attribute marking a callable as a program entry point.
pub const ENTRY_POINT_ATTRIBUTE: &str = "EntryPoint";

/// Which variant of a callable a specialization implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecializationKind {
    Body,
    Adjoint,
    Controlled,
    ControlledAdjoint,
}

impl SpecializationKind {
    /// All kinds, in dispatch-table order.
    pub const ALL: [SpecializationKind; 4] = [
        SpecializationKind::Body,
        SpecializationKind::Adjoint,
        SpecializationKind::Controlled,
        SpecializationKind::ControlledAdjoint,
    ];

    /// Symbol suffix used in mangled names.
    pub fn suffix(self) -> &'static str {
        match self {
            SpecializationKind::Body => "body",
            SpecializationKind::Adjoint => "adj",
            SpecializationKind::Controlled => "ctl",
            SpecializationKind::ControlledAdjoint => "ctladj",
        }
    }

    /// Slot in a dispatch table.
    pub fn index(self) -> usize {
        match self {
            SpecializationKind::Body => 0,
            SpecializationKind::Adjoint => 1,
            SpecializationKind::Controlled => 2,
            SpecializationKind::ControlledAdjoint => 3,
        }
    }

    /// Controlled variants take the control-qubit array as an extra leading argument.
    pub fn is_controlled(self) -> bool {
        matches!(
            self,
            SpecializationKind::Controlled | SpecializationKind::ControlledAdjoint
        )
    }
}

/// Where the implementation of a specialization comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpecializationBody {
    /// Source-provided (or compiler-generated) body, lowered by the tree visitor.
    Provided,
    /// Implemented by a hardware instruction; no body is emitted.
    Intrinsic,
    /// Defined in another compilation unit; declaration only.
    External,
}

/// One specialization of a callable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Specialization {
    pub kind: SpecializationKind,
    pub body: SpecializationBody,
}

/// A named, typed argument leaf. Unnamed leaves get a synthetic name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalItem {
    pub name: Option<String>,
    pub ty: ResolvedType,
}

/// The argument-tuple shape of a callable: a tree of leaves and tuples.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ArgTuple {
    Item(LocalItem),
    Tuple(Vec<ArgTuple>),
}

impl ArgTuple {
    /// Named leaf shorthand.
    pub fn item(name: impl Into<String>, ty: ResolvedType) -> Self {
        ArgTuple::Item(LocalItem {
            name: Some(name.into()),
            ty,
        })
    }

    /// Unnamed leaf shorthand.
    pub fn anonymous(ty: ResolvedType) -> Self {
        ArgTuple::Item(LocalItem { name: None, ty })
    }

    /// The resolved type this shape describes.
    ///
    /// A one-element tuple is the element itself; an empty tuple is `Unit`.
    pub fn resolved_type(&self) -> ResolvedType {
        match self {
            ArgTuple::Item(item) => item.ty.clone(),
            ArgTuple::Tuple(items) => match items.as_slice() {
                [] => ResolvedType::Unit,
                [single] => single.resolved_type(),
                _ => ResolvedType::Tuple(items.iter().map(ArgTuple::resolved_type).collect()),
            },
        }
    }

    /// The shapes that become function parameters: the items of an outer
    /// tuple, or the leaf itself. Nested tuples stay whole.
    pub fn top_level(&self) -> Vec<&ArgTuple> {
        match self {
            ArgTuple::Item(item) if item.ty.is_unit() => Vec::new(),
            ArgTuple::Item(_) => vec![self],
            ArgTuple::Tuple(items) => items
                .iter()
                .filter(|item| !item.resolved_type().is_unit())
                .collect(),
        }
    }

    /// Leaf name, if this is a named leaf.
    pub fn name(&self) -> Option<&str> {
        match self {
            ArgTuple::Item(item) => item.name.as_deref(),
            ArgTuple::Tuple(_) => None,
        }
    }
}

/// A named attribute with an optional string argument.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attribute {
    pub name: String,
    pub argument: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CallableKind {
    Function,
    Operation,
    TypeConstructor,
}

/// A resolved callable declaration.
///
/// Holds at most one specialization of each kind; `with_specialization`
/// replaces an existing one of the same kind.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Callable {
    pub name: QualifiedName,
    pub kind: CallableKind,
    pub signature: CallableSignature,
    pub arguments: ArgTuple,
    specializations: Vec<Specialization>,
    pub attributes: Vec<Attribute>,
}

impl Callable {
    /// A callable with a provided body and no other specializations.
    ///
    /// The signature's argument type is derived from `arguments`.
    pub fn new(
        name: QualifiedName,
        kind: CallableKind,
        arguments: ArgTuple,
        result: ResolvedType,
    ) -> Self {
        let signature = CallableSignature::new(arguments.resolved_type(), result);
        Self {
            name,
            kind,
            signature,
            arguments,
            specializations: vec![Specialization {
                kind: SpecializationKind::Body,
                body: SpecializationBody::Provided,
            }],
            attributes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_specialization(mut self, kind: SpecializationKind, body: SpecializationBody) -> Self {
        self.specializations.retain(|s| s.kind != kind);
        self.specializations.push(Specialization { kind, body });
        self.specializations.sort_by_key(|s| s.kind);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, argument: Option<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            argument,
        });
        self
    }

    /// Specializations in kind order.
    pub fn specializations(&self) -> &[Specialization] {
        &self.specializations
    }

    pub fn specialization(&self, kind: SpecializationKind) -> Option<&Specialization> {
        self.specializations.iter().find(|s| s.kind == kind)
    }

    /// Instruction name from an `Intrinsic` attribute.
    pub fn intrinsic_instruction(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == INTRINSIC_ATTRIBUTE)
            .and_then(|a| a.argument.as_deref())
    }

    pub fn is_entry_point(&self) -> bool {
        self.attributes.iter().any(|a| a.name == ENTRY_POINT_ATTRIBUTE)
    }

    /// Argument shape of one specialization.
    ///
    /// Body and adjoint take the declared arguments. Controlled variants take
    /// `(ctls, args)` where `args` is the declared argument as a single value.
    pub fn specialization_arguments(&self, kind: SpecializationKind) -> ArgTuple {
        if !kind.is_controlled() {
            return self.arguments.clone();
        }
        let controls = ArgTuple::item("ctls", ResolvedType::array_of(ResolvedType::Qubit));
        let inner = self.signature.argument.clone();
        if inner.is_unit() {
            ArgTuple::Tuple(vec![controls])
        } else {
            ArgTuple::Tuple(vec![controls, ArgTuple::item("args", inner)])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Callable {
        Callable::new(
            QualifiedName::new("Demo", "Rotate"),
            CallableKind::Operation,
            ArgTuple::Tuple(vec![
                ArgTuple::item("theta", ResolvedType::Double),
                ArgTuple::item("q", ResolvedType::Qubit),
            ]),
            ResolvedType::Unit,
        )
    }

    #[test]
    fn signature_follows_argument_shape() {
        let c = sample();
        assert_eq!(
            c.signature.argument,
            ResolvedType::Tuple(vec![ResolvedType::Double, ResolvedType::Qubit])
        );
    }

    #[test]
    fn specializations_are_unique_and_ordered() {
        let c = sample()
            .with_specialization(SpecializationKind::Controlled, SpecializationBody::Provided)
            .with_specialization(SpecializationKind::Adjoint, SpecializationBody::Provided)
            .with_specialization(SpecializationKind::Adjoint, SpecializationBody::Intrinsic);
        let kinds: Vec<_> = c.specializations().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SpecializationKind::Body,
                SpecializationKind::Adjoint,
                SpecializationKind::Controlled
            ]
        );
        assert_eq!(
            c.specialization(SpecializationKind::Adjoint).map(|s| s.body),
            Some(SpecializationBody::Intrinsic)
        );
    }

    #[test]
    fn controlled_arguments_prepend_controls() {
        let c = sample();
        let shape = c.specialization_arguments(SpecializationKind::Controlled);
        let top = shape.top_level();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name(), Some("ctls"));
        assert_eq!(top[1].resolved_type(), c.signature.argument);
    }

    #[test]
    fn unit_arguments_have_no_parameters() {
        let shape = ArgTuple::Tuple(Vec::new());
        assert!(shape.top_level().is_empty());
        assert_eq!(shape.resolved_type(), ResolvedType::Unit);
    }

    #[test]
    fn intrinsic_instruction_from_attribute() {
        let c = sample().with_attribute(INTRINSIC_ATTRIBUTE, Some("rx".to_string()));
        assert_eq!(c.intrinsic_instruction(), Some("rx"));
        assert!(!c.is_entry_point());
    }
}

//! Shared fixtures for generation tests.

use qirgen_ir::{
    ArgTuple, Callable, CallableKind, Namespace, Program, QualifiedName, ResolvedType, SpecializationBody,
    SpecializationKind, UserDefinedType, ENTRY_POINT_ATTRIBUTE, INTRINSIC_ATTRIBUTE,
};

use crate::error::Result;

use super::generation_context::GenerationContext;
use super::value_id::FunctionId;

pub(crate) fn name(namespace: &str, name: &str) -> QualifiedName {
    QualifiedName::new(namespace, name)
}

/// A small program exercising every lowering path:
///
/// - `Quantum.Intrinsic.H`: intrinsic body and adjoint
/// - `Demo.Sub.Sample(theta: Double, q: Qubit) : Unit` with body, adjoint, controlled
/// - `Demo.MakePair(n: Int) : (Int, String)`
/// - `Demo.Measure(q: Qubit) : Result`, external body
/// - `Demo.Pair = (Int, Qubit)`, `Demo.Label = String`, `Demo.Marker = Unit`
/// - `Demo.Main() : Unit` and `Qrng.RandomInts(count: Int, seeds: Int[]) : Int`, entry points
pub(crate) fn sample_program() -> Program {
    let h = Callable::new(
        name("Quantum.Intrinsic", "H"),
        CallableKind::Operation,
        ArgTuple::item("qubit", ResolvedType::Qubit),
        ResolvedType::Unit,
    )
    .with_specialization(SpecializationKind::Body, SpecializationBody::Intrinsic)
    .with_specialization(SpecializationKind::Adjoint, SpecializationBody::Intrinsic)
    .with_attribute(INTRINSIC_ATTRIBUTE, Some("h".to_string()));

    let sample = Callable::new(
        name("Demo.Sub", "Sample"),
        CallableKind::Operation,
        ArgTuple::Tuple(vec![
            ArgTuple::item("theta", ResolvedType::Double),
            ArgTuple::item("q", ResolvedType::Qubit),
        ]),
        ResolvedType::Unit,
    )
    .with_specialization(SpecializationKind::Adjoint, SpecializationBody::Provided)
    .with_specialization(SpecializationKind::Controlled, SpecializationBody::Provided);

    let make_pair = Callable::new(
        name("Demo", "MakePair"),
        CallableKind::Function,
        ArgTuple::item("n", ResolvedType::Int),
        ResolvedType::Tuple(vec![ResolvedType::Int, ResolvedType::String]),
    );

    let measure = Callable::new(
        name("Demo", "Measure"),
        CallableKind::Operation,
        ArgTuple::item("q", ResolvedType::Qubit),
        ResolvedType::Result,
    )
    .with_specialization(SpecializationKind::Body, SpecializationBody::External);

    let main = Callable::new(
        name("Demo", "Main"),
        CallableKind::Operation,
        ArgTuple::Tuple(Vec::new()),
        ResolvedType::Unit,
    )
    .with_attribute(ENTRY_POINT_ATTRIBUTE, None);

    let random_ints = Callable::new(
        name("Qrng", "RandomInts"),
        CallableKind::Operation,
        ArgTuple::Tuple(vec![
            ArgTuple::item("count", ResolvedType::Int),
            ArgTuple::item("seeds", ResolvedType::array_of(ResolvedType::Int)),
        ]),
        ResolvedType::Int,
    )
    .with_attribute(ENTRY_POINT_ATTRIBUTE, None);

    Program::new(vec![
        Namespace::new("Quantum.Intrinsic").with_callable(h),
        Namespace::new("Demo.Sub").with_callable(sample),
        Namespace::new("Demo")
            .with_callable(make_pair)
            .with_callable(measure)
            .with_callable(main)
            .with_type(UserDefinedType::new(
                name("Demo", "Pair"),
                ResolvedType::Tuple(vec![ResolvedType::Int, ResolvedType::Qubit]),
            ))
            .with_type(UserDefinedType::new(name("Demo", "Label"), ResolvedType::String))
            .with_type(UserDefinedType::new(name("Demo", "Marker"), ResolvedType::Unit)),
        Namespace::new("Qrng").with_callable(random_ints),
    ])
}

/// Generate a specialization whose body does nothing beyond the header.
pub(crate) fn define_empty(
    gen: &mut GenerationContext<'_, '_>,
    callable: &QualifiedName,
    kind: SpecializationKind,
) -> Result<FunctionId> {
    let program = gen.program();
    let callable = program
        .callable(callable)
        .ok_or_else(|| crate::error::GenerationError::UnknownCallable { name: callable.clone() })?;
    gen.start_specialization();
    let func = gen.generate_header(callable, kind)?;
    gen.end_specialization()?;
    Ok(func)
}

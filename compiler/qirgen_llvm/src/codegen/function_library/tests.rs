use super::*;
use crate::context::SimpleCx;
use inkwell::context::Context;
use pretty_assertions::assert_eq;
use qirgen_ir::{ArgTuple, Callable, CallableKind, Namespace, QualifiedName, INTRINSIC_ATTRIBUTE};

fn intrinsic(name: &str, instr: &str, arguments: ArgTuple, result: ResolvedType) -> Callable {
    Callable::new(
        QualifiedName::new("Quantum.Intrinsic", name),
        CallableKind::Operation,
        arguments,
        result,
    )
    .with_attribute(INTRINSIC_ATTRIBUTE, Some(instr.to_string()))
}

fn instruction_program() -> Program {
    Program::new(vec![Namespace::new("Quantum.Intrinsic")
        .with_callable(intrinsic(
            "H",
            "h",
            ArgTuple::item("qubit", ResolvedType::Qubit),
            ResolvedType::Unit,
        ))
        .with_callable(intrinsic(
            "Rz",
            "rz",
            ArgTuple::Tuple(vec![
                ArgTuple::item("theta", ResolvedType::Double),
                ArgTuple::item("qubit", ResolvedType::Qubit),
            ]),
            ResolvedType::Unit,
        ))
        .with_callable(intrinsic(
            "M",
            "mz",
            ArgTuple::item("qubit", ResolvedType::Qubit),
            ResolvedType::Result,
        ))
        .with_callable(Callable::new(
            QualifiedName::new("Quantum.Intrinsic", "Helper"),
            CallableKind::Function,
            ArgTuple::Tuple(Vec::new()),
            ResolvedType::Unit,
        ))])
}

#[test]
fn runtime_catalogue_has_fixed_order() {
    let runtime = FunctionLibrary::runtime();
    let names: Vec<&str> = runtime.names().collect();
    assert_eq!(names.first(), Some(&"int_power"));
    assert_eq!(names.last(), Some(&"message"));
    let create = names.iter().position(|n| *n == "array_create_1d");
    let get = names.iter().position(|n| *n == "array_get_element_ptr_1d");
    assert!(create < get);
    assert_eq!(runtime.full_name("tuple_create"), "__quantum__rt__tuple_create");
}

#[test]
fn runtime_signatures() {
    let runtime = FunctionLibrary::runtime();
    let create = runtime.signature("array_create_1d").unwrap();
    assert_eq!(create.params, vec![LowType::I32, LowType::I64]);
    assert_eq!(create.ret, LowType::Handle(HandleKind::Array));
    let fail = runtime.signature("fail").unwrap();
    assert_eq!(fail.attributes, &["cold", "noreturn"]);
    assert!(runtime.signature("qubit_reference").is_none());
}

#[test]
fn runtime_declares_whole_catalogue_on_first_access() {
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "runtime_test");
    let mut builder = IrBuilder::new(&scx);
    let mut runtime = FunctionLibrary::runtime();

    assert!(runtime.declared().is_empty());
    let first = runtime.get_function(&mut builder, "qubit_allocate").unwrap();
    let again = runtime.get_function(&mut builder, "qubit_allocate").unwrap();
    assert_eq!(first, again);
    assert_eq!(runtime.declared().len(), runtime.names().count());
    assert!(scx.llmod.get_function("__quantum__rt__int_power").is_some());
    assert!(scx.llmod.get_function("__quantum__rt__message").is_some());
}

#[test]
fn unknown_runtime_function_is_fatal() {
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "runtime_test");
    let mut builder = IrBuilder::new(&scx);
    let mut runtime = FunctionLibrary::runtime();

    let err = runtime.get_function(&mut builder, "teleport").unwrap_err();
    assert_eq!(
        err,
        GenerationError::UnknownFunction {
            name: "__quantum__rt__teleport".to_string()
        }
    );
}

#[test]
fn instructions_come_from_intrinsic_attributes() {
    let program = instruction_program();
    let types = TypeLowering::new(&program);
    let qis = FunctionLibrary::quantum_instructions(&program, &types).unwrap();

    let names: Vec<&str> = qis.names().collect();
    assert_eq!(names, vec!["h", "rz", "mz"]);
    assert_eq!(
        qis.signature("rz").unwrap().params,
        vec![LowType::Double, LowType::Handle(HandleKind::Qubit)]
    );
    assert_eq!(qis.signature("h").unwrap().ret, LowType::Void);
    assert_eq!(qis.signature("mz").unwrap().ret, LowType::Handle(HandleKind::Result));
}

#[test]
fn instructions_declare_lazily() {
    let program = instruction_program();
    let types = TypeLowering::new(&program);
    let mut qis = FunctionLibrary::quantum_instructions(&program, &types).unwrap();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "qis_test");
    let mut builder = IrBuilder::new(&scx);

    qis.get_function(&mut builder, "h").unwrap();
    assert!(scx.llmod.get_function("__quantum__qis__h").is_some());
    assert!(scx.llmod.get_function("__quantum__qis__rz").is_none());
    assert_eq!(qis.declared().len(), 1);
    assert_eq!(qis.declared()[0].0, "__quantum__qis__h");
}

#[test]
fn shared_instruction_is_catalogued_once() {
    let program = Program::new(vec![Namespace::new("Quantum.Intrinsic")
        .with_callable(intrinsic(
            "H",
            "h",
            ArgTuple::item("qubit", ResolvedType::Qubit),
            ResolvedType::Unit,
        ))
        .with_callable(intrinsic(
            "Hadamard",
            "h",
            ArgTuple::item("target", ResolvedType::Qubit),
            ResolvedType::Unit,
        ))]);
    let types = TypeLowering::new(&program);
    let mut qis = FunctionLibrary::quantum_instructions(&program, &types).unwrap();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "qis_test");
    let mut builder = IrBuilder::new(&scx);

    assert_eq!(qis.names().collect::<Vec<_>>(), vec!["h"]);
    qis.get_function(&mut builder, "h").unwrap();
    assert_eq!(qis.declared().len(), 1);
}

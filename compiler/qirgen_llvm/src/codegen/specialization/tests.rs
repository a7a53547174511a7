use super::*;
use crate::codegen::low_type::HandleKind;
use crate::codegen::test_support::{define_empty, name, sample_program};
use crate::config::GenerationConfig;
use crate::context::SimpleCx;
use inkwell::context::Context;
use pretty_assertions::assert_eq;
use qirgen_ir::{CallableKind, Program};

fn callable<'p>(program: &'p Program, namespace: &str, callable: &str) -> &'p Callable {
    program.callable(&name(namespace, callable)).unwrap()
}

fn udt<'p>(program: &'p Program, udt: &str) -> &'p UserDefinedType {
    program.user_defined_type(&name("Demo", udt)).unwrap()
}

#[test]
fn register_function_is_idempotent() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "register");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let sample = callable(&program, "Demo.Sub", "Sample");

    let first = gen.register_function(sample, SpecializationKind::Body).unwrap();
    let second = gen.register_function(sample, SpecializationKind::Body).unwrap();
    assert_eq!(first, second);
    gen.register_function(sample, SpecializationKind::Controlled).unwrap();

    let ir = gen.emit_ir();
    assert!(ir.contains("declare void @Demo__Sub__Sample__body(double, ptr)"));
    assert!(ir.contains("declare void @Demo__Sub__Sample__ctl(ptr, ptr)"));
}

#[test]
fn missing_specialization_is_fatal() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "missing");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let sample = callable(&program, "Demo.Sub", "Sample");

    let err = gen
        .register_function(sample, SpecializationKind::ControlledAdjoint)
        .unwrap_err();
    assert_eq!(
        err,
        GenerationError::MissingSpecialization {
            name: name("Demo.Sub", "Sample"),
            kind: SpecializationKind::ControlledAdjoint,
        }
    );
}

#[test]
fn header_binds_argument_names() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "header");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let sample = callable(&program, "Demo.Sub", "Sample");

    gen.start_specialization();
    let func = gen.generate_header(sample, SpecializationKind::Body).unwrap();
    let theta = gen.lookup("theta").unwrap();
    let q = gen.lookup("q").unwrap();
    assert_eq!(theta.ty, LowType::Double);
    assert_eq!(q.ty, LowType::Handle(HandleKind::Qubit));
    assert_eq!(gen.builder().value_name(theta.value), "theta__1");
    gen.end_specialization().unwrap();

    assert!(gen.builder().is_defined(func));
    assert!(gen.lookup("theta").is_err());
    let ir = gen.emit_ir();
    assert!(ir.contains("define void @Demo__Sub__Sample__body(double %theta__1, ptr %q__1)"));
    assert!(gen.verify().is_ok());
}

#[test]
fn controlled_header_takes_controls_and_arguments() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "controlled");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let sample = callable(&program, "Demo.Sub", "Sample");

    gen.start_specialization();
    gen.generate_header(sample, SpecializationKind::Controlled).unwrap();
    assert_eq!(
        gen.lookup("ctls").unwrap().ty,
        LowType::Handle(HandleKind::Array)
    );
    assert_eq!(
        gen.lookup("args").unwrap().ty,
        LowType::tuple(vec![LowType::Double, LowType::Handle(HandleKind::Qubit)])
    );
    gen.end_specialization().unwrap();
    assert!(gen.verify().is_ok());
}

#[test]
fn unnamed_and_nested_arguments() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "nested");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let nested = Callable::new(
        name("Demo", "Nested"),
        CallableKind::Function,
        ArgTuple::Tuple(vec![
            ArgTuple::anonymous(ResolvedType::Int),
            ArgTuple::Tuple(vec![
                ArgTuple::item("b", ResolvedType::Double),
                ArgTuple::item("c", ResolvedType::String),
            ]),
        ]),
        ResolvedType::Unit,
    );

    gen.start_specialization();
    gen.generate_header(&nested, SpecializationKind::Body).unwrap();
    assert_eq!(gen.lookup("arg__1").unwrap().ty, LowType::I64);
    assert_eq!(gen.lookup("b").unwrap().ty, LowType::Double);
    assert_eq!(gen.lookup("c").unwrap().ty, LowType::Handle(HandleKind::String));
    gen.end_specialization().unwrap();

    let ir = gen.emit_ir();
    assert!(ir.contains("define void @Demo__Nested__body(i64 %arg__1, ptr"));
    assert!(ir.contains("load double"));
    assert!(gen.verify().is_ok());
}

#[test]
fn end_drops_trailing_unreachable_block() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "trailing");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let main = callable(&program, "Demo", "Main");

    gen.start_specialization();
    let func = gen.generate_header(main, SpecializationKind::Body).unwrap();
    gen.builder().ret_void();
    let tail = gen.builder().append_block(func, "tail");
    gen.builder().position_at_end(tail);
    gen.end_specialization().unwrap();

    assert_eq!(gen.builder().function_value(func).count_basic_blocks(), 1);
    assert!(gen.verify().is_ok());
}

#[test]
fn end_terminates_branch_targets() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "join");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let main = callable(&program, "Demo", "Main");

    gen.start_specialization();
    let func = gen.generate_header(main, SpecializationKind::Body).unwrap();
    let join = gen.builder().append_block(func, "join");
    gen.builder().br(join);
    gen.builder().position_at_end(join);
    gen.end_specialization().unwrap();

    assert_eq!(gen.builder().function_value(func).count_basic_blocks(), 2);
    assert!(gen.builder().block_has_terminator(join));
    assert!(gen.verify().is_ok());
}

#[test]
fn empty_entry_block_gets_return() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "entry");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();

    define_empty(&mut gen, &name("Demo", "Main"), SpecializationKind::Body).unwrap();
    define_empty(&mut gen, &name("Demo", "MakePair"), SpecializationKind::Body).unwrap();

    let ir = gen.emit_ir();
    assert!(ir.contains("define void @Demo__Main__body() {\nentry:\n  ret void\n}"));
    assert!(ir.contains("define ptr @Demo__MakePair__body(i64 %n__1) {\nentry:\n  unreachable\n}"));
    assert!(gen.verify().is_ok());
}

#[test]
fn end_without_cursor_is_fatal() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "no_cursor");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();

    assert!(matches!(
        gen.end_specialization(),
        Err(GenerationError::MissingCursor { .. })
    ));
}

#[test]
fn constructor_stores_fields_after_header() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "ctor");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();

    let ctor = gen.generate_constructor(udt(&program, "Pair")).unwrap();
    assert_eq!(gen.generate_constructor(udt(&program, "Pair")).unwrap(), ctor);

    let ir = gen.emit_ir();
    assert!(ir.contains("define ptr @Demo__Pair__body(i64 %item1, ptr %item2)"));
    assert!(ir.contains("getelementptr inbounds { %TupleHeader, i64, ptr }, ptr %tuple_create, i32 0, i32 1"));
    assert!(ir.contains("store i64 %item1"));
    assert!(ir.contains("store ptr %item2"));
    // Qubits are not reference counted.
    assert!(!ir.contains("call void @__quantum__rt__tuple_reference"));
    assert!(gen.require_cursor("after constructor").is_err());
    assert!(gen.verify().is_ok());
}

#[test]
fn constructor_references_heap_arguments_once() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "label");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();

    gen.generate_constructor(udt(&program, "Label")).unwrap();
    let ir = gen.emit_ir();
    assert_eq!(
        ir.matches("call void @__quantum__rt__string_reference(ptr %item1)").count(),
        1
    );
    assert!(gen.verify().is_ok());
}

#[test]
fn unit_constructor_returns_null() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "marker");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();

    gen.generate_constructor(udt(&program, "Marker")).unwrap();
    assert!(gen
        .emit_ir()
        .contains("define ptr @Demo__Marker__body() {\nentry:\n  ret ptr null\n}"));
}

#[test]
fn returning_releases_open_scopes_before_ret() {
    let program = sample_program();
    let ctx = Context::create();
    let scx = SimpleCx::new(&ctx, "early_return");
    let mut gen = GenerationContext::new(&scx, &program, GenerationConfig::default()).unwrap();
    let make_pair = callable(&program, "Demo", "MakePair");

    gen.start_specialization();
    gen.generate_header(make_pair, SpecializationKind::Body).unwrap();
    let label = gen.create_string("pair").unwrap();
    gen.register_release(label.clone());
    gen.open_scope();
    let n = gen.lookup("n").unwrap();
    let pair = gen.create_tuple(&[n, label]).unwrap();
    gen.emit_return(Some(pair.value)).unwrap();
    gen.end_specialization().unwrap();

    let ir = gen.emit_ir();
    let release = ir
        .find("call void @__quantum__rt__string_unreference(ptr %string_create)")
        .unwrap();
    let ret = ir.find("ret ptr %tuple_create").unwrap();
    assert!(release < ret);
    assert_eq!(ir.matches("call void @__quantum__rt__string_unreference").count(), 1);
    assert!(gen.verify().is_ok());
}

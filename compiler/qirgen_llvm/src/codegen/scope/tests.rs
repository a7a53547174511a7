use super::*;
use crate::codegen::low_type::HandleKind;
use pretty_assertions::assert_eq;

fn value(id: u32) -> TypedValue {
    // Scope tests never resolve IDs; the type tells values apart.
    TypedValue::new(ValueId::NONE, LowType::Int { bits: id })
}

#[test]
fn unique_names_count_per_prefix() {
    let mut names = NameGenerator::default();
    assert_eq!(names.unique("q"), "q__1");
    assert_eq!(names.unique("q"), "q__2");
    assert_eq!(names.unique("r"), "r__1");
    names.reset();
    assert_eq!(names.unique("q"), "q__1");
}

#[test]
fn inner_binding_shadows_outer() {
    let mut scopes = ScopeStack::new();
    scopes.open_scope();
    scopes.bind("x", ScopeBinding::Immutable(value(1)));
    scopes.open_scope();
    scopes.bind("x", ScopeBinding::Immutable(value(2)));
    assert_eq!(scopes.lookup("x"), Some(&ScopeBinding::Immutable(value(2))));
    scopes.close_scope();
    assert_eq!(scopes.lookup("x"), Some(&ScopeBinding::Immutable(value(1))));
}

#[test]
fn child_scope_sees_parent_bindings() {
    let mut scopes = ScopeStack::new();
    scopes.open_scope();
    scopes.bind("outer", ScopeBinding::Immutable(value(1)));
    scopes.open_scope();
    scopes.bind("inner", ScopeBinding::Immutable(value(2)));
    assert!(scopes.lookup("outer").is_some());
    scopes.close_scope();
    assert!(scopes.lookup("inner").is_none());
}

#[test]
fn bind_without_scope_opens_one() {
    let mut scopes = ScopeStack::new();
    scopes.bind(
        "m",
        ScopeBinding::Mutable {
            ptr: ValueId::NONE,
            ty: LowType::I64,
        },
    );
    assert_eq!(scopes.depth(), 1);
    assert!(matches!(scopes.lookup("m"), Some(ScopeBinding::Mutable { .. })));
}

#[test]
fn releases_come_back_in_reverse_order() {
    let mut scopes = ScopeStack::new();
    scopes.open_scope();
    scopes.add_release(value(1));
    scopes.add_release(value(2));
    scopes.open_scope();
    scopes.add_release(TypedValue::new(ValueId::NONE, LowType::Handle(HandleKind::Array)));

    let inner = scopes.close_scope().unwrap();
    assert_eq!(inner.len(), 1);
    let outer = scopes.close_scope().unwrap();
    assert_eq!(outer, vec![value(2), value(1)]);
    assert_eq!(scopes.close_scope(), None);
}

#[test]
fn pending_releases_span_all_frames_without_closing() {
    let mut scopes = ScopeStack::new();
    scopes.open_scope();
    scopes.add_release(value(1));
    scopes.add_release(value(2));
    scopes.open_scope();
    scopes.add_release(value(3));

    assert_eq!(scopes.pending_releases(), vec![value(3), value(2), value(1)]);
    assert_eq!(scopes.depth(), 2);
    assert_eq!(scopes.close_scope().unwrap(), vec![value(3)]);
}

#[test]
fn inlining_changes_prefix_and_scope() {
    let mut scopes = ScopeStack::new();
    scopes.open_scope();
    assert_eq!(scopes.inlining_prefix(), "");
    scopes.start_inlining();
    scopes.start_inlining();
    assert_eq!(scopes.inlining_prefix(), "..");
    assert_eq!(scopes.depth(), 3);
    scopes.stop_inlining();
    assert_eq!(scopes.inlining_depth(), 1);
    assert_eq!(scopes.depth(), 2);
}

#[test]
fn reset_clears_everything() {
    let mut scopes = ScopeStack::new();
    scopes.start_inlining();
    scopes.bind("x", ScopeBinding::Immutable(value(1)));
    assert_eq!(scopes.unique_name("x"), "x__1");
    scopes.reset();
    assert_eq!(scopes.depth(), 0);
    assert_eq!(scopes.inlining_depth(), 0);
    assert!(scopes.lookup("x").is_none());
    assert_eq!(scopes.unique_name("x"), "x__1");
}

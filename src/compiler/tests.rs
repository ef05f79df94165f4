use inkwell::context::Context;

use crate::{
    ast::ast::Item,
    errors::errors::ErrorImpl,
    lexer::source::BufferedSource,
    parser::{item::parse_top_level_unit, parser::Parser},
    session::session::Session,
};

use super::{compiler::Compiler, item::gen_item, scope::ScopeTable};

fn parse_item(source: &str, session: &mut Session) -> Item {
    let source = BufferedSource::new(source.to_string(), None).unwrap();
    let mut parser = Parser::new(Box::new(source)).unwrap();
    parse_top_level_unit(&mut parser, session).unwrap().unwrap()
}

#[test]
fn scope_shadowing_unwinds_in_order() {
    let mut table: ScopeTable<i32> = ScopeTable::new();

    table.define("x", 1);
    let outer = table.mark();

    table.define("x", 2);
    table.define("y", 3);
    assert_eq!(table.get("x"), Some(2));
    assert_eq!(table.get("y"), Some(3));

    table.restore_to(outer);
    assert_eq!(table.get("x"), Some(1));
    assert_eq!(table.get("y"), None);
}

#[test]
fn scope_nested_same_name_shadows() {
    let mut table: ScopeTable<i32> = ScopeTable::new();

    table.define("x", 1);
    let first = table.mark();
    table.define("x", 2);
    let second = table.mark();
    table.define("x", 3);

    assert_eq!(table.get("x"), Some(3));
    table.restore_to(second);
    assert_eq!(table.get("x"), Some(2));
    table.restore_to(first);
    assert_eq!(table.get("x"), Some(1));
}

#[test]
fn scope_clear_empties_everything() {
    let mut table: ScopeTable<i32> = ScopeTable::new();
    table.define("x", 1);
    table.clear();
    assert_eq!(table.get("x"), None);
    table.restore_to(0);
    assert_eq!(table.get("x"), None);
}

#[test]
fn generates_a_simple_definition() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("def add(a b) a + b", &mut session);
    let function = gen_item(&mut compiler, &mut session, &item).unwrap();

    assert_eq!(function.count_params(), 2);
    assert!(module.get_function("add").is_some());
    assert!(session.lookup_proto("add").is_some());
}

#[test]
fn extern_declares_without_a_body() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("extern sin(x)", &mut session);
    let function = gen_item(&mut compiler, &mut session, &item).unwrap();

    assert_eq!(function.count_basic_blocks(), 0);
    assert!(session.lookup_proto("sin").is_some());
}

#[test]
fn unknown_variable_in_body() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("def broken(x) y", &mut session);
    let error = gen_item(&mut compiler, &mut session, &item).unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorImpl::UnknownVariable { name } if name == "y"
    ));
    // The failed function must not linger as a bodyless declaration with
    // a body attached later.
    assert!(module
        .get_function("broken")
        .map_or(true, |f| f.count_basic_blocks() == 0));
}

#[test]
fn assignment_needs_a_variable_target() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("def f(x) 1 = 2", &mut session);
    let error = gen_item(&mut compiler, &mut session, &item).unwrap_err();

    assert!(matches!(error.kind(), ErrorImpl::InvalidAssignmentTarget));
}

#[test]
fn call_arity_is_checked() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("def one(x) x", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    let item = parse_item("def f(x) one(x, x)", &mut session);
    let error = gen_item(&mut compiler, &mut session, &item).unwrap_err();

    assert!(matches!(
        error.kind(),
        ErrorImpl::ArityMismatch { expected: 1, received: 2, .. }
    ));
}

#[test]
fn binary_operator_definition_installs_precedence() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    assert_eq!(session.precedence_of('|'), -1);

    let item = parse_item("def binary| 5 (a b) a + b", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    assert_eq!(session.precedence_of('|'), 5);
    assert!(module.get_function("binary|").is_some());
}

#[test]
fn failed_operator_definition_rolls_back_precedence() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    // The body calls a function that does not exist, so generation fails
    // after the precedence was provisionally installed.
    let item = parse_item("def binary| 5 (a b) nope(a, b)", &mut session);
    assert!(gen_item(&mut compiler, &mut session, &item).is_err());

    assert_eq!(session.precedence_of('|'), -1);
}

#[test]
fn failed_operator_redefinition_keeps_the_displaced_precedence() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    // `+` is a builtin; when its redefinition fails, the rollback must put
    // the old precedence back rather than drop `+` from the table.
    let item = parse_item("def binary+ 7 (a b) nope(a, b)", &mut session);
    assert!(gen_item(&mut compiler, &mut session, &item).is_err());

    assert_eq!(session.precedence_of('+'), 20);
}

#[test]
fn redefining_a_generated_function_is_rejected() {
    let context = Context::create();
    let mut session = Session::new();

    let first = context.create_module("unit0");
    let mut compiler = Compiler::new(&context, &first);
    let item = parse_item("def f(x) x + 1", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    // A second body in a later unit would never be resolved by the engine,
    // so it is rejected instead of silently shadowed.
    let second = context.create_module("unit1");
    let mut compiler = Compiler::new(&context, &second);
    let item = parse_item("def f(x) x + 2", &mut session);
    let error = gen_item(&mut compiler, &mut session, &item).unwrap_err();

    assert!(matches!(error.kind(), ErrorImpl::BackendError { .. }));
    assert!(second.get_function("f").is_none());
}

#[test]
fn failed_definition_can_be_retried() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("def g(x) nope(x)", &mut session);
    assert!(gen_item(&mut compiler, &mut session, &item).is_err());

    // The failure must not count as a definition of `g`.
    let item = parse_item("def g(x) x + 1", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    assert!(module.get_function("g").unwrap().count_basic_blocks() > 0);
}

#[test]
fn cross_unit_calls_redeclare_from_the_cache() {
    let context = Context::create();
    let mut session = Session::new();

    let first = context.create_module("unit0");
    let mut compiler = Compiler::new(&context, &first);
    let item = parse_item("def double(x) x + x", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    // A later unit sees `double` through the prototype cache even though
    // its own module never defined it.
    let second = context.create_module("unit1");
    let mut compiler = Compiler::new(&context, &second);
    let item = parse_item("def quad(x) double(double(x))", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    let declared = second.get_function("double").unwrap();
    assert_eq!(declared.count_basic_blocks(), 0);
}

#[test]
fn arity_conflict_with_cached_prototype() {
    let context = Context::create();
    let module = context.create_module("test");
    let mut compiler = Compiler::new(&context, &module);
    let mut session = Session::new();

    let item = parse_item("extern sin(x)", &mut session);
    gen_item(&mut compiler, &mut session, &item).unwrap();

    let item = parse_item("def sin(a b) a", &mut session);
    let error = gen_item(&mut compiler, &mut session, &item).unwrap_err();

    assert!(matches!(error.kind(), ErrorImpl::BackendError { .. }));
}

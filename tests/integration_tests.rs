//! End-to-end tests: source text through the lexer, parser, code generator,
//! and the JIT execution engine.

use inkwell::context::Context;
use kaleido::{
    errors::errors::{Error, ErrorImpl},
    lexer::source::BufferedSource,
    session::driver::{AotSession, JitSession, UnitOutcome},
};

/// Runs every unit in `source` through a fresh JIT session, collecting the
/// per-unit results until end of input.
fn run_units(source: &str) -> Vec<Result<UnitOutcome, Error>> {
    let context = Context::create();
    let buffered =
        BufferedSource::new(source.to_string(), Some("test.kpe".to_string())).unwrap();
    let mut session = JitSession::new(&context, Box::new(buffered)).unwrap();

    let mut outcomes = vec![];
    loop {
        match session.run_one() {
            Ok(UnitOutcome::End) => break,
            other => outcomes.push(other),
        }
    }
    outcomes
}

/// Like `run_units`, but every unit must succeed; returns only the values
/// of the anonymous expressions.
fn eval(source: &str) -> Vec<f64> {
    run_units(source)
        .into_iter()
        .map(|outcome| outcome.unwrap())
        .filter_map(|outcome| match outcome {
            UnitOutcome::Evaluated(value) => Some(value),
            _ => None,
        })
        .collect()
}

#[test]
fn evaluates_arithmetic() {
    assert_eq!(eval("4 + 5;"), vec![9.0]);
    assert_eq!(eval("2 * 3 + 1;"), vec![7.0]);
}

#[test]
fn reevaluating_the_same_expression_works() {
    // Each anonymous expression is unloaded after it runs, so the second
    // one must not collide with the first.
    assert_eq!(eval("4 + 5; 4 + 5;"), vec![9.0, 9.0]);
}

#[test]
fn comparison_and_precedence() {
    // ((1 - (2*3)) < 10) is true, which is 1.0
    assert_eq!(eval("1 - 2*3 < 10;"), vec![1.0]);
    assert_eq!(eval("10 < 1;"), vec![0.0]);
}

#[test]
fn if_selects_an_arm() {
    assert_eq!(eval("if 1 then 42 else 0;"), vec![42.0]);
    assert_eq!(eval("if 0 then 42 else 7;"), vec![7.0]);
}

#[test]
fn recursive_definition_across_units() {
    let outcomes = run_units("def fib(x) if x < 3 then 1 else fib(x-1) + fib(x-2); fib(10);");

    assert_eq!(
        outcomes[0].as_ref().unwrap(),
        &UnitOutcome::Defined("fib".to_string())
    );
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(55.0));
}

#[test]
fn cross_unit_call() {
    assert_eq!(eval("def double(x) x + x; double(21);"), vec![42.0]);
}

#[test]
fn for_loop_accumulates_through_a_mutable_variable() {
    // The condition sees the incremented variable, so `i = 1, i < 5` runs
    // the body for i = 1, 2, 3, 4.
    assert_eq!(
        eval("def sumto(n) var s = 0 in (for i = 1, i < n in s = s + i) + s; sumto(5);"),
        vec![10.0]
    );
}

#[test]
fn for_loop_value_is_zero() {
    assert_eq!(eval("for i = 1, i < 3 in i;"), vec![0.0]);
}

#[test]
fn for_loop_iteration_count() {
    // One body execution per i in 1..5, counted through a mutable outer
    // binding.
    assert_eq!(
        eval("var s = 0 in (for i = 1, i < 5, 1.0 in s = s + 1) + s;"),
        vec![4.0]
    );
}

#[test]
fn var_shadowing_restores_the_outer_binding() {
    // Inner x is initialized from outer x, the outer one comes back after
    // the inner scope closes: (1 + 1) + 1.
    assert_eq!(
        eval("var x = 1 in (var x = x + 1 in x) + x;"),
        vec![3.0]
    );
}

#[test]
fn assignment_yields_the_stored_value() {
    // (x = x + 1) evaluates to 2 and x reads back as 2 afterwards.
    assert_eq!(eval("def bump(x) (x = x + 1) + x; bump(1);"), vec![4.0]);
}

#[test]
fn user_defined_binary_operator() {
    let source = "\
        def binary| 5 (a b) if a then 1 else if b then 1 else 0;\n\
        1 | 0;\n\
        0 | 0;\n";

    assert_eq!(eval(source), vec![1.0, 0.0]);
}

#[test]
fn user_defined_unary_operator() {
    assert_eq!(
        eval("def unary!(v) if v then 0 else 1; !0; !7;"),
        vec![1.0, 0.0]
    );
}

#[test]
fn failed_operator_definition_leaves_no_trace_in_the_grammar() {
    // The definition fails in code generation, so `|` must still be an
    // unknown operator afterwards: `1 | 2` evaluates the `1`, then the
    // dangling `| 2` is a syntax error.
    let outcomes = run_units("def binary| 5 (a b) nope(a, b); 1 | 2;");

    assert!(matches!(
        outcomes[0].as_ref().unwrap_err().kind(),
        ErrorImpl::UnknownFunction { name } if name == "nope"
    ));
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(1.0));
    assert!(outcomes[2].is_err());
}

#[test]
fn failed_builtin_operator_redefinition_keeps_the_grammar() {
    // The failing `binary+` displaced the builtin precedence while its body
    // generated; afterwards `+` must still parse and evaluate as before.
    let outcomes = run_units("def binary+ 7 (a b) nope(a, b); 1 + 2;");

    assert!(outcomes[0].is_err());
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(3.0));
}

#[test]
fn redefining_a_resident_function_is_rejected() {
    // The engine would keep calling the first body anyway, so the second
    // `def f` is an error and the original keeps answering.
    let outcomes = run_units("def f(x) x + 1; f(1); def f(x) x + 2; f(1);");

    assert_eq!(
        outcomes[0].as_ref().unwrap(),
        &UnitOutcome::Defined("f".to_string())
    );
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(2.0));
    assert!(matches!(
        outcomes[2].as_ref().unwrap_err().kind(),
        ErrorImpl::BackendError { .. }
    ));
    assert_eq!(outcomes[3].as_ref().unwrap(), &UnitOutcome::Evaluated(2.0));
}

#[test]
fn failed_definition_does_not_block_a_retry() {
    let outcomes = run_units("def g(x) nope(x); def g(x) x + 1; g(1);");

    assert!(outcomes[0].is_err());
    assert_eq!(
        outcomes[1].as_ref().unwrap(),
        &UnitOutcome::Defined("g".to_string())
    );
    assert_eq!(outcomes[2].as_ref().unwrap(), &UnitOutcome::Evaluated(2.0));
}

#[test]
fn assignment_to_a_non_variable_is_rejected() {
    let outcomes = run_units("1 = 2;");
    assert!(matches!(
        outcomes[0].as_ref().unwrap_err().kind(),
        ErrorImpl::InvalidAssignmentTarget
    ));
}

#[test]
fn arity_mismatch_is_rejected() {
    let outcomes = run_units("def one(x) x; one(1, 2);");
    assert!(matches!(
        outcomes[1].as_ref().unwrap_err().kind(),
        ErrorImpl::ArityMismatch {
            expected: 1,
            received: 2,
            ..
        }
    ));
}

#[test]
fn unknown_variable_is_reported_per_unit() {
    // The bad unit fails, the next one still runs.
    let outcomes = run_units("y + 1; 2 + 2;");

    assert!(matches!(
        outcomes[0].as_ref().unwrap_err().kind(),
        ErrorImpl::UnknownVariable { name } if name == "y"
    ));
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(4.0));
}

#[test]
fn runtime_intrinsic_resolves() {
    let outcomes = run_units("extern putchard(x); putchard(65);");

    assert_eq!(
        outcomes[0].as_ref().unwrap(),
        &UnitOutcome::Declared("putchard".to_string())
    );
    assert_eq!(outcomes[1].as_ref().unwrap(), &UnitOutcome::Evaluated(0.0));
}

#[test]
fn libm_extern_resolves() {
    assert_eq!(eval("extern sin(x); sin(0);"), vec![0.0]);
}

#[test]
fn aot_session_collects_without_executing() {
    let context = Context::create();
    let buffered = BufferedSource::new(
        "def double(x) x + x; 4 + 5;".to_string(),
        Some("test.kpe".to_string()),
    )
    .unwrap();
    let mut session = AotSession::new(&context, Box::new(buffered), "test.kpe").unwrap();

    assert_eq!(
        session.run_one().unwrap(),
        UnitOutcome::Defined("double".to_string())
    );
    // Anonymous expressions compile but are never run in batch mode.
    assert!(matches!(
        session.run_one().unwrap(),
        UnitOutcome::Defined(name) if name.starts_with("__anon_expr")
    ));
    assert_eq!(session.run_one().unwrap(), UnitOutcome::End);

    assert!(session.module.get_function("double").is_some());
    assert!(session.module.get_function("__anon_expr0").is_some());
}

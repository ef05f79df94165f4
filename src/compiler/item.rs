//! Top-level unit generation: externs and function definitions.

use inkwell::values::FunctionValue;

use crate::{
    ast::ast::{Function, Item, Prototype},
    errors::errors::{Error, ErrorImpl},
    session::session::Session,
};

use super::{compiler::Compiler, expr::gen_expr};

pub fn gen_item<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &mut Session,
    item: &Item,
) -> Result<FunctionValue<'ctx>, Error> {
    match item {
        Item::Extern(proto) => gen_extern(compiler, session, proto),
        Item::Definition(function) => gen_function(compiler, session, function),
    }
}

/// An extern contributes a declaration and a cached prototype; the symbol
/// itself resolves at execution time (libm, or one of the built-in runtime
/// functions).
fn gen_extern<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &mut Session,
    proto: &Prototype,
) -> Result<FunctionValue<'ctx>, Error> {
    check_arity_against_cache(session, proto)?;
    session.register_proto(proto.clone());
    Ok(compiler.declare_prototype(proto))
}

/// Generates a function body.
///
/// The prototype is cached before the body so recursive calls resolve, and
/// a `binary<op>` precedence is installed before the body so the operator
/// can appear in its own definition. Both are kept on success; the
/// precedence is rolled back to its previous entry when generation fails,
/// so the parser never accepts an operator without a function behind it
/// and a failed redefinition cannot knock out a working one.
pub fn gen_function<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &mut Session,
    function: &Function,
) -> Result<FunctionValue<'ctx>, Error> {
    let proto = &function.proto;

    check_arity_against_cache(session, proto)?;

    // The engine keeps resolving a symbol out of the module that first
    // defined it, so a second body would be dead on arrival.
    if session.is_defined(&proto.name) {
        return Err(Error::new(
            ErrorImpl::BackendError {
                message: format!("function `{}` is already defined", proto.name),
            },
            proto.span.start.clone(),
        ));
    }

    session.register_proto(proto.clone());

    let installed_operator = if proto.is_binary_op() {
        let op = proto.operator_char();
        let displaced = session.install_operator(op, proto.precedence);
        Some((op, displaced))
    } else {
        None
    };

    let fn_value = match compiler.get_function(&proto.name, session) {
        Some(existing) => existing,
        None => compiler.declare_prototype(proto),
    };

    let entry = compiler.context.append_basic_block(fn_value, "entry");
    compiler.builder.position_at_end(entry);

    // Parameters get stack slots like any other mutable variable; mem2reg
    // cleans the loads back up.
    compiler.variables.clear();
    for (param, name) in fn_value.get_param_iter().zip(proto.params.iter()) {
        let alloca = compiler.create_entry_block_alloca(fn_value, name);
        compiler
            .builder
            .build_store(alloca, param.into_float_value())
            .unwrap();
        compiler.variables.define(name, alloca);
    }

    let body = match gen_expr(compiler, session, &function.body) {
        Ok(value) => value,
        Err(error) => {
            // A half-built function must not stay in the module.
            unsafe { fn_value.delete() };
            rollback_operator(session, installed_operator);
            return Err(error);
        }
    };

    compiler.builder.build_return(Some(&body)).unwrap();

    if !fn_value.verify(true) {
        unsafe { fn_value.delete() };
        rollback_operator(session, installed_operator);
        return Err(Error::new(
            ErrorImpl::BackendError {
                message: format!("function `{}` failed LLVM verification", proto.name),
            },
            proto.span.start.clone(),
        ));
    }

    compiler.fpm.run_on(&fn_value);
    session.mark_defined(&proto.name);

    Ok(fn_value)
}

fn rollback_operator(session: &mut Session, installed: Option<(char, Option<i32>)>) {
    if let Some((op, previous)) = installed {
        session.restore_operator(op, previous);
    }
}

/// A name keeps the arity of its first declaration; re-declaring `sin(x)`
/// as `sin(a b)` is rejected rather than silently shadowed.
fn check_arity_against_cache(session: &Session, proto: &Prototype) -> Result<(), Error> {
    if let Some(known) = session.lookup_proto(&proto.name) {
        if known.params.len() != proto.params.len() {
            return Err(Error::new(
                ErrorImpl::BackendError {
                    message: format!(
                        "`{}` was previously declared with {} parameter(s), not {}",
                        proto.name,
                        known.params.len(),
                        proto.params.len()
                    ),
                },
                proto.span.start.clone(),
            ));
        }
    }
    Ok(())
}

//! Expression code generation. Everything evaluates to an `f64`.

use inkwell::{
    values::{BasicMetadataValueEnum, FloatValue},
    FloatPredicate,
};

use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
    session::session::Session,
};

use super::compiler::Compiler;

pub fn gen_expr<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &Session,
    expr: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    match expr {
        Expr::Number { value, .. } => Ok(compiler.context.f64_type().const_float(*value)),

        Expr::Variable { name, span } => match compiler.variables.get(name) {
            Some(alloca) => Ok(compiler
                .builder
                .build_load(alloca, name)
                .unwrap()
                .into_float_value()),
            None => Err(Error::new(
                ErrorImpl::UnknownVariable { name: name.clone() },
                span.start.clone(),
            )),
        },

        Expr::Unary { op, operand, span } => {
            let operand = gen_expr(compiler, session, operand)?;

            let name = format!("unary{}", op);
            let function = compiler.get_function(&name, session).ok_or_else(|| {
                Error::new(ErrorImpl::UnknownOperator { op: *op }, span.start.clone())
            })?;

            Ok(compiler
                .builder
                .build_call(function, &[operand.into()], "unop")
                .unwrap()
                .try_as_basic_value()
                .left()
                .unwrap()
                .into_float_value())
        }

        Expr::Binary {
            op: '=',
            lhs,
            rhs,
            span,
        } => gen_assignment(compiler, session, lhs, rhs, span),

        Expr::Binary {
            op, lhs, rhs, span, ..
        } => {
            let lhs = gen_expr(compiler, session, lhs)?;
            let rhs = gen_expr(compiler, session, rhs)?;

            match op {
                '+' => Ok(compiler.builder.build_float_add(lhs, rhs, "addtmp").unwrap()),
                '-' => Ok(compiler.builder.build_float_sub(lhs, rhs, "subtmp").unwrap()),
                '*' => Ok(compiler.builder.build_float_mul(lhs, rhs, "multmp").unwrap()),
                '<' => {
                    let cmp = compiler
                        .builder
                        .build_float_compare(FloatPredicate::ULT, lhs, rhs, "cmptmp")
                        .unwrap();
                    // Comparisons produce 0.0 or 1.0 like every other value.
                    Ok(compiler
                        .builder
                        .build_unsigned_int_to_float(cmp, compiler.context.f64_type(), "booltmp")
                        .unwrap())
                }
                _ => {
                    let name = format!("binary{}", op);
                    let function = compiler.get_function(&name, session).ok_or_else(|| {
                        Error::new(ErrorImpl::UnknownOperator { op: *op }, span.start.clone())
                    })?;

                    Ok(compiler
                        .builder
                        .build_call(function, &[lhs.into(), rhs.into()], "binop")
                        .unwrap()
                        .try_as_basic_value()
                        .left()
                        .unwrap()
                        .into_float_value())
                }
            }
        }

        Expr::Call { callee, args, span } => {
            let function = compiler.get_function(callee, session).ok_or_else(|| {
                Error::new(
                    ErrorImpl::UnknownFunction {
                        name: callee.clone(),
                    },
                    span.start.clone(),
                )
            })?;

            let expected = function.count_params() as usize;
            if expected != args.len() {
                return Err(Error::new(
                    ErrorImpl::ArityMismatch {
                        name: callee.clone(),
                        expected,
                        received: args.len(),
                    },
                    span.start.clone(),
                ));
            }

            let mut arg_values: Vec<BasicMetadataValueEnum> = Vec::with_capacity(args.len());
            for arg in args {
                arg_values.push(gen_expr(compiler, session, arg)?.into());
            }

            Ok(compiler
                .builder
                .build_call(function, &arg_values, "calltmp")
                .unwrap()
                .try_as_basic_value()
                .left()
                .unwrap()
                .into_float_value())
        }

        Expr::If {
            cond,
            then_expr,
            else_expr,
            ..
        } => gen_if(compiler, session, cond, then_expr, else_expr),

        Expr::For {
            var_name,
            start,
            end,
            step,
            body,
            ..
        } => gen_for(compiler, session, var_name, start, end, step.as_deref(), body),

        Expr::Var { bindings, body, .. } => gen_var(compiler, session, bindings, body),
    }
}

/// `lhs = rhs` stores through the variable's stack slot and yields the
/// stored value.
fn gen_assignment<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &Session,
    lhs: &Expr,
    rhs: &Expr,
    span: &crate::Span,
) -> Result<FloatValue<'ctx>, Error> {
    // Only a plain variable can be assigned to; `(a) = 1` or `1 = 2` cannot.
    let name = match lhs {
        Expr::Variable { name, .. } => name,
        _ => {
            return Err(Error::new(
                ErrorImpl::InvalidAssignmentTarget,
                lhs.span().start.clone(),
            ))
        }
    };

    let value = gen_expr(compiler, session, rhs)?;

    let alloca = compiler.variables.get(name).ok_or_else(|| {
        Error::new(
            ErrorImpl::UnknownVariable { name: name.clone() },
            span.start.clone(),
        )
    })?;

    compiler.builder.build_store(alloca, value).unwrap();
    Ok(value)
}

/// Nonzero condition selects the then arm. The phi's incoming blocks are
/// wherever each arm's generation actually ended, not the blocks the arms
/// started in; a nested `if` moves the insertion point.
fn gen_if<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &Session,
    cond: &Expr,
    then_expr: &Expr,
    else_expr: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let zero = compiler.context.f64_type().const_float(0.0);

    let cond_value = gen_expr(compiler, session, cond)?;
    let cond_bool = compiler
        .builder
        .build_float_compare(FloatPredicate::ONE, cond_value, zero, "ifcond")
        .unwrap();

    let function = compiler
        .builder
        .get_insert_block()
        .unwrap()
        .get_parent()
        .unwrap();

    let then_block = compiler.context.append_basic_block(function, "then");
    let else_block = compiler.context.append_basic_block(function, "else");
    let merge_block = compiler.context.append_basic_block(function, "ifcont");

    compiler
        .builder
        .build_conditional_branch(cond_bool, then_block, else_block)
        .unwrap();

    compiler.builder.position_at_end(then_block);
    let then_value = gen_expr(compiler, session, then_expr)?;
    compiler
        .builder
        .build_unconditional_branch(merge_block)
        .unwrap();
    let then_exit = compiler.builder.get_insert_block().unwrap();

    compiler.builder.position_at_end(else_block);
    let else_value = gen_expr(compiler, session, else_expr)?;
    compiler
        .builder
        .build_unconditional_branch(merge_block)
        .unwrap();
    let else_exit = compiler.builder.get_insert_block().unwrap();

    compiler.builder.position_at_end(merge_block);
    let phi = compiler
        .builder
        .build_phi(compiler.context.f64_type(), "iftmp")
        .unwrap();
    phi.add_incoming(&[(&then_value, then_exit), (&else_value, else_exit)]);

    Ok(phi.as_basic_value().into_float_value())
}

/// The induction variable is a stack slot, so the body may assign to it.
/// It shadows any same-named outer binding for the extent of the loop.
/// The loop itself always evaluates to 0.0.
fn gen_for<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &Session,
    var_name: &str,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    body: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let f64_type = compiler.context.f64_type();

    let function = compiler
        .builder
        .get_insert_block()
        .unwrap()
        .get_parent()
        .unwrap();

    let alloca = compiler.create_entry_block_alloca(function, var_name);
    let start_value = gen_expr(compiler, session, start)?;
    compiler.builder.build_store(alloca, start_value).unwrap();

    let loop_block = compiler.context.append_basic_block(function, "loop");
    compiler
        .builder
        .build_unconditional_branch(loop_block)
        .unwrap();
    compiler.builder.position_at_end(loop_block);

    let checkpoint = compiler.variables.mark();
    compiler.variables.define(var_name, alloca);

    // Body value is discarded.
    gen_expr(compiler, session, body)?;

    let step_value = match step {
        Some(step) => gen_expr(compiler, session, step)?,
        None => f64_type.const_float(1.0),
    };

    // Reload rather than reuse: the body may have assigned to the variable.
    // The increment lands before the end condition, so the condition sees
    // the value the next iteration would run with.
    let current = compiler
        .builder
        .build_load(alloca, var_name)
        .unwrap()
        .into_float_value();
    let next = compiler
        .builder
        .build_float_add(current, step_value, "nextvar")
        .unwrap();
    compiler.builder.build_store(alloca, next).unwrap();

    let end_value = gen_expr(compiler, session, end)?;

    let end_cond = compiler
        .builder
        .build_float_compare(
            FloatPredicate::ONE,
            end_value,
            f64_type.const_float(0.0),
            "loopcond",
        )
        .unwrap();

    let after_block = compiler.context.append_basic_block(function, "afterloop");
    compiler
        .builder
        .build_conditional_branch(end_cond, loop_block, after_block)
        .unwrap();
    compiler.builder.position_at_end(after_block);

    compiler.variables.restore_to(checkpoint);

    Ok(f64_type.const_float(0.0))
}

/// `var` binds each name to a fresh slot for the extent of `body`. Each
/// initializer runs before its own name is bound, so `var x = x in ...`
/// reads the outer `x`. A missing initializer means 0.0.
fn gen_var<'a, 'ctx>(
    compiler: &mut Compiler<'a, 'ctx>,
    session: &Session,
    bindings: &[(String, Option<Expr>)],
    body: &Expr,
) -> Result<FloatValue<'ctx>, Error> {
    let function = compiler
        .builder
        .get_insert_block()
        .unwrap()
        .get_parent()
        .unwrap();

    let checkpoint = compiler.variables.mark();

    for (name, init) in bindings {
        let init_value = match init {
            Some(init) => gen_expr(compiler, session, init)?,
            None => compiler.context.f64_type().const_float(0.0),
        };

        let alloca = compiler.create_entry_block_alloca(function, name);
        compiler.builder.build_store(alloca, init_value).unwrap();
        compiler.variables.define(name, alloca);
    }

    let body_value = gen_expr(compiler, session, body)?;

    compiler.variables.restore_to(checkpoint);

    Ok(body_value)
}

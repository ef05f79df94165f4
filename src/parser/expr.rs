use crate::{
    ast::ast::Expr,
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    session::session::Session,
    Span,
};

use super::parser::Parser;

/// expression ::= unary binoprhs
pub fn parse_expression(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    let lhs = parse_unary(parser, session)?;
    parse_bin_op_rhs(parser, session, 1, lhs)
}

/// Precedence climbing over the live operator table. Returns `lhs` untouched
/// as soon as the pending operator binds looser than `min_precedence`;
/// undefined operators look up as -1 and so always terminate the loop.
pub fn parse_bin_op_rhs(
    parser: &mut Parser,
    session: &Session,
    min_precedence: i32,
    mut lhs: Expr,
) -> Result<Expr, Error> {
    loop {
        let tok_precedence = pending_precedence(parser, session);
        if tok_precedence < min_precedence {
            return Ok(lhs);
        }

        let op = parser.advance()?.operator_char();
        let mut rhs = parse_unary(parser, session)?;

        // Left-associative by default: only recurse when the next operator
        // binds tighter than this one, and then with a strictly higher floor.
        let next_precedence = pending_precedence(parser, session);
        if tok_precedence < next_precedence {
            rhs = parse_bin_op_rhs(parser, session, tok_precedence + 1, rhs)?;
        }

        lhs = Expr::Binary {
            span: Span {
                start: lhs.span().start.clone(),
                end: rhs.span().end.clone(),
            },
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        };
    }
}

fn pending_precedence(parser: &Parser, session: &Session) -> i32 {
    if parser.current_token_kind() == TokenKind::Operator {
        session.precedence_of(parser.current_token().operator_char())
    } else {
        -1
    }
}

/// unary ::= primary | <op> unary
pub fn parse_unary(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    if parser.current_token_kind() != TokenKind::Operator {
        return parse_primary(parser, session);
    }

    let token = parser.advance()?;
    let operand = parse_unary(parser, session)?;

    Ok(Expr::Unary {
        span: Span {
            start: token.span.start.clone(),
            end: operand.span().end.clone(),
        },
        op: token.operator_char(),
        operand: Box::new(operand),
    })
}

/// primary ::= number | '(' expression ')' | identifier-or-call
///           | if-expr | for-expr | var-expr
pub fn parse_primary(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    match parser.current_token_kind() {
        TokenKind::Number => {
            let token = parser.current_token().clone();
            let result = token.value.parse();

            match result {
                Err(_) => Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    parser.get_position(),
                )),
                Ok(value) => Ok(Expr::Number {
                    value,
                    span: parser.advance()?.span,
                }),
            }
        }
        TokenKind::OpenParen => {
            parser.advance()?;
            let expr = parse_expression(parser, session)?;
            parser.expect(TokenKind::CloseParen)?;
            Ok(expr)
        }
        TokenKind::Identifier => parse_identifier_expr(parser, session),
        TokenKind::If => parse_if_expr(parser, session),
        TokenKind::For => parse_for_expr(parser, session),
        TokenKind::Var => parse_var_expr(parser, session),
        _ => Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected an expression"),
            },
            parser.get_position(),
        )),
    }
}

/// A bare identifier is a variable reference unless a `(` follows, which
/// makes it a call with comma-separated arguments.
fn parse_identifier_expr(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    let name_token = parser.advance()?;

    if parser.current_token_kind() != TokenKind::OpenParen {
        return Ok(Expr::Variable {
            name: name_token.value,
            span: name_token.span,
        });
    }

    parser.advance()?;
    let mut args = vec![];

    if parser.current_token_kind() != TokenKind::CloseParen {
        loop {
            args.push(parse_expression(parser, session)?);

            if parser.current_token_kind() != TokenKind::Comma {
                break;
            }
            parser.advance()?;
        }
    }

    let close = parser.expect(TokenKind::CloseParen)?;

    Ok(Expr::Call {
        callee: name_token.value,
        args,
        span: Span {
            start: name_token.span.start,
            end: close.span.end,
        },
    })
}

/// if-expr ::= 'if' expression 'then' expression 'else' expression
fn parse_if_expr(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    let start = parser.advance()?.span.start;

    let cond = parse_expression(parser, session)?;
    parser.expect(TokenKind::Then)?;
    let then_expr = parse_expression(parser, session)?;
    parser.expect(TokenKind::Else)?;
    let else_expr = parse_expression(parser, session)?;

    Ok(Expr::If {
        span: Span {
            start,
            end: else_expr.span().end.clone(),
        },
        cond: Box::new(cond),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
    })
}

/// for-expr ::= 'for' identifier '=' expression ',' expression (',' expression)?
///              'in' expression
fn parse_for_expr(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    let start = parser.advance()?.span.start;

    let error = Error::new(
        ErrorImpl::UnexpectedTokenDetailed {
            token: parser.current_token().value.clone(),
            message: String::from("expected an induction variable after `for`"),
        },
        parser.get_position(),
    );
    let var_name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    if !parser.current_is_operator('=') {
        return Err(Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected `=` after the induction variable"),
            },
            parser.get_position(),
        ));
    }
    parser.advance()?;

    let start_expr = parse_expression(parser, session)?;
    parser.expect(TokenKind::Comma)?;
    let end_expr = parse_expression(parser, session)?;

    let step = if parser.current_token_kind() == TokenKind::Comma {
        parser.advance()?;
        Some(Box::new(parse_expression(parser, session)?))
    } else {
        None
    };

    parser.expect(TokenKind::In)?;
    let body = parse_expression(parser, session)?;

    Ok(Expr::For {
        span: Span {
            start,
            end: body.span().end.clone(),
        },
        var_name,
        start: Box::new(start_expr),
        end: Box::new(end_expr),
        step,
        body: Box::new(body),
    })
}

/// var-expr ::= 'var' identifier ('=' expression)?
///                    (',' identifier ('=' expression)?)* 'in' expression
fn parse_var_expr(parser: &mut Parser, session: &Session) -> Result<Expr, Error> {
    let start = parser.advance()?.span.start;

    let mut bindings = vec![];

    loop {
        let error = Error::new(
            ErrorImpl::UnexpectedTokenDetailed {
                token: parser.current_token().value.clone(),
                message: String::from("expected an identifier after `var`"),
            },
            parser.get_position(),
        );
        let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

        let init = if parser.current_is_operator('=') {
            parser.advance()?;
            Some(parse_expression(parser, session)?)
        } else {
            None
        };

        bindings.push((name, init));

        if parser.current_token_kind() != TokenKind::Comma {
            break;
        }
        parser.advance()?;
    }

    parser.expect(TokenKind::In)?;
    let body = parse_expression(parser, session)?;

    Ok(Expr::Var {
        span: Span {
            start,
            end: body.span().end.clone(),
        },
        bindings,
        body: Box::new(body),
    })
}

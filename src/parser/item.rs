use crate::{
    ast::ast::{Function, Item, Prototype},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    session::session::Session,
    Span,
};

use super::{expr::parse_expression, parser::Parser};

/// Parses one top-level unit: a `def`, an `extern`, or a bare expression
/// wrapped as an anonymous zero-parameter function. Returns `None` at end of
/// input. Stray `;` separators are skipped.
///
/// Every failure is local to the unit; the caller resynchronizes and keeps
/// going. The precedence table is only read here — a `def binary<op>` does
/// not change the grammar until its code generation succeeds.
pub fn parse_top_level_unit(
    parser: &mut Parser,
    session: &mut Session,
) -> Result<Option<Item>, Error> {
    while parser.current_token_kind() == TokenKind::Semicolon {
        parser.advance()?;
    }

    match parser.current_token_kind() {
        TokenKind::Eof => Ok(None),
        TokenKind::Def => Ok(Some(Item::Definition(parse_definition(parser, session)?))),
        TokenKind::Extern => Ok(Some(Item::Extern(parse_extern(parser)?))),
        _ => Ok(Some(Item::Definition(parse_top_level_expr(
            parser, session,
        )?))),
    }
}

/// definition ::= 'def' prototype expression
pub fn parse_definition(parser: &mut Parser, session: &mut Session) -> Result<Function, Error> {
    parser.expect(TokenKind::Def)?;
    let proto = parse_prototype(parser)?;
    let body = parse_expression(parser, session)?;

    Ok(Function {
        proto,
        body,
        is_anonymous: false,
    })
}

/// external ::= 'extern' prototype
pub fn parse_extern(parser: &mut Parser) -> Result<Prototype, Error> {
    parser.expect(TokenKind::Extern)?;
    parse_prototype(parser)
}

/// A bare expression becomes a synthetic zero-parameter function with a
/// unique name, so the session can look its symbol up after generation.
pub fn parse_top_level_expr(parser: &mut Parser, session: &mut Session) -> Result<Function, Error> {
    let body = parse_expression(parser, session)?;

    let proto = Prototype {
        name: session.next_anon_name(),
        params: vec![],
        is_operator: false,
        precedence: 0,
        span: body.span().clone(),
    };

    Ok(Function {
        proto,
        body,
        is_anonymous: true,
    })
}

/// prototype ::= identifier '(' identifier* ')'
///             | 'unary' <op> '(' identifier ')'
///             | 'binary' <op> number? '(' identifier identifier ')'
///
/// Parameters are whitespace-separated. Operator prototypes encode the
/// operator in their name (`unary!`, `binary|`); arity is checked here so a
/// bad operator definition never reaches the code generator.
pub fn parse_prototype(parser: &mut Parser) -> Result<Prototype, Error> {
    let start = parser.get_position();

    let (name, operator_arity, precedence) = match parser.current_token_kind() {
        TokenKind::Identifier => (parser.advance()?.value, 0, 30),
        TokenKind::Unary => {
            parser.advance()?;
            let op = expect_operator_char(parser)?;
            (format!("unary{}", op), 1, 30)
        }
        TokenKind::Binary => {
            parser.advance()?;
            let op = expect_operator_char(parser)?;

            let precedence = if parser.current_token_kind() == TokenKind::Number {
                let token = parser.advance()?;
                let value: f64 = token.value.parse().map_err(|_| {
                    Error::new(
                        ErrorImpl::NumberParseError {
                            token: token.value.clone(),
                        },
                        token.span.start.clone(),
                    )
                })?;

                if !(1.0..=100.0).contains(&value) {
                    return Err(Error::new(
                        ErrorImpl::MalformedPrototype {
                            message: String::from("operator precedence must be 1..=100"),
                        },
                        token.span.start.clone(),
                    ));
                }
                value as i32
            } else {
                30
            };

            (format!("binary{}", op), 2, precedence)
        }
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: parser.current_token().value.clone(),
                    message: String::from("expected a function name in prototype"),
                },
                parser.get_position(),
            ))
        }
    };

    parser.expect(TokenKind::OpenParen)?;

    let mut params = vec![];
    while parser.current_token_kind() == TokenKind::Identifier {
        params.push(parser.advance()?.value);
    }

    let close = parser.expect(TokenKind::CloseParen)?;

    if operator_arity != 0 && params.len() != operator_arity {
        return Err(Error::new(
            ErrorImpl::MalformedPrototype {
                message: format!(
                    "operator `{}` must take exactly {} parameter(s), found {}",
                    name,
                    operator_arity,
                    params.len()
                ),
            },
            start,
        ));
    }

    Ok(Prototype {
        name,
        params,
        is_operator: operator_arity != 0,
        precedence,
        span: Span {
            start,
            end: close.span.end,
        },
    })
}

fn expect_operator_char(parser: &mut Parser) -> Result<char, Error> {
    if parser.current_token_kind() != TokenKind::Operator {
        return Err(Error::new(
            ErrorImpl::MalformedPrototype {
                message: format!(
                    "expected an operator character, found `{}`",
                    parser.current_token().value
                ),
            },
            parser.get_position(),
        ));
    }

    Ok(parser.advance()?.operator_char())
}

use std::fmt::Display;

use thiserror::Error;

use crate::Position;

#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn kind(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The taxonomy name reported to the user. All parser failures fold into
    /// `SyntaxError`; generator failures keep their specific names.
    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "SyntaxError",
            ErrorImpl::UnexpectedToken { .. } => "SyntaxError",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "SyntaxError",
            ErrorImpl::NumberParseError { .. } => "SyntaxError",
            ErrorImpl::MalformedPrototype { .. } => "SyntaxError",
            ErrorImpl::UnknownVariable { .. } => "UnknownVariable",
            ErrorImpl::UnknownFunction { .. } => "UnknownFunction",
            ErrorImpl::UnknownOperator { .. } => "UnknownOperator",
            ErrorImpl::ArityMismatch { .. } => "ArityMismatch",
            ErrorImpl::InvalidAssignmentTarget => "InvalidAssignmentTarget",
            ErrorImpl::BackendError { .. } => "BackendError",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => {
                ErrorTip::Suggestion(format!("invalid number literal: `{}`", token))
            }
            ErrorImpl::MalformedPrototype { message } => {
                ErrorTip::Suggestion(format!("malformed prototype: {}", message))
            }
            ErrorImpl::UnknownVariable { name } => {
                ErrorTip::Suggestion(format!("variable `{}` is not bound here", name))
            }
            ErrorImpl::UnknownFunction { name } => {
                ErrorTip::Suggestion(format!("function `{}` has not been declared", name))
            }
            ErrorImpl::UnknownOperator { op } => ErrorTip::Suggestion(format!(
                "operator `{}` has no definition, define it with `def binary{}` or `def unary{}`",
                op, op, op
            )),
            ErrorImpl::ArityMismatch {
                name,
                expected,
                received,
            } => ErrorTip::Suggestion(format!(
                "`{}` takes {} arguments, received {}",
                name, expected, received
            )),
            ErrorImpl::InvalidAssignmentTarget => ErrorTip::Suggestion(String::from(
                "the left side of `=` must be a plain variable",
            )),
            ErrorImpl::BackendError { message } => ErrorTip::Suggestion(message.clone()),
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("malformed prototype: {message:?}")]
    MalformedPrototype { message: String },
    #[error("unknown variable {name:?}")]
    UnknownVariable { name: String },
    #[error("unknown function {name:?}")]
    UnknownFunction { name: String },
    #[error("unknown operator {op:?}")]
    UnknownOperator { op: char },
    #[error("arity mismatch calling {name:?}: expected {expected:?}, received {received:?}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("destination of `=` must be a variable")]
    InvalidAssignmentTarget,
    #[error("backend error: {message:?}")]
    BackendError { message: String },
}

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::Position;

#[test]
fn test_parser_errors_report_as_syntax_error() {
    for error_impl in [
        ErrorImpl::UnrecognisedToken {
            token: String::from("\u{0}"),
        },
        ErrorImpl::UnexpectedToken {
            token: String::from(")"),
        },
        ErrorImpl::NumberParseError {
            token: String::from("1.2.3"),
        },
        ErrorImpl::MalformedPrototype {
            message: String::from("expected precedence"),
        },
    ] {
        let error = Error::new(error_impl, Position::null());
        assert_eq!(error.get_error_name(), "SyntaxError");
    }
}

#[test]
fn test_codegen_errors_keep_their_names() {
    let cases = [
        (
            ErrorImpl::UnknownVariable {
                name: String::from("x"),
            },
            "UnknownVariable",
        ),
        (
            ErrorImpl::UnknownFunction {
                name: String::from("f"),
            },
            "UnknownFunction",
        ),
        (ErrorImpl::UnknownOperator { op: '|' }, "UnknownOperator"),
        (
            ErrorImpl::ArityMismatch {
                name: String::from("f"),
                expected: 1,
                received: 2,
            },
            "ArityMismatch",
        ),
        (ErrorImpl::InvalidAssignmentTarget, "InvalidAssignmentTarget"),
        (
            ErrorImpl::BackendError {
                message: String::from("verification failed"),
            },
            "BackendError",
        ),
    ];

    for (error_impl, name) in cases {
        let error = Error::new(error_impl, Position::null());
        assert_eq!(error.get_error_name(), name);
    }
}

#[test]
fn test_tips_mention_the_offender() {
    let error = Error::new(
        ErrorImpl::UnknownVariable {
            name: String::from("count"),
        },
        Position::null(),
    );

    match error.get_tip() {
        ErrorTip::Suggestion(tip) => assert!(tip.contains("count")),
        ErrorTip::None => panic!("expected a suggestion"),
    }
}

#[test]
fn test_error_carries_position() {
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: String::from("then"),
        },
        Position(12, std::rc::Rc::new(String::from("test.kpe"))),
    );

    assert_eq!(error.get_position().0, 12);
    assert_eq!(*error.get_position().1, "test.kpe");
}

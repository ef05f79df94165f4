#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod compiler;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod session;

extern crate regex;

#[derive(Debug, Clone)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Finds the line containing a byte offset in `source`.
///
/// Returns (1-based line number, line text, column in characters within the
/// line), or None when the position lies outside the source. The column is
/// counted in characters rather than bytes so the caret lines up on lines
/// containing multi-byte characters. Streaming positions are best-effort,
/// so callers must tolerate the None case.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos >= source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            let column = line[..pos - start].chars().count();
            return Some((line_number, line.to_string(), column));
        }

        start = end;
        line_number += 1;
    }

    None
}

pub fn display_error(error: &Error, source: &str, file: &str) {
    /*
        Error: UnknownVariable (variable `y` is not bound here)
        -> mandel.kpe
           |
        20 | y + 1;
           | ^
    */

    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        eprintln!("Error: {}", error.get_error_name());
    } else {
        eprintln!("Error: {} ({})", error.get_error_name(), error.get_tip());
    }

    let (line, line_text, line_pos) = match get_line_at_position(source, position.0) {
        Some(found) => found,
        None => return,
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    eprintln!("-> {}", file);
    eprintln!("{:>padding$}", "|");

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    eprintln!("{} | {}", line_string, line_text_removed.trim_end());

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;

    eprintln!("{:>padding$} {:>arrows$}", "|", "^");
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "def one() 1;\ndef two() 2;\n";

        let (line_number, line, line_pos) = super::get_line_at_position(source, 4).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "def one() 1;\n");
        assert_eq!(line_pos, 4);

        let (line_number, line, line_pos) = super::get_line_at_position(source, 17).unwrap();
        assert_eq!(line_number, 2);
        assert_eq!(line, "def two() 2;\n");
        assert_eq!(line_pos, 4);
    }

    #[test]
    fn test_get_line_at_position_counts_characters() {
        // `α` is two bytes, so `β` starts at byte 5 but sits in column 4.
        let source = "α + β;\n";

        let (line_number, _, column) = super::get_line_at_position(source, 5).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(column, 4);
    }

    #[test]
    fn test_get_line_at_position_out_of_range() {
        assert!(super::get_line_at_position("1 + 2;", 400).is_none());
    }
}

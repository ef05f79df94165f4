use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::errors::errors::Error;
use crate::lexer::lexer::tokenize;
use crate::lexer::tokens::{Token, TokenKind};
use crate::{Position, Span};

/// One token at a time, on demand. The parser pulls from this; it never sees
/// where the characters came from.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, Error>;
}

/// Whole source held in memory and tokenized up front. Positions are exact
/// byte offsets into the buffer.
pub struct BufferedSource {
    tokens: Vec<Token>,
    pos: usize,
}

impl BufferedSource {
    pub fn new(source: String, file: Option<String>) -> Result<Self, Error> {
        let tokens = tokenize(source, file)?;
        Ok(BufferedSource { tokens, pos: 0 })
    }
}

impl TokenSource for BufferedSource {
    fn next_token(&mut self) -> Result<Token, Error> {
        // tokenize always appends Eof, which is then handed out forever.
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        Ok(token)
    }
}

/// Interactive source: reads one line at a time, runs it through the same
/// tokenizer, and shifts the positions by the bytes already consumed so
/// diagnostics stay roughly meaningful across lines.
pub struct StreamingSource<R: BufRead> {
    reader: R,
    file: Rc<String>,
    pending: VecDeque<Token>,
    consumed: u32,
    prompt: bool,
    done: bool,
}

impl<R: BufRead> StreamingSource<R> {
    pub fn new(reader: R, prompt: bool) -> Self {
        StreamingSource {
            reader,
            file: Rc::new(String::from("shell")),
            pending: VecDeque::new(),
            consumed: 0,
            prompt,
            done: false,
        }
    }

    fn eof_token(&self) -> Token {
        Token {
            kind: TokenKind::Eof,
            value: String::from("EOF"),
            span: Span {
                start: Position(self.consumed, Rc::clone(&self.file)),
                end: Position(self.consumed, Rc::clone(&self.file)),
            },
        }
    }

    fn refill(&mut self) -> Result<bool, Error> {
        if self.prompt {
            eprint!("ready> ");
            let _ = std::io::stderr().flush();
        }

        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => return Ok(false),
            Ok(_) => {}
            Err(_) => return Ok(false),
        }

        let base = self.consumed;
        self.consumed += line.len() as u32;

        let mut tokens = tokenize(line, Some((*self.file).clone()))?;
        tokens.pop(); // per-line Eof, the stream is not over

        for mut token in tokens {
            token.span.start.0 += base;
            token.span.end.0 += base;
            self.pending.push_back(token);
        }

        Ok(true)
    }
}

impl<R: BufRead> TokenSource for StreamingSource<R> {
    fn next_token(&mut self) -> Result<Token, Error> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }

            if self.done || !self.refill()? {
                self.done = true;
                return Ok(self.eof_token());
            }
        }
    }
}

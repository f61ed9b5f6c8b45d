//! The parser driver (§4.1): a forward-moving cursor over the
//! pre-tokenized array, shared by every production in this crate.
//!
//! Grounded on the teacher's own position-tracking idiom
//! (`ParserState`/`SourcePosition`, threaded through `parser.rs` and
//! `stylesheet.rs`) generalized to an explicit array cursor in the
//! style of Stormlicht's `web/core/src/css/syntax/parser.rs`, since the
//! teacher itself delegates cursor ownership to `cssparser::Parser` and
//! this core must own it directly per §3's "Parser state" model.

use crate::error::{Diagnostic, DiagnosticSink, OrderingViolation, ParserError, SourcePos};
use crate::import_record::ImportRecords;
use crate::token::{LexKind, LexToken};
use crate::token_tree::{self, ConvertOptions, TokenTree};

pub struct Driver<'a, S: DiagnosticSink> {
    tokens: &'a [LexToken],
    cursor: usize,
    prev_error: SourcePos,
    pub sink: &'a mut S,
    pub import_records: &'a mut ImportRecords,
}

impl<'a, S: DiagnosticSink> Driver<'a, S> {
    pub fn new(tokens: &'a [LexToken], sink: &'a mut S, import_records: &'a mut ImportRecords) -> Self {
        Driver { tokens, cursor: 0, prev_error: SourcePos::default(), sink, import_records }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: usize) {
        debug_assert!(cursor >= self.cursor || cursor <= self.tokens.len());
        self.cursor = cursor;
    }

    pub fn tokens(&self) -> &'a [LexToken] {
        self.tokens
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a [LexToken] {
        &self.tokens[start..end.min(self.tokens.len())]
    }

    /// The current token. Always valid: the array carries a trailing
    /// EOF sentinel, so the cursor never runs past the end.
    pub fn current(&self) -> &'a LexToken {
        self.at(self.cursor)
    }

    pub fn at(&self, index: usize) -> &'a LexToken {
        self.tokens.get(index).unwrap_or_else(|| self.tokens.last().expect("EOF sentinel"))
    }

    pub fn at_eof(&self) -> bool {
        self.current().kind == LexKind::Eof
    }

    pub fn advance(&mut self) -> &'a LexToken {
        let tok = self.current();
        if tok.kind != LexKind::Eof {
            self.cursor += 1;
        }
        tok
    }

    pub fn next(&mut self) -> &'a LexToken {
        self.advance()
    }

    pub fn peek(&self, kind: LexKind) -> bool {
        self.current().kind == kind
    }

    pub fn peek_at(&self, offset: usize, kind: LexKind) -> bool {
        self.at(self.cursor + offset).kind == kind
    }

    /// Advance iff the current token matches `kind`.
    pub fn eat(&mut self, kind: LexKind) -> bool {
        if self.peek(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advance iff the current token matches `kind`; otherwise emit a
    /// single "expected token" diagnostic and do not advance.
    pub fn expect(&mut self, kind: LexKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.unexpected_expecting(kind);
        false
    }

    /// Skip whitespace tokens (not comments — those never reach the
    /// lexical array, per §6).
    pub fn skip_whitespace(&mut self) {
        while self.peek(LexKind::Whitespace) {
            self.advance();
        }
    }

    pub fn prev_non_eof(&self) -> Option<&'a LexToken> {
        if self.cursor == 0 {
            None
        } else {
            Some(self.at(self.cursor - 1))
        }
    }

    /// Emit one "expected `kind`" diagnostic for the current token,
    /// per §4.1's shaping rules: a missing `;` right after whitespace
    /// attaches to the whitespace token's position with a literal
    /// message instead of describing the actually-found token.
    pub fn unexpected_expecting(&mut self, kind: LexKind) {
        let found = self.describe_current();
        let position = if kind == LexKind::Semicolon {
            if let Some(prev) = self.prev_non_eof() {
                if prev.kind == LexKind::Whitespace {
                    prev.start()
                } else {
                    self.current().start()
                }
            } else {
                self.current().start()
            }
        } else {
            self.current().start()
        };
        self.emit(ParserError::ExpectedToken { expected: kind, found }, position, None);
    }

    /// Emit one "unexpected token" diagnostic for the current token.
    pub fn unexpected(&mut self) {
        let found = self.describe_current();
        let position = self.current().start();
        self.emit(ParserError::UnexpectedToken(found), position, None);
    }

    pub fn error_ordering(&mut self, violation: OrderingViolation, position: SourcePos, note: Option<(String, SourcePos)>) {
        self.emit(ParserError::Ordering(violation), position, note);
    }

    pub fn error_at(&mut self, error: ParserError, position: SourcePos) {
        self.emit(error, position, None);
    }

    /// Consumes component values (balancing `(`, `{`, `[`, function
    /// opens against their closers) until a token in `stops` is seen at
    /// depth zero, or EOF. Returns the consumed `[start, end)` range;
    /// the stopping token itself is left unconsumed. Shared by every
    /// production that collects a prelude or a declaration value
    /// (§4.4, §4.5, §4.6) — each of those grammars only differs in
    /// which tokens stop it and what it does with the closer.
    pub fn consume_component_values_until(&mut self, stops: &[LexKind]) -> (usize, usize) {
        let start = self.cursor;
        let mut open_stack: Vec<LexKind> = Vec::new();

        loop {
            let tok = self.current();

            if open_stack.is_empty() && stops.contains(&tok.kind) {
                break;
            }
            if tok.kind == LexKind::Eof {
                break;
            }

            if let Some(closer) = tok.kind.closer_for_opener() {
                open_stack.push(closer);
                self.advance();
                continue;
            }

            if !open_stack.is_empty() && tok.kind == *open_stack.last().unwrap() {
                open_stack.pop();
                self.advance();
                continue;
            }

            self.advance();
        }

        (start, self.cursor)
    }

    fn describe_current(&self) -> String {
        let tok = self.current();
        match tok.kind {
            LexKind::Eof => "end of file".to_owned(),
            LexKind::Whitespace => "whitespace".to_owned(),
            LexKind::BadUrl => "a bad URL".to_owned(),
            LexKind::BadString => "a bad string".to_owned(),
            _ if tok.range.0 == tok.range.1 => tok.kind.describe().to_owned(),
            _ => format!("\"{}\"", tok.text),
        }
    }

    /// Emit a diagnostic, honoring the at-most-one-per-position rule
    /// (§4.1, §7): positions at or before `prev_error` are dropped.
    fn emit(&mut self, error: ParserError, position: SourcePos, note: Option<(String, SourcePos)>) {
        if position <= self.prev_error {
            return;
        }
        self.prev_error = position;
        self.sink.push(Diagnostic { error, position, note });
    }

    /// Converts an already-delimited `[start, end)` run into a
    /// [`TokenTree`], routing through the shared import-record
    /// collection and diagnostic sink.
    pub fn convert_range(&mut self, start: usize, end: usize, opts: &ConvertOptions) -> TokenTree {
        token_tree::convert(self.tokens, start, end, opts, self.sink, self.import_records)
    }
}

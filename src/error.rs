//! Diagnostic model for the parser core.
//!
//! Every production in this crate recovers from malformed input, so all
//! errors surfaced here are warnings in the sense of the calling
//! application: a [`Parse`](crate::parse) call never fails outright.
//! `ParserError` classifies *what* went wrong; [`Diagnostic`] pairs it
//! with a source position and an optional note, and is what actually
//! gets pushed to a [`DiagnosticSink`].

use std::fmt;

use crate::token::LexKind;

/// The taxonomy from the parsing-errors design: every variant here is
/// something the core recovers from and keeps parsing after.
#[derive(Debug, Clone, PartialEq)]
pub enum ParserError {
    /// A specific token kind was required and absent.
    ExpectedToken { expected: LexKind, found: String },
    /// No valid production begins at the current token.
    UnexpectedToken(String),
    /// `@charset` was not the first rule, or `@import` followed a
    /// non-import/non-charset rule.
    Ordering(OrderingViolation),
    /// `@namespace` was encountered; recognized but not implemented.
    Unsupported(&'static str),
    /// `@charset` declared something other than `"UTF-8"`.
    Encoding(String),
    /// An at-rule that requires a block was terminated with `;`/EOF, or
    /// an at-rule that forbids a block was given one.
    InvalidAtRuleBlockPresence { at_keyword: String, had_block: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingViolation {
    CharsetNotFirst,
    ImportAfterOtherRule,
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserError::ExpectedToken { expected, found } => {
                write!(f, "Expected {} but found {}", expected.describe(), found)
            }
            ParserError::UnexpectedToken(found) => write!(f, "Unexpected {}", found),
            ParserError::Ordering(OrderingViolation::CharsetNotFirst) => {
                write!(f, "@charset must be the first rule in the stylesheet")
            }
            ParserError::Ordering(OrderingViolation::ImportAfterOtherRule) => {
                write!(f, "@import rules must precede all rules other than @charset")
            }
            ParserError::Unsupported(feature) => write!(f, "{} is not supported", feature),
            ParserError::Encoding(found) => {
                write!(f, "@charset must declare \"UTF-8\", found \"{}\"", found)
            }
            ParserError::InvalidAtRuleBlockPresence { at_keyword, had_block: true } => {
                write!(f, "@{} does not take a block", at_keyword)
            }
            ParserError::InvalidAtRuleBlockPresence { at_keyword, had_block: false } => {
                write!(f, "@{} requires a block", at_keyword)
            }
        }
    }
}

/// A single byte offset into the source text. Kept as a plain newtype
/// rather than reaching for `cssparser::SourceLocation` (line/column)
/// since the core only ever needs to compare and attach positions, and
/// line/column projection is a presentation concern for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct SourcePos(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub error: ParserError,
    pub position: SourcePos,
    pub note: Option<(String, SourcePos)>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.error, self.position.0)?;
        if let Some((note, pos)) = &self.note {
            write!(f, " — note: {} (at {})", note, pos.0)?;
        }
        Ok(())
    }
}

/// Sink diagnostics are pushed to. Implementations are assumed safe to
/// call without interleaving from a single parse (the driver never
/// calls this from more than one logical thread of control).
pub trait DiagnosticSink {
    fn push(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics into a `Vec`, additionally mirroring each one to
/// the `log` facade at `warn` level so embedding applications that wire
/// up `env_logger`/`tracing-log` see parser diagnostics without reading
/// the returned vector.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!(target: "css_core::parser", "{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

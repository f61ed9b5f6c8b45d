//! The lexical token array and the bridge that produces it.
//!
//! Tokenization itself is out of scope for this crate (§1): `cssparser`
//! owns the actual lexical grammar. [`tokenize`] drives a
//! `cssparser::Parser` to completion and projects each token into
//! [`LexToken`], the flat array every production in this crate is
//! written against. This is the "narrow contract" the core requires of
//! its tokenizer collaborator — a finite, indexable array with a
//! trailing EOF, not a re-implementation of CSS tokenization.

use cssparser::{Parser, ParserInput, Token as CssToken};

use crate::error::SourcePos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexKind {
    Ident,
    AtKeyword,
    String,
    Url,
    BadString,
    BadUrl,
    Hash,
    Delim,
    Number,
    Percentage,
    Dimension,
    Function,
    Whitespace,
    Comma,
    Colon,
    Semicolon,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,
    Cdo,
    Cdc,
    Eof,
}

impl LexKind {
    pub fn describe(&self) -> &'static str {
        match self {
            LexKind::Ident => "an identifier",
            LexKind::AtKeyword => "an at-keyword",
            LexKind::String => "a string",
            LexKind::Url => "a URL",
            LexKind::BadString => "a bad string",
            LexKind::BadUrl => "a bad URL",
            LexKind::Hash => "a hash token",
            LexKind::Delim => "a delimiter",
            LexKind::Number => "a number",
            LexKind::Percentage => "a percentage",
            LexKind::Dimension => "a dimension",
            LexKind::Function => "a function",
            LexKind::Whitespace => "whitespace",
            LexKind::Comma => "\",\"",
            LexKind::Colon => "\":\"",
            LexKind::Semicolon => "\";\"",
            LexKind::ParenOpen => "\"(\"",
            LexKind::ParenClose => "\")\"",
            LexKind::BraceOpen => "\"{\"",
            LexKind::BraceClose => "\"}\"",
            LexKind::BracketOpen => "\"[\"",
            LexKind::BracketClose => "\"]\"",
            LexKind::Cdo => "\"<!--\"",
            LexKind::Cdc => "\"-->\"",
            LexKind::Eof => "end of file",
        }
    }

    pub fn closer_for_opener(&self) -> Option<LexKind> {
        match self {
            LexKind::ParenOpen | LexKind::Function => Some(LexKind::ParenClose),
            LexKind::BraceOpen => Some(LexKind::BraceClose),
            LexKind::BracketOpen => Some(LexKind::BracketClose),
            _ => None,
        }
    }
}

/// A single lexical token. `text` is the decoded-text projection
/// (escapes resolved) for the kinds that carry one; `unit_offset` is
/// set for `Dimension` and `Percentage` and records where the unit
/// substring (`px`, `%`, ...) starts within `text` — the numeric
/// literal itself is always the raw source slice, never reconstructed
/// from a parsed value, so exponents and leading zeros survive.
#[derive(Debug, Clone, PartialEq)]
pub struct LexToken {
    pub kind: LexKind,
    pub range: (usize, usize),
    pub text: String,
    pub unit_offset: Option<u32>,
}

impl LexToken {
    pub fn start(&self) -> SourcePos {
        SourcePos(self.range.0)
    }

    pub fn is_delim(&self, ch: char) -> bool {
        self.kind == LexKind::Delim && self.text.chars().next() == Some(ch)
    }

    pub fn number_part(&self) -> &str {
        match self.unit_offset {
            Some(off) => &self.text[..off as usize],
            None => &self.text,
        }
    }

    pub fn unit_part(&self) -> &str {
        match self.unit_offset {
            Some(off) => &self.text[off as usize..],
            None => "",
        }
    }
}

/// Runs `cssparser`'s tokenizer to completion and returns the flat
/// array the rest of this crate operates on, with a synthesized EOF
/// token appended per §6's tokenizer contract.
///
/// Ranges are recovered with `Parser::slice_from`, the same mechanism
/// the teacher uses to capture raw source text for verbatim
/// reproduction (e.g. custom-property values) — byte offsets fall out
/// of slice lengths rather than any direct position API, which keeps
/// this bridge honest about only depending on `cssparser`'s stable,
/// widely-used surface.
pub fn tokenize(source: &str) -> Vec<LexToken> {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut out = Vec::new();
    let mut byte_pos = 0usize;

    loop {
        let start_pos = parser.position();
        match parser.next_including_whitespace() {
            Ok(token) => {
                let token = token.clone();
                let raw = parser.slice_from(start_pos);
                let start = byte_pos;
                let end = start + raw.len();
                byte_pos = end;
                if let Some(lex) = project(&token, (start, end), raw) {
                    out.push(lex);
                }
            }
            Err(_) => break,
        }
    }

    out.push(LexToken {
        kind: LexKind::Eof,
        range: (byte_pos, byte_pos),
        text: String::new(),
        unit_offset: None,
    });

    out
}

/// Projects one `cssparser` token into a [`LexToken`], using `raw` (the
/// exact source slice the tokenizer consumed) as the text for numeric
/// kinds rather than reconstructing it from `cssparser`'s parsed
/// `value`/`int_value` fields — those are `f32`s with no memory of the
/// original digit string, so rebuilding text from them would silently
/// normalize `1e3` to `1000` and drop leading zeros from `010px` even
/// when minification is off. `mangle_number`/`mangle_dimension` are the
/// only things allowed to touch this text, and only when asked to.
fn project(token: &CssToken<'_>, range: (usize, usize), raw: &str) -> Option<LexToken> {
    let (kind, text, unit_offset) = match token {
        CssToken::Ident(s) => (LexKind::Ident, s.as_ref().to_owned(), None),
        CssToken::AtKeyword(s) => (LexKind::AtKeyword, s.as_ref().to_owned(), None),
        CssToken::QuotedString(s) => (LexKind::String, s.as_ref().to_owned(), None),
        CssToken::UnquotedUrl(s) => (LexKind::Url, s.as_ref().to_owned(), None),
        CssToken::BadString(s) => (LexKind::BadString, s.as_ref().to_owned(), None),
        CssToken::BadUrl(s) => (LexKind::BadUrl, s.as_ref().to_owned(), None),
        CssToken::Hash(s) | CssToken::IDHash(s) => (LexKind::Hash, s.as_ref().to_owned(), None),
        CssToken::Delim(c) => (LexKind::Delim, c.to_string(), None),
        CssToken::Number { .. } => (LexKind::Number, raw.to_owned(), None),
        CssToken::Percentage { .. } => {
            let offset = numeric_prefix_len(raw) as u32;
            (LexKind::Percentage, raw.to_owned(), Some(offset))
        }
        CssToken::Dimension { .. } => {
            let offset = numeric_prefix_len(raw) as u32;
            (LexKind::Dimension, raw.to_owned(), Some(offset))
        }
        CssToken::WhiteSpace(s) => (LexKind::Whitespace, s.to_string(), None),
        CssToken::Colon => (LexKind::Colon, ":".to_owned(), None),
        CssToken::Semicolon => (LexKind::Semicolon, ";".to_owned(), None),
        CssToken::Comma => (LexKind::Comma, ",".to_owned(), None),
        CssToken::Function(s) => (LexKind::Function, s.as_ref().to_owned(), None),
        CssToken::ParenthesisBlock => (LexKind::ParenOpen, "(".to_owned(), None),
        CssToken::SquareBracketBlock => (LexKind::BracketOpen, "[".to_owned(), None),
        CssToken::CurlyBracketBlock => (LexKind::BraceOpen, "{".to_owned(), None),
        CssToken::CloseParenthesis => (LexKind::ParenClose, ")".to_owned(), None),
        CssToken::CloseSquareBracket => (LexKind::BracketClose, "]".to_owned(), None),
        CssToken::CloseCurlyBracket => (LexKind::BraceClose, "}".to_owned(), None),
        CssToken::CDO => (LexKind::Cdo, "<!--".to_owned(), None),
        CssToken::CDC => (LexKind::Cdc, "-->".to_owned(), None),
        // Attribute-selector match operators are irrelevant to this
        // core (they only appear inside selector preludes, which are
        // handed to the external selector grammar verbatim).
        CssToken::IncludeMatch => (LexKind::Delim, "~=".to_owned(), None),
        CssToken::DashMatch => (LexKind::Delim, "|=".to_owned(), None),
        CssToken::PrefixMatch => (LexKind::Delim, "^=".to_owned(), None),
        CssToken::SuffixMatch => (LexKind::Delim, "$=".to_owned(), None),
        CssToken::SubstringMatch => (LexKind::Delim, "*=".to_owned(), None),
        // `next_including_whitespace` never yields `Comment` (that
        // requires `next_including_whitespace_and_comments`), but the
        // match must still be exhaustive over `Token`'s variants.
        CssToken::Comment(_) => return None,
    };

    Some(LexToken { kind, range, text, unit_offset })
}

/// Scans a raw `Percentage`/`Dimension` slice for the end of the
/// numeric literal (optional sign, digits, optional fraction, optional
/// exponent) so the unit suffix (`%`, `px`, ...) can be split off
/// without ever parsing the number itself. An `e`/`E` is only consumed
/// as an exponent marker when followed by a valid digit sequence, so
/// `1em` keeps its unit intact instead of mistaking the `e` for one.
fn numeric_prefix_len(raw: &str) -> usize {
    let bytes = raw.as_bytes();
    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < bytes.len() && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<LexToken> {
        let tokens = tokenize(source);
        tokens.into_iter().filter(|t| t.kind != LexKind::Whitespace && t.kind != LexKind::Eof).collect()
    }

    #[test]
    fn number_text_keeps_the_exponent() {
        let tokens = lex("1e3");
        assert_eq!(tokens[0].kind, LexKind::Number);
        assert_eq!(tokens[0].text, "1e3");
    }

    #[test]
    fn dimension_text_keeps_leading_zeros() {
        let tokens = lex("010px");
        assert_eq!(tokens[0].kind, LexKind::Dimension);
        assert_eq!(tokens[0].text, "010px");
        assert_eq!(tokens[0].number_part(), "010");
        assert_eq!(tokens[0].unit_part(), "px");
    }

    #[test]
    fn dimension_with_exponent_splits_before_the_unit() {
        let tokens = lex("1e3px");
        assert_eq!(tokens[0].number_part(), "1e3");
        assert_eq!(tokens[0].unit_part(), "px");
    }

    #[test]
    fn dimension_unit_starting_with_e_is_not_mistaken_for_an_exponent() {
        let tokens = lex("1em");
        assert_eq!(tokens[0].number_part(), "1");
        assert_eq!(tokens[0].unit_part(), "em");
    }

    #[test]
    fn percentage_text_includes_the_percent_sign() {
        let tokens = lex("50%");
        assert_eq!(tokens[0].kind, LexKind::Percentage);
        assert_eq!(tokens[0].text, "50%");
        assert_eq!(tokens[0].number_part(), "50");
        assert_eq!(tokens[0].unit_part(), "%");
    }
}

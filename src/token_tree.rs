//! §4.7 token-tree converter: flattens the lexical array a production
//! consumed into a nested [`TokenTree`], folding whitespace into flags
//! and applying the opportunistic minification transforms on numbers,
//! percentages and dimensions.
//!
//! The whitespace bitset mirrors the teacher's `VendorPrefix` bitflags
//! (`vendor_prefix.rs`) — two bits is the entire whitespace
//! representation outside verbatim mode, fixed up with a single linear
//! pass per sibling list.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::error::DiagnosticSink;
use crate::import_record::ImportKind;
use crate::minify::{mangle_dimension, mangle_number};
use crate::token::{LexKind, LexToken};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Whitespace: u8 {
        const BEFORE = 0b01;
        const AFTER  = 0b10;
    }
}

#[derive(Debug, Clone, PartialEq, Hash)]
pub struct AstToken {
    pub kind: LexKind,
    pub text: String,
    pub whitespace: Whitespace,
    pub children: Option<Box<TokenTree>>,
    pub unit_offset: Option<u32>,
    pub import_record: Option<u32>,
}

impl AstToken {
    fn leaf(kind: LexKind, text: String) -> Self {
        AstToken { kind, text, whitespace: Whitespace::empty(), children: None, unit_offset: None, import_record: None }
    }
}

/// An ordered sequence of [`AstToken`]s. Backed by `SmallVec` rather
/// than a separately-boxed tree node: most groups (a single keyword, a
/// `:hover`, a short function argument list) have a handful of
/// children, so inlining a few of them avoids a heap allocation for the
/// common case while keeping exactly one allocation per node when a
/// group does grow past the inline capacity (§9's "single allocation
/// per node" guidance).
#[derive(Debug, Clone, PartialEq, Hash, Default)]
pub struct TokenTree(pub SmallVec<[AstToken; 4]>);

impl TokenTree {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub struct ConvertOptions {
    pub allow_imports: bool,
    pub verbatim_whitespace: bool,
    pub mangle: bool,
}

struct Converter<'a, S: DiagnosticSink> {
    sink: &'a mut S,
    import_records: &'a mut crate::import_record::ImportRecords,
    mangle: bool,
}

/// Converts `tokens[start..end]` (a flat, balanced component-value run
/// already delimited by the caller — a declaration value, an at-rule
/// prelude, a function's argument list, ...) into a [`TokenTree`].
pub fn convert(
    tokens: &[LexToken],
    start: usize,
    end: usize,
    opts: &ConvertOptions,
    sink: &mut impl DiagnosticSink,
    import_records: &mut crate::import_record::ImportRecords,
) -> TokenTree {
    let mut conv = Converter { sink, import_records, mangle: opts.mangle };
    let (tree, _) = conv.convert_siblings(tokens, start, end, None, opts.allow_imports, opts.verbatim_whitespace);
    tree
}

impl<'a, S: DiagnosticSink> Converter<'a, S> {
    /// Converts one sibling list, stopping at `close` (if given) or at
    /// `end`. Returns the tree and the index just past the consumed
    /// closer (or `end` if none was found / required).
    fn convert_siblings(
        &mut self,
        tokens: &[LexToken],
        start: usize,
        end: usize,
        close: Option<LexKind>,
        allow_imports: bool,
        verbatim: bool,
    ) -> (TokenTree, usize) {
        let mut out: SmallVec<[AstToken; 4]> = SmallVec::new();
        let mut i = start;
        let mut pending_ws = false;

        while i < end {
            let tok = &tokens[i];

            if Some(tok.kind) == close {
                i += 1;
                break;
            }

            if tok.kind == LexKind::Whitespace {
                if verbatim {
                    // Custom-property values keep interior whitespace as
                    // literal tokens rather than folding it into flags
                    // (§4.7 verbatim mode) — fidelity matters more than
                    // the BEFORE/AFTER compression used elsewhere.
                    out.push(AstToken::leaf(LexKind::Whitespace, tok.text.clone()));
                    i += 1;
                    continue;
                }
                pending_ws = true;
                i += 1;
                continue;
            }

            let had_ws_before = pending_ws;
            if pending_ws {
                if let Some(last) = out.last_mut() {
                    last.whitespace |= Whitespace::AFTER;
                }
                pending_ws = false;
            }

            let (mut ast, next_i) = self.convert_one(tokens, i, end, allow_imports, verbatim);
            if had_ws_before {
                ast.whitespace |= Whitespace::BEFORE;
            }
            out.push(ast);
            i = next_i;
        }

        if pending_ws && close.is_some() {
            // Trailing whitespace directly before the closer: mark the
            // last child (if any) as having trailing space.
            if let Some(last) = out.last_mut() {
                last.whitespace |= Whitespace::AFTER;
            }
        }

        if !verbatim {
            fixup_siblings(&mut out, self.mangle);
        }

        (TokenTree(out), i)
    }

    fn convert_one(
        &mut self,
        tokens: &[LexToken],
        i: usize,
        end: usize,
        allow_imports: bool,
        verbatim: bool,
    ) -> (AstToken, usize) {
        let tok = &tokens[i];

        match tok.kind {
            LexKind::Function => {
                let is_var = tok.text.eq_ignore_ascii_case("var");
                let is_url_fn = tok.text.eq_ignore_ascii_case("url");
                let child_verbatim = verbatim || is_var;
                let (children, next_i) =
                    self.convert_siblings(tokens, i + 1, end, Some(LexKind::ParenClose), allow_imports, child_verbatim);

                if is_url_fn && children.0.len() == 1 && children.0[0].kind == LexKind::String {
                    let path = children.0[0].text.clone();
                    let record = self.import_records.push(ImportKind::ImportUrl, path, tok.range, !allow_imports);
                    let mut ast = AstToken::leaf(LexKind::Url, String::new());
                    ast.import_record = Some(record);
                    return (ast, next_i);
                }

                let mut ast = AstToken::leaf(LexKind::Function, tok.text.clone());
                ast.children = Some(Box::new(children));
                (ast, next_i)
            }
            LexKind::ParenOpen => {
                let (children, next_i) = self.convert_siblings(tokens, i + 1, end, Some(LexKind::ParenClose), allow_imports, verbatim);
                let children = self.apply_pretty_edges(children, verbatim);
                let mut ast = AstToken::leaf(LexKind::ParenOpen, "(".to_owned());
                ast.children = Some(Box::new(children));
                (ast, next_i)
            }
            LexKind::BracketOpen => {
                let (children, next_i) = self.convert_siblings(tokens, i + 1, end, Some(LexKind::BracketClose), allow_imports, verbatim);
                let children = self.apply_pretty_edges(children, verbatim);
                let mut ast = AstToken::leaf(LexKind::BracketOpen, "[".to_owned());
                ast.children = Some(Box::new(children));
                (ast, next_i)
            }
            LexKind::BraceOpen => {
                let (children, next_i) = self.convert_siblings(tokens, i + 1, end, Some(LexKind::BraceClose), allow_imports, verbatim);
                let children = self.apply_pretty_edges(children, verbatim);
                let mut ast = AstToken::leaf(LexKind::BraceOpen, "{".to_owned());
                ast.children = Some(Box::new(children));
                (ast, next_i)
            }
            LexKind::Url => {
                let path = tok.text.clone();
                let record = self.import_records.push(ImportKind::ImportUrl, path, tok.range, !allow_imports);
                let mut ast = AstToken::leaf(LexKind::Url, String::new());
                ast.import_record = Some(record);
                (ast, i + 1)
            }
            LexKind::Number => {
                let mut text = tok.text.clone();
                if self.mangle {
                    text = mangle_number(&text).0;
                }
                (AstToken::leaf(LexKind::Number, text), i + 1)
            }
            LexKind::Percentage => {
                let number = if self.mangle { mangle_number(tok.number_part()).0 } else { tok.number_part().to_owned() };
                let offset = number.len() as u32;
                let mut text = number;
                text.push('%');
                let mut ast = AstToken::leaf(LexKind::Percentage, text);
                ast.unit_offset = Some(offset);
                (ast, i + 1)
            }
            LexKind::Dimension => {
                let text = if self.mangle {
                    mangle_dimension(tok.number_part(), tok.unit_part())
                } else {
                    tok.text.clone()
                };
                let offset = dimension_offset(&text, tok.unit_part());
                let mut ast = AstToken::leaf(LexKind::Dimension, text);
                ast.unit_offset = Some(offset);
                (ast, i + 1)
            }
            _ => (AstToken::leaf(tok.kind, tok.text.clone()), i + 1),
        }
    }

    /// Pretty-printing edge whitespace for brace/paren/bracket groups:
    /// when not minifying and not in verbatim mode, the first and last
    /// children gain outer whitespace flags.
    fn apply_pretty_edges(&self, mut tree: TokenTree, verbatim: bool) -> TokenTree {
        if !verbatim && !self.mangle {
            if let Some(first) = tree.0.first_mut() {
                first.whitespace |= Whitespace::BEFORE;
            }
            if let Some(last) = tree.0.last_mut() {
                last.whitespace |= Whitespace::AFTER;
            }
        }
        tree
    }
}

/// Post-pass (§4.7, non-verbatim only): clear edge flags and normalize
/// comma spacing.
fn fixup_siblings(out: &mut [AstToken], minify: bool) {
    if out.is_empty() {
        return;
    }

    out[0].whitespace.remove(Whitespace::BEFORE);
    let last = out.len() - 1;
    out[last].whitespace.remove(Whitespace::AFTER);

    for idx in 0..out.len() {
        if out[idx].kind == LexKind::Comma {
            out[idx].whitespace.remove(Whitespace::BEFORE);
            if idx > 0 {
                out[idx - 1].whitespace.remove(Whitespace::AFTER);
            }
            if minify {
                out[idx].whitespace.remove(Whitespace::AFTER);
                if idx + 1 < out.len() {
                    out[idx + 1].whitespace.remove(Whitespace::BEFORE);
                }
            } else {
                out[idx].whitespace.insert(Whitespace::AFTER);
                if idx + 1 < out.len() {
                    out[idx + 1].whitespace.insert(Whitespace::BEFORE);
                }
            }
        }
    }
}

fn dimension_offset(text: &str, _original_unit: &str) -> u32 {
    let digits_end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+' || c == 'e' || c == 'E'))
        .unwrap_or(text.len());
    digits_end as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingSink;
    use crate::import_record::ImportRecords;
    use crate::token;

    fn convert_all(source: &str, opts: ConvertOptions) -> TokenTree {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        // Drop the trailing EOF sentinel from the run to convert.
        let end = tokens.len() - 1;
        convert(&tokens, 0, end, &opts, &mut sink, &mut records)
    }

    #[test]
    fn pretty_printing_adds_comma_spacing() {
        let tree = convert_all("a,b", ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: false });
        assert_eq!(tree.0.len(), 3);
        assert!(tree.0[1].kind == LexKind::Comma);
        assert!(tree.0[1].whitespace.contains(Whitespace::AFTER));
        assert!(tree.0[2].whitespace.contains(Whitespace::BEFORE));
    }

    #[test]
    fn minifying_strips_comma_spacing() {
        let tree = convert_all("a, b", ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: true });
        assert_eq!(tree.0.len(), 3);
        assert!(!tree.0[1].whitespace.contains(Whitespace::AFTER));
        assert!(!tree.0[2].whitespace.contains(Whitespace::BEFORE));
    }

    #[test]
    fn verbatim_mode_keeps_interior_whitespace_tokens() {
        let tree = convert_all("1  2  3", ConvertOptions { allow_imports: false, verbatim_whitespace: true, mangle: false });
        let ws_count = tree.0.iter().filter(|t| t.kind == LexKind::Whitespace).count();
        assert_eq!(ws_count, 2);
    }

    #[test]
    fn bare_url_gets_an_import_record() {
        let tokens = token::tokenize("url(foo.png)");
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let opts = ConvertOptions { allow_imports: true, verbatim_whitespace: false, mangle: false };
        let end = tokens.len() - 1;
        let tree = convert(&tokens, 0, end, &opts, &mut sink, &mut records);
        assert_eq!(tree.0.len(), 1);
        assert_eq!(tree.0[0].kind, LexKind::Url);
        let idx = tree.0[0].import_record.expect("url() should record an import");
        assert_eq!(records.get(idx).path, "foo.png");
    }
}

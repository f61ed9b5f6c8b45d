//! §4.4 at-rule parser: static shape classification plus the
//! per-at-rule specializations for `@charset`, `@import`, `@keyframes`
//! and `@namespace`.
//!
//! Grounded on the teacher's `AtRulePrelude` match in `parser.rs`
//! (the `match_ignore_ascii_case!` dispatch on the at-keyword) and the
//! `@media`/`@custom-media` rule shapes in `rules/media.rs` /
//! `rules/custom_media.rs`, generalized from typed preludes to the raw
//! `TokenTree` this core's generic path carries.

use itertools::Itertools;

use crate::ast::{KeyframeBlock, Rule};
use crate::declaration_list;
use crate::error::{DiagnosticSink, OrderingViolation, ParserError, SourcePos};
use crate::driver::Driver;
use crate::import_record::ImportKind;
use crate::minify::mangle_number;
use crate::options::ParserOptions;
use crate::rule_list;
use crate::token::LexKind;
use crate::token_tree::ConvertOptions;
use crate::vendor_prefix::VendorPrefix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtRuleShape {
    /// No block: `@charset`, `@import`.
    Empty,
    /// Block holds declarations: `@font-face`, `@page`, `@viewport`, ...
    Declarations,
    /// Block holds rules in the enclosing mode: `@media`, `@supports`, ...
    InheritContext,
    /// No known shape; handled structurally.
    Unknown,
}

pub fn classify(at_keyword_lower: &str) -> AtRuleShape {
    let (_, base) = VendorPrefix::strip(at_keyword_lower);
    match base {
        "charset" | "import" | "namespace" => AtRuleShape::Empty,
        "font-face" | "viewport" | "page" | "counter-style" | "font-palette-values"
        | "top-left" | "top-left-corner" | "top-center" | "top-right" | "top-right-corner"
        | "bottom-left" | "bottom-left-corner" | "bottom-center" | "bottom-right" | "bottom-right-corner"
        | "left-top" | "left-middle" | "left-bottom" | "right-top" | "right-middle" | "right-bottom" => {
            AtRuleShape::Declarations
        }
        "media" | "supports" | "scope" | "document" => AtRuleShape::InheritContext,
        _ => AtRuleShape::Unknown,
    }
}

/// Recognizes `@keyframes` and any vendor-prefixed spelling of it
/// (`-webkit-keyframes`, ...), falling back to a bare suffix check for
/// prefixes not in [`VendorPrefix`]'s known set.
fn is_keyframes_keyword(lower: &str) -> bool {
    let (_, base) = VendorPrefix::strip(lower);
    base == "keyframes" || lower.ends_with("-keyframes")
}

/// Parses one at-rule starting with the driver positioned at the
/// `@`-keyword token. `parent_parses_selectors` tells the generic
/// `InheritContext` path whether a nested block should recurse through
/// the rule-list parser with selectors enabled, or stay in
/// declaration-list mode (§4.4).
pub fn parse_at_rule<S: DiagnosticSink>(
    driver: &mut Driver<S>,
    opts: &ParserOptions,
    parent_parses_selectors: bool,
) -> Rule {
    let at_token = driver.current().text.clone();
    let start_pos = driver.current().start();
    driver.advance(); // consume the at-keyword

    let lower = at_token.to_ascii_lowercase();

    match lower.as_str() {
        "charset" => parse_charset(driver),
        "import" => parse_import(driver, opts),
        "namespace" => parse_namespace(driver, at_token, start_pos),
        _ if is_keyframes_keyword(&lower) => parse_keyframes(driver, opts, at_token),
        _ => parse_generic(driver, opts, at_token, lower, parent_parses_selectors),
    }
}

fn parse_charset<S: DiagnosticSink>(driver: &mut Driver<S>) -> Rule {
    driver.skip_whitespace();
    let encoding = if driver.peek(LexKind::String) {
        let text = driver.current().text.clone();
        driver.advance();
        text
    } else {
        driver.unexpected_expecting(LexKind::String);
        String::new()
    };

    if !encoding.eq_ignore_ascii_case("utf-8") {
        let pos = driver.current().start();
        driver.error_at(ParserError::Encoding(encoding.clone()), pos);
    }

    driver.skip_whitespace();
    driver.expect(LexKind::Semicolon);

    Rule::AtCharset { encoding }
}

fn parse_import<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions) -> Rule {
    driver.skip_whitespace();

    let path = match driver.current().kind {
        LexKind::Url | LexKind::String => {
            let text = driver.current().text.clone();
            driver.advance();
            text
        }
        _ => {
            driver.unexpected_expecting(LexKind::String);
            String::new()
        }
    };

    driver.skip_whitespace();

    let (cond_start, cond_end) = driver.consume_component_values_until(&[LexKind::Semicolon, LexKind::BraceClose]);
    let has_conditions = cond_start < cond_end;

    let convert_opts = ConvertOptions { allow_imports: true, verbatim_whitespace: false, mangle: opts.mangle_syntax };
    let mut conditions = driver.convert_range(cond_start, cond_end, &convert_opts);
    // `removeWhitespace`: normalize a leading whitespace flag away when
    // minifying, since the conditions run starts a fresh component
    // rather than continuing a value.
    if opts.remove_whitespace {
        if let Some(first) = conditions.0.first_mut() {
            first.whitespace.remove(crate::token_tree::Whitespace::BEFORE);
        }
    }

    driver.eat(LexKind::Semicolon);

    let kind = if has_conditions { ImportKind::ImportAtConditional } else { ImportKind::ImportAt };
    let index = driver.import_records.push(kind, path, (cond_start, cond_end), false);

    Rule::AtImport { import_record_index: index, conditions }
}

fn parse_namespace<S: DiagnosticSink>(driver: &mut Driver<S>, at_token: String, start_pos: SourcePos) -> Rule {
    driver.error_at(ParserError::Unsupported("@namespace"), start_pos);
    let (start, end) = driver.consume_component_values_until(&[LexKind::Semicolon, LexKind::BraceOpen, LexKind::BraceClose]);
    let opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: false };
    let prelude = driver.convert_range(start, end, &opts);
    driver.eat(LexKind::Semicolon);
    Rule::UnknownAt { at_token, prelude, block: None }
}

fn parse_keyframes<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions, at_token: String) -> Rule {
    driver.skip_whitespace();

    let name = if driver.peek(LexKind::Ident) {
        let text = driver.current().text.clone();
        driver.advance();
        text
    } else if driver.peek(LexKind::String) {
        // §4.4, §9 open question: string names are syntactically legal
        // elsewhere but rejected here for cross-engine parity.
        driver.unexpected();
        let text = driver.current().text.clone();
        driver.advance();
        text
    } else {
        driver.unexpected_expecting(LexKind::Ident);
        String::new()
    };

    driver.skip_whitespace();

    let mut blocks = Vec::new();
    if driver.expect(LexKind::BraceOpen) {
        loop {
            driver.skip_whitespace();
            if driver.peek(LexKind::BraceClose) || driver.at_eof() {
                break;
            }
            blocks.push(parse_keyframe_block(driver, opts));
        }
        driver.eat(LexKind::BraceClose);
    }

    if opts.mangle_syntax {
        for block in &mut blocks {
            for selector in &mut block.selectors {
                *selector = mangle_keyframe_selector(selector);
            }
            // Mangling can turn distinct selectors into the same text
            // (`0%, from` both become `0%`); collapse the repeats a
            // block's selector list carries rather than leaving dead
            // weight in the output.
            block.selectors = block.selectors.drain(..).unique().collect();
        }
        blocks.retain(|b| !b.is_empty());
    }

    Rule::AtKeyframes { at_token, name, blocks }
}

fn mangle_keyframe_selector(selector: &str) -> String {
    if selector.eq_ignore_ascii_case("from") {
        return "0%".to_owned();
    }
    if selector == "100%" {
        return "to".to_owned();
    }
    selector.to_owned()
}

fn parse_keyframe_block<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions) -> KeyframeBlock {
    let mut selectors = Vec::new();
    loop {
        driver.skip_whitespace();
        match driver.current().kind {
            LexKind::Ident => {
                let text = driver.current().text.clone();
                if text.eq_ignore_ascii_case("from") {
                    selectors.push("from".to_owned());
                } else if text.eq_ignore_ascii_case("to") {
                    selectors.push("to".to_owned());
                } else {
                    driver.unexpected();
                }
                driver.advance();
            }
            LexKind::Percentage => {
                let number = driver.current().number_part();
                let text = if opts.mangle_syntax { mangle_number(number).0 } else { number.to_owned() };
                selectors.push(format!("{}%", text));
                driver.advance();
            }
            _ => {
                driver.unexpected();
            }
        }
        driver.skip_whitespace();
        if driver.eat(LexKind::Comma) {
            continue;
        }
        break;
    }

    driver.skip_whitespace();
    driver.expect(LexKind::BraceOpen);
    let declarations = declaration_list::parse_declaration_list(driver, opts, false);
    driver.eat(LexKind::BraceClose);

    KeyframeBlock { selectors, declarations }
}

fn parse_generic<S: DiagnosticSink>(
    driver: &mut Driver<S>,
    opts: &ParserOptions,
    at_token: String,
    lower: String,
    parent_parses_selectors: bool,
) -> Rule {
    let shape = classify(&lower);

    let (start, end) = driver.consume_component_values_until(&[LexKind::Semicolon, LexKind::BraceOpen, LexKind::BraceClose]);
    let convert_opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: opts.mangle_syntax };
    let prelude = driver.convert_range(start, end, &convert_opts);

    let terminator = driver.current().kind;

    match terminator {
        LexKind::BraceOpen => {
            driver.advance();
            match shape {
                AtRuleShape::Declarations => {
                    let rules = declaration_list::parse_declaration_list(driver, opts, false);
                    driver.eat(LexKind::BraceClose);
                    Rule::KnownAt { at_token, prelude, rules }
                }
                AtRuleShape::InheritContext => {
                    let rules = if parent_parses_selectors {
                        rule_list::parse_rule_list(driver, opts, false, true)
                    } else {
                        declaration_list::parse_declaration_list(driver, opts, opts.nesting)
                    };
                    driver.eat(LexKind::BraceClose);
                    Rule::KnownAt { at_token, prelude, rules }
                }
                AtRuleShape::Unknown => {
                    let (block_start, block_end) = driver.consume_component_values_until(&[LexKind::BraceClose]);
                    let block_opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: false };
                    let block = driver.convert_range(block_start, block_end, &block_opts);
                    driver.eat(LexKind::BraceClose);
                    Rule::UnknownAt { at_token, prelude, block: Some(block) }
                }
                AtRuleShape::Empty => {
                    let pos = driver.current().start();
                    driver.error_at(
                        ParserError::InvalidAtRuleBlockPresence { at_keyword: at_token.clone(), had_block: true },
                        pos,
                    );
                    let (block_start, block_end) = driver.consume_component_values_until(&[LexKind::BraceClose]);
                    let block_opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: false };
                    let block = driver.convert_range(block_start, block_end, &block_opts);
                    driver.eat(LexKind::BraceClose);
                    Rule::UnknownAt { at_token, prelude, block: Some(block) }
                }
            }
        }
        LexKind::Semicolon | LexKind::BraceClose | LexKind::Eof => {
            if matches!(shape, AtRuleShape::Declarations | AtRuleShape::InheritContext) {
                let pos = driver.current().start();
                driver.error_at(
                    ParserError::InvalidAtRuleBlockPresence { at_keyword: at_token.clone(), had_block: false },
                    pos,
                );
            }
            driver.eat(LexKind::Semicolon);
            Rule::UnknownAt { at_token, prelude, block: None }
        }
        _ => unreachable!("consume_component_values_until only stops at the requested terminators"),
    }
}

pub fn report_charset_not_first<S: DiagnosticSink>(driver: &mut Driver<S>, position: SourcePos, prev_rule_pos: SourcePos) {
    driver.error_ordering(OrderingViolation::CharsetNotFirst, position, Some(("preceding rule".to_owned(), prev_rule_pos)));
}

pub fn report_import_after_other<S: DiagnosticSink>(driver: &mut Driver<S>, position: SourcePos) {
    driver.error_ordering(OrderingViolation::ImportAfterOtherRule, position, None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingSink;
    use crate::import_record::ImportRecords;
    use crate::token;

    fn parse_one(source: &str, opts: &ParserOptions) -> (Rule, Vec<crate::error::Diagnostic>) {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let mut driver = Driver::new(&tokens, &mut sink, &mut records);
        let rule = parse_at_rule(&mut driver, opts, true);
        (rule, sink.diagnostics)
    }

    #[test]
    fn classifies_known_shapes() {
        assert_eq!(classify("media"), AtRuleShape::InheritContext);
        assert_eq!(classify("font-face"), AtRuleShape::Declarations);
        assert_eq!(classify("charset"), AtRuleShape::Empty);
        assert_eq!(classify("fake-widget"), AtRuleShape::Unknown);
    }

    #[test]
    fn vendor_prefixed_document_is_inherit_context() {
        assert_eq!(classify("-moz-document"), AtRuleShape::InheritContext);
    }

    #[test]
    fn charset_reads_encoding() {
        let opts = ParserOptions::default();
        let (rule, diagnostics) = parse_one(r#"charset "UTF-8";"#, &opts);
        assert!(diagnostics.is_empty());
        assert!(matches!(rule, Rule::AtCharset { ref encoding } if encoding == "UTF-8"));
    }

    #[test]
    fn charset_with_bad_encoding_warns() {
        let opts = ParserOptions::default();
        let (_, diagnostics) = parse_one(r#"charset "latin1";"#, &opts);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::Encoding(ref e) if e == "latin1"));
    }

    #[test]
    fn import_without_conditions_is_plain() {
        let opts = ParserOptions::default();
        let (rule, _) = parse_one(r#"import "x.css";"#, &opts);
        match rule {
            Rule::AtImport { import_record_index, .. } => assert_eq!(import_record_index, 0),
            other => panic!("expected AtImport, got {:?}", other),
        }
    }

    #[test]
    fn keyframes_minify_dedupes_selectors_that_collapse_together() {
        let opts = ParserOptions::minifying();
        let (rule, _) = parse_one("keyframes k { 0%, from { color: red } }", &opts);
        match rule {
            Rule::AtKeyframes { blocks, .. } => assert_eq!(blocks[0].selectors, vec!["0%".to_owned()]),
            other => panic!("expected AtKeyframes, got {:?}", other),
        }
    }

    #[test]
    fn prefixed_keyframes_is_recognized() {
        let opts = ParserOptions::default();
        let (rule, _) = parse_one("-webkit-keyframes spin { from { color: red } }", &opts);
        assert!(matches!(rule, Rule::AtKeyframes { .. }));
    }

    #[test]
    fn unknown_at_rule_without_required_block_warns() {
        let opts = ParserOptions::default();
        let (_, diagnostics) = parse_one("media screen;", &opts);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::InvalidAtRuleBlockPresence { had_block: false, .. }));
    }

    #[test]
    fn namespace_is_reported_unsupported() {
        let opts = ParserOptions::default();
        let (_, diagnostics) = parse_one(r#"namespace url(foo);"#, &opts);
        assert!(matches!(diagnostics[0].error, ParserError::Unsupported("@namespace")));
    }
}

//! A recursive-descent CSS parser core: rule-list and declaration-list
//! grammars, an at-rule dispatcher, and opportunistic syntactic
//! minification, built over a flat pre-tokenized array rather than a
//! re-implementation of CSS tokenization (`cssparser` owns that).
//!
//! The crate is intentionally narrow (§1): no selector-grammar
//! semantics, no typed property values, no serialization, no bundling.
//! Embedding applications plug those in around the [`Ast`] this crate
//! produces, or around the [`qualified_rule::SelectorGrammar`]
//! extension point for a real selector parser.

mod ast;
mod at_rule;
mod declaration;
mod declaration_list;
mod driver;
mod error;
mod import_record;
mod minify;
mod options;
mod qualified_rule;
mod rule_list;
mod token;
mod token_tree;
mod vendor_prefix;

pub use ast::{KeyframeBlock, KnownKey, Rule, Selector};
pub use driver::Driver;
pub use error::{CollectingSink, Diagnostic, DiagnosticSink, OrderingViolation, ParserError, SourcePos};
pub use import_record::{ImportKind, ImportRecord};
pub use options::{ParserOptions, UnsupportedFeatures};
pub use qualified_rule::{DefaultSelectorGrammar, SelectorGrammar};
pub use token::{LexKind, LexToken};
pub use token_tree::{AstToken, ConvertOptions, TokenTree, Whitespace};

/// The output of a [`parse`] call (§6): the rule sequence in source
/// order plus the import records it referenced, stable by index.
#[derive(Debug, Clone, PartialEq)]
pub struct Ast {
    pub rules: Vec<Rule>,
    pub import_records: Vec<ImportRecord>,
}

/// Parses a complete stylesheet (top-level rule-list mode, §4.2) using
/// the default selector grammar and a fresh [`CollectingSink`].
pub fn parse(source: &str, opts: &ParserOptions) -> (Ast, Vec<Diagnostic>) {
    let mut sink = CollectingSink::new();
    let ast = parse_with_sink(source, opts, &mut sink);
    (ast, sink.diagnostics)
}

/// Same as [`parse`], but lets the caller supply their own
/// [`DiagnosticSink`] (e.g. one that forwards into an existing `log`
/// subscriber without also buffering).
pub fn parse_with_sink<S: DiagnosticSink>(source: &str, opts: &ParserOptions, sink: &mut S) -> Ast {
    let tokens = token::tokenize(source);
    let mut import_records = import_record::ImportRecords::new();
    let mut driver = Driver::new(&tokens, sink, &mut import_records);
    let rules = rule_list::parse_rule_list(&mut driver, opts, true, true);
    Ast { rules, import_records: import_records.into_vec() }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Rule;

    fn rules(source: &str, opts: &ParserOptions) -> Vec<Rule> {
        parse(source, opts).0.rules
    }

    #[test]
    fn duplicate_declarations_collapse_under_minify() {
        let opts = ParserOptions::minifying();
        let out = rules("a { color: red; color: red }", &opts);
        assert_eq!(out.len(), 1);
        match &out[0] {
            Rule::Selector { rules, .. } => assert_eq!(rules.len(), 1),
            other => panic!("expected a Selector rule, got {:?}", other),
        }
    }

    /// Diagnostics mirror into `log` (`CollectingSink::push`); this just
    /// confirms `env_logger` can be wired up as a subscriber without the
    /// parse itself needing to know a logger exists.
    #[test]
    fn diagnostics_still_collect_with_a_log_subscriber_installed() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (_, diagnostics) = parse("a{} @charset \"UTF-8\";", &ParserOptions::default());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn charset_then_selector_is_silent() {
        let opts = ParserOptions::default();
        let (ast, diagnostics) = parse(r#"@charset "UTF-8"; a{}"#, &opts);
        assert!(diagnostics.is_empty());
        assert!(matches!(ast.rules[0], Rule::AtCharset { ref encoding } if encoding == "UTF-8"));
        assert!(matches!(ast.rules[1], Rule::Selector { .. }));
    }

    #[test]
    fn charset_after_other_rule_warns_once() {
        let opts = ParserOptions::default();
        let (_, diagnostics) = parse(r#"a{} @charset "UTF-8";"#, &opts);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::Ordering(OrderingViolation::CharsetNotFirst)));
    }

    #[test]
    fn import_with_conditions_is_conditional() {
        let opts = ParserOptions::default();
        let (ast, _) = parse(r#"@import url("x.css") screen;"#, &opts);
        match &ast.rules[0] {
            Rule::AtImport { import_record_index, .. } => {
                let record = &ast.import_records[*import_record_index as usize];
                assert_eq!(record.path, "x.css");
                assert_eq!(record.kind, ImportKind::ImportAtConditional);
            }
            other => panic!("expected AtImport, got {:?}", other),
        }

        let (ast, _) = parse(r#"@import "x.css";"#, &opts);
        match &ast.rules[0] {
            Rule::AtImport { import_record_index, .. } => {
                assert_eq!(ast.import_records[*import_record_index as usize].kind, ImportKind::ImportAt);
            }
            other => panic!("expected AtImport, got {:?}", other),
        }
    }

    #[test]
    fn custom_property_keeps_verbatim_whitespace() {
        let opts = ParserOptions::default();
        let (ast, _) = parse("a { --x: 1  2  3 }", &opts);
        match &ast.rules[0] {
            Rule::Selector { rules, .. } => match &rules[0] {
                Rule::Declaration { value, .. } => {
                    let whitespace_tokens = value.0.iter().filter(|t| t.kind == LexKind::Whitespace).count();
                    assert!(whitespace_tokens >= 2, "expected interior whitespace to survive verbatim conversion");
                }
                other => panic!("expected Declaration, got {:?}", other),
            },
            other => panic!("expected Selector, got {:?}", other),
        }
    }

    #[test]
    fn keyframes_minify_rewrites_edge_selectors() {
        let opts = ParserOptions::minifying();
        let (ast, _) = parse("@keyframes k { from { color: red } 100% { color: blue } }", &opts);
        match &ast.rules[0] {
            Rule::AtKeyframes { blocks, .. } => {
                assert_eq!(blocks[0].selectors, vec!["0%".to_owned()]);
                assert_eq!(blocks[1].selectors, vec!["to".to_owned()]);
            }
            other => panic!("expected AtKeyframes, got {:?}", other),
        }
    }

    #[test]
    fn missing_colon_recovers_as_bad_declaration() {
        let opts = ParserOptions::default();
        let (ast, diagnostics) = parse("a { color red }", &opts);
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::ExpectedToken { expected: LexKind::Colon, .. }));
        match &ast.rules[0] {
            Rule::Selector { rules, .. } => assert!(matches!(rules[0], Rule::BadDeclaration { .. })),
            other => panic!("expected Selector, got {:?}", other),
        }
    }
}

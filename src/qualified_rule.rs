//! §4.5 selector/qualified-rule fallback.
//!
//! The real selector grammar is an explicit external collaborator
//! (§1, §6: "the selector-grammar parser invoked for qualified-rule
//! preludes"); §3 even calls the `Selector` payload "opaque here". This
//! core defines the narrow `(selectorList, ok)` contract and ships a
//! [`DefaultSelectorGrammar`] that honors it using only the balanced-
//! group/whitespace machinery already in this crate — callers that
//! need real selector-grammar validation plug in their own
//! `SelectorGrammar` backed by a real selector-matching crate.

use crate::ast::{Rule, Selector};
use crate::declaration_list;
use crate::driver::Driver;
use crate::error::{DiagnosticSink, ParserError};
use crate::options::ParserOptions;
use crate::token::{LexKind, LexToken};
use crate::token_tree::ConvertOptions;

pub trait SelectorGrammar<S: DiagnosticSink> {
    /// Attempts to parse a selector list starting at the driver's
    /// current position, stopping before the block's `{`. On success
    /// the cursor sits just before `{`. On failure the cursor may have
    /// moved arbitrarily; the caller resets it to the recorded prelude
    /// start and falls back to [`parse_generic_qualified`].
    fn parse_selector_list(&self, driver: &mut Driver<S>) -> (Vec<Selector>, bool);
}

pub struct DefaultSelectorGrammar;

impl<S: DiagnosticSink> SelectorGrammar<S> for DefaultSelectorGrammar {
    fn parse_selector_list(&self, driver: &mut Driver<S>) -> (Vec<Selector>, bool) {
        let prelude_start = driver.cursor();
        let (start, end) =
            driver.consume_component_values_until(&[LexKind::BraceOpen, LexKind::Semicolon, LexKind::BraceClose]);

        if driver.current().kind != LexKind::BraceOpen || start == end {
            driver.set_cursor(prelude_start);
            return (Vec::new(), false);
        }

        let groups = split_top_level_commas(driver.tokens(), start, end);
        let opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: false };
        let selectors = groups.into_iter().map(|(s, e)| Selector(driver.convert_range(s, e, &opts))).collect();
        (selectors, true)
    }
}

fn split_top_level_commas(tokens: &[LexToken], start: usize, end: usize) -> Vec<(usize, usize)> {
    let mut groups = Vec::new();
    let mut depth: Vec<LexKind> = Vec::new();
    let mut group_start = start;
    let mut i = start;

    while i < end {
        let kind = tokens[i].kind;
        if let Some(closer) = kind.closer_for_opener() {
            depth.push(closer);
        } else if depth.last() == Some(&kind) {
            depth.pop();
        } else if depth.is_empty() && kind == LexKind::Comma {
            groups.push((group_start, i));
            group_start = i + 1;
        }
        i += 1;
    }
    groups.push((group_start, end));
    groups
}

/// Entry point for a rule-list position that may be a selector rule:
/// tries the selector grammar first (when `parse_selectors` is set),
/// falling back to the verbatim qualified-rule capture on failure.
pub fn parse_qualified_rule<S: DiagnosticSink>(
    driver: &mut Driver<S>,
    opts: &ParserOptions,
    grammar: &impl SelectorGrammar<S>,
    parse_selectors: bool,
) -> Rule {
    let prelude_start = driver.cursor();

    if parse_selectors {
        let (selectors, ok) = grammar.parse_selector_list(driver);
        if ok {
            driver.expect(LexKind::BraceOpen);
            let rules = declaration_list::parse_declaration_list(driver, opts, opts.nesting);
            driver.eat(LexKind::BraceClose);
            return Rule::Selector { selectors, rules };
        }
        driver.set_cursor(prelude_start);
    }

    parse_generic_qualified(driver, opts)
}

fn parse_generic_qualified<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions) -> Rule {
    let (start, end) =
        driver.consume_component_values_until(&[LexKind::BraceOpen, LexKind::Semicolon, LexKind::BraceClose]);
    let convert_opts = ConvertOptions { allow_imports: false, verbatim_whitespace: false, mangle: opts.mangle_syntax };
    let prelude = driver.convert_range(start, end, &convert_opts);

    match driver.current().kind {
        LexKind::BraceOpen => {
            driver.advance();
            let rules = declaration_list::parse_declaration_list(driver, opts, opts.nesting);
            driver.eat(LexKind::BraceClose);
            Rule::Qualified { prelude, rules: Some(rules) }
        }
        LexKind::Semicolon => {
            // A stray `;` before `{` is meta-syntax (§4.5): terminate
            // the qualified rule here rather than treating it as part
            // of the prelude.
            let pos = driver.current().start();
            driver.error_at(
                ParserError::ExpectedToken { expected: LexKind::BraceOpen, found: "\";\"".to_owned() },
                pos,
            );
            driver.advance();
            Rule::Qualified { prelude, rules: None }
        }
        _ => Rule::Qualified { prelude, rules: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingSink;
    use crate::import_record::ImportRecords;
    use crate::token;

    fn parse(source: &str) -> Rule {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let mut driver = Driver::new(&tokens, &mut sink, &mut records);
        parse_qualified_rule(&mut driver, &ParserOptions::default(), &DefaultSelectorGrammar, true)
    }

    #[test]
    fn comma_separated_prelude_splits_into_selectors() {
        match parse("a, b { }") {
            Rule::Selector { selectors, rules } => {
                assert_eq!(selectors.len(), 2);
                assert!(rules.is_empty());
            }
            other => panic!("expected Selector, got {:?}", other),
        }
    }

    #[test]
    fn empty_prelude_falls_back_to_generic_qualified() {
        match parse("{ }") {
            Rule::Qualified { rules, .. } => assert!(rules.unwrap().is_empty()),
            other => panic!("expected Qualified fallback for an empty prelude, got {:?}", other),
        }
    }

    #[test]
    fn split_top_level_commas_respects_nesting() {
        let tokens = token::tokenize("a(b, c), d");
        let end = tokens.len() - 1;
        let groups = split_top_level_commas(&tokens, 0, end);
        assert_eq!(groups.len(), 2);
    }
}

//! §4.3 declaration-list parser: used inside blocks that hold
//! declarations and, per CSS Nesting, nested selector rules entered
//! through the `&` delimiter.
//!
//! Grounded on the nesting dispatch shape seen in `other_examples`'
//! `vizia-vizia` `NestedRuleParser` (declarations and nested rules
//! share one accumulating parser, distinguished by lookahead), adapted
//! here to this crate's single `Rule` list rather than split
//! `declarations`/`rules` vectors.

use crate::ast::Rule;
use crate::at_rule;
use crate::driver::Driver;
use crate::error::DiagnosticSink;
use crate::options::ParserOptions;
use crate::qualified_rule::{self, DefaultSelectorGrammar};
use crate::declaration;
use crate::token::LexKind;

pub fn parse_declaration_list<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions, nesting: bool) -> Vec<Rule> {
    let mut rules = Vec::new();

    loop {
        driver.skip_whitespace();
        while driver.eat(LexKind::Semicolon) {
            driver.skip_whitespace();
        }

        if driver.at_eof() || driver.peek(LexKind::BraceClose) {
            break;
        }

        if driver.peek(LexKind::AtKeyword) {
            rules.push(at_rule::parse_at_rule(driver, opts, false));
            continue;
        }

        if nesting && driver.current().is_delim('&') {
            rules.push(qualified_rule::parse_qualified_rule(driver, opts, &DefaultSelectorGrammar, true));
            continue;
        }

        rules.push(declaration::parse_declaration(driver, opts));
    }

    if opts.mangle_syntax {
        rules = crate::minify::remove_empty_and_duplicate_rules(rules);
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CollectingSink;
    use crate::import_record::ImportRecords;
    use crate::token;

    fn parse(source: &str, opts: &ParserOptions, nesting: bool) -> Vec<Rule> {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let mut driver = Driver::new(&tokens, &mut sink, &mut records);
        parse_declaration_list(&mut driver, opts, nesting)
    }

    #[test]
    fn plain_declarations_in_order() {
        let rules = parse("color: red; display: block", &ParserOptions::default(), false);
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules[0], Rule::Declaration { .. }));
        assert!(matches!(rules[1], Rule::Declaration { .. }));
    }

    #[test]
    fn nested_ampersand_rule_enters_selector_parsing() {
        let rules = parse("color: red; &:hover { color: blue }", &ParserOptions::default(), true);
        assert_eq!(rules.len(), 2);
        assert!(matches!(rules[1], Rule::Selector { .. }));
    }

    #[test]
    fn ampersand_without_nesting_enabled_is_a_bad_declaration() {
        let rules = parse("&:hover { color: blue }", &ParserOptions::default(), false);
        assert!(matches!(rules[0], Rule::BadDeclaration { .. }));
    }

    #[test]
    fn duplicate_declarations_dedupe_under_minify() {
        let rules = parse("color: red; color: red", &ParserOptions::minifying(), false);
        assert_eq!(rules.len(), 1);
    }
}

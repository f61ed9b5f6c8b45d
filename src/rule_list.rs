//! §4.2 rule-list parser: top-level and nested rule sequences, at-rule
//! dispatch, and the top-level ordering diagnostics for `@charset`/
//! `@import`.

use crate::ast::Rule;
use crate::at_rule;
use crate::driver::Driver;
use crate::error::{DiagnosticSink, SourcePos};
use crate::minify;
use crate::options::ParserOptions;
use crate::qualified_rule::{self, DefaultSelectorGrammar};
use crate::token::LexKind;

pub fn parse_rule_list<S: DiagnosticSink>(
    driver: &mut Driver<S>,
    opts: &ParserOptions,
    is_top_level: bool,
    parse_selectors: bool,
) -> Vec<Rule> {
    let mut rules = Vec::new();
    let mut last_rule_pos: Option<SourcePos> = None;
    let mut saw_non_charset_import_rule = false;
    let mut charset_order_reported = false;
    let mut import_order_reported = false;

    loop {
        driver.skip_whitespace();

        if driver.at_eof() || driver.peek(LexKind::BraceClose) {
            break;
        }

        if is_top_level && (driver.peek(LexKind::Cdo) || driver.peek(LexKind::Cdc)) {
            driver.advance();
            continue;
        }

        let rule_start_pos = driver.current().start();

        let rule = if driver.peek(LexKind::AtKeyword) {
            let rule = at_rule::parse_at_rule(driver, opts, parse_selectors);

            if is_top_level {
                match &rule {
                    Rule::AtCharset { .. } => {
                        if !rules.is_empty() && !charset_order_reported {
                            charset_order_reported = true;
                            at_rule::report_charset_not_first(
                                driver,
                                rule_start_pos,
                                last_rule_pos.unwrap_or(rule_start_pos),
                            );
                        }
                    }
                    Rule::AtImport { .. } => {
                        if saw_non_charset_import_rule && !import_order_reported {
                            import_order_reported = true;
                            at_rule::report_import_after_other(driver, rule_start_pos);
                        }
                    }
                    _ => saw_non_charset_import_rule = true,
                }
            }

            rule
        } else {
            if is_top_level {
                saw_non_charset_import_rule = true;
            }
            qualified_rule::parse_qualified_rule(driver, opts, &DefaultSelectorGrammar, parse_selectors)
        };

        last_rule_pos = Some(rule_start_pos);
        rules.push(rule);
    }

    if opts.mangle_syntax {
        rules = minify::remove_empty_and_duplicate_rules(rules);
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollectingSink, OrderingViolation, ParserError};
    use crate::import_record::ImportRecords;
    use crate::token;

    fn parse(source: &str, opts: &ParserOptions) -> (Vec<Rule>, Vec<crate::error::Diagnostic>) {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let mut driver = Driver::new(&tokens, &mut sink, &mut records);
        let rules = parse_rule_list(&mut driver, opts, true, true);
        (rules, sink.diagnostics)
    }

    #[test]
    fn cdo_cdc_are_skipped_at_top_level() {
        let (rules, diagnostics) = parse("<!-- a {} -->", &ParserOptions::default());
        assert!(diagnostics.is_empty());
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn import_after_selector_rule_warns_once() {
        let (_, diagnostics) = parse(r#"a {} @import "x.css"; @import "y.css";"#, &ParserOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::Ordering(OrderingViolation::ImportAfterOtherRule)));
    }

    #[test]
    fn import_before_any_other_rule_is_silent() {
        let (_, diagnostics) = parse(r#"@import "x.css"; a {}"#, &ParserOptions::default());
        assert!(diagnostics.is_empty());
    }
}

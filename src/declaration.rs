//! §4.6 declaration parser: `IDENT whitespace? ":" value ";"?` with
//! `!important` stripping and custom-property verbatim whitespace.

use crate::ast::{KnownKey, Rule};
use crate::driver::Driver;
use crate::error::DiagnosticSink;
use crate::options::ParserOptions;
use crate::token::LexKind;
use crate::token_tree::ConvertOptions;

pub fn parse_declaration<S: DiagnosticSink>(driver: &mut Driver<S>, opts: &ParserOptions) -> Rule {
    let key_start = driver.cursor();

    if !driver.peek(LexKind::Ident) {
        driver.unexpected_expecting(LexKind::Ident);
        return recover_bad_declaration(driver, key_start, opts);
    }

    let key_text = driver.current().text.clone();
    driver.advance();

    driver.skip_whitespace();

    if !driver.eat(LexKind::Colon) {
        driver.unexpected_expecting(LexKind::Colon);
        return recover_bad_declaration(driver, key_start, opts);
    }

    let value_start = driver.cursor();
    let (_, mut value_end) = driver.consume_component_values_until(&[LexKind::Semicolon, LexKind::BraceClose]);

    let (trimmed_end, important) = strip_trailing_important(driver.tokens(), value_start, value_end);
    value_end = trimmed_end;

    let is_custom_property = key_text.starts_with("--");
    let convert_opts = ConvertOptions {
        allow_imports: true,
        verbatim_whitespace: is_custom_property,
        mangle: opts.mangle_syntax,
    };
    let value = driver.convert_range(value_start, value_end, &convert_opts);

    driver.eat(LexKind::Semicolon);

    Rule::Declaration { key: KnownKey::lookup(&key_text), key_text, value, important }
}

fn recover_bad_declaration<S: DiagnosticSink>(driver: &mut Driver<S>, start: usize, _opts: &ParserOptions) -> Rule {
    let (_, end) = driver.consume_component_values_until(&[LexKind::Semicolon, LexKind::BraceClose]);
    let opts = ConvertOptions { allow_imports: false, verbatim_whitespace: true, mangle: false };
    let tokens = driver.convert_range(start, end, &opts);
    driver.eat(LexKind::Semicolon);
    Rule::BadDeclaration { tokens }
}

/// Strips a trailing `! <ws>? important <ws>?` run from
/// `tokens[start..end]` (§4.6 step 4), scanning from the right. Returns
/// the new (shorter) end and whether `!important` was found.
fn strip_trailing_important(tokens: &[crate::token::LexToken], start: usize, end: usize) -> (usize, bool) {
    let mut idx = end;

    while idx > start && tokens[idx - 1].kind == LexKind::Whitespace {
        idx -= 1;
    }

    if idx == start || tokens[idx - 1].kind != LexKind::Ident || !tokens[idx - 1].text.eq_ignore_ascii_case("important") {
        return (end, false);
    }
    idx -= 1;

    while idx > start && tokens[idx - 1].kind == LexKind::Whitespace {
        idx -= 1;
    }

    if idx == start || !tokens[idx - 1].is_delim('!') {
        return (end, false);
    }
    idx -= 1;

    (idx, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollectingSink, ParserError};
    use crate::import_record::ImportRecords;
    use crate::token;

    fn parse(source: &str, opts: &ParserOptions) -> (Rule, Vec<crate::error::Diagnostic>) {
        let tokens = token::tokenize(source);
        let mut sink = CollectingSink::new();
        let mut records = ImportRecords::new();
        let mut driver = Driver::new(&tokens, &mut sink, &mut records);
        let rule = parse_declaration(&mut driver, opts);
        (rule, sink.diagnostics)
    }

    #[test]
    fn important_is_stripped_from_the_value() {
        let (rule, _) = parse("color: red !important", &ParserOptions::default());
        match rule {
            Rule::Declaration { important, value, key_text, .. } => {
                assert!(important);
                assert_eq!(key_text, "color");
                assert!(value.0.iter().all(|t| !t.text.eq_ignore_ascii_case("important")));
            }
            other => panic!("expected Declaration, got {:?}", other),
        }
    }

    #[test]
    fn missing_colon_recovers() {
        let (rule, diagnostics) = parse("color red", &ParserOptions::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(diagnostics[0].error, ParserError::ExpectedToken { expected: LexKind::Colon, .. }));
        assert!(matches!(rule, Rule::BadDeclaration { .. }));
    }

    #[test]
    fn known_key_is_recognized() {
        let (rule, _) = parse("color: red", &ParserOptions::default());
        match rule {
            Rule::Declaration { key, .. } => assert_eq!(key, KnownKey::Color),
            other => panic!("expected Declaration, got {:?}", other),
        }
    }
}

//! §4.8 minification helpers: text-based number/dimension mangling and
//! the empty/duplicate rule elimination pass.
//!
//! Grounded on the teacher's own shorter-wins unit choice
//! (`values/time.rs`'s `ms`/`s` `ToCss` impl picks whichever
//! representation is shorter) and its leading/trailing zero trimming
//! (`values/number.rs::serialize_number`) — generalized here from
//! float-based serialization to text-based digit surgery, since this
//! core mangles the *lexical* number text directly rather than parsing
//! it to `f32` first (preserving precision the teacher's float
//! round-trip would lose is the whole point of keeping this in the
//! core instead of the printer).

use ahash::AHasher;
use indexmap::IndexMap;
use std::hash::{Hash, Hasher};

use crate::ast::Rule;

/// Drops trailing fractional zeros, a redundant leading `0`, and a
/// lone `.` left behind by the above. Exponents are left untouched.
/// Returns the (possibly unchanged) text and whether it changed.
pub fn mangle_number(text: &str) -> (String, bool) {
    if text.contains(['e', 'E']) {
        return (text.to_owned(), false);
    }

    let Some(dot) = text.find('.') else {
        return (text.to_owned(), false);
    };

    let (sign, rest) = split_sign(text);
    let dot_in_rest = dot - (text.len() - rest.len());
    let (int_part, frac_part) = rest.split_at(dot_in_rest);
    let frac_part = &frac_part[1..]; // drop the '.'

    let trimmed_frac = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(text.len());
    out.push_str(sign);

    if trimmed_frac.is_empty() {
        let int_trimmed = int_part.trim_start_matches('0');
        if int_trimmed.is_empty() {
            out.push('0');
        } else {
            out.push_str(int_trimmed);
        }
    } else {
        let int_trimmed = if int_part == "0" { "" } else { int_part.trim_start_matches('0') };
        out.push_str(int_trimmed);
        out.push('.');
        out.push_str(trimmed_frac);
    }

    let changed = out != text;
    (out, changed)
}

fn split_sign(text: &str) -> (&str, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        ("-", rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        ("+", rest)
    } else {
        ("", text)
    }
}

/// Shifts the decimal point of an exponent-free numeric text by
/// `offset` digits (positive = right, i.e. multiply by `10^offset`).
/// Used by unit conversion (e.g. seconds → milliseconds is `offset=3`).
pub fn shift_dot(text: &str, offset: i32) -> String {
    if text.contains(['e', 'E']) || offset == 0 {
        return text.to_owned();
    }

    let (sign, rest) = split_sign(text);
    let (int_part, frac_part) = match rest.find('.') {
        Some(dot) => (&rest[..dot], &rest[dot + 1..]),
        None => (rest, ""),
    };

    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes()).collect();
    let mut point = int_part.len() as i32 + offset;

    if point < 0 {
        let pad = (-point) as usize;
        let mut padded = vec![b'0'; pad];
        padded.extend(digits);
        digits = padded;
        point = 0;
    } else if point as usize > digits.len() {
        let pad = point as usize - digits.len();
        digits.extend(std::iter::repeat(b'0').take(pad));
    }

    let point = point as usize;
    let (int_digits, frac_digits) = digits.split_at(point);

    let int_str = {
        let s = std::str::from_utf8(int_digits).unwrap();
        let trimmed = s.trim_start_matches('0');
        if trimmed.is_empty() { "0" } else { trimmed }
    };
    let frac_str = std::str::from_utf8(frac_digits).unwrap().trim_end_matches('0');

    let mut out = String::new();
    out.push_str(sign);
    out.push_str(int_str);
    if !frac_str.is_empty() {
        out.push('.');
        out.push_str(frac_str);
    }
    out
}

/// Rewrites a `(number, unit)` dimension under minification. Only
/// `ms`/`s` time units are converted today (§4.8); any other unit is
/// returned with its number passed through [`mangle_number`]
/// unchanged otherwise.
pub fn mangle_dimension(number: &str, unit: &str) -> String {
    let mangled_number = mangle_number(number).0;

    let lower = unit.to_ascii_lowercase();
    let converted = match lower.as_str() {
        "ms" => Some((shift_dot(&mangled_number, -3), "s")),
        "s" => Some((shift_dot(&mangled_number, 3), "ms")),
        _ => None,
    };

    match converted {
        Some((alt_number, alt_unit)) => {
            let alt_number = mangle_number(&alt_number).0;
            let original = format!("{}{}", mangled_number, unit);
            let alternative = format!("{}{}", alt_number, alt_unit);
            if alternative.len() < original.len() {
                alternative
            } else {
                original
            }
        }
        None => format!("{}{}", mangled_number, unit),
    }
}

/// Removes structurally-empty rules and, among the rest, keeps only the
/// last occurrence of each group of structurally-equal rules (§4.8).
/// Scans from the end so "last wins" falls out of a single forward
/// pass over the reversed order rather than needing a second pass.
pub fn remove_empty_and_duplicate_rules(rules: Vec<Rule>) -> Vec<Rule> {
    let mut buckets: IndexMap<u32, Vec<usize>> = IndexMap::new();
    let mut keep = vec![false; rules.len()];

    for (idx, rule) in rules.iter().enumerate().rev() {
        if rule.is_structurally_empty() {
            continue;
        }

        match rule.structural_hash() {
            Some(hash) => {
                let bucket = buckets.entry(hash).or_default();
                let is_duplicate = bucket.iter().any(|&other_idx| rules[other_idx].structurally_equal(rule));
                if is_duplicate {
                    continue;
                }
                bucket.push(idx);
                keep[idx] = true;
            }
            None => {
                keep[idx] = true;
            }
        }
    }

    rules.into_iter().zip(keep).filter_map(|(rule, k)| if k { Some(rule) } else { None }).collect()
}

/// A 32-bit structural hash via `ahash`, seeded per call so buckets are
/// reproducible within one parse and never leak state across parses
/// (§9's open "per-process vs per-parse" question, decided for
/// determinism under test).
pub fn structural_hash(value: &impl Hash) -> u32 {
    let mut hasher = AHasher::default();
    value.hash(&mut hasher);
    (hasher.finish() & 0xFFFF_FFFF) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mangle_number_drops_trailing_fraction_zeros() {
        assert_eq!(mangle_number("1.50").0, "1.5");
        assert_eq!(mangle_number("1.0").0, "1");
        assert_eq!(mangle_number("0.50").0, ".5");
        assert_eq!(mangle_number("-0.50").0, "-.5");
        assert_eq!(mangle_number("0.0").0, "0");
    }

    #[test]
    fn mangle_number_is_idempotent() {
        for n in ["1.50", "1.0", "0.50", "-0.50", "0.0", "10", "-3"] {
            let once = mangle_number(n).0;
            let twice = mangle_number(&once).0;
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn shift_dot_round_trips() {
        for (n, k) in [("1.5", 3), ("0.5", -3), ("120", 2), ("0.001", 3)] {
            let shifted = shift_dot(n, k);
            let back = shift_dot(&shifted, -k);
            assert_eq!(mangle_number(&back).0, mangle_number(n).0);
        }
    }

    #[test]
    fn dimension_picks_shorter_form() {
        assert_eq!(mangle_dimension("0.50", "ms"), ".5ms");
        assert_eq!(mangle_dimension("500", "ms"), ".5s");
    }
}

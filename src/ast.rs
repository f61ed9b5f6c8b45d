//! §3 semantic data model: [`Rule`], [`KeyframeBlock`] and the
//! interned [`KnownKey`] declaration-key lookup.
//!
//! `Rule` is a tagged variant with case-dispatch for the hash/equality
//! capability pair (§9: "avoid a deep class hierarchy"), the same
//! shape the teacher uses for its own `CssRule` enum (`parser.rs`
//! matches on `AtRulePrelude`/`CssRule` variants rather than a trait
//! object per rule kind).

use crate::minify::structural_hash;
use crate::token_tree::TokenTree;

/// An interned, recognized CSS property name, plus the raw text for
/// fidelity (§3 glossary: "Known declaration key"). Unlike the
/// teacher's `PropertyId` (`properties/mod.rs`), this core does not
/// type declaration *values* — only the key is classified, since value
/// grammar validation is an explicit Non-goal (§1).
macro_rules! known_keys {
    ($($variant:ident => $text:literal),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum KnownKey {
            $($variant,)+
            Unknown,
        }

        impl KnownKey {
            pub fn lookup(text: &str) -> KnownKey {
                $(if text.eq_ignore_ascii_case($text) { return KnownKey::$variant; })+
                KnownKey::Unknown
            }
        }
    };
}

known_keys! {
    Color => "color",
    Background => "background",
    BackgroundColor => "background-color",
    Display => "display",
    Width => "width",
    Height => "height",
    Margin => "margin",
    Padding => "padding",
    Border => "border",
    Font => "font",
    FontSize => "font-size",
    FontFamily => "font-family",
    Position => "position",
    Top => "top",
    Right => "right",
    Bottom => "bottom",
    Left => "left",
    Flex => "flex",
    Transform => "transform",
    Transition => "transition",
    Animation => "animation",
    Opacity => "opacity",
    Content => "content",
    ZIndex => "z-index",
}

/// A single keyframe block: `<selector-list> { <declarations> }`.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct KeyframeBlock {
    /// `"0%"`, `"to"`, etc — already mangled if minification is on.
    pub selectors: Vec<String>,
    pub declarations: Vec<Rule>,
}

impl KeyframeBlock {
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

/// Opaque wrapper around a qualified rule's comma-separated selector
/// group. The selector grammar itself is an external collaborator
/// (§1, §6) — this core only needs to carry the prelude tokens for a
/// downstream selector-aware consumer, and to compare two selector
/// groups for byte-for-byte equality during deduplication.
#[derive(Debug, Clone, PartialEq, Hash)]
pub struct Selector(pub TokenTree);

#[derive(Debug, Clone, PartialEq, Hash)]
pub enum Rule {
    AtCharset {
        encoding: String,
    },
    AtImport {
        import_record_index: u32,
        conditions: TokenTree,
    },
    AtKeyframes {
        at_token: String,
        name: String,
        blocks: Vec<KeyframeBlock>,
    },
    KnownAt {
        at_token: String,
        prelude: TokenTree,
        rules: Vec<Rule>,
    },
    UnknownAt {
        at_token: String,
        prelude: TokenTree,
        block: Option<TokenTree>,
    },
    Selector {
        selectors: Vec<Selector>,
        rules: Vec<Rule>,
    },
    Qualified {
        prelude: TokenTree,
        rules: Option<Vec<Rule>>,
    },
    Declaration {
        key: KnownKey,
        key_text: String,
        value: TokenTree,
        important: bool,
    },
    BadDeclaration {
        tokens: TokenTree,
    },
}

impl Rule {
    /// §4.8: structurally empty rules are dropped outright, before
    /// hashing is even attempted.
    pub fn is_structurally_empty(&self) -> bool {
        match self {
            Rule::AtKeyframes { blocks, .. } => blocks.is_empty(),
            Rule::KnownAt { rules, .. } => rules.is_empty(),
            Rule::Selector { rules, .. } => rules.is_empty(),
            _ => false,
        }
    }

    /// A 32-bit structural hash, or `None` when hashing would not be
    /// meaningful — rules carrying an import-record index are
    /// positionally unique and deliberately opt out of deduplication
    /// (§9).
    pub fn structural_hash(&self) -> Option<u32> {
        match self {
            Rule::AtImport { .. } => None,
            other => Some(structural_hash(other)),
        }
    }

    pub fn structurally_equal(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::AtImport { .. }, _) | (_, Rule::AtImport { .. }) => false,
            _ => self == other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_lookup_is_case_insensitive() {
        assert_eq!(KnownKey::lookup("Color"), KnownKey::Color);
        assert_eq!(KnownKey::lookup("BACKGROUND-COLOR"), KnownKey::BackgroundColor);
        assert_eq!(KnownKey::lookup("--custom"), KnownKey::Unknown);
    }

    #[test]
    fn empty_keyframes_and_selector_rules_are_structurally_empty() {
        let keyframes = Rule::AtKeyframes { at_token: "keyframes".into(), name: "k".into(), blocks: Vec::new() };
        assert!(keyframes.is_structurally_empty());

        let selector = Rule::Selector { selectors: Vec::new(), rules: Vec::new() };
        assert!(selector.is_structurally_empty());

        let declaration =
            Rule::Declaration { key: KnownKey::Color, key_text: "color".into(), value: TokenTree::default(), important: false };
        assert!(!declaration.is_structurally_empty());
    }

    #[test]
    fn at_import_never_hashes_or_equals() {
        let a = Rule::AtImport { import_record_index: 0, conditions: TokenTree::default() };
        let b = Rule::AtImport { import_record_index: 1, conditions: TokenTree::default() };
        assert!(a.structural_hash().is_none());
        assert!(!a.structurally_equal(&b));
    }
}

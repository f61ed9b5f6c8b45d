//! §6 options record, grounded on the teacher's `ParserOptions`
//! (`parser.rs`) and its `Option<Browsers>` targets threading — here
//! the "targets" concept is generalized to the feature-bitset the spec
//! calls `UnsupportedCSSFeatures`: read and carried through, never
//! enforced by the core itself.

use bitflags::bitflags;

bitflags! {
    /// Feature bits consumed by a downstream printer; the parser core
    /// only stores this, per §6 ("read but not enforced here").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct UnsupportedFeatures: u32 {
        const NESTING       = 0b0001;
        const CUSTOM_MEDIA  = 0b0010;
        const LOGICAL_PROPS = 0b0100;
    }
}

#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub unsupported_features: UnsupportedFeatures,
    /// §6 `MangleSyntax`: enables number/dimension/keyframe-keyword
    /// rewriting and empty/duplicate rule elimination.
    pub mangle_syntax: bool,
    /// §6 `RemoveWhitespace`: minifying whitespace policy used by the
    /// token-tree converter.
    pub remove_whitespace: bool,
    /// Enables the CSS-Nesting `&` entry point inside declaration
    /// lists (§4.3).
    pub nesting: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            unsupported_features: UnsupportedFeatures::empty(),
            mangle_syntax: false,
            remove_whitespace: false,
            nesting: true,
        }
    }
}

impl ParserOptions {
    pub fn minifying() -> Self {
        ParserOptions { mangle_syntax: true, remove_whitespace: true, ..Default::default() }
    }
}

//! Vendor-prefix recognition for at-keywords (§4.4 generalization, §9
//! open question on `-moz-document`/`-ms-viewport`): a prefixed
//! at-keyword still routes through the same shape classification and
//! keyframes handling as its unprefixed form.
//!
//! Adapted from the teacher's `VendorPrefix` bitflags — trimmed to what
//! this core actually needs (recognizing and stripping a prefix off an
//! at-keyword) rather than the teacher's printer-side duplication
//! ("print the rule once per enabled flag"), which has no counterpart
//! here since this crate never serializes CSS back out.

#![allow(non_upper_case_globals)]

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct VendorPrefix: u8 {
        const WebKit = 0b0001;
        const Moz    = 0b0010;
        const Ms     = 0b0100;
        const O      = 0b1000;
    }
}

const PREFIXES: &[(&str, VendorPrefix)] =
    &[("-webkit-", VendorPrefix::WebKit), ("-moz-", VendorPrefix::Moz), ("-ms-", VendorPrefix::Ms), ("-o-", VendorPrefix::O)];

impl VendorPrefix {
    /// Splits a recognized vendor prefix off `lower` (an already
    /// lowercased at-keyword), returning the prefix flag (empty if none
    /// matched) and the remaining name.
    pub fn strip(lower: &str) -> (VendorPrefix, &str) {
        for (text, flag) in PREFIXES {
            if let Some(rest) = lower.strip_prefix(text) {
                return (*flag, rest);
            }
        }
        (VendorPrefix::empty(), lower)
    }
}

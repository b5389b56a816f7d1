//! Sequel guards.
//!
//! Titles that differ only by a part number ("Rocky II" / "Rocky III",
//! "Spiderman 2" / "Spiderman 3") are textually close but name different
//! films. Keys whose leading component trips a guard only merge when they are
//! identical.

use std::sync::LazyLock;

use regex::Regex;

/// Standalone Roman numeral from I to X.
static ROMAN_NUMERAL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(I|II|III|IV|V|VI|VII|VIII|IX|X)\b").expect("Invalid roman numeral regex")
});

/// Trailing digit run preceded by at least one non-digit.
static SEQUEL_NUMBER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\D+\d+$").expect("Invalid sequel number regex"));

/// True when `title` contains a standalone Roman numeral (`I` to `X`).
pub fn has_roman_numeral(title: &str) -> bool {
    ROMAN_NUMERAL_REGEX.is_match(title)
}

/// True when `title` ends in a number that follows non-digit text.
pub fn has_sequel_number(title: &str) -> bool {
    SEQUEL_NUMBER_REGEX.is_match(title)
}

pub fn is_sequel_title(title: &str) -> bool {
    has_roman_numeral(title) || has_sequel_number(title)
}

//! Key rendering and string similarity.
//!
//! Whole keys are compared as one string, so `("Heat", 1995)` and
//! `("Heat ", 1995)` differ by a single character rather than by a whole
//! component.

use film_model::CellValue;
use rapidfuzz::distance::indel;

/// Highest possible similarity score.
pub const MAX_SCORE: u8 = 100;

/// Similarity of two strings on a 0–100 scale.
///
/// Based on the indel distance (insertions and deletions only), normalized
/// by the combined length and rounded to the nearest integer.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a == b {
        return MAX_SCORE;
    }
    let similarity = indel::normalized_similarity(a.chars(), b.chars());
    (similarity * f64::from(MAX_SCORE)).round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Renders key components as a tuple, e.g. `(Rocky II, 1979)`.
pub fn render_key(components: &[CellValue]) -> String {
    let parts: Vec<String> = components.iter().map(CellValue::render).collect();
    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_score_max() {
        assert_eq!(ratio("(Heat, 1995)", "(Heat, 1995)"), 100);
        assert_eq!(ratio("", ""), 100);
    }

    #[test]
    fn unrelated_strings_score_low() {
        assert!(ratio("Heat", "Casablanca") < 50);
        assert_eq!(ratio("abc", "xyz"), 0);
    }

    #[test]
    fn single_insertion_in_long_key() {
        // 2 * 60 / 121 = 0.9917
        let a = "x".repeat(60);
        let b = format!("{a}y");
        assert_eq!(ratio(&a, &b), 99);
    }

    #[test]
    fn keys_render_as_tuples() {
        let key = [CellValue::text("Rocky II"), CellValue::Number(1979.0)];
        assert_eq!(render_key(&key), "(Rocky II, 1979)");
    }
}

//! `real_quick_ratio` - the character-multiset upper bound on sequence
//! similarity used by the Response-Similarity Classifier (spec.md §9).
//!
//! This deliberately reimplements `difflib.SequenceMatcher.real_quick_ratio`
//! rather than a full edit-distance ratio: `2 * |multiset intersection| /
//! (|a| + |b|)` is O(n) per comparison, which is what makes the RSC phase's
//! `C_req`-bounded fan-out tractable.

/// Upper-bound similarity ratio between two byte strings, rounded to 3
/// decimal places as spec.md §4.5 step 3 requires.
pub fn real_quick_ratio(a: &str, b: &str) -> f64 {
    let mut counts_a = [0u32; 256];
    let mut counts_b = [0u32; 256];
    for byte in a.bytes() {
        counts_a[byte as usize] += 1;
    }
    for byte in b.bytes() {
        counts_b[byte as usize] += 1;
    }

    let matches: u32 = counts_a
        .iter()
        .zip(counts_b.iter())
        .map(|(&ca, &cb)| ca.min(cb))
        .sum();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let ratio = (2.0 * matches as f64) / total as f64;
    round_to_3dp(ratio)
}

fn round_to_3dp(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_fully_similar() {
        assert_eq!(real_quick_ratio("hello world", "hello world"), 1.0);
    }

    #[test]
    fn disjoint_strings_are_dissimilar() {
        assert_eq!(real_quick_ratio("aaaa", "bbbb"), 0.0);
    }

    #[test]
    fn partial_overlap_is_between_zero_and_one() {
        let ratio = real_quick_ratio("catalog page for widgets", "catalog page for gadgets");
        assert!(ratio > 0.5 && ratio < 1.0);
    }

    #[test]
    fn both_empty_is_defined_as_identical() {
        assert_eq!(real_quick_ratio("", ""), 1.0);
    }

    #[test]
    fn result_is_rounded_to_three_decimals() {
        let ratio = real_quick_ratio("abcde", "abcfg");
        assert_eq!((ratio * 1000.0).fract(), 0.0);
    }
}

//! Dictionary template expansion (subdomain candidate generation)

use std::collections::HashSet;

/// The apex domain itself, as a pseudo-candidate
pub const APEX_SENTINEL: &str = "@";

/// Expand every template line in `subs.esd` into the full candidate set,
/// including the apex sentinel `@`.
///
/// Each line may contain `{letter}` / `{number}` placeholders (see
/// `expand_template`). Blank lines and lines containing `#` are skipped by
/// the caller before reaching this function (see `input::read_template_file`).
pub fn expand_dictionary<I, S>(templates: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut candidates = HashSet::new();
    for template in templates {
        for candidate in expand_template(template.as_ref()) {
            candidates.insert(candidate);
        }
    }
    candidates.insert(APEX_SENTINEL.to_string());
    candidates
}

/// Expand a single template line into its Cartesian-product candidates.
///
/// `{letter}` occurrences are all substituted with the same lowercase-letter
/// tuple per expansion step; `{number}` occurrences likewise share a decimal
/// digit tuple. A template with no placeholders yields itself, stripped of
/// leading/trailing dots.
pub fn expand_template(line: &str) -> Vec<String> {
    let letter_count = line.matches("{letter}").count();
    let number_count = line.matches("{number}").count();

    if letter_count == 0 && number_count == 0 {
        return vec![line.trim_matches('.').to_string()];
    }

    let letter_placeholder = "{letter}".repeat(letter_count);
    let mut with_letters = Vec::new();
    if letter_count > 0 {
        for tuple in cartesian_product(b'a'..=b'z', letter_count) {
            with_letters.push(line.replacen(&letter_placeholder, &tuple, 1));
        }
    } else {
        with_letters.push(line.to_string());
    }

    if number_count == 0 {
        return with_letters;
    }

    let number_placeholder = "{number}".repeat(number_count);
    let mut expanded = Vec::with_capacity(with_letters.len() * 10usize.pow(number_count as u32));
    for partial in &with_letters {
        for tuple in cartesian_product(b'0'..=b'9', number_count) {
            expanded.push(partial.replacen(&number_placeholder, &tuple, 1));
        }
    }
    expanded
}

/// All `repeat`-length tuples drawn from `alphabet`, joined into strings, in
/// lexicographic order (e.g. `a..=z`, repeat 2 -> "aa", "ab", .., "zz").
fn cartesian_product(alphabet: std::ops::RangeInclusive<u8>, repeat: usize) -> Vec<String> {
    let symbols: Vec<char> = alphabet.map(|b| b as char).collect();
    let mut results = vec![String::new()];
    for _ in 0..repeat {
        let mut next = Vec::with_capacity(results.len() * symbols.len());
        for prefix in &results {
            for &symbol in &symbols {
                let mut candidate = prefix.clone();
                candidate.push(symbol);
                next.push(candidate);
            }
        }
        results = next;
    }
    results
}

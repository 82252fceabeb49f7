//! Short variable-name allocation

const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Generate the next free short label: `a`..`z`, then `aa`..`az`, `ba`..
/// `zz`. One-letter names are exhausted before two-letter names,
/// lexicographic within each length. Matching against `existing` is exact.
///
/// Returns the empty string when all 26 + 676 candidates are taken; callers
/// must treat `""` as "could not allocate", it is not an error.
pub fn next_label<S: AsRef<str>>(existing: &[S]) -> String {
    let mut first_letters = vec![String::new()];
    first_letters.extend(ALPHABET.chars().map(String::from));

    for first in &first_letters {
        for second in ALPHABET.chars() {
            let candidate = format!("{first}{second}");
            if !existing.iter().any(|name| name.as_ref() == candidate) {
                return candidate;
            }
        }
    }

    String::new()
}

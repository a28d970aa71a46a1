//! Heuristic check that spoken text "starts with" a grapheme.
//!
//! # Responsibility
//! - Decide whether a transcript is credited for a target grapheme.
//!
//! # Invariants
//! - Pure function; no I/O and no logging of transcript content.
//! - Any whitespace-delimited token satisfying any rule is a match.
//! - Rules are checked in order: example word, single letter, digraph
//!   prefix, `Ng` special case.
//! - `ng` at token index 0 never counts for `Ng`.

/// Digraphs credited by token prefix (lowercase).
const PREFIX_DIGRAPHS: &[&str] = &["o'", "g'", "sh", "ch"];

/// The one grapheme that never starts a word.
const NG_GRAPHEME: &str = "ng";

/// Curated words credited for `Ng` by equality or prefix.
const NG_EXAMPLES: &[&str] = &["ming", "qo'ng'iroq", "qo'ng'iz"];

/// Returns whether `transcript` should count as starting with `grapheme`.
///
/// `example_words` are the canonical words for the grapheme; a token equal
/// to one of them, or extending one, is credited before any letter rule.
/// Unknown graphemes fall back to a first-character comparison.
pub fn is_match<S: AsRef<str>>(transcript: &str, grapheme: &str, example_words: &[S]) -> bool {
    let transcript = transcript.to_lowercase();
    let grapheme = grapheme.trim().to_lowercase();
    let examples = example_words
        .iter()
        .map(|word| word.as_ref().to_lowercase())
        .collect::<Vec<_>>();

    transcript
        .split_whitespace()
        .any(|token| token_matches(token, &grapheme, &examples))
}

fn token_matches(token: &str, grapheme: &str, examples: &[String]) -> bool {
    if matches_any_prefix(token, examples.iter().map(String::as_str)) {
        return true;
    }

    if grapheme == NG_GRAPHEME {
        return matches_any_prefix(token, NG_EXAMPLES.iter().copied()) || has_inner_ng(token);
    }

    if PREFIX_DIGRAPHS.contains(&grapheme) {
        return token.starts_with(grapheme);
    }

    match (token.chars().next(), grapheme.chars().next()) {
        (Some(first), Some(target)) => first == target,
        _ => false,
    }
}

fn matches_any_prefix<'a>(token: &str, mut words: impl Iterator<Item = &'a str>) -> bool {
    words.any(|word| !word.is_empty() && token.starts_with(word))
}

/// Checks the first `ng` occurrence for interior or final position.
///
/// Interior: `0 < index < len - 2`. Final: `index == len - 2`.
/// Later occurrences are never inspected.
fn has_inner_ng(token: &str) -> bool {
    let Some(index) = token.find(NG_GRAPHEME) else {
        return false;
    };
    let tail_start = token.len() - NG_GRAPHEME.len();

    let interior = index > 0 && index < tail_start;
    let last = index > 0 && index == tail_start;
    interior || last
}

#[cfg(test)]
mod tests {
    use super::{has_inner_ng, is_match};

    const NO_EXAMPLES: &[&str] = &[];

    #[test]
    fn example_word_matches_in_multi_word_utterance() {
        assert!(is_match(
            "anor keldi",
            "A",
            &["Anor", "Archa", "Avtobus"]
        ));
    }

    #[test]
    fn example_word_prefix_extension_matches() {
        assert!(is_match("bolalar", "Z", &["Bola"]));
    }

    #[test]
    fn single_letter_compares_first_char_case_insensitively() {
        assert!(is_match("Kitob", "k", NO_EXAMPLES));
        assert!(is_match("salom Kuch", "K", NO_EXAMPLES));
        assert!(!is_match("salom", "K", NO_EXAMPLES));
    }

    #[test]
    fn digraphs_require_full_prefix() {
        assert!(is_match("shamol", "Sh", NO_EXAMPLES));
        assert!(is_match("CHOY", "Ch", NO_EXAMPLES));
        assert!(is_match("o'q", "O'", NO_EXAMPLES));
        assert!(is_match("g'isht", "G'", NO_EXAMPLES));
        assert!(!is_match("suv", "Sh", NO_EXAMPLES));
        assert!(!is_match("ona", "O'", NO_EXAMPLES));
        assert!(!is_match("gul", "G'", NO_EXAMPLES));
    }

    #[test]
    fn ng_curated_examples_match() {
        assert!(is_match("ming", "Ng", NO_EXAMPLES));
        assert!(is_match("qo'ng'izlar", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn ng_leading_position_is_rejected() {
        assert!(!is_match("nga", "Ng", NO_EXAMPLES));
        assert!(!is_match("ng", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn ng_interior_and_final_positions_match() {
        assert!(is_match("tongda", "Ng", NO_EXAMPLES));
        assert!(is_match("qongiroq", "Ng", NO_EXAMPLES));
        assert!(is_match("rang", "Ng", NO_EXAMPLES));
        assert!(is_match("salom keng", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn ng_does_not_use_first_letter_rule() {
        assert!(!is_match("non", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn inner_ng_uses_first_occurrence_only() {
        assert!(!has_inner_ng("ngang"));
        assert!(has_inner_ng("angl"));
        assert!(has_inner_ng("ang"));
        assert!(!has_inner_ng("a"));

        assert!(!is_match("ngang", "Ng", NO_EXAMPLES));
        assert!(is_match("angang", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn empty_transcript_never_matches() {
        assert!(!is_match("", "A", &["Anor"]));
        assert!(!is_match("   ", "Ng", NO_EXAMPLES));
    }

    #[test]
    fn unknown_grapheme_falls_back_to_first_char() {
        assert!(is_match("wifi", "W", NO_EXAMPLES));
        assert!(is_match("wifi", "Wh", NO_EXAMPLES));
    }
}

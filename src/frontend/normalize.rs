//! Instruction text normalizer
//!
//! Lowercases, replaces every character that is neither alphanumeric nor one
//! of `'"<>=.-` with a space, then collapses whitespace. Idempotent.

/// Punctuation that survives normalization
const KEPT_PUNCTUATION: &[char] = &['\'', '"', '<', '>', '=', '.', '-'];

pub fn normalize(text: &str) -> String {
    let mapped: String = text
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_alphanumeric() || KEPT_PUNCTUATION.contains(&c) {
                c
            } else {
                ' '
            }
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if `word` occurs in normalized `text` as a whole word
pub fn contains_word(text: &str, word: &str) -> bool {
    if word.contains(' ') {
        return contains_phrase(text, word);
    }
    text.split(' ').any(|w| w.trim_matches(|c: char| c == '.' || c == '"' || c == '\'') == word)
}

/// True if the space-separated `phrase` occurs in `text` on word boundaries
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded = format!(" {} ", text.replace(['.', '"'], " "));
    padded.contains(&format!(" {} ", phrase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_collapses() {
        assert_eq!(normalize("  Send a   GET request!! "), "send a get request");
        assert_eq!(normalize("user_id, then (name)"), "user id then name");
    }

    #[test]
    fn test_keeps_allowed_punctuation() {
        assert_eq!(normalize("x=\"1\" <b> don't a.b-c"), "x=\"1\" <b> don't a.b-c");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "Attach request body with age 42",
            "Expected Output:\n  id value equals 1",
            "attempt SQL injection with ' OR 1=1 -- and verify",
            "\t\tTabs\tand ünïcode ÀÉ",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_contains_word() {
        let text = normalize("Send the request without a body.");
        assert!(contains_word(&text, "body"));
        assert!(contains_word(&text, "without"));
        assert!(!contains_word(&text, "bod"));
        assert!(contains_word(&text, "without a body"));
    }
}

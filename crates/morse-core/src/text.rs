//! Input sanitization.
//!
//! Raw form input becomes a [`SourceText`]: uppercase A-Z, digits and single
//! spaces, nothing else. Filtering never fails; anything unsupported is
//! dropped rather than substituted, so the device stays operable no matter
//! what a client submits.

use heapless::String;

/// Maximum stored message length in bytes.
pub const MESSAGE_MAX_LEN: usize = 64;

/// Sanitized, uppercase, space-collapsed message text.
pub type SourceText = String<MESSAGE_MAX_LEN>;

/// Sanitize raw text into the supported alphabet.
///
/// Lowercase letters are upper-cased, characters outside {A-Z, 0-9, space}
/// are dropped, runs of spaces collapse to one, and the result carries no
/// leading or trailing space. Input beyond [`MESSAGE_MAX_LEN`] is truncated.
/// Idempotent; the output may be empty.
pub fn normalize(raw: &str) -> SourceText {
    let mut text = SourceText::new();
    let mut pending_space = false;

    for c in raw.chars() {
        let c = c.to_ascii_uppercase();
        match c {
            'A'..='Z' | '0'..='9' => {
                let separator = pending_space && !text.is_empty();
                let needed = if separator { 2 } else { 1 };
                if text.len() + needed > text.capacity() {
                    break;
                }
                if separator {
                    let _ = text.push(' ');
                }
                let _ = text.push(c);
                pending_space = false;
            }
            ' ' => pending_space = true,
            _ => {}
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uppercases_and_drops_punctuation() {
        assert_eq!(normalize("hello world!"), "HELLO WORLD");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize("Hi 5"), "HI 5");
    }

    #[test]
    fn output_stays_within_alphabet() {
        let samples = [
            "café au lait",
            "line\r\nbreaks\tand\ttabs",
            "100% legit <script>alert(1)</script>",
            "ALREADY CLEAN 42",
        ];
        for sample in samples {
            let text = normalize(sample);
            assert!(
                text.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == ' '),
                "unexpected character in {text:?}"
            );
        }
    }

    #[test]
    fn collapses_space_runs_and_trims() {
        assert_eq!(normalize("  so   many    spaces  "), "SO MANY SPACES");
    }

    #[test]
    fn is_idempotent() {
        for sample in ["hello world!", "  a  b  ", "MiXeD 123", ""] {
            let once = normalize(sample);
            let twice = normalize(once.as_str());
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn empty_and_unsupported_only_input_yield_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("!!! ??? ..."), "");
    }

    #[test]
    fn truncates_at_the_bound_without_trailing_space() {
        let long: std::string::String = "AB ".repeat(64);
        let text = normalize(&long);
        assert!(text.len() <= MESSAGE_MAX_LEN);
        assert!(!text.ends_with(' '));
        assert!(!text.is_empty());
    }
}

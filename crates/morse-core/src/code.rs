//! Text to Morse symbol encoding.
//!
//! The encoder is a pure function over the normalized alphabet. Symbols are
//! a closed enumeration rather than characters in a buffer, so the duration
//! lookup in [`crate::timing`] is total and the sequencer cannot meet an
//! unknown byte at playback time. Durations are deliberately not part of a
//! symbol; retiming never requires re-encoding.

use heapless::{String, Vec};

use crate::text::MESSAGE_MAX_LEN;

/// One timed unit of playback: a mark (dot, dash) or a gap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorseSymbol {
    Dot,
    Dash,
    /// Separator between the characters of a word.
    IntraLetterGap,
    /// Reserved inter-letter separator; part of the closed set and the
    /// duration table, not produced by [`encode`].
    LetterGap,
    /// Separator between words.
    WordGap,
}

/// Upper bound on symbols per message: five marks per character plus one
/// separator, for a maximal-length message.
pub const SEQUENCE_CAPACITY: usize = MESSAGE_MAX_LEN * 6;

/// A complete message as an ordered symbol list. Rebuilt wholesale whenever
/// the source text changes, never mutated in place.
pub type SymbolSequence = Vec<MorseSymbol, SEQUENCE_CAPACITY>;

/// Display form of a sequence: `.`/`-` marks, `/` for any gap.
pub type PatternString = String<SEQUENCE_CAPACITY>;

/// Encode normalized text into a symbol sequence.
///
/// Words are joined by exactly one [`MorseSymbol::WordGap`], the characters
/// of a word by one [`MorseSymbol::IntraLetterGap`]; a character's own marks
/// carry no separators. Characters without a code table entry contribute
/// neither symbols nor separators. The sequence never starts or ends with a
/// gap. Deterministic; empty input encodes to an empty sequence.
pub fn encode(text: &str) -> SymbolSequence {
    let mut sequence = SymbolSequence::new();
    let mut prior_word = false;

    for word in text.split(' ') {
        let mut prior_char = false;
        for c in word.chars() {
            let marks = character_marks(c);
            if marks.is_empty() {
                continue;
            }
            if prior_char {
                push(&mut sequence, MorseSymbol::IntraLetterGap);
            } else if prior_word {
                push(&mut sequence, MorseSymbol::WordGap);
            }
            for &mark in marks {
                push(&mut sequence, mark);
            }
            prior_char = true;
        }
        prior_word |= prior_char;
    }

    sequence
}

/// Render a sequence as the dot/dash/gap string shown on the setup page.
pub fn render_pattern(sequence: &[MorseSymbol]) -> PatternString {
    let mut pattern = PatternString::new();
    for symbol in sequence {
        let glyph = match symbol {
            MorseSymbol::Dot => '.',
            MorseSymbol::Dash => '-',
            MorseSymbol::IntraLetterGap | MorseSymbol::LetterGap | MorseSymbol::WordGap => '/',
        };
        let _ = pattern.push(glyph);
    }
    pattern
}

/// Capacity covers any normalized message; overflow from oversized raw input
/// is silently truncated, keeping the encoder total.
fn push(sequence: &mut SymbolSequence, symbol: MorseSymbol) {
    let _ = sequence.push(symbol);
}

/// Fixed code table for A-Z and 0-9. Unsupported characters map to an empty
/// pattern.
fn character_marks(c: char) -> &'static [MorseSymbol] {
    use MorseSymbol::{Dash, Dot};

    match c {
        'A' => &[Dot, Dash],
        'B' => &[Dash, Dot, Dot, Dot],
        'C' => &[Dash, Dot, Dash, Dot],
        'D' => &[Dash, Dot, Dot],
        'E' => &[Dot],
        'F' => &[Dot, Dot, Dash, Dot],
        'G' => &[Dash, Dash, Dot],
        'H' => &[Dot, Dot, Dot, Dot],
        'I' => &[Dot, Dot],
        'J' => &[Dot, Dash, Dash, Dash],
        'K' => &[Dash, Dot, Dash],
        'L' => &[Dot, Dash, Dot, Dot],
        'M' => &[Dash, Dash],
        'N' => &[Dash, Dot],
        'O' => &[Dash, Dash, Dash],
        'P' => &[Dot, Dash, Dash, Dot],
        'Q' => &[Dash, Dash, Dot, Dash],
        'R' => &[Dot, Dash, Dot],
        'S' => &[Dot, Dot, Dot],
        'T' => &[Dash],
        'U' => &[Dot, Dot, Dash],
        'V' => &[Dot, Dot, Dot, Dash],
        'W' => &[Dot, Dash, Dash],
        'X' => &[Dash, Dot, Dot, Dash],
        'Y' => &[Dash, Dot, Dash, Dash],
        'Z' => &[Dash, Dash, Dot, Dot],
        '0' => &[Dash, Dash, Dash, Dash, Dash],
        '1' => &[Dot, Dash, Dash, Dash, Dash],
        '2' => &[Dot, Dot, Dash, Dash, Dash],
        '3' => &[Dot, Dot, Dot, Dash, Dash],
        '4' => &[Dot, Dot, Dot, Dot, Dash],
        '5' => &[Dot, Dot, Dot, Dot, Dot],
        '6' => &[Dash, Dot, Dot, Dot, Dot],
        '7' => &[Dash, Dash, Dot, Dot, Dot],
        '8' => &[Dash, Dash, Dash, Dot, Dot],
        '9' => &[Dash, Dash, Dash, Dash, Dot],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::MorseSymbol::{Dash, Dot, IntraLetterGap, WordGap};
    use super::*;

    #[test]
    fn sos_has_gaps_between_letters_only() {
        let expected = [
            Dot, Dot, Dot, IntraLetterGap, Dash, Dash, Dash, IntraLetterGap, Dot, Dot, Dot,
        ];
        assert_eq!(encode("SOS").as_slice(), expected);
    }

    #[test]
    fn empty_input_encodes_to_empty_sequence() {
        assert!(encode("").is_empty());
    }

    #[test]
    fn words_are_joined_by_exactly_one_word_gap() {
        let sequence = encode("A B");
        let word_gaps = sequence.iter().filter(|&&s| s == WordGap).count();
        assert_eq!(word_gaps, 1);
        assert_eq!(sequence.as_slice(), [Dot, Dash, WordGap, Dash, Dot, Dot, Dot]);
        assert!(!matches!(sequence.last().copied(), Some(IntraLetterGap | WordGap)));
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(encode("HELLO WORLD"), encode("HELLO WORLD"));
    }

    #[test]
    fn unsupported_characters_contribute_nothing() {
        assert_eq!(encode("A#B"), encode("AB"));
        assert!(encode("###").is_empty());
    }

    #[test]
    fn hi_5_sequence_and_rendering() {
        let sequence = encode("HI 5");
        let expected = [
            Dot, Dot, Dot, Dot, IntraLetterGap, Dot, Dot, WordGap, Dot, Dot, Dot, Dot, Dot,
        ];
        assert_eq!(sequence.as_slice(), expected);
        assert_eq!(render_pattern(&sequence), "..../../.....");
    }

    #[test]
    fn digit_patterns() {
        assert_eq!(encode("5").as_slice(), [Dot; 5]);
        assert_eq!(encode("0").as_slice(), [Dash; 5]);
    }
}

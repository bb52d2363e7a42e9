//! Per-symbol playback timing.

use embassy_time::Duration;

use crate::code::MorseSymbol;

/// Logical output level decided by the sequencer. The firmware maps it onto
/// its complementary LED pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinState {
    Off,
    On,
}

impl PinState {
    pub const fn is_on(self) -> bool {
        matches!(self, PinState::On)
    }
}

/// What playing one symbol means: hold the pin at `pin` for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolStep {
    pub pin: PinState,
    pub duration: Duration,
}

/// Duration table keyed by symbol kind, plus the pause between message
/// repetitions. Lookup is total over the closed symbol set.
#[derive(Debug, Clone, Copy)]
pub struct BlinkTiming {
    pub dot: Duration,
    pub dash: Duration,
    pub intra_letter_gap: Duration,
    pub letter_gap: Duration,
    pub word_gap: Duration,
    pub message_gap: Duration,
}

impl BlinkTiming {
    pub const fn new() -> Self {
        Self {
            dot: Duration::from_millis(100),
            dash: Duration::from_millis(400),
            intra_letter_gap: Duration::from_millis(200),
            letter_gap: Duration::from_millis(1000),
            word_gap: Duration::from_millis(1500),
            message_gap: Duration::from_millis(2000),
        }
    }

    /// The (on/off, duration) step for a symbol.
    pub const fn step(&self, symbol: MorseSymbol) -> SymbolStep {
        match symbol {
            MorseSymbol::Dot => SymbolStep { pin: PinState::On, duration: self.dot },
            MorseSymbol::Dash => SymbolStep { pin: PinState::On, duration: self.dash },
            MorseSymbol::IntraLetterGap => {
                SymbolStep { pin: PinState::Off, duration: self.intra_letter_gap }
            }
            MorseSymbol::LetterGap => {
                SymbolStep { pin: PinState::Off, duration: self.letter_gap }
            }
            MorseSymbol::WordGap => {
                SymbolStep { pin: PinState::Off, duration: self.word_gap }
            }
        }
    }

    /// Upper bound on how long a scheduler pass may wait: the dot duration,
    /// the shortest configured step.
    pub const fn poll_bound(&self) -> Duration {
        self.dot
    }
}

impl Default for BlinkTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_and_marks_drive_the_pin() {
        let timing = BlinkTiming::new();
        let symbols = [
            MorseSymbol::Dot,
            MorseSymbol::Dash,
            MorseSymbol::IntraLetterGap,
            MorseSymbol::LetterGap,
            MorseSymbol::WordGap,
        ];
        for symbol in symbols {
            let step = timing.step(symbol);
            let on = matches!(symbol, MorseSymbol::Dot | MorseSymbol::Dash);
            assert_eq!(step.pin.is_on(), on, "{symbol:?}");
            assert!(step.duration > Duration::from_ticks(0));
        }
    }

    #[test]
    fn durations_are_distinct() {
        let t = BlinkTiming::new();
        let all = [t.dot, t.dash, t.intra_letter_gap, t.letter_gap, t.word_gap];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn poll_bound_is_the_dot_duration() {
        let timing = BlinkTiming::new();
        assert_eq!(timing.poll_bound(), timing.dot);
    }
}

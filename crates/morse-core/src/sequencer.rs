//! Tick-driven blink state machine.
//!
//! The sequencer owns the active [`SymbolSequence`] and the playback cursor.
//! It is advanced exclusively by the scheduler loop, which feeds it the
//! wall-clock time elapsed since the previous pass and applies the returned
//! pin state. Waiting is never expressed as a sleep inside the machine;
//! "time spent in the current step" is explicit state, so the caller stays
//! free to service network traffic between ticks.

use embassy_time::Duration;

use crate::code::SymbolSequence;
use crate::timing::{BlinkTiming, PinState};

const ZERO: Duration = Duration::from_ticks(0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Empty sequence; nothing to play, pin off.
    Idle,
    /// Playing `sequence[index]`, `held` of its duration already spent.
    Holding { index: usize, held: Duration },
    /// Past the last symbol; pin held off for the message gap, `waited` of
    /// it already spent. Entered on install as well, so a fresh or replaced
    /// message always starts from a dark pause.
    SequenceComplete { waited: Duration },
}

/// Blink playback state machine. See [`crate`] docs for the ownership model.
pub struct BlinkSequencer {
    timing: BlinkTiming,
    sequence: SymbolSequence,
    phase: Phase,
    pin: PinState,
}

impl BlinkSequencer {
    /// New sequencer with no message: idle, pin off.
    pub fn new(timing: BlinkTiming) -> Self {
        Self {
            timing,
            sequence: SymbolSequence::new(),
            phase: Phase::Idle,
            pin: PinState::Off,
        }
    }

    /// Atomically replace the active sequence.
    ///
    /// The in-progress step is abandoned, the cursor resets, and the pin is
    /// forced off for one full message gap before the new sequence plays.
    /// No suffix of the old sequence is ever resumed.
    pub fn install(&mut self, sequence: SymbolSequence) {
        log::debug!("sequencer: installing {} symbols", sequence.len());
        self.sequence = sequence;
        self.phase = Phase::SequenceComplete { waited: ZERO };
        self.pin = PinState::Off;
    }

    /// Advance playback by `elapsed` and return the pin state to apply.
    ///
    /// A tick that reaches a step's full duration advances immediately
    /// (`elapsed == duration` counts as reached); a tick larger than the
    /// remaining step carries its overflow across as many symbols as it
    /// covers. After the last symbol the machine pauses for the message gap
    /// with the pin off, then restarts from the first symbol.
    pub fn tick(&mut self, elapsed: Duration) -> PinState {
        let mut budget = elapsed;
        loop {
            match self.phase {
                Phase::Idle => {
                    self.pin = PinState::Off;
                    break;
                }
                Phase::Holding { index, held } => {
                    let Some(&symbol) = self.sequence.get(index) else {
                        self.phase = Phase::SequenceComplete { waited: ZERO };
                        continue;
                    };
                    let step = self.timing.step(symbol);
                    self.pin = step.pin;
                    let remaining = saturating_remainder(step.duration, held);
                    if budget >= remaining {
                        budget = budget - remaining;
                        self.phase = if index + 1 < self.sequence.len() {
                            Phase::Holding { index: index + 1, held: ZERO }
                        } else {
                            Phase::SequenceComplete { waited: ZERO }
                        };
                    } else {
                        self.phase = Phase::Holding { index, held: held + budget };
                        break;
                    }
                }
                Phase::SequenceComplete { waited } => {
                    self.pin = PinState::Off;
                    let remaining = saturating_remainder(self.timing.message_gap, waited);
                    if budget >= remaining {
                        budget = budget - remaining;
                        if self.sequence.is_empty() {
                            self.phase = Phase::Idle;
                        } else {
                            self.phase = Phase::Holding { index: 0, held: ZERO };
                        }
                    } else {
                        self.phase = Phase::SequenceComplete { waited: waited + budget };
                        break;
                    }
                }
            }
        }
        self.pin
    }

    /// How long the scheduler may wait before the next tick: time left in
    /// the current step, bounded by the dot duration so a pending network
    /// request is never starved for longer than the shortest step.
    pub fn poll_budget(&self) -> Duration {
        let bound = self.timing.poll_bound();
        let remaining = match self.phase {
            Phase::Idle => bound,
            Phase::Holding { index, held } => match self.sequence.get(index) {
                Some(&symbol) => saturating_remainder(self.timing.step(symbol).duration, held),
                None => ZERO,
            },
            Phase::SequenceComplete { waited } => {
                saturating_remainder(self.timing.message_gap, waited)
            }
        };
        remaining.min(bound)
    }

    /// Pin state decided by the last tick.
    pub fn pin_state(&self) -> PinState {
        self.pin
    }

    /// Cursor position while a symbol is playing.
    pub fn cursor(&self) -> Option<usize> {
        match self.phase {
            Phase::Holding { index, .. } => Some(index),
            _ => None,
        }
    }

    /// True while the message-boundary pause runs.
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::SequenceComplete { .. })
    }

    /// True when there is no message to play.
    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }
}

fn saturating_remainder(duration: Duration, spent: Duration) -> Duration {
    if spent >= duration { ZERO } else { duration - spent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{MorseSymbol, encode};
    use crate::timing::SymbolStep;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn sequencer_with(text: &str) -> (BlinkSequencer, SymbolSequence) {
        let sequence = encode(text);
        let mut sequencer = BlinkSequencer::new(BlinkTiming::new());
        sequencer.install(sequence.clone());
        (sequencer, sequence)
    }

    fn total_duration(timing: &BlinkTiming, sequence: &[MorseSymbol]) -> Duration {
        sequence
            .iter()
            .fold(ZERO, |sum, &s| sum + timing.step(s).duration)
    }

    #[test]
    fn fresh_sequencer_is_idle_and_off() {
        let mut sequencer = BlinkSequencer::new(BlinkTiming::new());
        assert!(sequencer.is_idle());
        assert_eq!(sequencer.tick(ms(10_000)), PinState::Off);
        assert!(sequencer.is_idle());
    }

    #[test]
    fn playback_starts_after_one_message_gap() {
        let timing = BlinkTiming::new();
        let (mut sequencer, _) = sequencer_with("E");
        assert!(sequencer.is_complete());

        let almost = timing.message_gap - ms(1);
        assert_eq!(sequencer.tick(almost), PinState::Off);
        assert!(sequencer.is_complete());

        // The boundary tie advances straight into the first symbol.
        assert_eq!(sequencer.tick(ms(1)), PinState::On);
        assert_eq!(sequencer.cursor(), Some(0));
    }

    #[test]
    fn exact_total_duration_reaches_sequence_complete() {
        let timing = BlinkTiming::new();
        let (mut sequencer, sequence) = sequencer_with("SOS");
        sequencer.tick(timing.message_gap);

        let total = total_duration(&timing, &sequence);
        assert_eq!(sequencer.tick(total), PinState::Off);
        assert!(sequencer.is_complete());
        assert_eq!(sequencer.cursor(), None);
    }

    #[test]
    fn tick_granularity_does_not_change_boundary_pin_history() {
        let timing = BlinkTiming::new();
        let (mut coarse, sequence) = sequencer_with("HI 5");
        coarse.tick(timing.message_gap);
        let total = total_duration(&timing, &sequence);
        coarse.tick(total);
        assert!(coarse.is_complete());

        let (mut fine, _) = sequencer_with("HI 5");
        fine.tick(timing.message_gap);

        // At each symbol boundary the pin must already show the next step.
        let mut boundaries = heapless::Vec::<(u64, PinState), 512>::new();
        let mut at = 0u64;
        for (i, &symbol) in sequence.iter().enumerate() {
            let SymbolStep { duration, .. } = timing.step(symbol);
            at += duration.as_millis();
            let after = match sequence.get(i + 1) {
                Some(&next) => timing.step(next).pin,
                None => PinState::Off,
            };
            boundaries.push((at, after)).unwrap();
        }

        let mut expected = boundaries.iter();
        let mut next_boundary = expected.next();
        for t in 1..=total.as_millis() {
            let pin = fine.tick(ms(1));
            if let Some(&(boundary, wanted)) = next_boundary {
                if t == boundary {
                    assert_eq!(pin, wanted, "pin mismatch at {t} ms");
                    next_boundary = expected.next();
                }
            }
        }
        assert!(fine.is_complete());
        assert!(next_boundary.is_none());
    }

    #[test]
    fn install_mid_sequence_never_resumes_the_old_suffix() {
        let timing = BlinkTiming::new();
        let (mut sequencer, _) = sequencer_with("OOO");
        sequencer.tick(timing.message_gap);

        // Part-way into the first dash of the old message.
        assert_eq!(sequencer.tick(ms(150)), PinState::On);
        assert_eq!(sequencer.cursor(), Some(0));

        sequencer.install(encode("E"));
        assert_eq!(sequencer.pin_state(), PinState::Off);
        assert_eq!(sequencer.cursor(), None);

        // The whole message gap passes dark; a resumed old dash would show On.
        let gap_ms = timing.message_gap.as_millis();
        for _ in 0..gap_ms - 1 {
            assert_eq!(sequencer.tick(ms(1)), PinState::Off);
        }
        // New message starts from its first symbol: a single dot.
        assert_eq!(sequencer.tick(ms(1)), PinState::On);
        assert_eq!(sequencer.cursor(), Some(0));
        sequencer.tick(timing.dot);
        assert!(sequencer.is_complete());
    }

    #[test]
    fn installing_empty_sequence_settles_idle_and_off() {
        let timing = BlinkTiming::new();
        let (mut sequencer, _) = sequencer_with("SOS");
        sequencer.tick(timing.message_gap + ms(50));

        sequencer.install(encode(""));
        assert_eq!(sequencer.tick(timing.message_gap), PinState::Off);
        assert!(sequencer.is_idle());
        assert_eq!(sequencer.tick(ms(60_000)), PinState::Off);
    }

    #[test]
    fn message_repeats_after_the_gap() {
        let timing = BlinkTiming::new();
        let (mut sequencer, sequence) = sequencer_with("A");
        sequencer.tick(timing.message_gap);
        sequencer.tick(total_duration(&timing, &sequence));
        assert!(sequencer.is_complete());

        sequencer.tick(timing.message_gap);
        assert_eq!(sequencer.cursor(), Some(0));
        assert_eq!(sequencer.pin_state(), PinState::On);
    }

    #[test]
    fn poll_budget_never_exceeds_the_dot_duration() {
        let timing = BlinkTiming::new();
        let (mut sequencer, sequence) = sequencer_with("HELLO WORLD 73");
        let horizon =
            (timing.message_gap + total_duration(&timing, &sequence)).as_millis() * 2;

        let mut spent = 0u64;
        while spent < horizon {
            let budget = sequencer.poll_budget();
            assert!(budget <= timing.poll_bound(), "budget {budget:?} at {spent} ms");
            let step = budget.as_millis().max(1);
            sequencer.tick(ms(step));
            spent += step;
        }
    }

    #[test]
    fn poll_budget_shrinks_to_the_step_edge() {
        let timing = BlinkTiming::new();
        let (mut sequencer, _) = sequencer_with("S");
        sequencer.tick(timing.message_gap);

        // 40 ms into a 100 ms dot: 60 ms left, under the bound.
        sequencer.tick(ms(40));
        assert_eq!(sequencer.poll_budget(), ms(60));

        // Mid-dash the remainder exceeds the bound and is clamped.
        let (mut dashing, _) = sequencer_with("T");
        dashing.tick(timing.message_gap);
        dashing.tick(ms(10));
        assert_eq!(dashing.poll_budget(), timing.poll_bound());
    }
}

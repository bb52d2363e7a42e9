#![cfg_attr(not(test), no_std)]

//! Morse blink core
//!
//! Pure playback logic for the Morse blinker firmware:
//! - `text` - input sanitization into the supported alphabet
//! - `code` - text to symbol-sequence encoding and pattern rendering
//! - `timing` - per-symbol duration table
//! - `sequencer` - the tick-driven blink state machine
//!
//! Nothing in here touches hardware or sockets. The firmware's scheduler
//! loop feeds elapsed time into [`BlinkSequencer::tick`] and applies the
//! returned pin state; request handlers rebuild sequences with
//! [`normalize`] + [`encode`] and swap them in via
//! [`BlinkSequencer::install`].

pub mod code;
pub mod sequencer;
pub mod text;
pub mod timing;

pub use code::{MorseSymbol, PatternString, SEQUENCE_CAPACITY, SymbolSequence, encode, render_pattern};
pub use sequencer::BlinkSequencer;
pub use text::{MESSAGE_MAX_LEN, SourceText, normalize};
pub use timing::{BlinkTiming, PinState, SymbolStep};

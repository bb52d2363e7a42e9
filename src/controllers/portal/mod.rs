//! Setup portal wiring.
//!
//! The HTTP handler and the scheduler share two pieces of state:
//! - a blocking-mutex cell with the published text, its pattern rendering
//!   and the pending sequence swap (sync closure access only, never held
//!   across an await) - this is the single controlled update path between
//!   request handling and playback;
//! - an async-mutex slot with the flash store, locked for the duration of a
//!   save.

mod http;
mod page;

pub use http::PortalHttpController;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use morse_core::{PatternString, SourceText, SymbolSequence, encode, render_pattern};

use crate::domain::ports::{MessageStore as _, StorageError};
use crate::infrastructure::repositories::FlashMessageStore;

/// What the page shows: the stored text and its pattern rendering.
pub(crate) struct PortalView {
    pub text: SourceText,
    pub pattern: PatternString,
}

struct PortalState {
    view: PortalView,
    pending: Option<SymbolSequence>,
}

static PORTAL_STATE: Mutex<CriticalSectionRawMutex, RefCell<Option<PortalState>>> =
    Mutex::new(RefCell::new(None));

static MESSAGE_STORE: AsyncMutex<CriticalSectionRawMutex, Option<FlashMessageStore>> =
    AsyncMutex::new(None);

/// Install the store and the boot message; returns the initial sequence for
/// the scheduler.
pub async fn init_portal_controllers(
    store: FlashMessageStore,
    text: SourceText,
) -> SymbolSequence {
    let sequence = encode(text.as_str());
    let pattern = render_pattern(&sequence);
    PORTAL_STATE.lock(|cell| {
        cell.borrow_mut().replace(PortalState {
            view: PortalView { text, pattern },
            pending: None,
        });
    });
    *MESSAGE_STORE.lock().await = Some(store);
    sequence
}

/// Publish a new message and queue its sequence for the scheduler's next
/// tick.
pub(crate) fn publish_message(
    text: SourceText,
    sequence: SymbolSequence,
    pattern: PatternString,
) {
    PORTAL_STATE.lock(|cell| {
        if let Some(state) = cell.borrow_mut().as_mut() {
            state.view = PortalView { text, pattern };
            state.pending = Some(sequence);
        }
    });
}

/// Sequence swap left by the last update, if any. Scheduler side.
pub fn take_pending_sequence() -> Option<SymbolSequence> {
    PORTAL_STATE.lock(|cell| cell.borrow_mut().as_mut().and_then(|state| state.pending.take()))
}

/// Run `f` against the current view; `None` before initialization.
pub(crate) fn with_portal_view<R>(f: impl FnOnce(&PortalView) -> R) -> Option<R> {
    PORTAL_STATE.lock(|cell| cell.borrow().as_ref().map(|state| f(&state.view)))
}

/// Persist a message for the handler; serialized through the store mutex.
pub(crate) async fn save_message(text: &str) -> Result<(), StorageError> {
    let mut guard = MESSAGE_STORE.lock().await;
    match guard.as_mut() {
        Some(store) => store.save(text).await,
        None => Err(StorageError::DriverError),
    }
}

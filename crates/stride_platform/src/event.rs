//! Event loop and platform events

use crate::error::PlatformError;
use crate::input::InputEvent;

/// Event loop abstraction
///
/// Hosts implement this trait to feed device events and frame ticks to the
/// locomotion controller in the order they happen.
pub trait EventLoop {
    /// Run the event loop
    ///
    /// This method blocks until the loop is exhausted or the handler
    /// returns `ControlFlow::Exit`.
    fn run<F>(self, handler: F) -> Result<(), PlatformError>
    where
        F: FnMut(Event) -> ControlFlow;
}

/// Control flow after handling an event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlFlow {
    /// Continue running the event loop
    #[default]
    Continue,
    /// Exit the event loop
    Exit,
}

/// Platform events
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Input event (keyboard, pointer, touch)
    Input(InputEvent),
    /// Host pointer lock was acquired or released
    PointerLockChanged(bool),
    /// Application lifecycle event
    Lifecycle(LifecycleEvent),
    /// Frame tick - run one simulation step
    Frame {
        /// Seconds since the previous frame
        dt: f32,
    },
}

/// Application lifecycle events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Application resumed (came to foreground)
    Resumed,
    /// Application suspended (went to background)
    Suspended,
}

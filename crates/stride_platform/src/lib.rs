//! Stride Platform Abstraction Layer
//!
//! Platform-agnostic device events for the locomotion controller: keyboard
//! keys, relative pointer motion, touches with stable identifiers, pointer
//! lock changes and frame ticks.
//!
//! # Architecture
//!
//! - [`EventLoop`] - a host feeds [`Event`]s to a handler in arrival order
//! - [`DeviceCapabilities`] - what the host reports about touch hardware
//! - [`detect_channel`] - picks keyboard or touch controls, failing safe to
//!   keyboard
//!
//! # Example
//!
//! ```ignore
//! use stride_platform::*;
//!
//! host_event_loop.run(|event| {
//!     match event {
//!         Event::Frame { dt } => {
//!             // Run one controller tick
//!         }
//!         Event::Input(InputEvent::Keyboard(key)) => {
//!             // Route to the keyboard handler
//!         }
//!         _ => {}
//!     }
//!     ControlFlow::Continue
//! })?;
//! ```

mod capabilities;
mod error;
mod event;
mod input;

// Re-export all public types
pub use capabilities::{detect_channel, DeviceCapabilities};
pub use error::{PlatformError, Result};
pub use event::{ControlFlow, Event, EventLoop, LifecycleEvent};
pub use input::{InputEvent, Key, KeyState, KeyboardEvent, PointerMotion, TouchEvent};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::capabilities::{detect_channel, DeviceCapabilities};
    pub use crate::error::{PlatformError, Result};
    pub use crate::event::{ControlFlow, Event, EventLoop, LifecycleEvent};
    pub use crate::input::{InputEvent, Key, KeyState, KeyboardEvent, PointerMotion, TouchEvent};
}

//! Input event types for keyboard, pointer, and touch

use serde::{Deserialize, Serialize};

/// Input events
#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    /// Keyboard event
    Keyboard(KeyboardEvent),
    /// Relative pointer motion (delivered while the pointer is locked)
    Pointer(PointerMotion),
    /// Touch event (mobile/touchscreen)
    Touch(TouchEvent),
}

// ============================================================================
// Pointer
// ============================================================================

/// Relative mouse movement since the previous motion event, in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerMotion {
    pub dx: f32,
    pub dy: f32,
}

impl PointerMotion {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

// ============================================================================
// Keyboard Events
// ============================================================================

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed or released
    pub key: Key,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Auto-repeat from a held key
    pub repeat: bool,
}

impl KeyboardEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Pressed,
            repeat: false,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            state: KeyState::Released,
            repeat: false,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.state == KeyState::Pressed
    }
}

/// Key press/release state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key was pressed
    Pressed,
    /// Key was released
    Released,
}

/// Physical key codes
///
/// Named by position on a US layout, so WASD stays WASD on AZERTY.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // Letters
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,

    // Arrow keys
    Left,
    Right,
    Up,
    Down,

    // Special keys
    Space,
    Enter,
    Escape,
    Tab,
    Shift,
    Ctrl,
    Alt,

    // Unknown key
    Unknown,
}

// ============================================================================
// Touch Events
// ============================================================================

/// Touch events for touchscreens
#[derive(Clone, Debug, PartialEq)]
pub enum TouchEvent {
    /// A touch started
    Started {
        /// Stable identifier for this touch until it ends
        id: u64,
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// A touch moved
    Moved {
        /// Stable identifier for this touch until it ends
        id: u64,
        /// X position in window coordinates
        x: f32,
        /// Y position in window coordinates
        y: f32,
    },
    /// A touch ended
    Ended {
        /// Stable identifier for this touch until it ends
        id: u64,
        /// X position when ended
        x: f32,
        /// Y position when ended
        y: f32,
    },
    /// A touch was cancelled (e.g., by system gesture)
    Cancelled {
        /// Stable identifier for this touch until it ends
        id: u64,
    },
}

impl TouchEvent {
    /// Get the touch ID
    pub fn id(&self) -> u64 {
        match self {
            TouchEvent::Started { id, .. } => *id,
            TouchEvent::Moved { id, .. } => *id,
            TouchEvent::Ended { id, .. } => *id,
            TouchEvent::Cancelled { id } => *id,
        }
    }
}

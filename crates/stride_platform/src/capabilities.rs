//! Device capability detection

use stride_core::InputChannel;

/// What the host reports about its input hardware
///
/// `None` means the host could not answer the question.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceCapabilities {
    /// Host delivers touch events at all
    pub touch_events: Option<bool>,
    /// Maximum simultaneous touch points
    pub max_touch_points: Option<u32>,
}

impl DeviceCapabilities {
    /// Desktop with keyboard and mouse
    pub fn desktop() -> Self {
        Self {
            touch_events: Some(false),
            max_touch_points: Some(0),
        }
    }

    /// Phone or tablet
    pub fn touchscreen(points: u32) -> Self {
        Self {
            touch_events: Some(true),
            max_touch_points: Some(points),
        }
    }

    /// Whether the device should be driven with touch controls
    ///
    /// Unknown answers count as "no touch".
    pub fn is_touch(&self) -> bool {
        self.touch_events.unwrap_or(false) || self.max_touch_points.unwrap_or(0) > 0
    }
}

/// Pick the input channel for a device, failing safe to keyboard
pub fn detect_channel(capabilities: &DeviceCapabilities) -> InputChannel {
    if capabilities.is_touch() {
        InputChannel::Touch
    } else {
        InputChannel::Keyboard
    }
}

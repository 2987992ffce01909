//! Scripted input for headless runs
//!
//! A [`ScriptedEventLoop`] plays a fixed input pattern at a fixed frame
//! rate, the way a host event loop would deliver device events between
//! frames.

use clap::ValueEnum;
use stride_platform::{
    ControlFlow, DeviceCapabilities, Event, EventLoop, InputEvent, Key, KeyboardEvent,
    LifecycleEvent, PlatformError, TouchEvent,
};

const VIEWPORT_WIDTH: f32 = 800.0;
const JOYSTICK_TOUCH: u64 = 1;
const LOOK_TOUCH: u64 = 2;
const STOP_GO_PERIOD: f64 = 2.0;

/// Built-in input patterns
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Script {
    /// Hold W
    Forward,
    /// Hold W and D
    Diagonal,
    /// Hold D
    Strafe,
    /// W for one second, nothing for one second, repeat
    StopGo,
    /// Joystick pushed forward while dragging the look area to the right
    Touch,
}

impl Script {
    /// Device the script pretends to run on
    pub fn capabilities(self) -> DeviceCapabilities {
        match self {
            Script::Touch => DeviceCapabilities::touchscreen(5),
            _ => DeviceCapabilities::desktop(),
        }
    }

    pub fn viewport_width(self) -> f32 {
        VIEWPORT_WIDTH
    }

    fn held_keys(self) -> &'static [Key] {
        match self {
            Script::Forward | Script::StopGo => &[Key::W],
            Script::Diagonal => &[Key::W, Key::D],
            Script::Strafe => &[Key::D],
            Script::Touch => &[],
        }
    }
}

/// Fixed-rate event loop driven by a [`Script`]
#[derive(Clone, Debug)]
pub struct ScriptedEventLoop {
    script: Script,
    dt: f32,
    frames: u64,
}

impl ScriptedEventLoop {
    pub fn new(script: Script, seconds: f32, dt: f32) -> Result<Self, PlatformError> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PlatformError::EventLoop(format!("invalid frame delta {dt}")));
        }
        if !(seconds.is_finite() && seconds >= 0.0) {
            return Err(PlatformError::EventLoop(format!("invalid duration {seconds}")));
        }
        Ok(Self {
            script,
            dt,
            frames: (seconds / dt).round() as u64,
        })
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Device events delivered before frame `frame`
    pub fn events_before(&self, frame: u64) -> Vec<Event> {
        let mut events = Vec::new();
        let key = |event| Event::Input(InputEvent::Keyboard(event));
        let touch = |event| Event::Input(InputEvent::Touch(event));

        if frame == 0 {
            match self.script {
                Script::Touch => {
                    // Stick pushed a full radius up
                    events.push(touch(TouchEvent::Started {
                        id: JOYSTICK_TOUCH,
                        x: 120.0,
                        y: 500.0,
                    }));
                    events.push(touch(TouchEvent::Moved {
                        id: JOYSTICK_TOUCH,
                        x: 120.0,
                        y: 440.0,
                    }));
                    events.push(touch(TouchEvent::Started {
                        id: LOOK_TOUCH,
                        x: 600.0,
                        y: 300.0,
                    }));
                }
                script => {
                    events.push(Event::PointerLockChanged(true));
                    for &k in script.held_keys() {
                        events.push(key(KeyboardEvent::pressed(k)));
                    }
                }
            }
            return events;
        }

        match self.script {
            Script::StopGo => {
                let walking =
                    |f: u64| (f as f64 * f64::from(self.dt)) % STOP_GO_PERIOD < STOP_GO_PERIOD / 2.0;
                match (walking(frame - 1), walking(frame)) {
                    (true, false) => events.push(key(KeyboardEvent::released(Key::W))),
                    (false, true) => events.push(key(KeyboardEvent::pressed(Key::W))),
                    _ => {}
                }
            }
            Script::Touch => {
                // Slow pan to the right, two pixels per frame
                let x = 600.0 + 2.0 * frame as f32;
                events.push(touch(TouchEvent::Moved {
                    id: LOOK_TOUCH,
                    x,
                    y: 300.0,
                }));
            }
            _ => {}
        }
        events
    }
}

impl EventLoop for ScriptedEventLoop {
    fn run<F>(self, mut handler: F) -> Result<(), PlatformError>
    where
        F: FnMut(Event) -> ControlFlow,
    {
        for frame in 0..self.frames {
            for event in self.events_before(frame) {
                if handler(event) == ControlFlow::Exit {
                    return Ok(());
                }
            }
            if handler(Event::Frame { dt: self.dt }) == ControlFlow::Exit {
                return Ok(());
            }
        }
        handler(Event::Lifecycle(LifecycleEvent::Suspended));
        Ok(())
    }
}

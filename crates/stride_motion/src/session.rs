//! Walk session
//!
//! Owns everything a host needs for one walking experience: the controller,
//! the device routers, and the body and camera once the host provides them.
//! Platform [`Event`]s go in through [`WalkSession::handle_event`]; frame
//! events come back out as [`TickReport`]s.

use crate::body::PhysicsBody;
use crate::camera::CameraHandle;
use crate::config::{ConfigError, StrideConfig};
use crate::controller::{FrameContext, TickReport, WalkController};
use crate::devices::{KeyAction, KeyboardRouter, LockChange, PointerLook, TouchControls};
use std::sync::Arc;
use stride_core::{InputChannel, InputStore};
use stride_platform::{
    detect_channel, ControlFlow, DeviceCapabilities, Event, EventLoop, InputEvent, LifecycleEvent,
};

pub struct WalkSession<B, C> {
    controller: WalkController,
    keyboard: KeyboardRouter,
    touch: TouchControls,
    pointer: PointerLook,
    channel: InputChannel,
    body: Option<B>,
    camera: Option<C>,
}

impl<B, C> std::fmt::Debug for WalkSession<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalkSession")
            .field("controller", &self.controller)
            .field("channel", &self.channel)
            .field("pointer", &self.pointer)
            .field("body", &self.body.is_some())
            .field("camera", &self.camera.is_some())
            .finish()
    }
}

impl<B: PhysicsBody, C: CameraHandle> WalkSession<B, C> {
    /// Create a session for a device
    ///
    /// The input channel is picked once from the device capabilities.
    pub fn new(
        config: StrideConfig,
        capabilities: &DeviceCapabilities,
        viewport_width: f32,
    ) -> Result<Self, ConfigError> {
        let channel = detect_channel(capabilities);
        let input = Arc::new(InputStore::new());
        input.set_touch_mode(channel == InputChannel::Touch);

        let keyboard = KeyboardRouter::new(config.keys.clone());
        let touch = TouchControls::new(config.touch.clone(), viewport_width);
        let pointer = PointerLook::new(&config.look, channel);
        let controller = WalkController::new(config, input)?;

        tracing::debug!(?channel, "walk session created");

        Ok(Self {
            controller,
            keyboard,
            touch,
            pointer,
            channel,
            body: None,
            camera: None,
        })
    }

    pub fn channel(&self) -> InputChannel {
        self.channel
    }

    pub fn controller(&self) -> &WalkController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut WalkController {
        &mut self.controller
    }

    pub fn input(&self) -> &Arc<InputStore> {
        self.controller.input()
    }

    pub fn pointer(&self) -> &PointerLook {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerLook {
        &mut self.pointer
    }

    /// Register a pointer lock listener
    pub fn on_lock_change<F>(&mut self, listener: F)
    where
        F: Fn(&LockChange) + Send + Sync + 'static,
    {
        self.pointer.subscribe(listener);
    }

    /// Hand over the physics body and place it at the spawn point
    pub fn attach_body(&mut self, mut body: B) {
        self.controller.spawn(&mut body);
        self.body = Some(body);
    }

    pub fn attach_camera(&mut self, camera: C) {
        self.camera = Some(camera);
    }

    pub fn body(&self) -> Option<&B> {
        self.body.as_ref()
    }

    pub fn body_mut(&mut self) -> Option<&mut B> {
        self.body.as_mut()
    }

    pub fn camera(&self) -> Option<&C> {
        self.camera.as_ref()
    }

    /// Viewport resized; the touch zones follow
    pub fn resize(&mut self, width: f32) {
        self.touch.set_viewport_width(width);
    }

    /// Route one platform event
    ///
    /// Frame events run a controller tick and return its report.
    pub fn handle_event(&mut self, event: Event) -> Option<TickReport> {
        match event {
            Event::Input(InputEvent::Keyboard(key)) => {
                if self.keyboard.handle(&key, self.controller.input()) == KeyAction::ToggleTelemetry {
                    self.controller.toggle_telemetry();
                }
                None
            }
            Event::Input(InputEvent::Pointer(motion)) => {
                if self.channel == InputChannel::Keyboard {
                    if let Some(camera) = self.camera.as_mut() {
                        self.pointer.handle_motion(&motion, camera);
                    }
                }
                None
            }
            Event::Input(InputEvent::Touch(touch)) => {
                if self.channel == InputChannel::Touch {
                    self.touch.handle(&touch, self.controller.input());
                }
                None
            }
            Event::PointerLockChanged(locked) => {
                self.pointer.on_lock_changed(locked);
                None
            }
            Event::Lifecycle(LifecycleEvent::Suspended) => {
                self.release_input();
                None
            }
            Event::Lifecycle(LifecycleEvent::Resumed) => None,
            Event::Frame { dt } => {
                let body = self.body.as_mut().map(|b| b as &mut dyn PhysicsBody);
                let camera = self.camera.as_mut().map(|c| c as &mut dyn CameraHandle);
                Some(self.controller.tick(&FrameContext::new(dt), body, camera))
            }
        }
    }

    /// Drop held keys, touches and the pointer lock
    fn release_input(&mut self) {
        let input = self.controller.input().clone();
        self.touch.clear(&input);
        input.reset();
        input.set_touch_mode(self.channel == InputChannel::Touch);
        self.pointer.unlock();
        tracing::debug!("input released");
    }

    /// Drive the session from an event loop
    ///
    /// `on_frame` sees every tick report and decides whether to keep going.
    pub fn run<L, F>(&mut self, event_loop: L, mut on_frame: F) -> stride_platform::Result<()>
    where
        L: EventLoop,
        F: FnMut(&mut Self, &TickReport) -> ControlFlow,
    {
        event_loop.run(|event| match self.handle_event(event) {
            Some(report) => on_frame(self, &report),
            None => ControlFlow::Continue,
        })
    }
}

//! Debug telemetry
//!
//! Exposes the gait state for visualization. A [`DebugSnapshot`] is copied
//! once per tick while telemetry is enabled; disabled telemetry does no
//! work and allocates nothing. Without the `debug-telemetry` feature the
//! [`Telemetry`] type is a stub with the same interface that never samples.

use crate::gait::GaitState;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Copy of the gait state for one tick
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DebugSnapshot {
    pub phase: f32,
    pub intensity: f32,
    pub cadence_hz: f32,
    /// Base vertical amplitude (m)
    pub vertical_amplitude: f32,
    /// Base lateral amplitude (m)
    pub lateral_amplitude: f32,
}

/// A point on a reference curve: x is the phase in `[0, 2π]`
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
    pub phase: f32,
    pub value: f32,
}

/// Reference bob curves over one full cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct BobCurves {
    /// `sin 2φ` scaled by the vertical amplitude
    pub vertical: Vec<CurvePoint>,
    /// `sin φ` scaled by the lateral amplitude
    pub lateral: Vec<CurvePoint>,
}

/// Where the current phase sits on each curve, scaled by intensity
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PhaseMarkers {
    /// Fraction of the cycle completed, in `[0, 1)`
    pub cycle_fraction: f32,
    pub vertical: f32,
    pub lateral: f32,
}

impl DebugSnapshot {
    pub fn from_state(state: &GaitState, vertical_amplitude: f32, lateral_amplitude: f32) -> Self {
        Self {
            phase: state.phase(),
            intensity: state.intensity(),
            cadence_hz: state.cadence_hz(),
            vertical_amplitude,
            lateral_amplitude,
        }
    }

    /// Sample both reference curves at `samples + 1` evenly spaced phases
    ///
    /// The curves use base amplitudes only; intensity shows up on the
    /// markers.
    pub fn curves(&self, samples: usize) -> BobCurves {
        let samples = samples.max(1);
        let mut curves = BobCurves {
            vertical: Vec::with_capacity(samples + 1),
            lateral: Vec::with_capacity(samples + 1),
        };
        for i in 0..=samples {
            let phase = TAU * i as f32 / samples as f32;
            curves.vertical.push(CurvePoint {
                phase,
                value: (2.0 * phase).sin() * self.vertical_amplitude,
            });
            curves.lateral.push(CurvePoint {
                phase,
                value: phase.sin() * self.lateral_amplitude,
            });
        }
        curves
    }

    pub fn markers(&self) -> PhaseMarkers {
        PhaseMarkers {
            cycle_fraction: self.phase / TAU,
            vertical: (2.0 * self.phase).sin() * self.vertical_amplitude * self.intensity,
            lateral: self.phase.sin() * self.lateral_amplitude * self.intensity,
        }
    }
}

/// Receiver for telemetry snapshots
pub trait TelemetrySink {
    fn publish(&mut self, snapshot: &DebugSnapshot);
}

impl<F> TelemetrySink for F
where
    F: FnMut(&DebugSnapshot),
{
    fn publish(&mut self, snapshot: &DebugSnapshot) {
        self(snapshot)
    }
}

/// Runtime telemetry switch
#[cfg(feature = "debug-telemetry")]
#[derive(Clone, Debug, Default)]
pub struct Telemetry {
    enabled: bool,
}

#[cfg(feature = "debug-telemetry")]
impl Telemetry {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            tracing::debug!(enabled, "debug telemetry toggled");
        }
        self.enabled = enabled;
    }

    /// Flip the switch, returning the new state
    pub fn toggle(&mut self) -> bool {
        self.set_enabled(!self.enabled);
        self.enabled
    }

    /// Copy the gait state if enabled
    pub fn sample(
        &mut self,
        state: &GaitState,
        vertical_amplitude: f32,
        lateral_amplitude: f32,
    ) -> Option<DebugSnapshot> {
        if !self.enabled {
            return None;
        }
        Some(DebugSnapshot::from_state(
            state,
            vertical_amplitude,
            lateral_amplitude,
        ))
    }
}

/// Telemetry stub compiled without the `debug-telemetry` feature
#[cfg(not(feature = "debug-telemetry"))]
#[derive(Clone, Debug, Default)]
pub struct Telemetry;

#[cfg(not(feature = "debug-telemetry"))]
impl Telemetry {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn is_enabled(&self) -> bool {
        false
    }

    pub fn set_enabled(&mut self, _enabled: bool) {}

    pub fn toggle(&mut self) -> bool {
        false
    }

    pub fn sample(
        &mut self,
        _state: &GaitState,
        _vertical_amplitude: f32,
        _lateral_amplitude: f32,
    ) -> Option<DebugSnapshot> {
        None
    }
}

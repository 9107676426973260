//! Core data types for the step locomotion engine.
//!
//! This module defines the fundamental types shared across the sampling,
//! detection, and integration stages. Types are small and copyable; the
//! engine never retains more than the latest sample and the explicitly
//! modeled detector/integrator state.
//!
//! Design principle: if a concept exists, it gets a type. Raw tuples and
//! untyped scalars never cross a stage boundary.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Maximum accepted frame delta in milliseconds.
///
/// A tick whose delta exceeds this (or is NaN) is treated as a frame-drop
/// fault: velocity on both monitored axes is zeroed and the tick does no
/// motion work.
pub const MAX_DELTA_MS: f32 = 200.0;

/// A concrete coordinate axis.
///
/// The engine's forward/strafe semantics are configurable mappings onto
/// these axes (see `roll_axis` / `pitch_axis` in the configuration).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Reads this axis' component from a vector.
    pub fn component(self, v: &Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Writes this axis' component of a vector.
    pub fn set_component(self, v: &mut Vector3<f32>, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// Direction of a detected step relative to the device heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDirection {
    Forward,
    Backward,
}

impl StepDirection {
    /// Sign applied to the step acceleration: +1 forward, -1 backward.
    pub fn sign(self) -> f32 {
        match self {
            StepDirection::Forward => 1.0,
            StepDirection::Backward => -1.0,
        }
    }
}

/// A single canonicalized hardware reading.
///
/// `rotation` holds Euler angles in radians reassembled into the engine's
/// YXZ convention (x = pitch/beta, y = yaw/alpha, z = negated roll/gamma);
/// the device reports ZXY order, and the sampling stage performs the
/// reassignment. `acceleration` is in device-local axes with missing
/// components substituted by zero.
///
/// Samples are constructed fresh from each incoming hardware event and are
/// immutable once built; only the latest one is ever retained.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Euler rotation in radians, YXZ order.
    pub rotation: Vector3<f32>,

    /// Linear acceleration in m/s², device-local axes.
    pub acceleration: Vector3<f32>,
}

impl MotionSample {
    /// Creates a sample from already-canonical components.
    pub fn new(rotation: Vector3<f32>, acceleration: Vector3<f32>) -> Self {
        Self {
            rotation,
            acceleration,
        }
    }
}

/// A discrete decision that the user has taken one walking step.
///
/// Emitted by a step strategy, consumed exactly once by the motion
/// integrator within the same tick. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Absolute acceleration magnitude that triggered the step (m/s²).
    pub magnitude: f32,

    /// Forward or backward, from comparing the roll angle to the
    /// configured roll threshold.
    pub direction: StepDirection,

    /// Roll angle (radians) subtracted from the heading pitch when the
    /// step is backward; zero for forward steps.
    pub roll_correction: f32,
}

impl StepEvent {
    /// Creates a fully specified step event.
    pub fn new(magnitude: f32, direction: StepDirection, roll_correction: f32) -> Self {
        Self {
            magnitude,
            direction,
            roll_correction,
        }
    }

    /// A nominal unit step with no directional information.
    ///
    /// Used by strategies that only produce a binary step signal.
    pub fn unit() -> Self {
        Self {
            magnitude: 1.0,
            direction: StepDirection::Forward,
            roll_correction: 0.0,
        }
    }
}

//! Motion integration.
//!
//! Converts detected step events into a velocity update and a displacement
//! vector in world space. The integrator owns the only velocity state in the
//! engine; velocity on the non-active axes stays zero, and a frame-rate
//! fault forces both monitored axes to exactly zero.
//!
//! Displacement rotation uses explicit per-call temporaries; no scratch
//! vectors survive between calls.

use log::warn;
use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use crate::types::{Axis, StepEvent, MAX_DELTA_MS};

/// Configuration for the motion integrator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IntegratorConfig {
    /// Gain multiplying a step's magnitude into acceleration.
    pub acceleration_gain: f32,
    /// Velocity decay coefficient per second. Zero disables decay entirely.
    pub easing: f32,
    /// Front-to-back axis carrying the walking velocity.
    pub roll_axis: Axis,
    /// Left-to-right axis, zeroed together with the roll axis on faults.
    pub pitch_axis: Axis,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            acceleration_gain: 15.0,
            easing: 0.0, // inert unless explicitly enabled
            roll_axis: Axis::Z,
            pitch_axis: Axis::X,
        }
    }
}

/// The entity's current heading, in radians.
///
/// Only pitch and yaw participate in the heading transform; the roll
/// component is always zero when steering locomotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heading {
    /// Rotation about the entity X axis.
    pub pitch_rad: f32,
    /// Rotation about the entity Y axis.
    pub yaw_rad: f32,
}

/// Integrates step events into velocity and world-space displacement.
#[derive(Debug, Clone)]
pub struct MotionIntegrator {
    config: IntegratorConfig,
    velocity: Vector3<f32>,
}

impl MotionIntegrator {
    /// Creates an integrator at rest.
    pub fn new(config: IntegratorConfig) -> Self {
        Self {
            config,
            velocity: Vector3::zeros(),
        }
    }

    /// Current per-axis velocity.
    pub fn velocity(&self) -> Vector3<f32> {
        self.velocity
    }

    /// Zeroes velocity on both monitored axes.
    ///
    /// Invoked on the frame-drop fault path so a stalled render loop cannot
    /// launch the entity when frames resume.
    pub fn fault_reset(&mut self) {
        self.config.pitch_axis.set_component(&mut self.velocity, 0.0);
        self.config.roll_axis.set_component(&mut self.velocity, 0.0);
    }

    /// Applies one step event to the velocity over `delta_s` seconds.
    pub fn integrate_step(&mut self, event: &StepEvent, delta_s: f32) {
        // Same fault policy as the tick entry: an invalid delta zeroes the
        // monitored axes and skips the update.
        if !delta_s.is_finite() || delta_s * 1000.0 > MAX_DELTA_MS {
            warn!(
                target: "step_locomotion::integrate",
                "invalid step delta {delta_s}s, resetting velocity"
            );
            self.fault_reset();
            return;
        }

        if self.config.easing > 0.0 {
            let pitch_v = self.config.pitch_axis.component(&self.velocity);
            let roll_v = self.config.roll_axis.component(&self.velocity);
            self.config
                .pitch_axis
                .set_component(&mut self.velocity, pitch_v - pitch_v * self.config.easing * delta_s);
            self.config
                .roll_axis
                .set_component(&mut self.velocity, roll_v - roll_v * self.config.easing * delta_s);
        }

        let acceleration =
            event.magnitude * self.config.acceleration_gain * event.direction.sign();
        let roll_v = self.config.roll_axis.component(&self.velocity);
        self.config
            .roll_axis
            .set_component(&mut self.velocity, roll_v - acceleration * delta_s);
    }

    /// Computes the displacement for this tick.
    ///
    /// With no heading the movement is absolute: `velocity * delta_s`
    /// unrotated. Otherwise the local direction vector is rotated by the
    /// heading transform (YXZ order, zero roll), with `roll_correction`
    /// subtracted from the pitch term to bias backward steps.
    pub fn displacement(
        &self,
        delta_s: f32,
        heading: Option<Heading>,
        roll_correction: f32,
    ) -> Vector3<f32> {
        let direction = self.velocity * delta_s;

        let Some(heading) = heading else {
            return direction;
        };

        let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), heading.yaw_rad)
            * Rotation3::from_axis_angle(&Vector3::x_axis(), heading.pitch_rad - roll_correction);
        rotation * direction
    }
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self::new(IntegratorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepDirection;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn forward_step_drives_negative_roll_velocity() {
        let mut integrator = MotionIntegrator::default();
        let step = StepEvent::new(1.2, StepDirection::Forward, 0.0);

        integrator.integrate_step(&step, 0.1);

        // v -= 1.2 * 15 * 0.1
        assert_relative_eq!(integrator.velocity().z, -1.8, epsilon = 1e-5);
        assert_eq!(integrator.velocity().x, 0.0);
        assert_eq!(integrator.velocity().y, 0.0);
    }

    #[test]
    fn backward_step_negates_acceleration() {
        let mut integrator = MotionIntegrator::default();
        let step = StepEvent::new(1.0, StepDirection::Backward, 0.5);

        integrator.integrate_step(&step, 0.1);

        assert_relative_eq!(integrator.velocity().z, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn invalid_delta_resets_monitored_axes() {
        let mut integrator = MotionIntegrator::default();
        let step = StepEvent::new(2.0, StepDirection::Forward, 0.0);
        integrator.integrate_step(&step, 0.1);
        assert!(integrator.velocity().z != 0.0);

        // 300ms delta exceeds the fault ceiling.
        integrator.integrate_step(&step, 0.3);
        assert_eq!(integrator.velocity().z, 0.0);
        assert_eq!(integrator.velocity().x, 0.0);

        // NaN takes the same path.
        integrator.integrate_step(&step, 0.1);
        integrator.integrate_step(&step, f32::NAN);
        assert_eq!(integrator.velocity().z, 0.0);
    }

    #[test]
    fn easing_is_inert_by_default() {
        let mut a = MotionIntegrator::default();
        let mut b = MotionIntegrator::new(IntegratorConfig {
            easing: 0.0,
            ..IntegratorConfig::default()
        });
        let step = StepEvent::new(1.0, StepDirection::Forward, 0.0);
        for _ in 0..5 {
            a.integrate_step(&step, 0.1);
            b.integrate_step(&step, 0.1);
        }
        assert_eq!(a.velocity(), b.velocity());
    }

    #[test]
    fn easing_decays_velocity_when_enabled() {
        let mut eased = MotionIntegrator::new(IntegratorConfig {
            easing: 2.0,
            ..IntegratorConfig::default()
        });
        let mut raw = MotionIntegrator::default();
        let step = StepEvent::new(1.0, StepDirection::Forward, 0.0);
        for _ in 0..10 {
            eased.integrate_step(&step, 0.1);
            raw.integrate_step(&step, 0.1);
        }
        assert!(eased.velocity().z.abs() < raw.velocity().z.abs());
    }

    #[test]
    fn displacement_without_heading_is_absolute() {
        let mut integrator = MotionIntegrator::default();
        integrator.integrate_step(&StepEvent::new(1.0, StepDirection::Forward, 0.0), 0.1);

        let displacement = integrator.displacement(0.1, None, 0.0);
        assert_eq!(displacement, integrator.velocity() * 0.1);
    }

    #[test]
    fn displacement_rotates_with_yaw() {
        let mut integrator = MotionIntegrator::default();
        integrator.integrate_step(&StepEvent::new(1.0, StepDirection::Forward, 0.0), 0.1);
        let speed = integrator.velocity().z; // -1.5

        // Quarter turn about Y maps local -Z onto -X.
        let heading = Heading {
            pitch_rad: 0.0,
            yaw_rad: FRAC_PI_2,
        };
        let displacement = integrator.displacement(0.1, Some(heading), 0.0);

        assert_relative_eq!(displacement.x, speed * 0.1, epsilon = 1e-5);
        assert_relative_eq!(displacement.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(displacement.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn roll_correction_tilts_the_heading_pitch() {
        let mut integrator = MotionIntegrator::default();
        integrator.integrate_step(&StepEvent::new(1.0, StepDirection::Backward, 0.5), 0.1);

        let heading = Heading {
            pitch_rad: 0.0,
            yaw_rad: 0.0,
        };
        let corrected = integrator.displacement(0.1, Some(heading), 0.5);
        let uncorrected = integrator.displacement(0.1, Some(heading), 0.0);

        // Pitch bias moves part of the displacement onto the Y axis.
        assert_relative_eq!(uncorrected.y, 0.0, epsilon = 1e-6);
        assert!(corrected.y.abs() > 1e-3);
        assert_relative_eq!(
            corrected.norm(),
            uncorrected.norm(),
            epsilon = 1e-5
        );
    }
}

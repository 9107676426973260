//! Sample normalization and capture.
//!
//! Hardware delivers two kinds of events asynchronously: orientation updates
//! (Euler angles in degrees, any field optional) and motion updates (linear
//! acceleration plus rotation rates, any field optional). This module
//! canonicalizes them into [`MotionSample`] and provides the latest-sample
//! capture slot shared between the event callbacks and the tick.
//!
//! Capture is intentionally lossy: bursts of events between ticks are
//! coalesced and unread samples are dropped. Steps are derived from windowed
//! state, not from raw event replay, so nothing is lost that the detector
//! would have used.

use std::sync::{Mutex, PoisonError};

use nalgebra::Vector3;

use crate::types::MotionSample;

/// A raw device orientation event, angles in degrees.
///
/// The device reports intrinsic ZXY order: alpha about Z, beta about X',
/// gamma about Y''. Absent fields are treated as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawOrientation {
    /// Yaw about the device Z axis, degrees.
    pub alpha: Option<f32>,
    /// Pitch about the device X' axis, degrees.
    pub beta: Option<f32>,
    /// Roll about the device Y'' axis, degrees.
    pub gamma: Option<f32>,
}

/// A raw device motion event.
///
/// Only the linear acceleration feeds the detector; the rotation rates are
/// preserved so hosts can hand the event over wholesale, but orientation
/// events are the rotation source the engine actually reads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawMotion {
    /// Linear acceleration along the device X axis, m/s².
    pub acceleration_x: Option<f32>,
    /// Linear acceleration along the device Y axis, m/s².
    pub acceleration_y: Option<f32>,
    /// Linear acceleration along the device Z axis, m/s².
    pub acceleration_z: Option<f32>,
    /// Rotation rates [alpha, beta, gamma] in the host sensor's units.
    pub rotation_rate: Option<[f32; 3]>,
}

/// Canonicalizes raw device events into [`MotionSample`]s.
///
/// Degrees become radians, absent fields become zero, and the Euler triple
/// is reassembled from the device's ZXY convention into the engine's YXZ
/// convention as `(beta, alpha, -gamma)`. The gamma negation is part of the
/// convention change and must be preserved.
#[derive(Debug, Clone, Copy)]
pub struct SampleNormalizer {
    /// Offset added to the yaw/alpha angle after conversion, radians.
    /// Only applied when the device actually reported an alpha value.
    pub alpha_offset_rad: f32,
}

impl Default for SampleNormalizer {
    fn default() -> Self {
        Self {
            alpha_offset_rad: 0.0,
        }
    }
}

impl SampleNormalizer {
    /// Creates a normalizer with the given yaw offset.
    pub fn new(alpha_offset_rad: f32) -> Self {
        Self { alpha_offset_rad }
    }

    /// Builds a canonical sample from one orientation and one motion event.
    ///
    /// No error conditions: missing fields default to zero, no side effects.
    pub fn normalize(&self, orientation: &RawOrientation, motion: &RawMotion) -> MotionSample {
        let alpha = orientation
            .alpha
            .map(|a| a.to_radians() + self.alpha_offset_rad)
            .unwrap_or(0.0);
        let beta = orientation.beta.map(f32::to_radians).unwrap_or(0.0);
        let gamma = orientation.gamma.map(f32::to_radians).unwrap_or(0.0);

        // ZXY on the device, YXZ for the entity.
        let rotation = Vector3::new(beta, alpha, -gamma);

        let acceleration = Vector3::new(
            motion.acceleration_x.unwrap_or(0.0),
            motion.acceleration_y.unwrap_or(0.0),
            motion.acceleration_z.unwrap_or(0.0),
        );

        MotionSample::new(rotation, acceleration)
    }
}

/// The latest known sensor state, one slot per event kind.
///
/// Both slots start empty; the engine performs no motion work until each has
/// received at least one event (a startup condition, not a failure).
#[derive(Debug, Clone, Copy, Default)]
pub struct SensorSnapshot {
    /// Most recent orientation event, if any.
    pub orientation: Option<RawOrientation>,
    /// Most recent motion event, if any.
    pub motion: Option<RawMotion>,
}

impl SensorSnapshot {
    /// True once both event kinds have been observed.
    pub fn is_complete(&self) -> bool {
        self.orientation.is_some() && self.motion.is_some()
    }
}

/// Thread-safe latest-sample slot for asynchronous capture.
///
/// Event callbacks perform a single field overwrite; the tick takes a copy.
/// There is no queue. On single-threaded hosts the engine's own snapshot
/// field can be written directly instead.
#[derive(Debug, Default)]
pub struct SensorInbox {
    inner: Mutex<SensorSnapshot>,
}

impl SensorInbox {
    /// Creates an empty inbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites the orientation slot with a newer event.
    pub fn push_orientation(&self, event: RawOrientation) {
        self.lock().orientation = Some(event);
    }

    /// Overwrites the motion slot with a newer event.
    pub fn push_motion(&self, event: RawMotion) {
        self.lock().motion = Some(event);
    }

    /// Copies out the current snapshot for the tick to consume.
    pub fn snapshot(&self) -> SensorSnapshot {
        *self.lock()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SensorSnapshot> {
        // A poisoned lock only means a writer panicked mid-overwrite of two
        // Copy fields; the snapshot is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    #[test]
    fn reassembles_device_angles_into_yxz() {
        let normalizer = SampleNormalizer::default();
        let orientation = RawOrientation {
            alpha: Some(90.0),
            beta: Some(0.0),
            gamma: Some(30.0),
        };
        let sample = normalizer.normalize(&orientation, &RawMotion::default());

        assert_relative_eq!(sample.rotation.x, 0.0);
        assert_relative_eq!(sample.rotation.y, PI / 2.0);
        assert_relative_eq!(sample.rotation.z, -PI / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let normalizer = SampleNormalizer::default();
        let sample = normalizer.normalize(
            &RawOrientation::default(),
            &RawMotion {
                acceleration_y: Some(1.5),
                ..Default::default()
            },
        );

        assert_eq!(sample.rotation, Vector3::zeros());
        assert_eq!(sample.acceleration, Vector3::new(0.0, 1.5, 0.0));
    }

    #[test]
    fn alpha_offset_requires_reported_alpha() {
        let normalizer = SampleNormalizer::new(0.5);

        // Offset applies when alpha is present.
        let with_alpha = normalizer.normalize(
            &RawOrientation {
                alpha: Some(0.0),
                ..Default::default()
            },
            &RawMotion::default(),
        );
        assert_relative_eq!(with_alpha.rotation.y, 0.5);

        // Absent alpha stays exactly zero, offset or not.
        let without_alpha =
            normalizer.normalize(&RawOrientation::default(), &RawMotion::default());
        assert_eq!(without_alpha.rotation.y, 0.0);
    }

    #[test]
    fn inbox_overwrites_and_snapshots() {
        let inbox = SensorInbox::new();
        assert!(!inbox.snapshot().is_complete());

        inbox.push_orientation(RawOrientation {
            alpha: Some(10.0),
            ..Default::default()
        });
        inbox.push_orientation(RawOrientation {
            alpha: Some(20.0),
            ..Default::default()
        });
        inbox.push_motion(RawMotion {
            acceleration_x: Some(0.3),
            ..Default::default()
        });

        let snapshot = inbox.snapshot();
        assert!(snapshot.is_complete());
        // Only the latest orientation survives; older events are coalesced away.
        assert_eq!(snapshot.orientation.unwrap().alpha, Some(20.0));
    }
}

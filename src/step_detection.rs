//! Step detection strategies.
//!
//! Turns the canonical sample stream plus per-tick time deltas into discrete
//! step events. Two interchangeable strategies exist behind the
//! [`StepStrategy`] trait:
//!
//! - [`WindowedStepDetector`]: fixed evaluation window, magnitude threshold
//!   on one acceleration axis, direction from the roll angle.
//! - [`CrossingStepDetector`]: adaptive midpoint of the rolling min/max of
//!   one acceleration axis, step on a downward crossing of the calibrated
//!   midpoint.
//!
//! Both assume the caller has already rejected faulty frame deltas; a
//! strategy never sees a NaN or over-ceiling delta.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{Axis, MotionSample, StepDirection, StepEvent};

/// A step decision procedure over the sample stream.
///
/// Implementations own all state they need across ticks and emit at most one
/// event per evaluation. Feeding the same sample sequence twice from a fresh
/// state yields the same event sequence.
pub trait StepStrategy {
    /// Consumes one sample and the elapsed milliseconds since the last tick,
    /// returning a step event if one fired this tick.
    fn evaluate(&mut self, sample: &MotionSample, delta_ms: f32) -> Option<StepEvent>;

    /// Clears all accumulated state back to a fresh detector.
    fn reset(&mut self);
}

/// Which step strategy the engine should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Fixed-window magnitude/timing detection.
    Windowed,
    /// Adaptive midpoint-crossing detection.
    Crossing,
}

/// Configuration for the fixed-window strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowedConfig {
    /// Evaluation window length in milliseconds.
    pub time_threshold_ms: f32,
    /// Minimum acceleration magnitude to count as a step (m/s²).
    pub acc_threshold: f32,
    /// Roll angle at or below which a step is backward (radians).
    pub roll_threshold: f32,
    /// Acceleration axis used as the step-magnitude signal.
    pub pitch_axis: Axis,
    /// Rotation axis whose angle decides forward vs backward.
    pub roll_axis: Axis,
}

impl Default for WindowedConfig {
    fn default() -> Self {
        Self {
            time_threshold_ms: 350.0, // ~max 3 steps/sec
            acc_threshold: 0.8,       // minimum detectable step
            roll_threshold: 1.0,      // device near flat = walking backward
            pitch_axis: Axis::X,
            roll_axis: Axis::Z,
        }
    }
}

/// Strategy A: fixed-window magnitude/timing detector.
///
/// Accumulates elapsed time until the window closes, then reads the
/// magnitude of the configured acceleration axis on that tick's sample.
/// Evaluation is instantaneous: the detector returns to accumulating in the
/// same tick that crossed the window boundary.
#[derive(Debug, Clone)]
pub struct WindowedStepDetector {
    config: WindowedConfig,
    window_accumulated_ms: f32,
}

impl WindowedStepDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: WindowedConfig) -> Self {
        Self {
            config,
            window_accumulated_ms: 0.0,
        }
    }

    /// Milliseconds accumulated toward the current window.
    pub fn window_accumulated_ms(&self) -> f32 {
        self.window_accumulated_ms
    }
}

impl Default for WindowedStepDetector {
    fn default() -> Self {
        Self::new(WindowedConfig::default())
    }
}

impl StepStrategy for WindowedStepDetector {
    fn evaluate(&mut self, sample: &MotionSample, delta_ms: f32) -> Option<StepEvent> {
        self.window_accumulated_ms += delta_ms;
        if self.window_accumulated_ms < self.config.time_threshold_ms {
            return None;
        }
        // Window closed: decide now, start the next window either way.
        self.window_accumulated_ms = 0.0;

        let magnitude = self.config.pitch_axis.component(&sample.acceleration).abs();
        if magnitude <= self.config.acc_threshold {
            return None;
        }

        let roll = self.config.roll_axis.component(&sample.rotation).abs();
        let (direction, roll_correction) = if roll <= self.config.roll_threshold {
            (StepDirection::Backward, roll)
        } else {
            (StepDirection::Forward, 0.0)
        };

        debug!(
            target: "step_locomotion::detect",
            "step: magnitude={:.2} m/s² {:?} (roll={:.2} rad)",
            magnitude, direction, roll
        );

        Some(StepEvent::new(magnitude, direction, roll_correction))
    }

    fn reset(&mut self) {
        self.window_accumulated_ms = 0.0;
    }
}

/// Configuration for the midpoint-crossing strategy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CrossingConfig {
    /// Acceleration axis monitored for crossings.
    pub signal_axis: Axis,
    /// Changes at or below this are treated as sensor noise and suppressed.
    pub dead_zone: f32,
    /// Processed (non-suppressed) samples per calibration cycle.
    pub recalibration_samples: usize,
}

impl Default for CrossingConfig {
    fn default() -> Self {
        Self {
            signal_axis: Axis::X, // yaw-significant when held in landscape
            dead_zone: 0.1,
            recalibration_samples: 50,
        }
    }
}

/// Strategy B: adaptive midpoint-crossing detector.
///
/// Tracks the rolling min/max of one acceleration axis and signals a step
/// when the instantaneous midpoint drops below the threshold calibrated at
/// the end of the previous cycle. The crossing carries no magnitude or
/// direction of its own, so emitted events are nominal unit steps
/// ([`StepEvent::unit`]).
#[derive(Debug, Clone)]
pub struct CrossingStepDetector {
    config: CrossingConfig,
    extreme_min: f32,
    extreme_max: f32,
    last_threshold: f32,
    candidate_thresholds: Vec<f32>,
    sample_counter: usize,
    previous_value: f32,
}

impl CrossingStepDetector {
    /// Creates a detector with the given configuration.
    pub fn new(config: CrossingConfig) -> Self {
        Self {
            config,
            extreme_min: f32::MAX,
            extreme_max: f32::MIN,
            last_threshold: 0.0,
            candidate_thresholds: Vec::with_capacity(config.recalibration_samples),
            sample_counter: 0,
            previous_value: 0.0,
        }
    }

    /// The threshold calibrated at the end of the previous cycle.
    pub fn calibrated_threshold(&self) -> f32 {
        self.last_threshold
    }

    /// Rolling (min, max) of the monitored axis this cycle.
    pub fn extremes(&self) -> (f32, f32) {
        (self.extreme_min, self.extreme_max)
    }

    /// Processed samples since the last recalibration.
    pub fn samples_this_cycle(&self) -> usize {
        self.sample_counter
    }

    fn recalibrate(&mut self) {
        let sum: f32 = self.candidate_thresholds.iter().sum();
        self.last_threshold = sum / self.candidate_thresholds.len() as f32;
        self.candidate_thresholds.clear();
        self.extreme_min = f32::MAX;
        self.extreme_max = f32::MIN;
        self.sample_counter = 0;
        debug!(
            target: "step_locomotion::detect",
            "recalibrated: threshold={:.3}", self.last_threshold
        );
    }
}

impl Default for CrossingStepDetector {
    fn default() -> Self {
        Self::new(CrossingConfig::default())
    }
}

impl StepStrategy for CrossingStepDetector {
    fn evaluate(&mut self, sample: &MotionSample, _delta_ms: f32) -> Option<StepEvent> {
        let value = self.config.signal_axis.component(&sample.acceleration);
        self.extreme_min = self.extreme_min.min(value);
        self.extreme_max = self.extreme_max.max(value);

        // Noise dead-zone: near-duplicate readings advance nothing beyond
        // the min/max update above.
        if (value - self.previous_value).abs() <= self.config.dead_zone {
            return None;
        }
        self.previous_value = value;

        let threshold = (self.extreme_max + self.extreme_min) / 2.0;
        self.candidate_thresholds.push(threshold);
        self.sample_counter += 1;

        // Known quirk: the instantaneous midpoint is compared against the
        // threshold calibrated a full cycle ago, and right after a
        // recalibration the extremes have just been reseeded, so crossings
        // near calibration boundaries can misfire. Callers should treat
        // events from this strategy as a coarse binary signal.
        let stepped = threshold < self.last_threshold;

        if self.sample_counter >= self.config.recalibration_samples {
            self.recalibrate();
        }

        if stepped {
            debug!(target: "step_locomotion::detect", "crossing step: midpoint={:.3}", threshold);
            Some(StepEvent::unit())
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.extreme_min = f32::MAX;
        self.extreme_max = f32::MIN;
        self.last_threshold = 0.0;
        self.candidate_thresholds.clear();
        self.sample_counter = 0;
        self.previous_value = 0.0;
    }
}

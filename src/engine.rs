//! Locomotion engine.
//!
//! Orchestrates the full data flow: capture → normalize → detect →
//! integrate → apply. The engine is driven by an external render loop
//! through [`LocomotionEngine::tick`], receives sensor events through the
//! capture methods (or a [`SensorInbox`] snapshot on multi-threaded hosts),
//! and pushes displacements through the [`PoseApplier`] boundary.
//!
//! The tick is synchronous and never blocks. Between ticks the only state
//! is the latest sensor snapshot and the explicitly modeled detector and
//! integrator state.

use log::warn;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::integration::{IntegratorConfig, MotionIntegrator};
use crate::pose::PoseApplier;
use crate::sampling::{RawMotion, RawOrientation, SampleNormalizer, SensorSnapshot};
use crate::step_detection::{
    CrossingConfig, CrossingStepDetector, StepStrategy, StrategyKind, WindowedConfig,
    WindowedStepDetector,
};
use crate::types::{Axis, StepEvent, MAX_DELTA_MS};

/// The engine's recognized configuration options.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocomotionConfig {
    /// Acceleration gain applied to step magnitudes.
    pub acceleration: f32,
    /// Minimum step acceleration magnitude (m/s²).
    pub acc_threshold: f32,
    /// Roll angle at or below which a step is backward (radians).
    pub roll_threshold: f32,
    /// Evaluation window for the windowed strategy (milliseconds).
    pub time_threshold_ms: f32,
    /// Front-to-back axis.
    pub roll_axis: Axis,
    /// Left-to-right axis; also the step-magnitude signal axis.
    pub pitch_axis: Axis,
    /// When false the engine is quiescent: ticks do nothing.
    pub enabled: bool,
    /// Velocity decay per second; zero disables decay.
    pub easing: f32,
    /// Offset added to reported yaw angles during normalization (radians).
    pub alpha_offset_rad: f32,
    /// Which step strategy to run.
    pub strategy: StrategyKind,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self::defaults_for(StrategyKind::Windowed)
    }
}

impl LocomotionConfig {
    /// Default tuning for the given strategy.
    ///
    /// The crossing strategy emits unit-magnitude steps, so it ships with a
    /// proportionally larger gain (65 vs 15).
    pub fn defaults_for(strategy: StrategyKind) -> Self {
        Self {
            acceleration: match strategy {
                StrategyKind::Windowed => 15.0,
                StrategyKind::Crossing => 65.0,
            },
            acc_threshold: 0.8,
            roll_threshold: 1.0,
            time_threshold_ms: 350.0,
            roll_axis: Axis::Z,
            pitch_axis: Axis::X,
            enabled: true,
            easing: 0.0,
            alpha_offset_rad: 0.0,
            strategy,
        }
    }

    fn windowed(&self) -> WindowedConfig {
        WindowedConfig {
            time_threshold_ms: self.time_threshold_ms,
            acc_threshold: self.acc_threshold,
            roll_threshold: self.roll_threshold,
            pitch_axis: self.pitch_axis,
            roll_axis: self.roll_axis,
        }
    }

    fn crossing(&self) -> CrossingConfig {
        CrossingConfig {
            signal_axis: self.pitch_axis,
            ..CrossingConfig::default()
        }
    }

    fn integrator(&self) -> IntegratorConfig {
        IntegratorConfig {
            acceleration_gain: self.acceleration,
            easing: self.easing,
            roll_axis: self.roll_axis,
            pitch_axis: self.pitch_axis,
        }
    }
}

/// Step-driven locomotion engine.
pub struct LocomotionEngine {
    config: LocomotionConfig,
    normalizer: SampleNormalizer,
    strategy: Box<dyn StepStrategy + Send>,
    integrator: MotionIntegrator,
    snapshot: SensorSnapshot,
    last_step: Option<StepEvent>,
}

impl LocomotionEngine {
    /// Creates an engine with the given configuration.
    pub fn new(config: LocomotionConfig) -> Self {
        let strategy: Box<dyn StepStrategy + Send> = match config.strategy {
            StrategyKind::Windowed => Box::new(WindowedStepDetector::new(config.windowed())),
            StrategyKind::Crossing => Box::new(CrossingStepDetector::new(config.crossing())),
        };
        Self {
            normalizer: SampleNormalizer::new(config.alpha_offset_rad),
            strategy,
            integrator: MotionIntegrator::new(config.integrator()),
            snapshot: SensorSnapshot::default(),
            last_step: None,
            config,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    /// Enables or disables the engine. Disabled is a normal quiescent
    /// state: sensor capture still overwrites the snapshot, ticks do
    /// nothing.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.config.enabled = enabled;
    }

    /// Overwrites the latest orientation event.
    pub fn push_orientation(&mut self, event: RawOrientation) {
        self.snapshot.orientation = Some(event);
    }

    /// Overwrites the latest motion event.
    pub fn push_motion(&mut self, event: RawMotion) {
        self.snapshot.motion = Some(event);
    }

    /// Replaces the whole sensor snapshot, e.g. from a
    /// [`SensorInbox`](crate::sampling::SensorInbox) on hosts where capture
    /// runs on another thread.
    pub fn ingest_snapshot(&mut self, snapshot: SensorSnapshot) {
        self.snapshot = snapshot;
    }

    /// Current per-axis velocity.
    pub fn velocity(&self) -> Vector3<f32> {
        self.integrator.velocity()
    }

    /// The step event from the most recent tick, if one fired.
    pub fn last_step(&self) -> Option<StepEvent> {
        self.last_step
    }

    /// Clears detector and integrator state; the sensor snapshot survives.
    pub fn reset(&mut self) {
        self.strategy.reset();
        self.integrator = MotionIntegrator::new(self.config.integrator());
        self.last_step = None;
    }

    /// Advances the engine by one frame.
    ///
    /// `time_ms` is the host clock timestamp and is currently unused (the
    /// deltas carry all timing); `delta_ms` is the elapsed time since the
    /// previous tick. A NaN or over-ceiling delta takes the fault path:
    /// velocity on both monitored axes is zeroed and no motion work runs.
    pub fn tick(&mut self, _time_ms: f64, delta_ms: f32, applier: &mut dyn PoseApplier) {
        self.last_step = None;

        if delta_ms.is_nan() || delta_ms > MAX_DELTA_MS {
            warn!(
                target: "step_locomotion::engine",
                "frame delta {delta_ms}ms out of range, resetting velocity"
            );
            self.integrator.fault_reset();
            return;
        }

        if !self.config.enabled {
            return;
        }

        // Startup condition: do nothing until both sensors have reported.
        let (Some(orientation), Some(motion)) = (self.snapshot.orientation, self.snapshot.motion)
        else {
            return;
        };

        let sample = self.normalizer.normalize(&orientation, &motion);
        let Some(event) = self.strategy.evaluate(&sample, delta_ms) else {
            return;
        };
        self.last_step = Some(event);

        let delta_s = delta_ms / 1000.0;
        self.integrator.integrate_step(&event, delta_s);
        let displacement =
            self.integrator
                .displacement(delta_s, applier.heading(), event.roll_correction);

        if let Err(err) = applier.apply_displacement(displacement) {
            // The entity is the host's concern; keep ticking.
            warn!(target: "step_locomotion::engine", "pose update dropped: {err}");
        }
    }
}

//! Step Locomotion Engine Library
//!
//! Converts a noisy stream of handheld-device motion and orientation samples
//! into discrete step events and translates those events into a moving
//! entity's position, simulating walking locomotion from accelerometer data
//! instead of joystick or touch input.
//!
//! # Design Philosophy
//!
//! - **Latest sample wins**: hardware events between ticks are coalesced;
//!   steps are derived from windowed state, never from raw event replay.
//! - **Fault-safe timing**: an invalid or excessive frame delta zeroes the
//!   walking velocity instead of launching the entity on the next frame.
//! - **Narrow boundaries**: the engine never touches hardware or a scene
//!   graph; samples come in through small event types and displacements go
//!   out through the [`PoseApplier`](pose::PoseApplier) trait.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use step_locomotion::engine::{LocomotionConfig, LocomotionEngine};
//! use step_locomotion::pose::SimEntity;
//! use step_locomotion::sampling::{RawMotion, RawOrientation};
//!
//! let mut engine = LocomotionEngine::new(LocomotionConfig::default());
//! let mut entity = SimEntity::new(Vector3::zeros());
//!
//! // Latest hardware events, delivered callback-style by the host.
//! engine.push_orientation(RawOrientation { gamma: Some(80.0), ..Default::default() });
//! engine.push_motion(RawMotion { acceleration_x: Some(1.2), ..Default::default() });
//!
//! // Per-frame tick from the host render loop.
//! for frame in 0..4 {
//!     engine.tick(frame as f64 * 100.0, 100.0, &mut entity);
//! }
//! assert!(engine.last_step().is_some());
//! ```

pub mod engine;
pub mod integration;
pub mod pose;
pub mod sampling;
pub mod step_detection;
pub mod types;


// Re-export commonly used types
pub use engine::{LocomotionConfig, LocomotionEngine};
pub use integration::{Heading, IntegratorConfig, MotionIntegrator};
pub use pose::{PoseApplier, PoseError, SimEntity};
pub use sampling::{RawMotion, RawOrientation, SampleNormalizer, SensorInbox, SensorSnapshot};
pub use step_detection::{
    CrossingConfig, CrossingStepDetector, StepStrategy, StrategyKind, WindowedConfig,
    WindowedStepDetector,
};
pub use types::{Axis, MotionSample, StepDirection, StepEvent, MAX_DELTA_MS};

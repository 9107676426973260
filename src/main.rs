//! Step Locomotion Engine demo.
//!
//! Feeds a short synthetic walk through the engine and prints the entity's
//! trajectory. For library use, see lib.rs.

use nalgebra::Vector3;
use step_locomotion::engine::{LocomotionConfig, LocomotionEngine};
use step_locomotion::pose::SimEntity;
use step_locomotion::sampling::{RawMotion, RawOrientation};

fn main() {
    env_logger::init();

    println!("Step Locomotion Engine v0.1.0");
    println!("Synthetic walk: 2 seconds at 10 fps, one stomp every 4th frame");

    let mut engine = LocomotionEngine::new(LocomotionConfig::default());
    let mut entity = SimEntity::new(Vector3::zeros());

    // Device held upright: roll well past the backward threshold.
    engine.push_orientation(RawOrientation {
        alpha: Some(0.0),
        beta: Some(0.0),
        gamma: Some(-80.0),
    });

    for frame in 0..20u32 {
        let stomp = frame % 4 == 3;
        engine.push_motion(RawMotion {
            acceleration_x: Some(if stomp { 1.5 } else { 0.2 }),
            ..Default::default()
        });

        engine.tick(frame as f64 * 100.0, 100.0, &mut entity);

        if let Some(step) = engine.last_step() {
            let p = entity.transform_position();
            println!(
                "frame {frame:2}: step {:?} magnitude {:.2} -> position ({:.3}, {:.3}, {:.3})",
                step.direction, step.magnitude, p.x, p.y, p.z
            );
        }
    }

    let p = entity.transform_position();
    let v = engine.velocity();
    println!(
        "final position: ({:.3}, {:.3}, {:.3}), velocity z: {:.3}",
        p.x, p.y, p.z, v.z
    );
}

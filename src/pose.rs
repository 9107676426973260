//! Pose application boundary.
//!
//! The engine never touches a scene graph directly. It queries the current
//! heading through [`PoseApplier`] and hands back a world-space displacement;
//! what "applying" means belongs to the host. A failed application (the
//! entity is gone) is the collaborator's concern and the engine treats it as
//! a no-op.
//!
//! [`SimEntity`] is a concrete in-memory applier for hosts without a scene
//! graph and for tests. It mirrors the dual position representation many
//! runtimes keep: a transform-level position and a declarative position
//! attribute, both updated on every displacement so observers of either
//! stay consistent.

use nalgebra::Vector3;
use thiserror::Error;

use crate::integration::Heading;

/// Failure to apply a displacement to the controlled entity.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoseError {
    /// The entity no longer exists in the host scene.
    #[error("entity is no longer attached")]
    EntityDetached,
}

/// The narrow boundary between the engine and the entity it moves.
pub trait PoseApplier {
    /// Current heading of the entity, or `None` when the entity carries no
    /// rotation (absolute-frame movement).
    fn heading(&self) -> Option<Heading>;

    /// Adds the displacement to the entity's position. No retries.
    fn apply_displacement(&mut self, displacement: Vector3<f32>) -> Result<(), PoseError>;
}

/// In-memory entity pose with the dual transform/attribute representation.
#[derive(Debug, Clone)]
pub struct SimEntity {
    transform_position: Vector3<f32>,
    attribute_position: Vector3<f32>,
    heading: Option<Heading>,
    attached: bool,
}

impl SimEntity {
    /// Creates an attached entity at the given position with no rotation.
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            transform_position: position,
            attribute_position: position,
            heading: None,
            attached: true,
        }
    }

    /// Creates an entity with an initial heading.
    pub fn with_heading(position: Vector3<f32>, heading: Heading) -> Self {
        Self {
            heading: Some(heading),
            ..Self::new(position)
        }
    }

    /// Sets or clears the entity's heading.
    pub fn set_heading(&mut self, heading: Option<Heading>) {
        self.heading = heading;
    }

    /// Transform-level position.
    pub fn transform_position(&self) -> Vector3<f32> {
        self.transform_position
    }

    /// Attribute-level position.
    pub fn attribute_position(&self) -> Vector3<f32> {
        self.attribute_position
    }

    /// Simulates the entity being removed from the scene.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Whether the entity still exists.
    pub fn is_attached(&self) -> bool {
        self.attached
    }
}

impl PoseApplier for SimEntity {
    fn heading(&self) -> Option<Heading> {
        if self.attached {
            self.heading
        } else {
            None
        }
    }

    fn apply_displacement(&mut self, displacement: Vector3<f32>) -> Result<(), PoseError> {
        if !self.attached {
            return Err(PoseError::EntityDetached);
        }
        // Both representations move together.
        self.transform_position += displacement;
        self.attribute_position += displacement;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displacement_updates_both_representations() {
        let mut entity = SimEntity::new(Vector3::new(1.0, 0.0, 0.0));
        entity
            .apply_displacement(Vector3::new(0.0, 0.0, -0.5))
            .unwrap();

        assert_eq!(entity.transform_position(), Vector3::new(1.0, 0.0, -0.5));
        assert_eq!(entity.attribute_position(), entity.transform_position());
    }

    #[test]
    fn detached_entity_rejects_displacement() {
        let mut entity = SimEntity::new(Vector3::zeros());
        entity.detach();

        let result = entity.apply_displacement(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(result, Err(PoseError::EntityDetached));
        assert_eq!(entity.transform_position(), Vector3::zeros());
    }

    #[test]
    fn heading_reflects_rotation_state() {
        let entity = SimEntity::new(Vector3::zeros());
        assert!(entity.heading().is_none());

        let rotated = SimEntity::with_heading(
            Vector3::zeros(),
            Heading {
                pitch_rad: 0.1,
                yaw_rad: 0.2,
            },
        );
        assert_eq!(
            rotated.heading(),
            Some(Heading {
                pitch_rad: 0.1,
                yaw_rad: 0.2,
            })
        );
    }
}

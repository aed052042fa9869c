//! # Stock Components
//!
//! The component set every Kestrel simulation registers. All of them are
//! plain data; behavior lives in [`crate::systems`].

use bytemuck::{Pod, Zeroable};
use kestrel_core::{Component, Coordinator, EcsResult};

use crate::math::Vec3;

/// Position, rotation (Euler angles, radians) and scale.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Transform {
    /// World-space position.
    pub position: Vec3,
    /// Euler angles.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Transform {
    /// Transform at `position` with no rotation and unit scale.
    #[must_use]
    pub const fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Vec3::ZERO)
    }
}

impl Component for Transform {}

/// Linear and angular velocity, in units (radians) per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// Linear velocity.
    pub linear: Vec3,
    /// Angular velocity, added to [`Transform::rotation`].
    pub angular: Vec3,
}

impl Velocity {
    /// Pure linear velocity.
    #[must_use]
    pub const fn linear(linear: Vec3) -> Self {
        Self {
            linear,
            angular: Vec3::ZERO,
        }
    }
}

impl Component for Velocity {}

/// Physical properties used by the physics system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBody {
    /// Mass in kilograms.
    pub mass: f32,
    /// Fraction of linear velocity lost per update, in `[0, 1]`.
    pub drag: f32,
    /// Whether gravity accelerates this body.
    pub use_gravity: bool,
}

impl RigidBody {
    /// Body of `mass` with default drag.
    #[must_use]
    pub const fn new(mass: f32, use_gravity: bool) -> Self {
        Self {
            mass,
            drag: 0.01,
            use_gravity,
        }
    }
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(1.0, true)
    }
}

impl Component for RigidBody {}

/// Reference to GPU-side mesh and material resources.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mesh {
    /// Mesh id in the backend's resource table.
    pub mesh_id: u32,
    /// Material id in the backend's resource table.
    pub material_id: u32,
}

impl Component for Mesh {}

/// Human-readable entity label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// The label.
    pub name: String,
}

impl Tag {
    /// Creates a tag.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new("Entity")
    }
}

impl Component for Tag {}

/// Registers every stock component, in a fixed order.
///
/// # Errors
///
/// Fails if any of them is already registered.
pub fn register_components(ecs: &mut Coordinator) -> EcsResult<()> {
    ecs.register_component::<Transform>()?;
    ecs.register_component::<Velocity>()?;
    ecs.register_component::<RigidBody>()?;
    ecs.register_component::<Mesh>()?;
    ecs.register_component::<Tag>()?;
    Ok(())
}

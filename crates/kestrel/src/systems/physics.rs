//! Explicit Euler integration with gravity and linear drag.

use kestrel_core::{ComponentView, EcsResult, EntitySet, System};

use crate::components::{RigidBody, Tag, Transform, Velocity};
use crate::math::Vec3;

/// Moves every entity that has a [`Transform`], [`Velocity`] and [`RigidBody`].
///
/// Per entity and update:
///
/// 1. `linear += gravity * dt` when the body uses gravity
/// 2. `linear *= 1 - drag`
/// 3. `position += linear * dt`
/// 4. `rotation += angular * dt`
///
/// Every `log_interval` updates the position of each tracked entity is
/// logged at `debug` together with its [`Tag`], if it has one.
#[derive(Debug, Clone)]
pub struct PhysicsSystem {
    gravity: Vec3,
    log_interval: u64,
    updates: u64,
}

impl PhysicsSystem {
    /// Standard Earth gravity, in m/s².
    pub const EARTH_GRAVITY: Vec3 = Vec3::new(0.0, -9.81, 0.0);

    /// Creates the system. A `log_interval` of zero disables position logs.
    #[must_use]
    pub const fn new(gravity: Vec3, log_interval: u64) -> Self {
        Self {
            gravity,
            log_interval,
            updates: 0,
        }
    }

    /// Gravity applied to bodies that use it.
    #[must_use]
    pub const fn gravity(&self) -> Vec3 {
        self.gravity
    }

    /// Number of completed updates.
    #[must_use]
    pub const fn updates(&self) -> u64 {
        self.updates
    }

    fn should_log(&self) -> bool {
        self.log_interval != 0 && self.updates % self.log_interval == 0
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new(Self::EARTH_GRAVITY, 60)
    }
}

impl System for PhysicsSystem {
    fn update(
        &mut self,
        view: &mut ComponentView<'_>,
        entities: &EntitySet,
        delta_seconds: f64,
    ) -> EcsResult<()> {
        #[allow(clippy::cast_possible_truncation)]
        let dt = delta_seconds as f32;

        self.updates += 1;
        let log_positions = self.should_log();

        for &entity in entities {
            let body = *view.get::<RigidBody>(entity)?;

            let velocity = view.get_mut::<Velocity>(entity)?;
            if body.use_gravity {
                velocity.linear += self.gravity * dt;
            }
            velocity.linear *= 1.0 - body.drag;
            let Velocity { linear, angular } = *velocity;

            let transform = view.get_mut::<Transform>(entity)?;
            transform.position += linear * dt;
            transform.rotation += angular * dt;
            let position = transform.position;

            if log_positions {
                let name = view
                    .get::<Tag>(entity)
                    .map_or("<untagged>", |tag| tag.name.as_str());
                tracing::debug!(
                    %entity,
                    name,
                    x = position.x,
                    y = position.y,
                    z = position.z,
                    "body position"
                );
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "physics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::register_components;
    use kestrel_core::{Coordinator, Entity, Signature};

    fn setup(system: PhysicsSystem) -> Coordinator {
        let mut ecs = Coordinator::with_capacity(8);
        register_components(&mut ecs).unwrap();
        ecs.register_system_with(system).unwrap();

        let required: Signature = [
            ecs.component_type::<Transform>().unwrap(),
            ecs.component_type::<Velocity>().unwrap(),
            ecs.component_type::<RigidBody>().unwrap(),
        ]
        .into_iter()
        .collect();
        ecs.set_system_signature::<PhysicsSystem>(required).unwrap();
        ecs
    }

    fn spawn(ecs: &mut Coordinator, velocity: Velocity, body: RigidBody) -> Entity {
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::default()).unwrap();
        ecs.add_component(e, velocity).unwrap();
        ecs.add_component(e, body).unwrap();
        e
    }

    #[test]
    fn test_gravity_integration() {
        let mut ecs = setup(PhysicsSystem::default());
        let body = RigidBody {
            drag: 0.0,
            ..RigidBody::default()
        };
        let e = spawn(&mut ecs, Velocity::default(), body);

        ecs.run_system::<PhysicsSystem>(1.0).unwrap();

        let velocity = ecs.get_component::<Velocity>(e).unwrap().linear;
        let position = ecs.get_component::<Transform>(e).unwrap().position;
        assert!(velocity.abs_diff_eq(Vec3::new(0.0, -9.81, 0.0), 1e-5));
        assert!(position.abs_diff_eq(Vec3::new(0.0, -9.81, 0.0), 1e-5));
    }

    #[test]
    fn test_drag_and_rotation_without_gravity() {
        let mut ecs = setup(PhysicsSystem::default());
        let body = RigidBody {
            mass: 2.0,
            drag: 0.5,
            use_gravity: false,
        };
        let velocity = Velocity {
            linear: Vec3::new(4.0, 0.0, 0.0),
            angular: Vec3::new(0.0, 1.0, 0.0),
        };
        let e = spawn(&mut ecs, velocity, body);

        ecs.run_system::<PhysicsSystem>(0.5).unwrap();

        let velocity = ecs.get_component::<Velocity>(e).unwrap();
        assert!(velocity.linear.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-6));

        let transform = ecs.get_component::<Transform>(e).unwrap();
        assert!(transform.position.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));
        assert!(transform.rotation.abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    }

    #[test]
    fn test_untracked_entities_are_not_moved() {
        let mut ecs = setup(PhysicsSystem::default());
        let e = ecs.create_entity().unwrap();
        ecs.add_component(e, Transform::default()).unwrap();
        ecs.add_component(e, Velocity::linear(Vec3::ONE)).unwrap();

        ecs.run_system::<PhysicsSystem>(1.0).unwrap();

        assert_eq!(ecs.get_component::<Transform>(e).unwrap().position, Vec3::ZERO);
        assert!(ecs.system_entities::<PhysicsSystem>().unwrap().is_empty());
    }

    #[test]
    fn test_update_counter_and_custom_gravity() {
        let lunar = Vec3::new(0.0, -1.62, 0.0);
        let mut ecs = setup(PhysicsSystem::new(lunar, 2));
        let body = RigidBody {
            drag: 0.0,
            ..RigidBody::default()
        };
        let e = spawn(&mut ecs, Velocity::default(), body);
        ecs.add_component(e, Tag::new("probe")).unwrap();

        for _ in 0..3 {
            ecs.run_system::<PhysicsSystem>(1.0).unwrap();
        }

        let system = ecs.system::<PhysicsSystem>().unwrap();
        assert_eq!(system.updates(), 3);
        assert_eq!(system.gravity(), lunar);

        let velocity = ecs.get_component::<Velocity>(e).unwrap().linear;
        assert!(velocity.abs_diff_eq(Vec3::new(0.0, -4.86, 0.0), 1e-5));
    }

    #[test]
    fn test_log_interval_zero_never_logs() {
        let mut system = PhysicsSystem::new(Vec3::ZERO, 0);
        system.updates = 120;
        assert!(!system.should_log());

        let mut system = PhysicsSystem::new(Vec3::ZERO, 60);
        system.updates = 120;
        assert!(system.should_log());
        system.updates = 121;
        assert!(!system.should_log());
    }
}

//! Demo scene used by `kestrel_headless`.

use kestrel_core::Entity;

use crate::components::{Mesh, RigidBody, Transform, Velocity};
use crate::engine::{Engine, EngineResult};
use crate::math::Vec3;

/// Mesh id of the unit cube in the demo resource table.
pub const CUBE_MESH: u32 = 0;
/// Mesh id of the ground plane in the demo resource table.
pub const PLANE_MESH: u32 = 1;

/// Number of entities [`build_demo_scene`] spawns.
pub const DEMO_ENTITY_COUNT: usize = 5;

/// Spawns a ground plane, three falling cubes and one floating spinner.
///
/// Returns the spawned entities in creation order.
///
/// # Errors
///
/// Fails if the engine has fewer than [`DEMO_ENTITY_COUNT`] free entities.
pub fn build_demo_scene(engine: &mut Engine) -> EngineResult<Vec<Entity>> {
    let mut spawned = Vec::with_capacity(DEMO_ENTITY_COUNT);

    let ground = Transform {
        scale: Vec3::new(20.0, 0.1, 20.0),
        ..Transform::default()
    };
    spawned.push(engine.spawn_static(
        "Ground",
        ground,
        Mesh {
            mesh_id: PLANE_MESH,
            material_id: 0,
        },
    )?);

    let drops = [
        ("Cube_0", Vec3::new(-2.0, 10.0, 0.0), 1.0),
        ("Cube_1", Vec3::new(0.0, 15.0, 0.0), 2.0),
        ("Cube_2", Vec3::new(2.0, 20.0, 0.0), 5.0),
    ];
    for (material_id, (name, position, mass)) in (1..).zip(drops) {
        let cube = engine.spawn_body(
            name,
            Transform::at(position),
            Velocity::default(),
            RigidBody::new(mass, true),
        )?;
        engine.coordinator_mut().add_component(
            cube,
            Mesh {
                mesh_id: CUBE_MESH,
                material_id,
            },
        )?;
        spawned.push(cube);
    }

    let spinner = engine.spawn_body(
        "Spinner",
        Transform::at(Vec3::new(0.0, 3.0, -4.0)),
        Velocity {
            linear: Vec3::ZERO,
            angular: Vec3::new(0.0, 1.5, 0.0),
        },
        RigidBody::new(1.0, false),
    )?;
    engine.coordinator_mut().add_component(
        spinner,
        Mesh {
            mesh_id: CUBE_MESH,
            material_id: 4,
        },
    )?;
    spawned.push(spinner);

    tracing::info!(entities = spawned.len(), "demo scene built");
    Ok(spawned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::systems::PhysicsSystem;

    #[test]
    fn test_demo_scene_contents() {
        let mut engine = Engine::new(EngineConfig::default()).unwrap();
        let spawned = build_demo_scene(&mut engine).unwrap();
        assert_eq!(spawned.len(), DEMO_ENTITY_COUNT);

        let ecs = engine.coordinator();
        assert_eq!(ecs.system_entities::<PhysicsSystem>().unwrap().len(), 4);

        engine.step().unwrap();
        assert_eq!(engine.draw_list().unwrap().len(), DEMO_ENTITY_COUNT);
    }

    #[test]
    fn test_cubes_fall_and_spinner_floats() {
        let mut config = EngineConfig::default();
        config.simulation.frames = 60;
        let mut engine = Engine::new(config).unwrap();
        let spawned = build_demo_scene(&mut engine).unwrap();
        engine.run().unwrap();

        let ecs = engine.coordinator();
        let cube = ecs.get_component::<Transform>(spawned[1]).unwrap();
        assert!(cube.position.y < 10.0);

        let spinner = ecs.get_component::<Transform>(spawned[4]).unwrap();
        assert_eq!(spinner.position, Vec3::new(0.0, 3.0, -4.0));
        assert!(spinner.rotation.y > 1.4 && spinner.rotation.y < 1.6);
    }

    #[test]
    fn test_scene_needs_room() {
        let mut config = EngineConfig::default();
        config.ecs.max_entities = 3;
        let mut engine = Engine::new(config).unwrap();
        assert!(build_demo_scene(&mut engine).is_err());
    }
}

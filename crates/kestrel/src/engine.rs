//! # Frame Driver
//!
//! [`Engine`] owns the [`Coordinator`] and advances it at a fixed timestep:
//! physics first, then render preparation. There is no window or input; a
//! run ends after the configured number of frames or when [`Engine::stop`]
//! is called from the per-frame callback.

use std::time::{Duration, Instant};

use kestrel_core::{Coordinator, EcsError, Entity, Signature};
use thiserror::Error;

use crate::components::{register_components, Mesh, RigidBody, Tag, Transform, Velocity};
use crate::config::{ConfigError, EngineConfig};
use crate::systems::{DrawList, PhysicsSystem, RenderSystem};

/// Errors surfaced by the engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// ECS contract violation.
    #[error(transparent)]
    Ecs(#[from] EcsError),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// What one [`Engine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Simulated time after this frame.
    pub simulated_seconds: f64,
    /// Live entities.
    pub living_entities: usize,
    /// Entities moved by physics.
    pub bodies: usize,
    /// Draw commands produced.
    pub draw_commands: usize,
}

/// Outcome of [`Engine::run`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Frames stepped during this run.
    pub frames: u64,
    /// Simulated time covered by this run.
    pub simulated_seconds: f64,
    /// Real time spent.
    pub wall_time: Duration,
    /// True if [`Engine::stop`] ended the run before the frame budget.
    pub stopped_early: bool,
    /// Stats of the last frame, if any frame ran.
    pub last_frame: Option<FrameStats>,
}

/// Headless simulation engine.
pub struct Engine {
    ecs: Coordinator,
    config: EngineConfig,
    frame: u64,
    simulated_seconds: f64,
    running: bool,
}

impl Engine {
    /// Builds an engine: validates `config`, registers the stock components
    /// and both systems with their required signatures.
    ///
    /// # Errors
    ///
    /// [`EngineError::Config`] for an invalid configuration.
    pub fn new(config: EngineConfig) -> EngineResult<Self> {
        config.validate()?;

        let mut ecs = Coordinator::with_capacity(config.ecs.max_entities);
        register_components(&mut ecs)?;

        let transform = ecs.component_type::<Transform>()?;
        let velocity = ecs.component_type::<Velocity>()?;
        let rigid_body = ecs.component_type::<RigidBody>()?;
        let mesh = ecs.component_type::<Mesh>()?;

        ecs.register_system_with(PhysicsSystem::new(
            config.physics.gravity,
            config.simulation.log_interval,
        ))?;
        ecs.set_system_signature::<PhysicsSystem>(
            Signature::EMPTY
                .with(transform)
                .with(velocity)
                .with(rigid_body),
        )?;

        ecs.register_system::<RenderSystem>()?;
        ecs.set_system_signature::<RenderSystem>(Signature::EMPTY.with(transform).with(mesh))?;

        tracing::info!(
            max_entities = config.ecs.max_entities,
            timestep = config.simulation.fixed_timestep,
            "engine initialized"
        );

        Ok(Self {
            ecs,
            config,
            frame: 0,
            simulated_seconds: 0.0,
            running: false,
        })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The ECS.
    #[must_use]
    pub fn coordinator(&self) -> &Coordinator {
        &self.ecs
    }

    /// The ECS, mutably.
    pub fn coordinator_mut(&mut self) -> &mut Coordinator {
        &mut self.ecs
    }

    /// Frames stepped so far.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulated time so far.
    #[must_use]
    pub const fn simulated_seconds(&self) -> f64 {
        self.simulated_seconds
    }

    /// True while [`Engine::run`] is looping.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Ends the current run after the frame in progress.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Draw commands produced by the last frame.
    ///
    /// # Errors
    ///
    /// Only if the render system was removed, which the engine never does.
    pub fn draw_list(&self) -> EngineResult<&DrawList> {
        Ok(self.ecs.system::<RenderSystem>()?.draw_list())
    }

    /// Spawns a dynamic body: tag, transform, velocity and rigid body.
    ///
    /// # Errors
    ///
    /// `EntityCapacityExceeded` when the world is full.
    pub fn spawn_body(
        &mut self,
        name: &str,
        transform: Transform,
        velocity: Velocity,
        body: RigidBody,
    ) -> EngineResult<Entity> {
        let entity = self.ecs.create_entity()?;
        self.ecs.add_component(entity, Tag::new(name))?;
        self.ecs.add_component(entity, transform)?;
        self.ecs.add_component(entity, velocity)?;
        self.ecs.add_component(entity, body)?;
        tracing::debug!(%entity, name, "body spawned");
        Ok(entity)
    }

    /// Spawns a visible, non-moving entity: tag, transform and mesh.
    ///
    /// # Errors
    ///
    /// `EntityCapacityExceeded` when the world is full.
    pub fn spawn_static(
        &mut self,
        name: &str,
        transform: Transform,
        mesh: Mesh,
    ) -> EngineResult<Entity> {
        let entity = self.ecs.create_entity()?;
        self.ecs.add_component(entity, Tag::new(name))?;
        self.ecs.add_component(entity, transform)?;
        self.ecs.add_component(entity, mesh)?;
        tracing::debug!(%entity, name, "static entity spawned");
        Ok(entity)
    }

    /// Destroys an entity.
    ///
    /// # Errors
    ///
    /// `EntityNotAlive` or `EntityOutOfRange`.
    pub fn despawn(&mut self, entity: Entity) -> EngineResult<()> {
        self.ecs.destroy_entity(entity)?;
        Ok(())
    }

    /// Advances one fixed timestep: physics, then render preparation.
    ///
    /// # Errors
    ///
    /// Whatever a system returns; the frame counter is not advanced.
    pub fn step(&mut self) -> EngineResult<FrameStats> {
        let dt = self.config.simulation.fixed_timestep;
        self.ecs.run_system::<PhysicsSystem>(dt)?;
        self.ecs.run_system::<RenderSystem>(dt)?;

        self.frame += 1;
        self.simulated_seconds += dt;

        let stats = FrameStats {
            frame: self.frame,
            simulated_seconds: self.simulated_seconds,
            living_entities: self.ecs.living_count(),
            bodies: self.ecs.system_entities::<PhysicsSystem>()?.len(),
            draw_commands: self.draw_list()?.len(),
        };
        tracing::trace!(
            frame = stats.frame,
            bodies = stats.bodies,
            draw_commands = stats.draw_commands,
            "frame complete"
        );
        Ok(stats)
    }

    /// Runs up to `simulation.frames` frames.
    ///
    /// # Errors
    ///
    /// The first error from [`Engine::step`]; the run stops there.
    pub fn run(&mut self) -> EngineResult<RunSummary> {
        self.run_with(|_, _| {})
    }

    /// Like [`Engine::run`], calling `on_frame` after every frame. The
    /// callback may edit the world or call [`Engine::stop`].
    ///
    /// # Errors
    ///
    /// The first error from [`Engine::step`]; the run stops there.
    pub fn run_with<F>(&mut self, mut on_frame: F) -> EngineResult<RunSummary>
    where
        F: FnMut(&mut Self, &FrameStats),
    {
        let budget = self.config.simulation.frames;
        let start_frame = self.frame;
        let start_seconds = self.simulated_seconds;
        let started = Instant::now();
        let mut last_frame = None;

        tracing::info!(
            frames = budget,
            entities = self.ecs.living_count(),
            "simulation started"
        );

        self.running = true;
        while self.running && self.frame - start_frame < budget {
            let stats = match self.step() {
                Ok(stats) => stats,
                Err(err) => {
                    self.running = false;
                    tracing::warn!(frame = self.frame + 1, error = %err, "frame failed");
                    return Err(err);
                }
            };
            on_frame(self, &stats);
            last_frame = Some(stats);
        }
        self.running = false;

        let frames = self.frame - start_frame;
        let summary = RunSummary {
            frames,
            simulated_seconds: self.simulated_seconds - start_seconds,
            wall_time: started.elapsed(),
            stopped_early: frames < budget,
            last_frame,
        };

        tracing::info!(
            frames = summary.frames,
            simulated_seconds = summary.simulated_seconds,
            wall_ms = summary.wall_time.as_secs_f64() * 1000.0,
            stopped_early = summary.stopped_early,
            "simulation finished"
        );
        Ok(summary)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("frame", &self.frame)
            .field("simulated_seconds", &self.simulated_seconds)
            .field("living_entities", &self.ecs.living_count())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    fn config(frames: u64) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.ecs.max_entities = 16;
        config.simulation.frames = frames;
        config.simulation.fixed_timestep = 0.5;
        config
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config(1);
        bad.simulation.fixed_timestep = 0.0;
        assert!(matches!(Engine::new(bad), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_systems_pick_up_spawned_entities() {
        let mut engine = Engine::new(config(1)).unwrap();
        let body = engine
            .spawn_body("ball", Transform::default(), Velocity::default(), RigidBody::default())
            .unwrap();
        let ground = engine
            .spawn_static("ground", Transform::default(), Mesh::default())
            .unwrap();

        let ecs = engine.coordinator();
        assert!(ecs.system_entities::<PhysicsSystem>().unwrap().contains(&body));
        assert!(!ecs.system_entities::<PhysicsSystem>().unwrap().contains(&ground));
        assert!(ecs.system_entities::<RenderSystem>().unwrap().contains(&ground));
        assert_eq!(ecs.get_component::<Tag>(body).unwrap().name, "ball");
    }

    #[test]
    fn test_step_moves_bodies_and_draws() {
        let mut engine = Engine::new(config(1)).unwrap();
        let body = RigidBody {
            drag: 0.0,
            ..RigidBody::default()
        };
        let ball = engine
            .spawn_body("ball", Transform::default(), Velocity::default(), body)
            .unwrap();
        engine
            .coordinator_mut()
            .add_component(ball, Mesh { mesh_id: 1, material_id: 0 })
            .unwrap();

        let stats = engine.step().unwrap();
        assert_eq!(stats.frame, 1);
        assert_eq!(stats.bodies, 1);
        assert_eq!(stats.draw_commands, 1);
        assert_eq!(stats.simulated_seconds, 0.5);

        // Render runs after physics, so the command sees the new position.
        let position = engine.coordinator().get_component::<Transform>(ball).unwrap().position;
        let drawn = engine.draw_list().unwrap().commands()[0].transform.position;
        assert_eq!(drawn, position);
        assert!(position.abs_diff_eq(Vec3::new(0.0, -2.4525, 0.0), 1e-5));
    }

    #[test]
    fn test_run_respects_frame_budget() {
        let mut engine = Engine::new(config(5)).unwrap();
        let summary = engine.run().unwrap();

        assert_eq!(summary.frames, 5);
        assert!(!summary.stopped_early);
        assert_eq!(summary.simulated_seconds, 2.5);
        assert_eq!(summary.last_frame.map(|f| f.frame), Some(5));
        assert!(!engine.is_running());

        // A second run continues the frame count.
        let summary = engine.run().unwrap();
        assert_eq!(summary.frames, 5);
        assert_eq!(engine.frame(), 10);
    }

    #[test]
    fn test_zero_log_interval_runs() {
        let mut config = config(3);
        config.simulation.log_interval = 0;
        let mut engine = Engine::new(config).unwrap();
        engine
            .spawn_body("quiet", Transform::default(), Velocity::default(), RigidBody::default())
            .unwrap();

        assert_eq!(engine.run().unwrap().frames, 3);
        assert_eq!(engine.coordinator().system::<PhysicsSystem>().unwrap().updates(), 3);
    }

    #[test]
    fn test_stop_from_callback() {
        let mut engine = Engine::new(config(100)).unwrap();
        let summary = engine
            .run_with(|engine, stats| {
                if stats.frame == 3 {
                    engine.stop();
                }
            })
            .unwrap();

        assert_eq!(summary.frames, 3);
        assert!(summary.stopped_early);
    }

    #[test]
    fn test_capacity_surfaces_as_ecs_error() {
        let mut config = config(1);
        config.ecs.max_entities = 1;
        let mut engine = Engine::new(config).unwrap();

        engine
            .spawn_static("a", Transform::default(), Mesh::default())
            .unwrap();
        let err = engine
            .spawn_static("b", Transform::default(), Mesh::default())
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Ecs(EcsError::EntityCapacityExceeded { capacity: 1 })
        ));
    }

    #[test]
    fn test_despawn_removes_from_draw_list() {
        let mut engine = Engine::new(config(1)).unwrap();
        let crate_entity = engine
            .spawn_static("crate", Transform::default(), Mesh::default())
            .unwrap();
        engine.step().unwrap();
        assert_eq!(engine.draw_list().unwrap().len(), 1);

        engine.despawn(crate_entity).unwrap();
        engine.step().unwrap();
        assert!(engine.draw_list().unwrap().is_empty());
        assert!(engine.despawn(crate_entity).is_err());
    }
}

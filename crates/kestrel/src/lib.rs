//! # Kestrel
//!
//! Headless simulation layer on top of [`kestrel_core`].
//!
//! - [`components`] - the stock component set
//! - [`systems`] - physics integration and render preparation
//! - [`config`] - TOML configuration, loaded once at startup
//! - [`engine`] - fixed-timestep frame driver
//!
//! ## Example
//!
//! ```rust
//! use kestrel::{Engine, EngineConfig, RigidBody, Transform, Velocity};
//!
//! let mut config = EngineConfig::default();
//! config.simulation.frames = 10;
//!
//! let mut engine = Engine::new(config).unwrap();
//! let ball = engine
//!     .spawn_body("ball", Transform::default(), Velocity::default(), RigidBody::default())
//!     .unwrap();
//!
//! let summary = engine.run().unwrap();
//! assert_eq!(summary.frames, 10);
//!
//! let fallen = engine.coordinator().get_component::<Transform>(ball).unwrap();
//! assert!(fallen.position.y < 0.0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod components;
pub mod config;
pub mod engine;
pub mod math;
pub mod scene;
pub mod systems;

pub use components::{register_components, Mesh, RigidBody, Tag, Transform, Velocity};
pub use config::{ConfigError, EngineConfig};
pub use engine::{Engine, EngineError, EngineResult, FrameStats, RunSummary};
pub use math::Vec3;
pub use systems::{DrawCommand, DrawList, PhysicsSystem, RenderSystem};

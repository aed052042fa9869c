//! # Stock Systems
//!
//! - [`PhysicsSystem`] integrates velocity and gravity into transforms
//! - [`RenderSystem`] turns transforms and meshes into a [`DrawList`]
//!
//! Both are registered by [`crate::Engine`], which also sets their
//! required signatures. Physics always runs before render within a frame.

mod physics;
mod render;

pub use physics::PhysicsSystem;
pub use render::{DrawCommand, DrawList, RenderSystem};

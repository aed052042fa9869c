//! # Entity Component System
//!
//! A signature-routed ECS with dense per-type component storage.
//!
//! ## Design Philosophy
//!
//! - Entity ids come from a fixed pool and are recycled
//! - Each component type lives in its own gap-free array
//! - Signatures record which components an entity has
//! - Systems track the entities whose signature covers theirs
//! - One [`Coordinator`] sequences every cross-registry update

mod component;
mod coordinator;
mod entity;
mod signature;
mod storage;
mod system;

pub use component::Component;
pub use coordinator::Coordinator;
pub use entity::{Entity, EntityRegistry, MAX_ENTITIES};
pub use signature::{ComponentType, Signature, MAX_COMPONENTS};
pub use storage::{ComponentArray, ComponentRegistry, ErasedComponentArray};
pub use system::{AsAny, ComponentView, EntitySet, System, SystemRegistry};

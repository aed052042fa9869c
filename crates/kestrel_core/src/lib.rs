//! # Kestrel Core
//!
//! Entity Component System runtime for the Kestrel engine.
//!
//! - Up to [`MAX_ENTITIES`] live entities by default, ids recycled
//! - Up to [`MAX_COMPONENTS`] component types, one dense array each
//! - Systems track exactly the entities whose signature covers theirs
//!
//! ## Architecture Rules
//!
//! 1. **One owner** - a [`Coordinator`] owns all ECS state; there are no globals
//! 2. **Dense storage** - component values are packed, removal is swap-with-last
//! 3. **Contract errors** - every misuse is reported as an [`EcsError`], never ignored
//!
//! ## Example
//!
//! ```rust
//! use kestrel_core::{Component, Coordinator, Signature};
//!
//! #[derive(Clone, Copy, Debug, Default, PartialEq)]
//! struct Position(f32, f32, f32);
//! impl Component for Position {}
//!
//! let mut ecs = Coordinator::new();
//! let position = ecs.register_component::<Position>().unwrap();
//!
//! let entity = ecs.create_entity().unwrap();
//! ecs.add_component(entity, Position(1.0, 2.0, 3.0)).unwrap();
//!
//! assert_eq!(ecs.signature(entity).unwrap(), Signature::EMPTY.with(position));
//! assert_eq!(*ecs.get_component::<Position>(entity).unwrap(), Position(1.0, 2.0, 3.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;
pub mod error;

pub use ecs::{
    AsAny, Component, ComponentArray, ComponentRegistry, ComponentType, ComponentView,
    Coordinator, Entity, EntityRegistry, EntitySet, ErasedComponentArray, Signature, System,
    SystemRegistry, MAX_COMPONENTS, MAX_ENTITIES,
};
pub use error::{EcsError, EcsResult, ErrorKind};

//! # Coordinator
//!
//! The single entry point into the ECS. It owns the entity, component and
//! system registries and orders every cross-registry update so that:
//!
//! - an entity's signature always mirrors the components it holds
//! - every system tracks exactly the live entities matching its signature

use super::component::Component;
use super::entity::{Entity, EntityRegistry, MAX_ENTITIES};
use super::signature::{ComponentType, Signature};
use super::storage::{ComponentArray, ComponentRegistry};
use super::system::{EntitySet, System, SystemRegistry};
use crate::error::EcsResult;

/// The ECS facade.
///
/// One coordinator is one simulation. There is no global instance; pass it
/// to whoever needs it.
///
/// # Example
///
/// ```rust,ignore
/// let mut ecs = Coordinator::new();
/// ecs.register_component::<Transform>()?;
///
/// let entity = ecs.create_entity()?;
/// ecs.add_component(entity, Transform::default())?;
/// ecs.get_component_mut::<Transform>(entity)?.position.y += 1.0;
/// ```
pub struct Coordinator {
    entities: EntityRegistry,
    components: ComponentRegistry,
    systems: SystemRegistry,
}

impl Coordinator {
    /// Creates a coordinator for up to [`MAX_ENTITIES`] live entities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_ENTITIES)
    }

    /// Creates a coordinator for up to `max_entities` live entities.
    ///
    /// # Panics
    ///
    /// Panics if `max_entities` is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn with_capacity(max_entities: usize) -> Self {
        tracing::debug!(max_entities, "coordinator created");
        Self {
            entities: EntityRegistry::new(max_entities),
            components: ComponentRegistry::new(max_entities),
            systems: SystemRegistry::new(),
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entities.capacity()
    }

    /// Number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn living_count(&self) -> usize {
        self.entities.living_count()
    }

    /// Checks whether `entity` is live.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Creates an entity with an empty signature.
    ///
    /// Systems with an empty required signature pick it up immediately.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityCapacityExceeded`](crate::EcsError::EntityCapacityExceeded)
    /// at the live-entity maximum.
    pub fn create_entity(&mut self) -> EcsResult<Entity> {
        let entity = self.entities.create()?;
        self.systems.entity_signature_changed(entity, Signature::EMPTY);
        Ok(entity)
    }

    /// Destroys `entity`, purging its components and system membership.
    ///
    /// Component data goes first while the signature is still intact, then
    /// the id is reclaimed, then systems forget it.
    ///
    /// # Errors
    ///
    /// `EntityOutOfRange` or `EntityNotAlive`; nothing is touched on error.
    pub fn destroy_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.entities.ensure_alive(entity)?;

        self.components.entity_destroyed(entity);
        self.entities.destroy(entity)?;
        self.systems.entity_destroyed(entity);

        Ok(())
    }

    /// Returns the signature of `entity`.
    ///
    /// # Errors
    ///
    /// `EntityOutOfRange` for an id beyond capacity.
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities.signature(entity)
    }

    /// Iterates over live entities with their signatures, in id order.
    pub fn living_entities(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.entities.iter_living()
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Registers component type `C`.
    ///
    /// # Errors
    ///
    /// `ComponentAlreadyRegistered` or `ComponentCapacityExceeded`.
    pub fn register_component<C: Component>(&mut self) -> EcsResult<ComponentType> {
        self.components.register::<C>()
    }

    /// Returns the type index (signature bit) of `C`.
    ///
    /// # Errors
    ///
    /// `ComponentNotRegistered` if `C` was never registered.
    pub fn component_type<C: Component>(&self) -> EcsResult<ComponentType> {
        self.components.component_type::<C>()
    }

    /// Adds `component` to `entity`.
    ///
    /// Storage is updated first, then the signature, then systems, so by the
    /// time systems re-evaluate both data and signature reflect the addition.
    ///
    /// # Errors
    ///
    /// `EntityOutOfRange`, `EntityNotAlive`, `ComponentNotRegistered` or
    /// `DuplicateComponent`; nothing is touched on error.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.entities.ensure_alive(entity)?;
        let component_type = self.components.component_type::<C>()?;

        self.components.insert(entity, component)?;

        let mut signature = self.entities.signature(entity)?;
        signature.set(component_type, true);
        self.entities.set_signature(entity, signature)?;

        self.systems.entity_signature_changed(entity, signature);
        tracing::trace!(%entity, component = C::name(), "component added");

        Ok(())
    }

    /// Removes and returns the `C` of `entity`.
    ///
    /// Mirrors [`add_component`](Self::add_component): storage, signature,
    /// then systems.
    ///
    /// # Errors
    ///
    /// `EntityOutOfRange`, `EntityNotAlive`, `ComponentNotRegistered` or
    /// `ComponentNotFound`; nothing is touched on error.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.entities.ensure_alive(entity)?;
        let component_type = self.components.component_type::<C>()?;

        let removed = self.components.remove::<C>(entity)?;

        let mut signature = self.entities.signature(entity)?;
        signature.set(component_type, false);
        self.entities.set_signature(entity, signature)?;

        self.systems.entity_signature_changed(entity, signature);
        tracing::trace!(%entity, component = C::name(), "component removed");

        Ok(removed)
    }

    /// Gets the `C` of `entity`.
    ///
    /// # Errors
    ///
    /// `ComponentNotRegistered` or `ComponentNotFound`.
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.components.get(entity)
    }

    /// Gets the `C` of `entity` mutably.
    ///
    /// # Errors
    ///
    /// `ComponentNotRegistered` or `ComponentNotFound`.
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.components.get_mut(entity)
    }

    /// Checks whether `entity` has a `C`. Unregistered types are absent.
    #[must_use]
    pub fn has_component<C: Component>(&self, entity: Entity) -> bool {
        self.components
            .array::<C>()
            .is_ok_and(|array| array.contains(entity))
    }

    /// Returns the dense array of `C` for bulk iteration.
    ///
    /// # Errors
    ///
    /// `ComponentNotRegistered` if `C` was never registered.
    pub fn component_array<C: Component>(&self) -> EcsResult<&ComponentArray<C>> {
        self.components.array::<C>()
    }

    /// Returns the dense array of `C` mutably. Values can change, membership
    /// cannot.
    ///
    /// # Errors
    ///
    /// `ComponentNotRegistered` if `C` was never registered.
    pub fn component_values_mut<C: Component>(&mut self) -> EcsResult<&mut [C]> {
        Ok(self.components.array_mut::<C>()?.values_mut())
    }

    /// Number of registered component types.
    #[must_use]
    pub fn component_type_count(&self) -> usize {
        self.components.type_count()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Registers a default-constructed `S`.
    ///
    /// # Errors
    ///
    /// `SystemAlreadyRegistered` if an `S` exists.
    pub fn register_system<S: System + Default>(&mut self) -> EcsResult<&mut S> {
        self.register_system_with(S::default())
    }

    /// Registers `instance` as the `S` system.
    ///
    /// Its required signature starts empty, so it starts out tracking every
    /// live entity.
    ///
    /// # Errors
    ///
    /// `SystemAlreadyRegistered` if an `S` exists.
    pub fn register_system_with<S: System>(&mut self, instance: S) -> EcsResult<&mut S> {
        self.systems.register(instance)?;
        self.systems.refresh::<S, _>(self.entities.iter_living())?;
        self.systems.get_mut::<S>()
    }

    /// Sets the signature an entity needs to be tracked by `S` and rebuilds
    /// its tracked set from the live entities.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered` if `S` was never registered.
    pub fn set_system_signature<S: System>(&mut self, signature: Signature) -> EcsResult<()> {
        self.systems.set_required_signature::<S>(signature)?;
        self.systems.refresh::<S, _>(self.entities.iter_living())
    }

    /// Returns the signature required by `S`.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered` if `S` was never registered.
    pub fn system_signature<S: System>(&self) -> EcsResult<Signature> {
        self.systems.required_signature::<S>()
    }

    /// Returns the entities tracked by `S`.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered` if `S` was never registered.
    pub fn system_entities<S: System>(&self) -> EcsResult<&EntitySet> {
        self.systems.entities::<S>()
    }

    /// Returns the `S` instance.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered` if `S` was never registered.
    pub fn system<S: System>(&self) -> EcsResult<&S> {
        self.systems.get::<S>()
    }

    /// Returns the `S` instance mutably.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered` if `S` was never registered.
    pub fn system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        self.systems.get_mut::<S>()
    }

    /// Runs `S` once over its tracked entities.
    ///
    /// # Errors
    ///
    /// `SystemNotRegistered`, or whatever the system returns.
    pub fn run_system<S: System>(&mut self, delta_seconds: f64) -> EcsResult<()> {
        self.systems.run::<S>(&mut self.components, delta_seconds)
    }

    /// Runs every system once, in registration order.
    ///
    /// # Errors
    ///
    /// The error of the first failing system.
    pub fn run_systems(&mut self, delta_seconds: f64) -> EcsResult<()> {
        self.systems.run_all(&mut self.components, delta_seconds)
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

//! # Component Storage
//!
//! Dense, gap-free component storage.
//!
//! Each component type gets one [`ComponentArray`]:
//! - Values live in a contiguous buffer, valid in `[0, len)`
//! - An entity→slot table and a slot→entity table translate between stable
//!   entity ids and volatile slots
//! - Removal moves the last value into the hole, so iteration order is not
//!   stable across removals
//!
//! The [`ComponentRegistry`] owns one array per registered type behind the
//! [`ErasedComponentArray`] trait, which is all it needs to purge a destroyed
//! entity without knowing any concrete component type.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::Entity;
use super::signature::{ComponentType, MAX_COMPONENTS};
use crate::error::{EcsError, EcsResult};

/// Dense storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut positions: ComponentArray<Position> = ComponentArray::new(5000);
/// positions.insert(entity, Position::new(1.0, 2.0, 3.0))?;
/// ```
pub struct ComponentArray<C: Component> {
    /// Packed component values.
    values: Vec<C>,
    /// Owner of each slot, parallel to `values`.
    slot_to_entity: Vec<Entity>,
    /// Slot of each entity, indexed by entity id.
    entity_to_slot: Box<[Option<u32>]>,
}

impl<C: Component> ComponentArray<C> {
    /// Creates an empty array able to address `capacity` entity ids.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            slot_to_entity: Vec::with_capacity(capacity),
            entity_to_slot: vec![None; capacity].into_boxed_slice(),
        }
    }

    /// Returns the number of stored components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Checks whether the array holds no components.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of addressable entity ids.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entity_to_slot.len()
    }

    /// Checks whether `entity` has a component in this array.
    #[inline]
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    /// Appends a component for `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::DuplicateComponent`] if the entity already has one,
    /// [`EcsError::EntityOutOfRange`] if the id is beyond capacity.
    pub fn insert(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        let capacity = self.capacity();
        let entry = self
            .entity_to_slot
            .get_mut(entity.index())
            .ok_or(EcsError::EntityOutOfRange { entity, capacity })?;

        if entry.is_some() {
            return Err(EcsError::DuplicateComponent {
                entity,
                component: C::name(),
            });
        }

        #[allow(clippy::cast_possible_truncation)]
        let slot = self.values.len() as u32;
        *entry = Some(slot);
        self.slot_to_entity.push(entity);
        self.values.push(component);

        Ok(())
    }

    /// Removes and returns the component of `entity`.
    ///
    /// The last value is moved into the freed slot and its owner's mapping is
    /// repointed before the length shrinks.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] if the entity has no component here.
    pub fn remove(&mut self, entity: Entity) -> EcsResult<C> {
        let slot = self
            .entity_to_slot
            .get_mut(entity.index())
            .and_then(Option::take)
            .ok_or_else(|| Self::not_found(entity))? as usize;

        let value = self.values.swap_remove(slot);
        self.slot_to_entity.swap_remove(slot);

        // Whatever was last now sits in `slot`.
        if let Some(&moved) = self.slot_to_entity.get(slot) {
            #[allow(clippy::cast_possible_truncation)]
            let new_slot = slot as u32;
            self.entity_to_slot[moved.index()] = Some(new_slot);
        }

        Ok(value)
    }

    /// Gets the component of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] if the entity has no component here.
    #[inline]
    pub fn get(&self, entity: Entity) -> EcsResult<&C> {
        match self.slot_of(entity) {
            Some(slot) => Ok(&self.values[slot]),
            None => Err(Self::not_found(entity)),
        }
    }

    /// Gets the component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] if the entity has no component here.
    #[inline]
    pub fn get_mut(&mut self, entity: Entity) -> EcsResult<&mut C> {
        match self.slot_of(entity) {
            Some(slot) => Ok(&mut self.values[slot]),
            None => Err(Self::not_found(entity)),
        }
    }

    /// Returns the packed values in slot order.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[C] {
        &self.values
    }

    /// Returns the packed values mutably, in slot order.
    #[inline]
    pub fn values_mut(&mut self) -> &mut [C] {
        &mut self.values
    }

    /// Returns the owners of each slot, parallel to [`values`](Self::values).
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.slot_to_entity
    }

    /// Returns the owner of `slot`, if the slot is occupied.
    #[inline]
    #[must_use]
    pub fn entity_at(&self, slot: usize) -> Option<Entity> {
        self.slot_to_entity.get(slot).copied()
    }

    /// Iterates over `(entity, component)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &C)> {
        self.slot_to_entity.iter().copied().zip(self.values.iter())
    }

    /// Iterates mutably over `(entity, component)` pairs in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Entity, &mut C)> {
        self.slot_to_entity
            .iter()
            .copied()
            .zip(self.values.iter_mut())
    }

    #[inline]
    fn slot_of(&self, entity: Entity) -> Option<usize> {
        self.entity_to_slot
            .get(entity.index())
            .copied()
            .flatten()
            .map(|slot| slot as usize)
    }

    fn not_found(entity: Entity) -> EcsError {
        EcsError::ComponentNotFound {
            entity,
            component: C::name(),
        }
    }
}

/// The type-erased face of a [`ComponentArray`].
pub trait ErasedComponentArray {
    /// Drops the entity's component if it has one.
    fn entity_destroyed(&mut self, entity: Entity);

    /// Number of stored components.
    fn len(&self) -> usize;

    /// Checks whether the array is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Checks whether the entity has a component in this array.
    fn contains(&self, entity: Entity) -> bool;

    /// Name of the stored component type.
    fn component_name(&self) -> &'static str;

    /// Upcast for downcasting to the concrete array.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete array.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedComponentArray for ComponentArray<C> {
    fn entity_destroyed(&mut self, entity: Entity) {
        if self.contains(entity) {
            // Presence was just checked, removal cannot fail.
            let _ = self.remove(entity);
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.slot_of(entity).is_some()
    }

    fn component_name(&self) -> &'static str {
        C::name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Owns one [`ComponentArray`] per registered component type.
pub struct ComponentRegistry {
    /// Type index of every registered component type.
    type_indices: HashMap<TypeId, ComponentType>,
    /// Arrays, indexed by type index.
    arrays: Vec<Box<dyn ErasedComponentArray>>,
    /// Entity capacity each new array is sized for.
    entity_capacity: usize,
}

impl ComponentRegistry {
    /// Creates an empty registry whose arrays address `entity_capacity` ids.
    #[must_use]
    pub fn new(entity_capacity: usize) -> Self {
        Self {
            type_indices: HashMap::with_capacity(MAX_COMPONENTS),
            arrays: Vec::with_capacity(MAX_COMPONENTS),
            entity_capacity,
        }
    }

    /// Number of registered component types.
    #[inline]
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.arrays.len()
    }

    /// Registers `C` and assigns it the next type index.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentAlreadyRegistered`] on repeat registration,
    /// [`EcsError::ComponentCapacityExceeded`] once [`MAX_COMPONENTS`] types exist.
    pub fn register<C: Component>(&mut self) -> EcsResult<ComponentType> {
        let type_id = TypeId::of::<C>();
        if self.type_indices.contains_key(&type_id) {
            return Err(EcsError::ComponentAlreadyRegistered(C::name()));
        }

        let Ok(index) = u8::try_from(self.arrays.len()) else {
            return Err(Self::full::<C>());
        };
        if usize::from(index) >= MAX_COMPONENTS {
            tracing::warn!(component = C::name(), "component type capacity reached");
            return Err(Self::full::<C>());
        }

        let component_type = ComponentType::new(index);
        self.type_indices.insert(type_id, component_type);
        self.arrays
            .push(Box::new(ComponentArray::<C>::new(self.entity_capacity)));

        tracing::debug!(component = C::name(), index, "component type registered");
        Ok(component_type)
    }

    /// Returns the type index of `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `C` was never registered.
    pub fn component_type<C: Component>(&self) -> EcsResult<ComponentType> {
        self.type_indices
            .get(&TypeId::of::<C>())
            .copied()
            .ok_or(EcsError::ComponentNotRegistered(C::name()))
    }

    /// Checks whether `C` is registered.
    #[must_use]
    pub fn is_registered<C: Component>(&self) -> bool {
        self.type_indices.contains_key(&TypeId::of::<C>())
    }

    /// Returns the array storing `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `C` was never registered.
    pub fn array<C: Component>(&self) -> EcsResult<&ComponentArray<C>> {
        let index = self.component_type::<C>()?.index();
        self.arrays[index]
            .as_any()
            .downcast_ref::<ComponentArray<C>>()
            .ok_or(EcsError::ComponentNotRegistered(C::name()))
    }

    /// Returns the array storing `C` mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotRegistered`] if `C` was never registered.
    pub fn array_mut<C: Component>(&mut self) -> EcsResult<&mut ComponentArray<C>> {
        let index = self.component_type::<C>()?.index();
        self.arrays[index]
            .as_any_mut()
            .downcast_mut::<ComponentArray<C>>()
            .ok_or(EcsError::ComponentNotRegistered(C::name()))
    }

    /// Inserts a component for `entity`.
    ///
    /// # Errors
    ///
    /// See [`ComponentArray::insert`]; also fails if `C` is unregistered.
    pub fn insert<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        self.array_mut::<C>()?.insert(entity, component)
    }

    /// Removes the component of `entity`.
    ///
    /// # Errors
    ///
    /// See [`ComponentArray::remove`]; also fails if `C` is unregistered.
    pub fn remove<C: Component>(&mut self, entity: Entity) -> EcsResult<C> {
        self.array_mut::<C>()?.remove(entity)
    }

    /// Gets the component of `entity`.
    ///
    /// # Errors
    ///
    /// See [`ComponentArray::get`]; also fails if `C` is unregistered.
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.array::<C>()?.get(entity)
    }

    /// Gets the component of `entity` mutably.
    ///
    /// # Errors
    ///
    /// See [`ComponentArray::get_mut`]; also fails if `C` is unregistered.
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.array_mut::<C>()?.get_mut(entity)
    }

    /// Purges `entity` from every array.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for array in &mut self.arrays {
            array.entity_destroyed(entity);
        }
    }

    /// Iterates over the erased arrays in type-index order.
    pub fn arrays(&self) -> impl Iterator<Item = &(dyn ErasedComponentArray + 'static)> + '_ {
        self.arrays.iter().map(|array| &**array)
    }

    fn full<C: Component>() -> EcsError {
        EcsError::ComponentCapacityExceeded {
            name: C::name(),
            max: MAX_COMPONENTS,
        }
    }
}

//! # Entity Management
//!
//! Entities are plain integer ids drawn from a fixed pool. The registry hands
//! them out, takes them back, and stores each one's component signature.

use std::collections::VecDeque;
use std::fmt;

use super::signature::Signature;
use crate::error::{EcsError, EcsResult};

/// Default live-entity capacity.
pub const MAX_ENTITIES: usize = 5000;

/// Identifier for an entity.
///
/// Ids are recycled after destruction. Holding an `Entity` across a destroy
/// gives no guarantee about what it refers to afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Entity(u32);

impl Entity {
    /// Wraps a raw id. Only the registry hands out live ids.
    #[inline]
    #[must_use]
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }

    /// Returns the id as an array index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Issues and recycles entity ids and stores their signatures.
///
/// All slots are allocated up front. Ids come back out of the free queue in
/// the order they were returned, so a destroyed id is reused only after every
/// other free id has been handed out.
pub struct EntityRegistry {
    /// Ids ready to be handed out.
    available: VecDeque<Entity>,
    /// Signature of every slot; empty for free slots.
    signatures: Box<[Signature]>,
    /// Liveness of every slot.
    alive: Box<[bool]>,
    /// Number of currently live entities.
    living_count: usize,
}

impl EntityRegistry {
    /// Creates a registry with `capacity` ids, all free.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        #[allow(clippy::cast_possible_truncation)]
        let available = (0..capacity as u32).map(Entity).collect();

        Self {
            available,
            signatures: vec![Signature::EMPTY; capacity].into_boxed_slice(),
            alive: vec![false; capacity].into_boxed_slice(),
            living_count: 0,
        }
    }

    /// Returns the maximum number of live entities.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.signatures.len()
    }

    /// Returns the number of currently live entities.
    #[inline]
    #[must_use]
    pub const fn living_count(&self) -> usize {
        self.living_count
    }

    /// Takes the next free id and marks it live.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityCapacityExceeded`] when every id is live.
    pub fn create(&mut self) -> EcsResult<Entity> {
        let Some(entity) = self.available.pop_front() else {
            tracing::warn!(capacity = self.capacity(), "entity capacity reached");
            return Err(EcsError::EntityCapacityExceeded {
                capacity: self.capacity(),
            });
        };

        self.alive[entity.index()] = true;
        self.living_count += 1;
        tracing::trace!(%entity, living = self.living_count, "entity created");

        Ok(entity)
    }

    /// Clears the entity's signature and returns its id to the free pool.
    ///
    /// Component data and system membership are not touched here.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfRange`] for an id beyond capacity,
    /// [`EcsError::EntityNotAlive`] for an id that is already free.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        self.ensure_alive(entity)?;

        let idx = entity.index();
        self.signatures[idx].reset();
        self.alive[idx] = false;
        self.available.push_back(entity);
        self.living_count -= 1;
        tracing::trace!(%entity, living = self.living_count, "entity destroyed");

        Ok(())
    }

    /// Overwrites the entity's signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfRange`] for an id beyond capacity.
    pub fn set_signature(&mut self, entity: Entity, signature: Signature) -> EcsResult<()> {
        let idx = self.check_range(entity)?;
        self.signatures[idx] = signature;
        Ok(())
    }

    /// Returns the entity's signature.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfRange`] for an id beyond capacity.
    pub fn signature(&self, entity: Entity) -> EcsResult<Signature> {
        let idx = self.check_range(entity)?;
        Ok(self.signatures[idx])
    }

    /// Checks whether the id is currently live. Out-of-range ids are not.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Fails unless the id is in range and live.
    ///
    /// # Errors
    ///
    /// [`EcsError::EntityOutOfRange`] or [`EcsError::EntityNotAlive`].
    pub fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        let idx = self.check_range(entity)?;
        if self.alive[idx] {
            Ok(())
        } else {
            Err(EcsError::EntityNotAlive(entity))
        }
    }

    /// Iterates over every live entity with its signature, in id order.
    pub fn iter_living(&self) -> impl Iterator<Item = (Entity, Signature)> + '_ {
        self.alive
            .iter()
            .zip(self.signatures.iter())
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(idx, (_, signature))| {
                #[allow(clippy::cast_possible_truncation)]
                let entity = Entity(idx as u32);
                (entity, *signature)
            })
    }

    fn check_range(&self, entity: Entity) -> EcsResult<usize> {
        let idx = entity.index();
        if idx < self.capacity() {
            Ok(idx)
        } else {
            Err(EcsError::EntityOutOfRange {
                entity,
                capacity: self.capacity(),
            })
        }
    }
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(MAX_ENTITIES)
    }
}

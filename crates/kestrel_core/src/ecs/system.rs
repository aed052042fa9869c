//! # Systems
//!
//! A system is behavior that runs over every entity whose signature covers
//! the system's required signature.
//!
//! The [`SystemRegistry`] keeps the bookkeeping (required signature and
//! tracked entity set) as plain data next to each system instance. Behavior
//! is dispatched through the [`System`] trait, which receives a
//! [`ComponentView`] to borrow component data for the duration of one run.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};

use super::component::Component;
use super::entity::Entity;
use super::signature::Signature;
use super::storage::ComponentRegistry;
use crate::error::{EcsError, EcsResult};

/// Ordered set of entities tracked by a system.
pub type EntitySet = BTreeSet<Entity>;

/// Upcast to [`Any`], implemented for every `'static` type.
pub trait AsAny: Any {
    /// Upcast.
    fn as_any(&self) -> &dyn Any;
    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behavior unit operating on a set of entities.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct Gravity;
///
/// impl System for Gravity {
///     fn update(&mut self, view: &mut ComponentView<'_>, entities: &EntitySet, dt: f64) -> EcsResult<()> {
///         for &entity in entities {
///             view.get_mut::<Velocity>(entity)?.y -= 9.81 * dt as f32;
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait System: AsAny {
    /// Runs the system once over its tracked entities.
    ///
    /// # Errors
    ///
    /// Any [`EcsError`] raised while accessing component data.
    fn update(
        &mut self,
        view: &mut ComponentView<'_>,
        entities: &EntitySet,
        delta_seconds: f64,
    ) -> EcsResult<()>;

    /// Human-readable name used in errors and logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Component access handed to a running system.
///
/// It can read and write existing components but cannot add or remove any,
/// so no structural change happens while a system iterates its entity set.
pub struct ComponentView<'w> {
    components: &'w mut ComponentRegistry,
}

impl<'w> ComponentView<'w> {
    /// Wraps the component registry.
    pub fn new(components: &'w mut ComponentRegistry) -> Self {
        Self { components }
    }

    /// Gets a component.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] or [`EcsError::ComponentNotRegistered`].
    #[inline]
    pub fn get<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        self.components.get(entity)
    }

    /// Gets a component mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentNotFound`] or [`EcsError::ComponentNotRegistered`].
    #[inline]
    pub fn get_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        self.components.get_mut(entity)
    }

    /// Checks whether the entity has a `C`. Unregistered types are absent.
    #[must_use]
    pub fn has<C: Component>(&self, entity: Entity) -> bool {
        self.components
            .array::<C>()
            .is_ok_and(|array| array.contains(entity))
    }
}

/// One registered system with its bookkeeping.
struct SystemRecord {
    name: &'static str,
    required: Signature,
    entities: EntitySet,
    instance: Box<dyn System>,
}

impl SystemRecord {
    fn reevaluate(&mut self, entity: Entity, signature: Signature) {
        if signature.matches(self.required) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(&entity);
        }
    }
}

/// Owns every registered system and its tracked entity set.
#[derive(Default)]
pub struct SystemRegistry {
    /// Position of each system type in `records`.
    indices: HashMap<TypeId, usize>,
    /// Systems in registration order.
    records: Vec<SystemRecord>,
}

impl SystemRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Checks whether no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stores `instance` as the single system of type `S`.
    ///
    /// The new system starts with the empty required signature and no
    /// tracked entities.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemAlreadyRegistered`] if an `S` is already stored.
    pub fn register<S: System>(&mut self, instance: S) -> EcsResult<&mut S> {
        let type_id = TypeId::of::<S>();
        let name = instance.name();
        if self.indices.contains_key(&type_id) {
            return Err(EcsError::SystemAlreadyRegistered(name));
        }

        self.indices.insert(type_id, self.records.len());
        self.records.push(SystemRecord {
            name,
            required: Signature::EMPTY,
            entities: EntitySet::new(),
            instance: Box::new(instance),
        });
        tracing::debug!(system = name, "system registered");

        self.get_mut::<S>()
    }

    /// Sets the signature an entity needs to be tracked by `S`.
    ///
    /// Tracked sets are not touched; follow with [`refresh`](Self::refresh).
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn set_required_signature<S: System>(&mut self, signature: Signature) -> EcsResult<()> {
        let record = self.record_mut::<S>()?;
        record.required = signature;
        tracing::debug!(system = record.name, %signature, "system signature set");
        Ok(())
    }

    /// Returns the signature required by `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn required_signature<S: System>(&self) -> EcsResult<Signature> {
        Ok(self.record::<S>()?.required)
    }

    /// Returns the entities currently tracked by `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn entities<S: System>(&self) -> EcsResult<&EntitySet> {
        Ok(&self.record::<S>()?.entities)
    }

    /// Returns the `S` instance.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn get<S: System>(&self) -> EcsResult<&S> {
        (*self.record::<S>()?.instance)
            .as_any()
            .downcast_ref::<S>()
            .ok_or_else(Self::not_registered::<S>)
    }

    /// Returns the `S` instance mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn get_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        (*self.record_mut::<S>()?.instance)
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or_else(Self::not_registered::<S>)
    }

    /// Removes `entity` from every tracked set.
    pub fn entity_destroyed(&mut self, entity: Entity) {
        for record in &mut self.records {
            record.entities.remove(&entity);
        }
    }

    /// Re-evaluates `entity` against every system after its signature changed.
    pub fn entity_signature_changed(&mut self, entity: Entity, signature: Signature) {
        for record in &mut self.records {
            record.reevaluate(entity, signature);
        }
    }

    /// Rebuilds the tracked set of `S` from the given live entities.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`] if `S` was never registered.
    pub fn refresh<S, I>(&mut self, living: I) -> EcsResult<()>
    where
        S: System,
        I: IntoIterator<Item = (Entity, Signature)>,
    {
        let record = self.record_mut::<S>()?;
        record.entities.clear();
        for (entity, signature) in living {
            record.reevaluate(entity, signature);
        }
        tracing::debug!(
            system = record.name,
            tracked = record.entities.len(),
            "system membership rebuilt"
        );
        Ok(())
    }

    /// Runs `S` once.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotRegistered`], or whatever the system returns.
    pub fn run<S: System>(
        &mut self,
        components: &mut ComponentRegistry,
        delta_seconds: f64,
    ) -> EcsResult<()> {
        let record = self.record_mut::<S>()?;
        Self::run_record(record, components, delta_seconds)
    }

    /// Runs every system once, in registration order.
    ///
    /// # Errors
    ///
    /// Stops at the first system that fails and returns its error.
    pub fn run_all(
        &mut self,
        components: &mut ComponentRegistry,
        delta_seconds: f64,
    ) -> EcsResult<()> {
        for record in &mut self.records {
            Self::run_record(record, components, delta_seconds)?;
        }
        Ok(())
    }

    /// Names of the registered systems, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.records.iter().map(|record| record.name)
    }

    fn run_record(
        record: &mut SystemRecord,
        components: &mut ComponentRegistry,
        delta_seconds: f64,
    ) -> EcsResult<()> {
        let SystemRecord {
            name,
            entities,
            instance,
            ..
        } = record;
        tracing::trace!(system = *name, entities = entities.len(), "running system");
        instance.update(&mut ComponentView::new(components), entities, delta_seconds)
    }

    fn record<S: System>(&self) -> EcsResult<&SystemRecord> {
        self.indices
            .get(&TypeId::of::<S>())
            .map(|&index| &self.records[index])
            .ok_or_else(Self::not_registered::<S>)
    }

    fn record_mut<S: System>(&mut self) -> EcsResult<&mut SystemRecord> {
        match self.indices.get(&TypeId::of::<S>()) {
            Some(&index) => Ok(&mut self.records[index]),
            None => Err(Self::not_registered::<S>()),
        }
    }

    fn not_registered<S: System>() -> EcsError {
        EcsError::SystemNotRegistered(std::any::type_name::<S>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::signature::ComponentType;
    use crate::error::ErrorKind;

    #[derive(Debug, Default)]
    struct Counter {
        runs: usize,
        seen: Vec<Entity>,
    }

    impl System for Counter {
        fn update(
            &mut self,
            _view: &mut ComponentView<'_>,
            entities: &EntitySet,
            _delta_seconds: f64,
        ) -> EcsResult<()> {
            self.runs += 1;
            self.seen = entities.iter().copied().collect();
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Other;

    impl System for Other {
        fn update(&mut self, _: &mut ComponentView<'_>, _: &EntitySet, _: f64) -> EcsResult<()> {
            Ok(())
        }
    }

    fn bits(indices: &[u8]) -> Signature {
        indices.iter().copied().map(ComponentType::new).collect()
    }

    #[test]
    fn test_register_once() {
        let mut registry = SystemRegistry::new();
        registry.register(Counter::default()).unwrap();

        let err = registry.register(Counter::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRegistration);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_signature_before_register() {
        let mut registry = SystemRegistry::new();
        let err = registry.set_required_signature::<Counter>(bits(&[0])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(registry.entities::<Counter>().is_err());
    }

    #[test]
    fn test_signature_changes_drive_membership() {
        let mut registry = SystemRegistry::new();
        registry.register(Counter::default()).unwrap();
        registry.register(Other).unwrap();
        registry.set_required_signature::<Counter>(bits(&[0, 1])).unwrap();
        registry.set_required_signature::<Other>(bits(&[0])).unwrap();

        let e = Entity::from_raw(9);
        registry.entity_signature_changed(e, bits(&[0]));
        assert!(!registry.entities::<Counter>().unwrap().contains(&e));
        assert!(registry.entities::<Other>().unwrap().contains(&e));

        registry.entity_signature_changed(e, bits(&[0, 1, 4]));
        assert!(registry.entities::<Counter>().unwrap().contains(&e));

        registry.entity_signature_changed(e, bits(&[1]));
        assert!(registry.entities::<Counter>().unwrap().is_empty());
        assert!(registry.entities::<Other>().unwrap().is_empty());
    }

    #[test]
    fn test_entity_destroyed_is_idempotent() {
        let mut registry = SystemRegistry::new();
        registry.register(Counter::default()).unwrap();

        let e = Entity::from_raw(1);
        registry.entity_signature_changed(e, Signature::EMPTY);
        registry.entity_destroyed(e);
        registry.entity_destroyed(e);
        assert!(registry.entities::<Counter>().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_and_run() {
        let mut registry = SystemRegistry::new();
        let mut components = ComponentRegistry::new(8);
        registry.register(Counter::default()).unwrap();
        registry.set_required_signature::<Counter>(bits(&[2])).unwrap();

        let living = vec![
            (Entity::from_raw(0), bits(&[2])),
            (Entity::from_raw(1), bits(&[1])),
            (Entity::from_raw(5), bits(&[1, 2])),
        ];
        registry.refresh::<Counter, _>(living).unwrap();
        registry.run::<Counter>(&mut components, 0.016).unwrap();

        let counter = registry.get::<Counter>().unwrap();
        assert_eq!(counter.runs, 1);
        assert_eq!(counter.seen, vec![Entity::from_raw(0), Entity::from_raw(5)]);
    }

    #[test]
    fn test_view_has() {
        #[derive(Debug)]
        struct Health(u32);
        impl Component for Health {}
        struct Armor;
        impl Component for Armor {}

        let mut components = ComponentRegistry::new(8);
        components.register::<Health>().unwrap();
        components.insert(Entity::from_raw(3), Health(10)).unwrap();

        let mut view = ComponentView::new(&mut components);
        assert!(view.has::<Health>(Entity::from_raw(3)));
        assert!(!view.has::<Health>(Entity::from_raw(4)));
        assert!(!view.has::<Armor>(Entity::from_raw(3)));

        view.get_mut::<Health>(Entity::from_raw(3)).unwrap().0 -= 4;
        assert_eq!(view.get::<Health>(Entity::from_raw(3)).unwrap().0, 6);
    }

    #[test]
    fn test_run_all_in_registration_order() {
        let mut registry = SystemRegistry::new();
        let mut components = ComponentRegistry::new(8);
        registry.register(Other).unwrap();
        registry.register(Counter::default()).unwrap();

        registry.run_all(&mut components, 0.0).unwrap();
        registry.run_all(&mut components, 0.0).unwrap();

        assert_eq!(registry.get::<Counter>().unwrap().runs, 2);
        let names: Vec<&str> = registry.names().collect();
        assert!(names[0].ends_with("Other"));
        assert!(names[1].ends_with("Counter"));
    }
}

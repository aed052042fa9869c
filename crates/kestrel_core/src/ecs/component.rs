//! # Component System
//!
//! Components are pure data containers with no behavior. Their type index is
//! not fixed in the type: it is handed out when the type is registered with a
//! [`Coordinator`](super::Coordinator).

/// Marker trait for ECS components.
///
/// Any owned, `'static` data type can be a component once it opts in.
///
/// # Example
///
/// ```rust
/// use kestrel_core::Component;
///
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Health {
///     current: f32,
///     max: f32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Sized + 'static {
    /// Human-readable name used in errors and logs.
    #[must_use]
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;
    impl Component for Marker {}

    #[test]
    fn test_component_name() {
        assert!(Marker::name().ends_with("Marker"));
    }
}

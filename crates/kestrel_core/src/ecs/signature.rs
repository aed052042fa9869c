//! # Signatures
//!
//! A signature is a fixed-width bitmask with one bit per registered component
//! type. Entities carry the signature of what they have; systems carry the
//! signature of what they need.

use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Maximum number of distinct component types (the signature width).
pub const MAX_COMPONENTS: usize = 32;

/// Index of a registered component type, i.e. its bit in a [`Signature`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ComponentType(u8);

impl ComponentType {
    /// Creates a component type index.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MAX_COMPONENTS`].
    #[inline]
    #[must_use]
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < MAX_COMPONENTS, "component index out of range");
        Self(index)
    }

    /// Returns the bit index.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Component-presence bitmask.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Signature(u32);

impl Signature {
    /// The empty signature. As a requirement it matches every entity.
    pub const EMPTY: Self = Self(0);

    /// Creates a signature from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns the raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns a copy with the bit for `component` set.
    #[inline]
    #[must_use]
    pub const fn with(self, component: ComponentType) -> Self {
        Self(self.0 | (1 << component.0))
    }

    /// Returns a copy with the bit for `component` cleared.
    #[inline]
    #[must_use]
    pub const fn without(self, component: ComponentType) -> Self {
        Self(self.0 & !(1 << component.0))
    }

    /// Sets or clears the bit for `component`.
    #[inline]
    pub fn set(&mut self, component: ComponentType, present: bool) {
        *self = if present {
            self.with(component)
        } else {
            self.without(component)
        };
    }

    /// Checks whether the bit for `component` is set.
    #[inline]
    #[must_use]
    pub const fn contains(self, component: ComponentType) -> bool {
        self.0 & (1 << component.0) != 0
    }

    /// Checks whether this signature has every bit of `required`.
    ///
    /// This is the system membership test: `(self & required) == required`.
    #[inline]
    #[must_use]
    pub const fn matches(self, required: Self) -> bool {
        self.0 & required.0 == required.0
    }

    /// Checks whether no bit is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of set bits.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Clears every bit.
    #[inline]
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Iterates over the set component types in ascending order.
    pub fn iter(self) -> impl Iterator<Item = ComponentType> {
        #[allow(clippy::cast_possible_truncation)]
        let width = MAX_COMPONENTS as u8;
        (0..width)
            .map(ComponentType)
            .filter(move |&component| self.contains(component))
    }
}

impl FromIterator<ComponentType> for Signature {
    fn from_iter<I: IntoIterator<Item = ComponentType>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl BitAnd for Signature {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#034b})", self.0)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}

//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Articles and sellers are both entities: an article keeps its key while its
/// sale state changes, a seller keeps its number across re-imports.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

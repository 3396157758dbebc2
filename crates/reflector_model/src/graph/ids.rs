//! Arena handles.
//!
//! Handles are plain indices into the arenas owned by
//! [`TypeGraph`](super::TypeGraph) and the session's unit table. They are
//! only minted by those owners, so indexing with them never goes out of
//! bounds within one session.

use std::fmt;

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(u32);

        impl $name {
            /// Wraps an arena index.
            #[must_use]
            pub const fn from_index(index: u32) -> Self {
                Self(index)
            }

            /// The arena index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

handle!(
    /// Handle to a [`TypeNode`](super::TypeNode).
    TypeId,
    "TypeId"
);

handle!(
    /// Handle to a [`Scope`](super::Scope).
    ScopeId,
    "ScopeId"
);

handle!(
    /// Handle to a [`SourceUnit`](crate::SourceUnit).
    UnitId,
    "UnitId"
);

/// Converts an arena length into the next handle index.
pub(crate) fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_round_trip_their_index() {
        let id = TypeId::from_index(7);
        assert_eq!(id.index(), 7);
        assert_eq!(format!("{id:?}"), "TypeId(7)");
        assert_ne!(TypeId::from_index(1), TypeId::from_index(2));
    }
}

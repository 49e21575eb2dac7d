//! Type-safe identifier wrappers around `i64`.
//!
//! Every persisted entity has a store-assigned bigint surrogate key. The
//! raw `i64` columns stay on the entity structs so row mapping is direct;
//! these newtypes are used at API seams where mixing identifiers of
//! different entity kinds would be an easy mistake (aggregate result maps,
//! synthesizer bookkeeping).
//!
//! Identifiers are never generated application-side: the store assigns them
//! via `GENERATED ALWAYS AS IDENTITY` on insert.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `i64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Wrap a raw store-assigned identifier.
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Return the inner `i64` value.
            pub const fn into_inner(self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of a [`Population`](crate::entities::Population).
    PopulationId
}

define_id! {
    /// Identifier of a [`Farm`](crate::entities::Farm).
    FarmId
}

define_id! {
    /// Identifier of a [`Year`](crate::entities::Year).
    YearId
}

define_id! {
    /// Identifier of a [`ProductGroup`](crate::entities::ProductGroup).
    ProductGroupId
}

define_id! {
    /// Identifier of a [`Policy`](crate::entities::Policy).
    PolicyId
}

define_id! {
    /// Identifier of a [`FadnProduct`](crate::entities::FadnProduct)
    /// catalog entry.
    FadnProductId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let population = PopulationId::new(7);
        let farm = FarmId::new(7);
        // Same inner value, different types -- the compiler enforces no mixing.
        assert_eq!(population.into_inner(), farm.into_inner());
    }

    #[test]
    fn id_roundtrip_serde() {
        let original = ProductGroupId::new(42);
        let json = serde_json::to_string(&original).ok();
        assert_eq!(json.as_deref(), Some("42"));
        let restored: Result<ProductGroupId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn id_display_matches_inner() {
        let id = PolicyId::new(-3);
        assert_eq!(id.to_string(), "-3");
    }
}

//! Enumeration types for the Agridata entity model.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Product type
// ---------------------------------------------------------------------------

/// The model-level category of a [`ProductGroup`](crate::entities::ProductGroup).
///
/// Productions must reference a group of the matching category: an
/// agricultural production row only ever points at an `Agricultural` group,
/// a livestock production row only at a `Livestock` group.
///
/// Stored as the `product_type` `PostgreSQL` enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "product_type", rename_all = "lowercase")]
pub enum ProductType {
    /// Crop production (cereals, vegetables, permanent crops, ...).
    Agricultural,
    /// Animal production (dairy, beef, sheep, ...).
    Livestock,
}

impl ProductType {
    /// Stable lowercase name, matching the `PostgreSQL` enum label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agricultural => "agricultural",
            Self::Livestock => "livestock",
        }
    }
}

impl core::fmt::Display for ProductType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_type_labels_are_lowercase() {
        assert_eq!(ProductType::Agricultural.as_str(), "agricultural");
        assert_eq!(ProductType::Livestock.as_str(), "livestock");
        assert_eq!(ProductType::Livestock.to_string(), "livestock");
    }
}

//! FADN reference catalog initialization.
//!
//! The Farm Accountancy Data Network catalog is global reference data
//! (unique per identifier, not population-scoped). Initialization is
//! idempotent: identifiers already in the store are skipped.

use std::collections::HashSet;

use agridata_db::{NaturalKey, PgStore, Query, Repository};
use agridata_types::FadnProduct;
use tracing::info;

use crate::error::BootstrapError;
use crate::synthesizer::dedup_by_key;

/// The FADN product identifiers the platform cross-references.
pub const FADN_CATALOG: &[(&str, &str)] = &[
    ("CWHTC", "Common wheat"),
    ("DWHTC", "Durum wheat"),
    ("BARL", "Barley"),
    ("OATS", "Oats"),
    ("MAIZ", "Grain maize"),
    ("PARI", "Rice"),
    ("PULS", "Protein crops"),
    ("POTA", "Potatoes"),
    ("SUGB", "Sugar beet"),
    ("SUNF", "Sunflower"),
    ("RAPE", "Rape and turnip rape"),
    ("SOYA", "Soya"),
    ("OLIVGR", "Olive groves"),
    ("VINEY", "Vineyards"),
    ("CITR", "Citrus fruit"),
    ("MILK", "Cows' milk"),
    ("BEEF", "Beef and veal"),
    ("PORK", "Pigmeat"),
    ("MUTM", "Sheep and goat meat"),
    ("POUL", "Poultry meat"),
    ("EGGS", "Eggs"),
    ("WOOL", "Wool"),
];

/// Insert every missing catalog entry and return the number inserted.
///
/// Safe to call on every startup; existing identifiers are left untouched.
///
/// # Errors
///
/// Returns [`BootstrapError`] if the existing catalog cannot be read or
/// the insert fails.
pub async fn ensure_fadn_catalog(store: &PgStore) -> Result<usize, BootstrapError> {
    let repo = Repository::<FadnProduct>::new(store.clone());
    let existing: HashSet<String> = repo
        .get_all(&Query::new())
        .await?
        .iter()
        .map(NaturalKey::natural_key)
        .collect();

    let candidates: Vec<FadnProduct> = FADN_CATALOG
        .iter()
        .map(|(identifier, name)| FadnProduct {
            id: 0,
            fadn_identifier: (*identifier).to_owned(),
            product_name: (*name).to_owned(),
        })
        .collect();
    let mut fresh = dedup_by_key(candidates, &existing, FadnProduct::natural_key);
    if fresh.is_empty() {
        return Ok(0);
    }

    repo.add_range(&mut fresh, 0).await?;
    info!(inserted = fresh.len(), "FADN catalog entries inserted");
    Ok(fresh.len())
}

//! Core domain entities for the Agridata relational graph.
//!
//! Each struct maps one-to-one onto a table in `PostgreSQL` (`id` is the
//! identity primary key, `_id`-suffixed fields are foreign keys). Fields
//! annotated `#[sqlx(skip)]` are in-memory-only parent back-references:
//! they stay `None` unless the caller asked the repository to eager-load
//! the relation, and are never serialized or persisted.
//!
//! Natural keys (the composite field sets that must be unique per entity
//! kind) are documented on each struct and enforced by unique indexes in
//! the store.

use serde::{Deserialize, Serialize};

use crate::enums::ProductType;

// ---------------------------------------------------------------------------
// Root aggregate
// ---------------------------------------------------------------------------

/// Root dataset grouping a cohort of farms, years, product groups and
/// policies for one simulation universe.
///
/// Deleting a population cascades to every descendant record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Population {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Human-readable description of the dataset.
    pub description: String,
}

/// A calendar year tracked within a population.
///
/// Natural key: `(year_number, population_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Year {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The calendar year number (e.g. `2023`).
    pub year_number: i64,
    /// Owning population.
    pub population_id: i64,
    /// Non-owning back-reference to the owning population.
    #[sqlx(skip)]
    #[serde(skip)]
    pub population: Option<Box<Population>>,
}

/// An individual agricultural holding.
///
/// Natural keys: `(farm_code, population_id)` and
/// `(farm_code, population_id, region_level_3)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Farm {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Source-dataset farm code, unique within a population.
    pub farm_code: String,
    /// Latitude of the holding, decimal degrees.
    pub latitude: f64,
    /// Longitude of the holding, decimal degrees.
    pub longitude: f64,
    /// Altitude of the holding, metres above sea level.
    pub altitude: f64,
    /// NUTS level 1 region code.
    pub region_level_1: String,
    /// NUTS level 2 region code.
    pub region_level_2: String,
    /// NUTS level 3 region code.
    pub region_level_3: String,
    /// Technical-economic orientation classification code.
    pub technical_economic_orientation: i64,
    /// Owning population.
    pub population_id: i64,
    /// Non-owning back-reference to the owning population.
    #[sqlx(skip)]
    #[serde(skip)]
    pub population: Option<Box<Population>>,
}

// ---------------------------------------------------------------------------
// Product and policy definitions
// ---------------------------------------------------------------------------

/// A model-level category bucketing related agricultural or livestock
/// products.
///
/// Natural key: `(name, population_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductGroup {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Group name, unique within a population.
    pub name: String,
    /// Whether this group buckets agricultural or livestock products.
    pub product_type: ProductType,
    /// Name of the group in the originating data source.
    pub original_name_datasource: String,
    /// Model-specific category tags (stored as a `TEXT[]` column).
    pub model_specific_categories: Vec<String>,
    /// Owning population.
    pub population_id: i64,
    /// Non-owning back-reference to the owning population.
    #[sqlx(skip)]
    #[serde(skip)]
    pub population: Option<Box<Population>>,
}

/// An agricultural policy instrument (subsidy scheme).
///
/// Natural key: `(population_id, policy_identifier)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Policy {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Short policy identifier (e.g. `"BPS"`), unique within a population.
    pub policy_identifier: String,
    /// Whether the payment is coupled to production.
    pub is_coupled: bool,
    /// Human-readable description of the instrument.
    pub policy_description: String,
    /// Economic compensation per eligible unit, in currency units.
    pub economic_compensation: f64,
    /// First year number the policy applies to.
    pub start_year_number: i64,
    /// Last year number the policy applies to.
    pub end_year_number: i64,
    /// Owning population.
    pub population_id: i64,
    /// Non-owning back-reference to the owning population.
    #[sqlx(skip)]
    #[serde(skip)]
    pub population: Option<Box<Population>>,
}

/// Join entity linking a policy to a product group it compensates.
///
/// Natural key: `(product_group_id, policy_id, population_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PolicyGroupRelation {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The compensated product group.
    pub product_group_id: i64,
    /// The compensating policy.
    pub policy_id: i64,
    /// Owning population.
    pub population_id: i64,
    /// Compensation attributed to this (group, policy) pair.
    pub economic_compensation: f64,
    /// Non-owning back-reference to the product group.
    #[sqlx(skip)]
    #[serde(skip)]
    pub product_group: Option<Box<ProductGroup>>,
    /// Non-owning back-reference to the policy.
    #[sqlx(skip)]
    #[serde(skip)]
    pub policy: Option<Box<Policy>>,
}

/// An entry of the FADN (Farm Accountancy Data Network) product catalog.
///
/// The catalog is global: it is not scoped to any population.
/// Natural key: `fadn_identifier`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FadnProduct {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Globally unique FADN product identifier.
    pub fadn_identifier: String,
    /// FADN product name.
    pub product_name: String,
}

/// Join entity cross-referencing a product group with a FADN catalog entry.
///
/// Natural key: `(product_group_id, fadn_product_id, population_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FadnProductRelation {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The model product group.
    pub product_group_id: i64,
    /// The referenced FADN catalog entry.
    pub fadn_product_id: i64,
    /// Owning population.
    pub population_id: i64,
    /// Share of the group's occurrence represented by this FADN product.
    pub representativeness: f64,
    /// Non-owning back-reference to the product group.
    #[sqlx(skip)]
    #[serde(skip)]
    pub product_group: Option<Box<ProductGroup>>,
    /// Non-owning back-reference to the FADN catalog entry.
    #[sqlx(skip)]
    #[serde(skip)]
    pub fadn_product: Option<Box<FadnProduct>>,
}

// ---------------------------------------------------------------------------
// Production records
// ---------------------------------------------------------------------------

/// Crop production of one farm for one product group in one year.
///
/// Natural key: `(farm_id, product_group_id, year_id)`. The referenced
/// product group must be [`ProductType::Agricultural`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgriculturalProduction {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Producing farm.
    pub farm_id: i64,
    /// Produced product group (agricultural-typed).
    pub product_group_id: i64,
    /// Production year.
    pub year_id: i64,
    /// Cultivated area, hectares.
    pub cultivated_area: f64,
    /// Irrigated share of the cultivated area, hectares.
    pub irrigated_area: f64,
    /// Harvested quantity, tonnes.
    pub crop_production: f64,
    /// Quantity sold, tonnes.
    pub quantity_sold: f64,
    /// Value of sold production, currency units.
    pub value_sold: f64,
    /// Variable production costs, currency units.
    pub variable_costs: f64,
    /// Unit sell price, currency units per tonne.
    pub sell_price: f64,
    /// Non-owning back-reference to the producing farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
    /// Non-owning back-reference to the product group.
    #[sqlx(skip)]
    #[serde(skip)]
    pub product_group: Option<Box<ProductGroup>>,
    /// Non-owning back-reference to the production year.
    #[sqlx(skip)]
    #[serde(skip)]
    pub year: Option<Box<Year>>,
}

/// Animal production of one farm for one product group in one year.
///
/// Natural key: `(farm_id, product_group_id, year_id)`. The referenced
/// product group must be [`ProductType::Livestock`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LivestockProduction {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Producing farm.
    pub farm_id: i64,
    /// Produced product group (livestock-typed).
    pub product_group_id: i64,
    /// Production year.
    pub year_id: i64,
    /// Average number of animals held over the year.
    pub number_of_animals: f64,
    /// Number of animals sold over the year.
    pub number_of_animals_sold: f64,
    /// Total milk production, tonnes.
    pub milk_total_production: f64,
    /// Value of sold production, currency units.
    pub value_sold: f64,
    /// Variable production costs, currency units.
    pub variable_costs: f64,
    /// Unit sell price, currency units per head.
    pub sell_price: f64,
    /// Non-owning back-reference to the producing farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
    /// Non-owning back-reference to the product group.
    #[sqlx(skip)]
    #[serde(skip)]
    pub product_group: Option<Box<ProductGroup>>,
    /// Non-owning back-reference to the production year.
    #[sqlx(skip)]
    #[serde(skip)]
    pub year: Option<Box<Year>>,
}

// ---------------------------------------------------------------------------
// Per-(farm, year) records
// ---------------------------------------------------------------------------

/// Demographic data of a farm's holder for one year.
///
/// Natural key: `(farm_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct HolderFarmYearData {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The farm whose holder is described.
    pub farm_id: i64,
    /// The year the record refers to.
    pub year_id: i64,
    /// Age of the holder, years.
    pub holder_age: i64,
    /// Number of family members working on the holding.
    pub holder_family_members: i64,
    /// Number of potential successors.
    pub holder_successors: i64,
    /// Age of the eldest potential successor, years.
    pub holder_successors_age: i64,
    /// Gender of the holder, source-dataset coding.
    pub holder_gender: String,
    /// Non-owning back-reference to the farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
    /// Non-owning back-reference to the year.
    #[sqlx(skip)]
    #[serde(skip)]
    pub year: Option<Box<Year>>,
}

/// Closing balance-sheet values of one farm at the end of one year.
///
/// Natural key: `(farm_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClosingValFarmValue {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The farm the closing values belong to.
    pub farm_id: i64,
    /// The closing year.
    pub year_id: i64,
    /// Owned agricultural land area, hectares.
    pub agricultural_land_area: f64,
    /// Value of owned agricultural land, currency units.
    pub agricultural_land_value: f64,
    /// Total current assets, currency units.
    pub total_current_assets: f64,
    /// Outstanding long and medium term loans, currency units.
    pub long_and_medium_term_loans: f64,
    /// Non-owning back-reference to the farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
    /// Non-owning back-reference to the year.
    #[sqlx(skip)]
    #[serde(skip)]
    pub year: Option<Box<Year>>,
}

/// Greening-obligation surface of one farm for one year.
///
/// Natural key: `(farm_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct GreeningFarmYearData {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The farm the greening surface belongs to.
    pub farm_id: i64,
    /// The year the record refers to.
    pub year_id: i64,
    /// Surface under greening obligations, hectares.
    pub greening_surface: f64,
    /// Non-owning back-reference to the farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
}

/// Agro-management decision values of one farm for one year.
///
/// Natural key: `(farm_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AgroManagementDecision {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The deciding farm.
    pub farm_id: i64,
    /// The decision year.
    pub year_id: i64,
    /// Agricultural land managed after the decision, hectares.
    pub agricultural_land: f64,
    /// Average price per hectare assumed in the decision, currency units.
    pub average_ha_price: f64,
    /// Total current assets at decision time, currency units.
    pub total_current_assets: f64,
    /// Outstanding long and medium term loans, currency units.
    pub long_and_medium_term_loans: f64,
    /// Non-owning back-reference to the farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
}

/// Subsidy received by one farm in one year under one policy.
///
/// Natural key: `(farm_id, year_id, policy_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FarmYearSubsidy {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The receiving farm.
    pub farm_id: i64,
    /// The subsidy year.
    pub year_id: i64,
    /// The granting policy.
    pub policy_id: i64,
    /// Subsidy amount, currency units.
    pub value: f64,
    /// Non-owning back-reference to the farm.
    #[sqlx(skip)]
    #[serde(skip)]
    pub farm: Option<Box<Farm>>,
    /// Non-owning back-reference to the policy.
    #[sqlx(skip)]
    #[serde(skip)]
    pub policy: Option<Box<Policy>>,
}

// ---------------------------------------------------------------------------
// Land market records
// ---------------------------------------------------------------------------

/// A land rent agreement between two farms for one year.
///
/// Natural key: `(origin_farm_id, destination_farm_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LandRent {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// Farm renting the land out.
    pub origin_farm_id: i64,
    /// Farm renting the land in.
    pub destination_farm_id: i64,
    /// The rent year.
    pub year_id: i64,
    /// Rented area, hectares.
    pub rent_area: f64,
    /// Total yearly rent, currency units.
    pub rent_value: f64,
}

/// A land sale tied to an agricultural production record.
///
/// Natural key: `(destination_farm_id, production_id, year_id)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct LandTransaction {
    /// Store-assigned surrogate identifier (`0` until persisted).
    pub id: i64,
    /// The agricultural production whose land changes hands.
    pub production_id: i64,
    /// The acquiring farm.
    pub destination_farm_id: i64,
    /// The transaction year.
    pub year_id: i64,
    /// Percentage of the production's land transferred, 0 to 100.
    pub percentage: f64,
    /// Sale price, currency units.
    pub sale_price: f64,
}

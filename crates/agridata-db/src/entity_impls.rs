//! [`Entity`] and [`NaturalKey`] implementations for the whole entity
//! graph, plus the declared relation names.
//!
//! Column lists here must match the migration schema exactly; the
//! repository builds every statement from them.

use agridata_types::{
    AgriculturalProduction, AgroManagementDecision, ClosingValFarmValue, FadnProduct,
    FadnProductRelation, Farm, FarmYearSubsidy, GreeningFarmYearData, HolderFarmYearData,
    LandRent, LandTransaction, LivestockProduction, LogMessage, Policy, PolicyGroupRelation,
    Population, ProductGroup, SimulationRun, SimulationScenario, SyntheticPopulation, Year,
};
use sqlx::PgPool;

use crate::entity::{attach_parent, Entity, NaturalKey};
use crate::error::DbError;
use crate::query::Filter;
use crate::value::SqlValue;

/// Declared relation names accepted by `Query::include`.
pub mod relations {
    /// Back-reference to the owning population.
    pub const POPULATION: &str = "population";
    /// Back-reference to a farm.
    pub const FARM: &str = "farm";
    /// Back-reference to a year.
    pub const YEAR: &str = "year";
    /// Back-reference to a product group.
    pub const PRODUCT_GROUP: &str = "product_group";
    /// Back-reference to a policy.
    pub const POLICY: &str = "policy";
    /// Back-reference to a FADN catalog entry.
    pub const FADN_PRODUCT: &str = "fadn_product";
    /// Back-reference to a simulation scenario.
    pub const SCENARIO: &str = "scenario";
}

fn unknown_relation<T: Entity>(relation: &str) -> DbError {
    DbError::UnknownRelation {
        table: T::TABLE,
        relation: relation.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Root aggregate
// ---------------------------------------------------------------------------

impl Entity for Population {
    const TABLE: &'static str = "populations";
    const INSERT_COLUMNS: &'static [&'static str] = &["description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![SqlValue::Text(self.description.clone())]
    }
}

impl Entity for Year {
    const TABLE: &'static str = "years";
    const INSERT_COLUMNS: &'static [&'static str] = &["year_number", "population_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.year_number),
            SqlValue::BigInt(self.population_id),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::POPULATION => {
                attach_parent::<_, Population>(
                    pool,
                    rows,
                    |row| row.population_id,
                    |row, parent| row.population = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for Year {
    type Key = (i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.year_number, self.population_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("year_number", key.0).and(Filter::eq("population_id", key.1))
    }
}

impl Entity for Farm {
    const TABLE: &'static str = "farms";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_code",
        "latitude",
        "longitude",
        "altitude",
        "region_level_1",
        "region_level_2",
        "region_level_3",
        "technical_economic_orientation",
        "population_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.farm_code.clone()),
            SqlValue::Double(self.latitude),
            SqlValue::Double(self.longitude),
            SqlValue::Double(self.altitude),
            SqlValue::Text(self.region_level_1.clone()),
            SqlValue::Text(self.region_level_2.clone()),
            SqlValue::Text(self.region_level_3.clone()),
            SqlValue::BigInt(self.technical_economic_orientation),
            SqlValue::BigInt(self.population_id),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::POPULATION => {
                attach_parent::<_, Population>(
                    pool,
                    rows,
                    |row| row.population_id,
                    |row, parent| row.population = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for Farm {
    type Key = (String, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_code.clone(), self.population_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_code", key.0.as_str()).and(Filter::eq("population_id", key.1))
    }
}

// ---------------------------------------------------------------------------
// Product and policy definitions
// ---------------------------------------------------------------------------

impl Entity for ProductGroup {
    const TABLE: &'static str = "product_groups";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "name",
        "product_type",
        "original_name_datasource",
        "model_specific_categories",
        "population_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.name.clone()),
            SqlValue::ProductType(self.product_type),
            SqlValue::Text(self.original_name_datasource.clone()),
            SqlValue::TextArray(self.model_specific_categories.clone()),
            SqlValue::BigInt(self.population_id),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::POPULATION => {
                attach_parent::<_, Population>(
                    pool,
                    rows,
                    |row| row.population_id,
                    |row, parent| row.population = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for ProductGroup {
    type Key = (String, i64);

    fn natural_key(&self) -> Self::Key {
        (self.name.clone(), self.population_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("name", key.0.as_str()).and(Filter::eq("population_id", key.1))
    }
}

impl Entity for Policy {
    const TABLE: &'static str = "policies";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "policy_identifier",
        "is_coupled",
        "policy_description",
        "economic_compensation",
        "start_year_number",
        "end_year_number",
        "population_id",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.policy_identifier.clone()),
            SqlValue::Bool(self.is_coupled),
            SqlValue::Text(self.policy_description.clone()),
            SqlValue::Double(self.economic_compensation),
            SqlValue::BigInt(self.start_year_number),
            SqlValue::BigInt(self.end_year_number),
            SqlValue::BigInt(self.population_id),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::POPULATION => {
                attach_parent::<_, Population>(
                    pool,
                    rows,
                    |row| row.population_id,
                    |row, parent| row.population = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for Policy {
    type Key = (i64, String);

    fn natural_key(&self) -> Self::Key {
        (self.population_id, self.policy_identifier.clone())
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("population_id", key.0).and(Filter::eq("policy_identifier", key.1.as_str()))
    }
}

impl Entity for PolicyGroupRelation {
    const TABLE: &'static str = "policy_group_relations";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "product_group_id",
        "policy_id",
        "population_id",
        "economic_compensation",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.product_group_id),
            SqlValue::BigInt(self.policy_id),
            SqlValue::BigInt(self.population_id),
            SqlValue::Double(self.economic_compensation),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::PRODUCT_GROUP => {
                attach_parent::<_, ProductGroup>(
                    pool,
                    rows,
                    |row| row.product_group_id,
                    |row, parent| row.product_group = Some(Box::new(parent)),
                )
                .await
            }
            relations::POLICY => {
                attach_parent::<_, Policy>(
                    pool,
                    rows,
                    |row| row.policy_id,
                    |row, parent| row.policy = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for PolicyGroupRelation {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.product_group_id, self.policy_id, self.population_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("product_group_id", key.0)
            .and(Filter::eq("policy_id", key.1))
            .and(Filter::eq("population_id", key.2))
    }
}

impl Entity for FadnProduct {
    const TABLE: &'static str = "fadn_products";
    const INSERT_COLUMNS: &'static [&'static str] = &["fadn_identifier", "product_name"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::Text(self.fadn_identifier.clone()),
            SqlValue::Text(self.product_name.clone()),
        ]
    }
}

impl NaturalKey for FadnProduct {
    type Key = String;

    fn natural_key(&self) -> Self::Key {
        self.fadn_identifier.clone()
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("fadn_identifier", key.as_str())
    }
}

impl Entity for FadnProductRelation {
    const TABLE: &'static str = "fadn_product_relations";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "product_group_id",
        "fadn_product_id",
        "population_id",
        "representativeness",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.product_group_id),
            SqlValue::BigInt(self.fadn_product_id),
            SqlValue::BigInt(self.population_id),
            SqlValue::Double(self.representativeness),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::PRODUCT_GROUP => {
                attach_parent::<_, ProductGroup>(
                    pool,
                    rows,
                    |row| row.product_group_id,
                    |row, parent| row.product_group = Some(Box::new(parent)),
                )
                .await
            }
            relations::FADN_PRODUCT => {
                attach_parent::<_, FadnProduct>(
                    pool,
                    rows,
                    |row| row.fadn_product_id,
                    |row, parent| row.fadn_product = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for FadnProductRelation {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.product_group_id, self.fadn_product_id, self.population_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("product_group_id", key.0)
            .and(Filter::eq("fadn_product_id", key.1))
            .and(Filter::eq("population_id", key.2))
    }
}

// ---------------------------------------------------------------------------
// Production records
// ---------------------------------------------------------------------------

impl Entity for AgriculturalProduction {
    const TABLE: &'static str = "agricultural_productions";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_id",
        "product_group_id",
        "year_id",
        "cultivated_area",
        "irrigated_area",
        "crop_production",
        "quantity_sold",
        "value_sold",
        "variable_costs",
        "sell_price",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.product_group_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.cultivated_area),
            SqlValue::Double(self.irrigated_area),
            SqlValue::Double(self.crop_production),
            SqlValue::Double(self.quantity_sold),
            SqlValue::Double(self.value_sold),
            SqlValue::Double(self.variable_costs),
            SqlValue::Double(self.sell_price),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            relations::PRODUCT_GROUP => {
                attach_parent::<_, ProductGroup>(
                    pool,
                    rows,
                    |row| row.product_group_id,
                    |row, parent| row.product_group = Some(Box::new(parent)),
                )
                .await
            }
            relations::YEAR => {
                attach_parent::<_, Year>(
                    pool,
                    rows,
                    |row| row.year_id,
                    |row, parent| row.year = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for AgriculturalProduction {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.product_group_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0)
            .and(Filter::eq("product_group_id", key.1))
            .and(Filter::eq("year_id", key.2))
    }
}

impl Entity for LivestockProduction {
    const TABLE: &'static str = "livestock_productions";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_id",
        "product_group_id",
        "year_id",
        "number_of_animals",
        "number_of_animals_sold",
        "milk_total_production",
        "value_sold",
        "variable_costs",
        "sell_price",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.product_group_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.number_of_animals),
            SqlValue::Double(self.number_of_animals_sold),
            SqlValue::Double(self.milk_total_production),
            SqlValue::Double(self.value_sold),
            SqlValue::Double(self.variable_costs),
            SqlValue::Double(self.sell_price),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            relations::PRODUCT_GROUP => {
                attach_parent::<_, ProductGroup>(
                    pool,
                    rows,
                    |row| row.product_group_id,
                    |row, parent| row.product_group = Some(Box::new(parent)),
                )
                .await
            }
            relations::YEAR => {
                attach_parent::<_, Year>(
                    pool,
                    rows,
                    |row| row.year_id,
                    |row, parent| row.year = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for LivestockProduction {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.product_group_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0)
            .and(Filter::eq("product_group_id", key.1))
            .and(Filter::eq("year_id", key.2))
    }
}

// ---------------------------------------------------------------------------
// Per-(farm, year) records
// ---------------------------------------------------------------------------

impl Entity for HolderFarmYearData {
    const TABLE: &'static str = "holder_farm_year_data";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_id",
        "year_id",
        "holder_age",
        "holder_family_members",
        "holder_successors",
        "holder_successors_age",
        "holder_gender",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::BigInt(self.holder_age),
            SqlValue::BigInt(self.holder_family_members),
            SqlValue::BigInt(self.holder_successors),
            SqlValue::BigInt(self.holder_successors_age),
            SqlValue::Text(self.holder_gender.clone()),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            relations::YEAR => {
                attach_parent::<_, Year>(
                    pool,
                    rows,
                    |row| row.year_id,
                    |row, parent| row.year = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for HolderFarmYearData {
    type Key = (i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0).and(Filter::eq("year_id", key.1))
    }
}

impl Entity for ClosingValFarmValue {
    const TABLE: &'static str = "closing_val_farm_values";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_id",
        "year_id",
        "agricultural_land_area",
        "agricultural_land_value",
        "total_current_assets",
        "long_and_medium_term_loans",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.agricultural_land_area),
            SqlValue::Double(self.agricultural_land_value),
            SqlValue::Double(self.total_current_assets),
            SqlValue::Double(self.long_and_medium_term_loans),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            relations::YEAR => {
                attach_parent::<_, Year>(
                    pool,
                    rows,
                    |row| row.year_id,
                    |row, parent| row.year = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for ClosingValFarmValue {
    type Key = (i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0).and(Filter::eq("year_id", key.1))
    }
}

impl Entity for GreeningFarmYearData {
    const TABLE: &'static str = "greening_farm_year_data";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["farm_id", "year_id", "greening_surface"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.greening_surface),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for GreeningFarmYearData {
    type Key = (i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0).and(Filter::eq("year_id", key.1))
    }
}

impl Entity for AgroManagementDecision {
    const TABLE: &'static str = "agro_management_decisions";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "farm_id",
        "year_id",
        "agricultural_land",
        "average_ha_price",
        "total_current_assets",
        "long_and_medium_term_loans",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.agricultural_land),
            SqlValue::Double(self.average_ha_price),
            SqlValue::Double(self.total_current_assets),
            SqlValue::Double(self.long_and_medium_term_loans),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for AgroManagementDecision {
    type Key = (i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0).and(Filter::eq("year_id", key.1))
    }
}

impl Entity for FarmYearSubsidy {
    const TABLE: &'static str = "farm_year_subsidies";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["farm_id", "year_id", "policy_id", "value"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::BigInt(self.policy_id),
            SqlValue::Double(self.value),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::FARM => {
                attach_parent::<_, Farm>(
                    pool,
                    rows,
                    |row| row.farm_id,
                    |row, parent| row.farm = Some(Box::new(parent)),
                )
                .await
            }
            relations::POLICY => {
                attach_parent::<_, Policy>(
                    pool,
                    rows,
                    |row| row.policy_id,
                    |row, parent| row.policy = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl NaturalKey for FarmYearSubsidy {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.farm_id, self.year_id, self.policy_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("farm_id", key.0)
            .and(Filter::eq("year_id", key.1))
            .and(Filter::eq("policy_id", key.2))
    }
}

// ---------------------------------------------------------------------------
// Land market records
// ---------------------------------------------------------------------------

impl Entity for LandRent {
    const TABLE: &'static str = "land_rents";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "origin_farm_id",
        "destination_farm_id",
        "year_id",
        "rent_area",
        "rent_value",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.origin_farm_id),
            SqlValue::BigInt(self.destination_farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.rent_area),
            SqlValue::Double(self.rent_value),
        ]
    }
}

impl NaturalKey for LandRent {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.origin_farm_id, self.destination_farm_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("origin_farm_id", key.0)
            .and(Filter::eq("destination_farm_id", key.1))
            .and(Filter::eq("year_id", key.2))
    }
}

impl Entity for LandTransaction {
    const TABLE: &'static str = "land_transactions";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "production_id",
        "destination_farm_id",
        "year_id",
        "percentage",
        "sale_price",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.production_id),
            SqlValue::BigInt(self.destination_farm_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Double(self.percentage),
            SqlValue::Double(self.sale_price),
        ]
    }
}

impl NaturalKey for LandTransaction {
    type Key = (i64, i64, i64);

    fn natural_key(&self) -> Self::Key {
        (self.destination_farm_id, self.production_id, self.year_id)
    }

    fn key_filter(key: &Self::Key) -> Filter {
        Filter::eq("destination_farm_id", key.0)
            .and(Filter::eq("production_id", key.1))
            .and(Filter::eq("year_id", key.2))
    }
}

// ---------------------------------------------------------------------------
// Simulation scaffolding
// ---------------------------------------------------------------------------

impl Entity for SimulationScenario {
    const TABLE: &'static str = "simulation_scenarios";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "population_id",
        "year_id",
        "short_description",
        "additional_policies",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.population_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Text(self.short_description.clone()),
            SqlValue::Json(self.additional_policies.clone()),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::POPULATION => {
                attach_parent::<_, Population>(
                    pool,
                    rows,
                    |row| row.population_id,
                    |row, parent| row.population = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl Entity for SimulationRun {
    const TABLE: &'static str = "simulation_runs";
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "scenario_id",
        "overall_status",
        "current_stage",
        "current_year_number",
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.scenario_id),
            SqlValue::Text(self.overall_status.clone()),
            SqlValue::Text(self.current_stage.clone()),
            SqlValue::BigInt(self.current_year_number),
        ]
    }

    async fn load_related(
        pool: &PgPool,
        relation: &str,
        rows: &mut [Self],
    ) -> Result<(), DbError> {
        match relation {
            relations::SCENARIO => {
                attach_parent::<_, SimulationScenario>(
                    pool,
                    rows,
                    |row| row.scenario_id,
                    |row, parent| row.scenario = Some(Box::new(parent)),
                )
                .await
            }
            _ => Err(unknown_relation::<Self>(relation)),
        }
    }
}

impl Entity for LogMessage {
    const TABLE: &'static str = "log_messages";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["run_id", "timestamp", "source", "log_level", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.run_id),
            SqlValue::Timestamp(self.timestamp),
            SqlValue::Text(self.source.clone()),
            SqlValue::BigInt(self.log_level),
            SqlValue::Text(self.description.clone()),
        ]
    }
}

impl Entity for SyntheticPopulation {
    const TABLE: &'static str = "synthetic_populations";
    const INSERT_COLUMNS: &'static [&'static str] =
        &["population_id", "year_id", "name", "description"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<SqlValue> {
        vec![
            SqlValue::BigInt(self.population_id),
            SqlValue::BigInt(self.year_id),
            SqlValue::Text(self.name.clone()),
            SqlValue::Text(self.description.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_values_match_declared_columns() {
        let farm = Farm::default();
        assert_eq!(
            farm.insert_values().len(),
            <Farm as Entity>::INSERT_COLUMNS.len()
        );
        let production = AgriculturalProduction::default();
        assert_eq!(
            production.insert_values().len(),
            <AgriculturalProduction as Entity>::INSERT_COLUMNS.len()
        );
        let scenario = SimulationScenario::default();
        assert_eq!(
            scenario.insert_values().len(),
            <SimulationScenario as Entity>::INSERT_COLUMNS.len()
        );
    }

    #[test]
    fn natural_key_filter_matches_key_fields() {
        let year = Year {
            id: 0,
            year_number: 2023,
            population_id: 4,
            population: None,
        };
        let mut args = Vec::new();
        let sql = Year::key_filter(&year.natural_key()).render(&mut args);
        assert_eq!(sql, "(year_number = $1 AND population_id = $2)");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn land_transaction_key_uses_destination_first() {
        let tx = LandTransaction {
            id: 0,
            production_id: 9,
            destination_farm_id: 3,
            year_id: 5,
            percentage: 50.0,
            sale_price: 1000.0,
        };
        assert_eq!(tx.natural_key(), (3, 9, 5));
    }
}

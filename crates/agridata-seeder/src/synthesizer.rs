//! Relational graph synthesizer.
//!
//! Extends the persisted entity graph with a consistent, de-duplicated
//! synthetic dataset: populations with farms, years, product groups,
//! productions, policies, per-(farm, year) records and subsidies, plus
//! simulation scaffolding. Stages run in dependency order; each stage
//! reads the previous stage's persisted output back from the store.
//!
//! Two properties the pipeline upholds everywhere:
//!
//! - **De-duplication is two-level.** Before a record is staged, its
//!   natural key is checked against the live store extent (fetched once
//!   per stage) and against the keys already staged in the not-yet-flushed
//!   batch ([`dedup_by_key`]).
//! - **Failures never abort the pipeline.** Each stage's terminal write is
//!   checked; on failure the stage logs, records itself in the summary and
//!   the next stage runs. This is a best-effort fixture loader, not a
//!   transactional importer.
//!
//! All randomness flows through one explicitly seeded [`StdRng`], so a
//! given configuration always produces the same candidate records.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use agridata_db::{Entity, Filter, NaturalKey, PgStore, Query, Repository, WriteError};
use agridata_types::{
    AgriculturalProduction, ClosingValFarmValue, FadnProduct, FadnProductRelation, Farm,
    FarmYearSubsidy, HolderFarmYearData, LivestockProduction, LogMessage, Policy,
    PolicyGroupRelation, Population, ProductGroup, ProductType, SimulationRun,
    SimulationScenario, SyntheticPopulation, Year,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::catalog;

/// Name pool for agricultural product groups.
const AGRICULTURAL_GROUPS: &[&str] = &[
    "Soft wheat",
    "Durum wheat",
    "Barley",
    "Grain maize",
    "Sunflower",
    "Potatoes",
    "Sugar beet",
    "Olive groves",
    "Vineyards",
    "Citrus orchards",
    "Protein crops",
    "Rapeseed",
];

/// Name pool for livestock product groups.
const LIVESTOCK_GROUPS: &[&str] = &[
    "Dairy cattle",
    "Beef cattle",
    "Sheep",
    "Goats",
    "Pigs",
    "Laying hens",
    "Broilers",
];

/// Fixed policy pool applied to every population.
const POLICY_POOL: &[(&str, &str)] = &[
    ("BPS", "Basic payment scheme"),
    ("GREEN", "Greening payment"),
    ("YF", "Young farmers payment"),
    ("CDP", "Coupled direct payment"),
    ("ANC", "Areas of natural constraint"),
    ("ECO", "Eco-scheme payment"),
];

/// NUTS-style region triples farms are placed in.
const REGIONS: &[(&str, &str, &str)] = &[
    ("ES", "ES24", "ES243"),
    ("ES", "ES41", "ES418"),
    ("ES", "ES61", "ES616"),
    ("PT", "PT18", "PT187"),
    ("FR", "FRJ2", "FRJ28"),
];

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Cardinality and value knobs for the synthetic dataset.
///
/// Loaded from the `seeder` section of `agridata-config.yaml`; every field
/// falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SynthesizerConfig {
    /// Seed for the random source; equal seeds produce equal candidates.
    pub seed: u64,
    /// Number of populations the store should hold after seeding.
    pub populations: usize,
    /// Minimum farms generated per population.
    pub min_farms: usize,
    /// Maximum farms generated per population.
    pub max_farms: usize,
    /// First year number of the required span.
    pub start_year_number: i64,
    /// Number of consecutive years per population.
    pub year_count: i64,
    /// Minimum product groups per population.
    pub min_product_groups: usize,
    /// Maximum product groups per population.
    pub max_product_groups: usize,
    /// Maximum policies linked to one product group.
    pub max_policies_per_group: usize,
    /// Maximum FADN catalog entries linked to one product group.
    pub max_fadn_products_per_group: usize,
    /// Log messages generated per simulation run.
    pub log_messages_per_run: usize,
    /// Batch size passed to every bulk insert.
    pub write_batch_size: usize,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            populations: 2,
            min_farms: 5,
            max_farms: 10,
            start_year_number: 2020,
            year_count: 3,
            min_product_groups: 4,
            max_product_groups: 8,
            max_policies_per_group: 2,
            max_fadn_products_per_group: 3,
            log_messages_per_run: 10,
            write_batch_size: 200,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-stage outcome of one synthesizer run.
#[derive(Debug, Clone, Default)]
pub struct SeedSummary {
    /// Rows inserted per stage.
    pub inserted: BTreeMap<&'static str, usize>,
    /// Stages whose terminal write reported a failure.
    pub failed_stages: Vec<&'static str>,
}

impl SeedSummary {
    fn record(&mut self, stage: &'static str, count: usize) {
        *self.inserted.entry(stage).or_insert(0) += count;
    }

    fn record_failure(&mut self, stage: &'static str) {
        if !self.failed_stages.contains(&stage) {
            self.failed_stages.push(stage);
        }
    }

    /// Total rows inserted across all stages.
    pub fn total_inserted(&self) -> usize {
        self.inserted.values().sum()
    }
}

// ---------------------------------------------------------------------------
// De-duplication
// ---------------------------------------------------------------------------

/// Keep only candidates whose key is neither in `existing` (the live store
/// extent) nor already staged earlier in the same candidate list.
///
/// Input order of the survivors is preserved.
pub(crate) fn dedup_by_key<T, K, F>(candidates: Vec<T>, existing: &HashSet<K>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut staged: HashSet<K> = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| {
            let k = key(candidate);
            !existing.contains(&k) && staged.insert(k)
        })
        .collect()
}

/// Fetch the full natural-key extent of one entity kind.
async fn existing_keys<T: NaturalKey>(
    store: &PgStore,
) -> Result<HashSet<T::Key>, agridata_db::DbError> {
    let rows = Repository::<T>::new(store.clone())
        .get_all(&Query::new())
        .await?;
    Ok(rows.iter().map(T::natural_key).collect())
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

fn farm_record(rng: &mut impl Rng, population_id: i64, index: usize) -> Farm {
    let (level_1, level_2, level_3) = REGIONS
        .choose(rng)
        .copied()
        .unwrap_or(("ES", "ES41", "ES418"));
    Farm {
        id: 0,
        farm_code: format!("F{index:05}"),
        latitude: rng.random_range(36.0..44.0),
        longitude: rng.random_range(-9.0..3.0),
        altitude: rng.random_range(0.0..1500.0),
        region_level_1: level_1.to_owned(),
        region_level_2: level_2.to_owned(),
        region_level_3: level_3.to_owned(),
        technical_economic_orientation: rng.random_range(15..=90),
        population_id,
        population: None,
    }
}

fn agricultural_production_record(
    rng: &mut impl Rng,
    farm_id: i64,
    product_group_id: i64,
    year_id: i64,
) -> AgriculturalProduction {
    let cultivated = rng.random_range(0.5..120.0);
    AgriculturalProduction {
        id: 0,
        farm_id,
        product_group_id,
        year_id,
        cultivated_area: cultivated,
        irrigated_area: rng.random_range(0.0..cultivated),
        crop_production: rng.random_range(1.0..600.0),
        quantity_sold: rng.random_range(0.0..500.0),
        value_sold: rng.random_range(100.0..60_000.0),
        variable_costs: rng.random_range(10.0..5_000.0),
        sell_price: rng.random_range(0.05..3.0),
        farm: None,
        product_group: None,
        year: None,
    }
}

fn livestock_production_record(
    rng: &mut impl Rng,
    farm_id: i64,
    product_group_id: i64,
    year_id: i64,
) -> LivestockProduction {
    let herd = rng.random_range(1.0..500.0);
    LivestockProduction {
        id: 0,
        farm_id,
        product_group_id,
        year_id,
        number_of_animals: herd,
        number_of_animals_sold: rng.random_range(0.0..herd),
        milk_total_production: rng.random_range(0.0..100_000.0),
        value_sold: rng.random_range(100.0..80_000.0),
        variable_costs: rng.random_range(10.0..5_000.0),
        sell_price: rng.random_range(0.5..400.0),
        farm: None,
        product_group: None,
        year: None,
    }
}

fn holder_record(rng: &mut impl Rng, farm_id: i64, year_id: i64) -> HolderFarmYearData {
    HolderFarmYearData {
        id: 0,
        farm_id,
        year_id,
        holder_age: rng.random_range(25..=75),
        holder_family_members: rng.random_range(1..=6),
        holder_successors: rng.random_range(0..=3),
        holder_successors_age: rng.random_range(0..=45),
        holder_gender: if rng.random_bool(0.5) { "F" } else { "M" }.to_owned(),
        farm: None,
        year: None,
    }
}

fn closing_value_record(rng: &mut impl Rng, farm_id: i64, year_id: i64) -> ClosingValFarmValue {
    ClosingValFarmValue {
        id: 0,
        farm_id,
        year_id,
        agricultural_land_area: rng.random_range(1.0..250.0),
        agricultural_land_value: rng.random_range(5_000.0..1_500_000.0),
        total_current_assets: rng.random_range(1_000.0..500_000.0),
        long_and_medium_term_loans: rng.random_range(0.0..250_000.0),
        farm: None,
        year: None,
    }
}

// ---------------------------------------------------------------------------
// Synthesizer
// ---------------------------------------------------------------------------

/// Staged fixture pipeline over one store.
pub struct Synthesizer {
    store: PgStore,
    rng: StdRng,
    config: SynthesizerConfig,
}

impl Synthesizer {
    /// Create a synthesizer seeded from `config.seed`.
    pub fn new(store: PgStore, config: SynthesizerConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { store, rng, config }
    }

    /// Run the full pipeline and report per-stage outcomes.
    ///
    /// Write failures are absorbed per stage (logged, recorded in the
    /// summary, pipeline continues); only read-path and infrastructure
    /// failures abort.
    ///
    /// # Errors
    ///
    /// Returns [`agridata_db::DbError`] when a stage cannot read the
    /// persisted output of its predecessors.
    pub async fn initialize_development_fixtures(
        &mut self,
    ) -> Result<SeedSummary, agridata_db::DbError> {
        info!(seed = self.config.seed, "synthesizer starting");
        let mut summary = SeedSummary::default();

        self.stage_populations_and_farms(&mut summary).await?;
        self.stage_years(&mut summary).await?;
        self.stage_simulation_scaffolding(&mut summary).await?;
        self.stage_synthetic_populations(&mut summary).await?;
        self.stage_product_groups(&mut summary).await?;
        self.stage_productions(&mut summary).await?;
        self.stage_policies(&mut summary).await?;
        self.stage_holder_data(&mut summary).await?;
        self.stage_group_relations(&mut summary).await?;
        self.stage_financials(&mut summary).await?;

        info!(
            total_inserted = summary.total_inserted(),
            failed_stages = summary.failed_stages.len(),
            "synthesizer finished"
        );
        Ok(summary)
    }

    /// Flush one stage's candidates, absorbing write failures into the
    /// summary.
    async fn flush_stage<T: Entity>(
        &self,
        rows: &mut Vec<T>,
        stage: &'static str,
        summary: &mut SeedSummary,
    ) {
        if rows.is_empty() {
            info!(stage, inserted = 0, "stage complete");
            summary.record(stage, 0);
            return;
        }
        let repo = Repository::<T>::new(self.store.clone());
        match repo.add_range(rows, self.config.write_batch_size).await {
            Ok(()) => {
                info!(stage, inserted = rows.len(), "stage complete");
                summary.record(stage, rows.len());
            }
            Err(error) => {
                let committed = match &error {
                    WriteError::BatchFailed { committed, .. } => *committed,
                    _ => 0,
                };
                error!(stage, committed, %error, "stage write failed; continuing");
                summary.record(stage, committed);
                summary.record_failure(stage);
            }
        }
    }

    async fn populations(&self) -> Result<Vec<Population>, agridata_db::DbError> {
        Repository::<Population>::new(self.store.clone())
            .get_all(&Query::new())
            .await
    }

    /// Group an entity extent by a parent id.
    async fn by_parent<T: Entity>(
        &self,
        parent_id: impl Fn(&T) -> i64,
    ) -> Result<BTreeMap<i64, Vec<T>>, agridata_db::DbError> {
        let rows = Repository::<T>::new(self.store.clone())
            .get_all(&Query::new())
            .await?;
        let mut grouped: BTreeMap<i64, Vec<T>> = BTreeMap::new();
        for row in rows {
            grouped.entry(parent_id(&row)).or_default().push(row);
        }
        Ok(grouped)
    }

    // -- stage 1 -----------------------------------------------------------

    async fn stage_populations_and_farms(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let repo = Repository::<Population>::new(self.store.clone());
        let mut populations = repo.get_all(&Query::new()).await?;

        let missing = self.config.populations.saturating_sub(populations.len());
        let mut created = 0usize;
        for offset in 0..missing {
            let mut population = Population {
                id: 0,
                description: format!("Synthetic population {}", populations.len() + offset + 1),
            };
            match repo.add(&mut population).await {
                Ok(()) => {
                    created += 1;
                    populations.push(population);
                }
                Err(error) => {
                    error!(%error, "population insert failed; continuing");
                    summary.record_failure("populations");
                }
            }
        }
        info!(stage = "populations", inserted = created, "stage complete");
        summary.record("populations", created);

        let existing = existing_keys::<Farm>(&self.store).await?;
        let (min_farms, max_farms) = (self.config.min_farms, self.config.max_farms);
        let mut candidates = Vec::new();
        for population in &populations {
            let count = self.rng.random_range(min_farms..=max_farms);
            for index in 0..count {
                candidates.push(farm_record(&mut self.rng, population.id, index));
            }
        }
        let mut fresh = dedup_by_key(candidates, &existing, Farm::natural_key);
        self.flush_stage(&mut fresh, "farms", summary).await;
        Ok(())
    }

    // -- stage 2 -----------------------------------------------------------

    async fn stage_years(&mut self, summary: &mut SeedSummary) -> Result<(), agridata_db::DbError> {
        let populations = self.populations().await?;
        let existing = existing_keys::<Year>(&self.store).await?;

        let mut candidates = Vec::new();
        for population in &populations {
            for offset in 0..self.config.year_count {
                candidates.push(Year {
                    id: 0,
                    year_number: self.config.start_year_number + offset,
                    population_id: population.id,
                    population: None,
                });
            }
        }
        let mut fresh = dedup_by_key(candidates, &existing, Year::natural_key);
        self.flush_stage(&mut fresh, "years", summary).await;
        Ok(())
    }

    // -- stage 3 -----------------------------------------------------------

    async fn stage_simulation_scaffolding(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        const STAGE: &str = "simulation_scaffolding";
        let populations = self.populations().await?;
        let years = self.by_parent::<Year>(|year| year.population_id).await?;

        let scenario_repo = Repository::<SimulationScenario>::new(self.store.clone());
        let run_repo = Repository::<SimulationRun>::new(self.store.clone());
        let log_repo = Repository::<LogMessage>::new(self.store.clone());

        let mut inserted = 0usize;
        for population in &populations {
            for year in years.get(&population.id).map_or(&[][..], Vec::as_slice) {
                let already = scenario_repo
                    .count(Some(
                        &Filter::eq("population_id", population.id)
                            .and(Filter::eq("year_id", year.id)),
                    ))
                    .await?;
                if already > 0 {
                    continue;
                }

                let mut scenario = SimulationScenario {
                    id: 0,
                    population_id: population.id,
                    year_id: year.id,
                    short_description: format!("Baseline scenario {}", year.year_number),
                    additional_policies: serde_json::Value::Object(serde_json::Map::new()),
                    population: None,
                };
                if let Err(error) = scenario_repo.add(&mut scenario).await {
                    warn!(%error, population_id = population.id, "scenario insert failed");
                    summary.record_failure(STAGE);
                    continue;
                }
                inserted += 1;

                let mut run = SimulationRun {
                    id: 0,
                    scenario_id: scenario.id,
                    overall_status: "COMPLETED".to_owned(),
                    current_stage: "DATAPREPARATION".to_owned(),
                    current_year_number: year.year_number,
                    scenario: None,
                };
                if let Err(error) = run_repo.add(&mut run).await {
                    warn!(%error, scenario_id = scenario.id, "run insert failed");
                    summary.record_failure(STAGE);
                    continue;
                }
                inserted += 1;

                let mut messages: Vec<LogMessage> = (0..self.config.log_messages_per_run)
                    .map(|index| LogMessage {
                        id: 0,
                        run_id: run.id,
                        timestamp: Utc::now(),
                        source: "seeder".to_owned(),
                        log_level: 1,
                        description: format!("fixture message {index}"),
                    })
                    .collect();
                match log_repo
                    .add_range(&mut messages, self.config.write_batch_size)
                    .await
                {
                    Ok(()) => inserted += messages.len(),
                    Err(error) => {
                        warn!(%error, run_id = run.id, "log batch insert failed");
                        summary.record_failure(STAGE);
                    }
                }
            }
        }
        info!(stage = STAGE, inserted, "stage complete");
        summary.record(STAGE, inserted);
        Ok(())
    }

    // -- stage 4 -----------------------------------------------------------

    async fn stage_synthetic_populations(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let repo = Repository::<SyntheticPopulation>::new(self.store.clone());
        // Global guard: any existing placeholder anywhere skips the stage.
        if repo.count(None).await? > 0 {
            info!(stage = "synthetic_populations", inserted = 0, "stage complete");
            summary.record("synthetic_populations", 0);
            return Ok(());
        }

        let populations = self.populations().await?;
        let years = self.by_parent::<Year>(|year| year.population_id).await?;
        let mut rows = Vec::new();
        for population in &populations {
            for year in years.get(&population.id).map_or(&[][..], Vec::as_slice) {
                rows.push(SyntheticPopulation {
                    id: 0,
                    population_id: population.id,
                    year_id: year.id,
                    name: format!("SP-{}-{}", population.id, year.year_number),
                    description: format!(
                        "Synthetic placeholder for population {} in {}",
                        population.id, year.year_number
                    ),
                });
            }
        }
        self.flush_stage(&mut rows, "synthetic_populations", summary)
            .await;
        Ok(())
    }

    // -- stage 5 -----------------------------------------------------------

    async fn stage_product_groups(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let populations = self.populations().await?;
        let existing = existing_keys::<ProductGroup>(&self.store).await?;

        let pool: Vec<(&str, ProductType)> = AGRICULTURAL_GROUPS
            .iter()
            .map(|name| (*name, ProductType::Agricultural))
            .chain(
                LIVESTOCK_GROUPS
                    .iter()
                    .map(|name| (*name, ProductType::Livestock)),
            )
            .collect();

        let (min_groups, max_groups) =
            (self.config.min_product_groups, self.config.max_product_groups);
        let mut candidates = Vec::new();
        for population in &populations {
            let count = self.rng.random_range(min_groups..=max_groups);
            for (name, product_type) in pool.choose_multiple(&mut self.rng, count) {
                candidates.push(ProductGroup {
                    id: 0,
                    name: (*name).to_owned(),
                    product_type: *product_type,
                    original_name_datasource: name.to_uppercase().replace(' ', "_"),
                    model_specific_categories: vec![match product_type {
                        ProductType::Agricultural => "crop".to_owned(),
                        ProductType::Livestock => "animal".to_owned(),
                    }],
                    population_id: population.id,
                    population: None,
                });
            }
        }
        let mut fresh = dedup_by_key(candidates, &existing, ProductGroup::natural_key);
        self.flush_stage(&mut fresh, "product_groups", summary).await;
        Ok(())
    }

    // -- stage 6 -----------------------------------------------------------

    async fn stage_productions(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let farms = self.by_parent::<Farm>(|farm| farm.population_id).await?;
        let years = self.by_parent::<Year>(|year| year.population_id).await?;
        let groups = self
            .by_parent::<ProductGroup>(|group| group.population_id)
            .await?;

        let mut agricultural = Vec::new();
        let mut livestock = Vec::new();
        for (population_id, population_farms) in &farms {
            let Some(population_years) = years.get(population_id) else {
                continue;
            };
            let population_groups = groups.get(population_id).map_or(&[][..], Vec::as_slice);
            let crop_groups: Vec<&ProductGroup> = population_groups
                .iter()
                .filter(|group| group.product_type == ProductType::Agricultural)
                .collect();
            let animal_groups: Vec<&ProductGroup> = population_groups
                .iter()
                .filter(|group| group.product_type == ProductType::Livestock)
                .collect();

            for farm in population_farms {
                for year in population_years {
                    let crop_count = self.rng.random_range(0..=crop_groups.len().min(3));
                    for group in crop_groups.choose_multiple(&mut self.rng, crop_count) {
                        agricultural.push(agricultural_production_record(
                            &mut self.rng,
                            farm.id,
                            group.id,
                            year.id,
                        ));
                    }
                    let animal_count = self.rng.random_range(0..=animal_groups.len().min(2));
                    for group in animal_groups.choose_multiple(&mut self.rng, animal_count) {
                        livestock.push(livestock_production_record(
                            &mut self.rng,
                            farm.id,
                            group.id,
                            year.id,
                        ));
                    }
                }
            }
        }

        // Productions de-duplicate only within the run; values are
        // randomized per run, so cross-run collisions surface as a stage
        // write failure instead of being silently skipped.
        let no_store_keys = HashSet::new();
        let mut fresh_crop =
            dedup_by_key(agricultural, &no_store_keys, AgriculturalProduction::natural_key);
        self.flush_stage(&mut fresh_crop, "agricultural_productions", summary)
            .await;
        let mut fresh_animal =
            dedup_by_key(livestock, &no_store_keys, LivestockProduction::natural_key);
        self.flush_stage(&mut fresh_animal, "livestock_productions", summary)
            .await;
        Ok(())
    }

    // -- stage 7 -----------------------------------------------------------

    async fn stage_policies(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let populations = self.populations().await?;
        let existing = existing_keys::<Policy>(&self.store).await?;

        let year_span = (
            self.config.start_year_number,
            self.config.start_year_number + self.config.year_count,
        );
        let mut candidates = Vec::new();
        for population in &populations {
            for (identifier, description) in POLICY_POOL {
                candidates.push(Policy {
                    id: 0,
                    policy_identifier: (*identifier).to_owned(),
                    is_coupled: self.rng.random_bool(0.5),
                    policy_description: (*description).to_owned(),
                    economic_compensation: self.rng.random_range(50.0..500.0),
                    start_year_number: year_span.0,
                    end_year_number: year_span.1,
                    population_id: population.id,
                    population: None,
                });
            }
        }
        let mut fresh = dedup_by_key(candidates, &existing, Policy::natural_key);
        self.flush_stage(&mut fresh, "policies", summary).await;
        Ok(())
    }

    // -- stage 8 -----------------------------------------------------------

    async fn stage_holder_data(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let farms = self.by_parent::<Farm>(|farm| farm.population_id).await?;
        let years = self.by_parent::<Year>(|year| year.population_id).await?;
        let existing = existing_keys::<HolderFarmYearData>(&self.store).await?;

        let mut candidates = Vec::new();
        for (population_id, population_farms) in &farms {
            for farm in population_farms {
                for year in years.get(population_id).map_or(&[][..], Vec::as_slice) {
                    candidates.push(holder_record(&mut self.rng, farm.id, year.id));
                }
            }
        }
        let mut fresh = dedup_by_key(candidates, &existing, HolderFarmYearData::natural_key);
        self.flush_stage(&mut fresh, "holder_data", summary).await;
        Ok(())
    }

    // -- stage 9 -----------------------------------------------------------

    async fn stage_group_relations(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        // The relations need the catalog; ensure it exists first.
        match catalog::ensure_fadn_catalog(&self.store).await {
            Ok(inserted) => summary.record("fadn_products", inserted),
            Err(error) => {
                error!(%error, "FADN catalog initialization failed; continuing");
                summary.record_failure("fadn_products");
            }
        }

        let groups = self
            .by_parent::<ProductGroup>(|group| group.population_id)
            .await?;
        let policies = self
            .by_parent::<Policy>(|policy| policy.population_id)
            .await?;
        let fadn_products = Repository::<FadnProduct>::new(self.store.clone())
            .get_all(&Query::new())
            .await?;

        let existing_policy_relations = existing_keys::<PolicyGroupRelation>(&self.store).await?;
        let existing_fadn_relations = existing_keys::<FadnProductRelation>(&self.store).await?;

        let mut policy_relations = Vec::new();
        let mut fadn_relations = Vec::new();
        for (population_id, population_groups) in &groups {
            let population_policies =
                policies.get(population_id).map_or(&[][..], Vec::as_slice);
            for group in population_groups {
                let policy_count = self
                    .rng
                    .random_range(0..=population_policies.len().min(self.config.max_policies_per_group));
                for policy in population_policies.choose_multiple(&mut self.rng, policy_count) {
                    policy_relations.push(PolicyGroupRelation {
                        id: 0,
                        product_group_id: group.id,
                        policy_id: policy.id,
                        population_id: *population_id,
                        economic_compensation: self.rng.random_range(10.0..300.0),
                        product_group: None,
                        policy: None,
                    });
                }

                let fadn_count = self.rng.random_range(
                    1..=fadn_products
                        .len()
                        .min(self.config.max_fadn_products_per_group)
                        .max(1),
                );
                for product in fadn_products.choose_multiple(&mut self.rng, fadn_count) {
                    fadn_relations.push(FadnProductRelation {
                        id: 0,
                        product_group_id: group.id,
                        fadn_product_id: product.id,
                        population_id: *population_id,
                        representativeness: self.rng.random_range(0.0..1.0),
                        product_group: None,
                        fadn_product: None,
                    });
                }
            }
        }

        let mut fresh_policy = dedup_by_key(
            policy_relations,
            &existing_policy_relations,
            PolicyGroupRelation::natural_key,
        );
        self.flush_stage(&mut fresh_policy, "policy_group_relations", summary)
            .await;
        let mut fresh_fadn = dedup_by_key(
            fadn_relations,
            &existing_fadn_relations,
            FadnProductRelation::natural_key,
        );
        self.flush_stage(&mut fresh_fadn, "fadn_product_relations", summary)
            .await;
        Ok(())
    }

    // -- stage 10 ----------------------------------------------------------

    async fn stage_financials(
        &mut self,
        summary: &mut SeedSummary,
    ) -> Result<(), agridata_db::DbError> {
        let farms = self.by_parent::<Farm>(|farm| farm.population_id).await?;
        let years = self.by_parent::<Year>(|year| year.population_id).await?;
        let policies = self
            .by_parent::<Policy>(|policy| policy.population_id)
            .await?;
        let existing_closing = existing_keys::<ClosingValFarmValue>(&self.store).await?;
        let existing_subsidies = existing_keys::<FarmYearSubsidy>(&self.store).await?;

        let mut closing_values = Vec::new();
        let mut subsidies = Vec::new();
        for (population_id, population_farms) in &farms {
            let population_years = years.get(population_id).map_or(&[][..], Vec::as_slice);
            let population_policies =
                policies.get(population_id).map_or(&[][..], Vec::as_slice);
            for farm in population_farms {
                for year in population_years {
                    closing_values.push(closing_value_record(&mut self.rng, farm.id, year.id));

                    let granted = self
                        .rng
                        .random_range(0..=population_policies.len().min(3));
                    for policy in population_policies.choose_multiple(&mut self.rng, granted) {
                        subsidies.push(FarmYearSubsidy {
                            id: 0,
                            farm_id: farm.id,
                            year_id: year.id,
                            policy_id: policy.id,
                            value: self.rng.random_range(100.0..10_000.0),
                            farm: None,
                            policy: None,
                        });
                    }
                }
            }
        }

        let mut fresh_closing = dedup_by_key(
            closing_values,
            &existing_closing,
            ClosingValFarmValue::natural_key,
        );
        self.flush_stage(&mut fresh_closing, "closing_values", summary)
            .await;
        let mut fresh_subsidies =
            dedup_by_key(subsidies, &existing_subsidies, FarmYearSubsidy::natural_key);
        self.flush_stage(&mut fresh_subsidies, "subsidies", summary)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

    use super::*;

    fn year(year_number: i64, population_id: i64) -> Year {
        Year {
            id: 0,
            year_number,
            population_id,
            population: None,
        }
    }

    #[test]
    fn dedup_skips_keys_already_in_store() {
        let mut existing = HashSet::new();
        existing.insert((2020i64, 1i64));
        let candidates = vec![year(2020, 1), year(2021, 1)];
        let fresh = dedup_by_key(candidates, &existing, Year::natural_key);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].year_number, 2021);
    }

    #[test]
    fn dedup_skips_keys_staged_earlier_in_the_batch() {
        let existing = HashSet::new();
        let candidates = vec![year(2020, 1), year(2020, 1), year(2020, 2)];
        let fresh = dedup_by_key(candidates, &existing, Year::natural_key);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].population_id, 1);
        assert_eq!(fresh[1].population_id, 2);
    }

    #[test]
    fn dedup_preserves_input_order() {
        let existing = HashSet::new();
        let candidates = vec![year(2022, 1), year(2020, 1), year(2021, 1)];
        let fresh = dedup_by_key(candidates, &existing, Year::natural_key);
        let numbers: Vec<i64> = fresh.iter().map(|y| y.year_number).collect();
        assert_eq!(numbers, vec![2022, 2020, 2021]);
    }

    #[test]
    fn config_defaults_are_consistent() {
        let config = SynthesizerConfig::default();
        assert!(config.min_farms <= config.max_farms);
        assert!(config.min_product_groups <= config.max_product_groups);
        assert!(config.year_count > 0);
    }

    #[test]
    fn record_builders_respect_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let farm = farm_record(&mut rng, 1, 3);
        assert_eq!(farm.farm_code, "F00003");
        assert!((36.0..44.0).contains(&farm.latitude));

        let production = agricultural_production_record(&mut rng, 1, 2, 3);
        assert!(production.variable_costs >= 10.0);
        assert!(production.irrigated_area <= production.cultivated_area);

        let holder = holder_record(&mut rng, 1, 2);
        assert!((25..=75).contains(&holder.holder_age));
    }

    #[test]
    fn summary_accumulates_and_deduplicates_failures() {
        let mut summary = SeedSummary::default();
        summary.record("farms", 3);
        summary.record("farms", 2);
        summary.record_failure("policies");
        summary.record_failure("policies");
        assert_eq!(summary.inserted.get("farms"), Some(&5));
        assert_eq!(summary.failed_stages, vec!["policies"]);
        assert_eq!(summary.total_inserted(), 5);
    }
}

//! Extended, entity-specific aggregation repositories.
//!
//! These sit beside the generic [`crate::Repository`] for the handful of
//! population-scoped statistics the simulation engine asks for. Each one is
//! a single `GROUP BY` statement; grouping and averaging happen in the
//! store, and groups with no qualifying rows are simply absent from the
//! result (never reported as zero).

use std::collections::BTreeMap;

use agridata_types::{PolicyId, PopulationId, ProductGroupId};

use crate::error::DbError;
use crate::store::PgStore;

/// Aggregations over crop production records.
#[derive(Clone)]
pub struct AgriculturalProductionStats {
    store: PgStore,
}

impl AgriculturalProductionStats {
    /// Create the aggregation repository over `store`.
    pub const fn new(store: PgStore) -> Self {
        Self { store }
    }

    /// Average variable cost per product group across all crop production
    /// records of `population`, considering only records with strictly
    /// positive variable costs.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn average_variable_cost_by_product_group(
        &self,
        population: PopulationId,
    ) -> Result<BTreeMap<ProductGroupId, f64>, DbError> {
        let rows: Vec<(i64, f64)> = sqlx::query_as(
            "SELECT p.product_group_id, AVG(p.variable_costs) \
             FROM agricultural_productions p \
             JOIN farms f ON f.id = p.farm_id \
             WHERE f.population_id = $1 AND p.variable_costs > 0 \
             GROUP BY p.product_group_id",
        )
        .bind(i64::from(population))
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(group, average)| (ProductGroupId::new(group), average))
            .collect())
    }
}

/// Aggregations over livestock production records.
#[derive(Clone)]
pub struct LivestockProductionStats {
    store: PgStore,
}

impl LivestockProductionStats {
    /// Create the aggregation repository over `store`.
    pub const fn new(store: PgStore) -> Self {
        Self { store }
    }

    /// Average variable cost per product group across all livestock
    /// production records of `population`, considering only records with
    /// strictly positive variable costs.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn average_variable_cost_by_product_group(
        &self,
        population: PopulationId,
    ) -> Result<BTreeMap<ProductGroupId, f64>, DbError> {
        let rows: Vec<(i64, f64)> = sqlx::query_as(
            "SELECT p.product_group_id, AVG(p.variable_costs) \
             FROM livestock_productions p \
             JOIN farms f ON f.id = p.farm_id \
             WHERE f.population_id = $1 AND p.variable_costs > 0 \
             GROUP BY p.product_group_id",
        )
        .bind(i64::from(population))
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(group, average)| (ProductGroupId::new(group), average))
            .collect())
    }
}

/// Aggregations over per-farm, per-year subsidy records.
#[derive(Clone)]
pub struct FarmYearSubsidyStats {
    store: PgStore,
}

impl FarmYearSubsidyStats {
    /// Create the aggregation repository over `store`.
    pub const fn new(store: PgStore) -> Self {
        Self { store }
    }

    /// Total subsidy value granted per policy across all farms and years of
    /// `population`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the statement fails.
    pub async fn total_subsidy_by_policy(
        &self,
        population: PopulationId,
    ) -> Result<BTreeMap<PolicyId, f64>, DbError> {
        let rows: Vec<(i64, f64)> = sqlx::query_as(
            "SELECT s.policy_id, SUM(s.value) \
             FROM farm_year_subsidies s \
             JOIN farms f ON f.id = s.farm_id \
             WHERE f.population_id = $1 \
             GROUP BY s.policy_id",
        )
        .bind(i64::from(population))
        .fetch_all(self.store.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(policy, total)| (PolicyId::new(policy), total))
            .collect())
    }
}

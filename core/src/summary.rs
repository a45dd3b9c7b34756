//! Post-run verification summary.
//!
//! Read back from the store after every phase has committed; nothing
//! here is computed from in-memory generator state.

use crate::{
    config::GeneratorConfig,
    error::GenResult,
    phase::PhaseReport,
    store::{MetricsStore, MonthlyShare},
    types::Day,
};
use chrono::Datelike;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub seed: u64,
    pub phases: Vec<PhaseReport>,
    pub table_counts: Vec<(String, i64)>,
    pub daily_rows: i64,
    pub date_range: Option<(Day, Day)>,
    pub ticket_count: i64,
    /// Category the trend below tracks.
    pub trend_category: String,
    pub monthly_trend: Vec<MonthlyShare>,
}

impl GenerationSummary {
    pub fn collect(
        store: &MetricsStore,
        config: &GeneratorConfig,
        phases: Vec<PhaseReport>,
    ) -> GenResult<Self> {
        let problem_start = config.tickets.problem_start;
        let trend_from = problem_start.with_day(1).unwrap_or(problem_start);
        let trend_category = config.tickets.boosted_category.clone();
        Ok(Self {
            seed: config.seed,
            phases,
            table_counts: store.table_counts()?,
            daily_rows: store.table_row_count("daily_metrics")?,
            date_range: store.daily_date_range()?,
            ticket_count: store.ticket_count()?,
            monthly_trend: store.monthly_category_share(&trend_category, trend_from)?,
            trend_category,
        })
    }

    pub fn rows_for(&self, table: &str) -> Option<i64> {
        self.table_counts
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, n)| *n)
    }
}

//! The generator: runs every phase against one store and one RNG.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   0. Schema (drop and recreate all tables)
//!   1. Daily aggregates
//!   2. Channel breakdown    (reads daily rows)
//!   3. Product breakdown    (reads daily rows)
//!   4. Support tickets
//!   5. Weekly funnel        (reads daily rows)
//!   6. Summary verification (reads everything)
//!
//! RULES:
//!   - Phases execute in registration order, exactly once.
//!   - Each phase commits in its own transaction.
//!   - All randomness flows through the single SeededRng, so the
//!     registration order is part of the output contract.

use crate::{
    channel_metrics::ChannelMetricsPhase,
    config::GeneratorConfig,
    daily_metrics::DailyMetricsPhase,
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    product_metrics::ProductMetricsPhase,
    rng::SeededRng,
    store::MetricsStore,
    summary::GenerationSummary,
    support_tickets::SupportTicketPhase,
    weekly_funnel::WeeklyFunnelPhase,
};
use std::path::Path;

pub struct Generator {
    pub config: GeneratorConfig,
    rng: SeededRng,
    phases: Vec<Box<dyn GenerationPhase>>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rng: SeededRng::new(config.seed),
            config,
            phases: Vec::new(),
        }
    }

    /// Build a fully wired generator with all phases registered.
    /// Call this instead of new() + manual register() calls.
    pub fn build(config: GeneratorConfig) -> GenResult<Self> {
        config.validate()?;
        let mut generator = Generator::new(config);
        let cfg = &generator.config;
        let phases: Vec<Box<dyn GenerationPhase>> = vec![
            Box::new(DailyMetricsPhase::new(cfg)),
            Box::new(ChannelMetricsPhase::new(cfg)),
            Box::new(ProductMetricsPhase::new(cfg)),
            Box::new(SupportTicketPhase::new(cfg)?),
            Box::new(WeeklyFunnelPhase::new(cfg)),
        ];
        for phase in phases {
            generator.register(phase);
        }
        Ok(generator)
    }

    /// Register a phase. Call in the documented execution order.
    pub fn register(&mut self, phase: Box<dyn GenerationPhase>) {
        self.phases.push(phase);
    }

    pub fn phase_names(&self) -> Vec<&'static str> {
        self.phases.iter().map(|p| p.name()).collect()
    }

    /// Recreate the schema in `store`, run every phase, and verify.
    pub fn run(&mut self, store: &MetricsStore) -> GenResult<GenerationSummary> {
        log::info!(
            "Generating {} days ({} to {}) with seed {}",
            self.config.day_count(),
            self.config.start_date,
            self.config.end_date,
            self.rng.seed
        );
        store.migrate()?;

        let mut reports: Vec<PhaseReport> = Vec::with_capacity(self.phases.len());
        for phase in &mut self.phases {
            let rng = &mut self.rng;
            log::info!("Generating {}...", phase.name());
            let report = store.in_transaction(|s| phase.run(s, rng))?;
            log::info!("{}: {} rows", report.phase, report.rows_written);
            reports.push(report);
        }

        GenerationSummary::collect(store, &self.config, reports)
    }

    /// Delete any database at `path`, then generate into a fresh file.
    pub fn run_to_path(&mut self, path: &Path) -> GenResult<GenerationSummary> {
        let store = MetricsStore::recreate(path)?;
        let summary = self.run(&store)?;
        log::info!("Database saved to {}", path.display());
        Ok(summary)
    }
}

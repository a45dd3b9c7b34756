//! Generation phase trait.
//!
//! RULE: Every builder implements GenerationPhase.
//! The generator calls run() on each registered phase exactly once,
//! in registration order. Execution order is fixed and documented in
//! generator.rs.

use crate::{error::GenResult, rng::SeededRng, store::MetricsStore};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseReport {
    pub phase: &'static str,
    pub rows_written: usize,
}

/// The contract every generation phase must fulfill.
pub trait GenerationPhase {
    /// Unique stable name for this phase.
    fn name(&self) -> &'static str;

    /// Write this phase's rows.
    ///
    /// - `store`: the run's database; earlier phases' rows are readable
    /// - `rng`:   the run's single deterministic stream
    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport>;
}

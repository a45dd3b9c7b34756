//! Discrete weighted distributions.
//!
//! One sampler serves every weighted draw in the generator: ticket
//! category, subcategory and channel. Weights are normalised on
//! construction and a draw walks the cumulative sum, taking the first
//! entry whose running total exceeds the roll.
//!
//! Two kinds of table exist. `new` clamps negative weights to zero.
//! `signed` keeps them: the running total then dips and later entries
//! can be shadowed by bands already claimed, or pushed past 1.0 where no
//! roll reaches them. Either way a roll past every band selects the last
//! entry that owns part of [0, 1).

use crate::{
    error::{GenError, GenResult},
    rng::SeededRng,
};

#[derive(Debug, Clone)]
pub struct WeightedTable<L> {
    entries: Vec<(L, f64)>,
    fallback: usize,
}

impl<L> WeightedTable<L> {
    /// Build a table from `(label, weight)` pairs in draw order.
    /// Negative weights are clamped to zero.
    pub fn new(name: &str, entries: Vec<(L, f64)>) -> GenResult<Self> {
        let clamped = entries
            .into_iter()
            .map(|(label, w)| (label, if w.is_finite() { w.max(0.0) } else { 0.0 }))
            .collect();
        Self::normalised(name, clamped)
    }

    /// Build a table that keeps negative weights, normalised by the
    /// signed total. Non-finite weights are rejected.
    pub fn signed(name: &str, entries: Vec<(L, f64)>) -> GenResult<Self> {
        if entries.iter().any(|(_, w)| !w.is_finite()) {
            return Err(GenError::InvalidConfig(format!(
                "distribution '{name}' has a non-finite weight"
            )));
        }
        Self::normalised(name, entries)
    }

    fn normalised(name: &str, entries: Vec<(L, f64)>) -> GenResult<Self> {
        let total: f64 = entries.iter().map(|(_, w)| w).sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(GenError::EmptyDistribution { name: name.to_string() });
        }
        let entries: Vec<(L, f64)> = entries
            .into_iter()
            .map(|(label, w)| (label, w / total))
            .collect();
        let fallback = band_widths(&entries)
            .iter()
            .rposition(|w| *w > 0.0)
            .ok_or_else(|| GenError::EmptyDistribution { name: name.to_string() })?;
        Ok(Self { entries, fallback })
    }

    /// Select the first entry whose cumulative total exceeds `roll` (in [0, 1)).
    pub fn pick(&self, roll: f64) -> &L {
        let mut cumulative = 0.0;
        for (label, weight) in &self.entries {
            cumulative += weight;
            if roll < cumulative {
                return label;
            }
        }
        &self.entries[self.fallback].0
    }

    pub fn sample(&self, rng: &mut SeededRng) -> &L {
        self.pick(rng.next_f64())
    }

    /// Normalised weight of each entry, in draw order. Signed tables
    /// may hold negative weights here.
    pub fn entries(&self) -> &[(L, f64)] {
        &self.entries
    }
}

impl<L: PartialEq> WeightedTable<L> {
    /// Chance that a uniform roll in [0, 1) picks `label`.
    pub fn probability_of(&self, label: &L) -> f64 {
        self.entries
            .iter()
            .zip(band_widths(&self.entries))
            .filter(|((l, _), _)| l == label)
            .map(|(_, band)| band)
            .sum()
    }
}

/// Width of [0, 1) that each entry wins under a first-match walk:
/// its band runs from the highest earlier running total to its own,
/// both capped at 1.0.
fn band_widths<L>(entries: &[(L, f64)]) -> Vec<f64> {
    let mut cumulative = 0.0f64;
    let mut claimed = 0.0f64;
    entries
        .iter()
        .map(|(_, w)| {
            cumulative += w;
            let band = (cumulative.min(1.0) - claimed).max(0.0);
            claimed = claimed.max(cumulative.min(1.0));
            band
        })
        .collect()
}

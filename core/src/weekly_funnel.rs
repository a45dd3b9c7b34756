//! Weekly funnel roll-up.
//!
//! Monday-aligned 7-day windows that lie fully inside the generated
//! range. Visitors and completed checkouts come from the summed daily
//! rows; the intermediate stages are successive random reductions.

use crate::{
    config::{FunnelConfig, GeneratorConfig},
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    rng::SeededRng,
    seasonality::first_monday_on_or_after,
    store::MetricsStore,
    types::{round_to, Day},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyFunnel {
    pub week_start: Day,
    pub visitors: i64,
    pub product_views: i64,
    pub add_to_cart: i64,
    pub checkout_started: i64,
    pub checkout_completed: i64,
    pub conversion_rate: f64,
}

pub struct WeeklyFunnelPhase {
    start: Day,
    end: Day,
    config: FunnelConfig,
}

impl WeeklyFunnelPhase {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            start: config.start_date,
            end: config.end_date,
            config: config.funnel.clone(),
        }
    }

    /// Start dates of every complete week inside the window.
    pub fn week_starts(&self) -> Vec<Day> {
        let mut weeks = Vec::new();
        let mut current = first_monday_on_or_after(self.start);
        while current + Duration::days(6) <= self.end {
            weeks.push(current);
            current += Duration::days(7);
        }
        weeks
    }

    pub fn build_week(
        &self,
        week_start: Day,
        visitors: i64,
        conversions: i64,
        rng: &mut SeededRng,
    ) -> WeeklyFunnel {
        let c = &self.config;
        let product_views =
            (visitors as f64 * rng.uniform(c.product_view_fraction.0, c.product_view_fraction.1)) as i64;
        let add_to_cart =
            (product_views as f64 * rng.uniform(c.add_to_cart_fraction.0, c.add_to_cart_fraction.1)) as i64;
        let checkout_started = (add_to_cart as f64
            * rng.uniform(c.checkout_started_fraction.0, c.checkout_started_fraction.1))
            as i64;
        let conversion_rate = if visitors > 0 {
            round_to(conversions as f64 / visitors as f64, 4)
        } else {
            0.0
        };
        WeeklyFunnel {
            week_start,
            visitors,
            product_views,
            add_to_cart,
            checkout_started,
            checkout_completed: conversions,
            conversion_rate,
        }
    }
}

impl GenerationPhase for WeeklyFunnelPhase {
    fn name(&self) -> &'static str {
        "weekly_funnel"
    }

    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport> {
        let mut written = 0;
        for week_start in self.week_starts() {
            let week_end = week_start + Duration::days(6);
            let Some((visitors, conversions)) = store.daily_sums_between(week_start, week_end)? else {
                log::debug!("week {week_start}: no daily rows, skipped");
                continue;
            };
            let row = self.build_week(week_start, visitors, conversions, rng);
            store.insert_weekly_funnel(&row)?;
            written += 1;
        }
        Ok(PhaseReport {
            phase: self.name(),
            rows_written: written,
        })
    }
}

//! Daily aggregate builder.
//!
//! One row per calendar day in the configured window, no gaps. Every
//! later phase except tickets reads these rows back from the store.

use crate::{
    config::{DailyConfig, GeneratorConfig},
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    rng::SeededRng,
    seasonality::{day_of_week_factor, days_between, days_inclusive, growth_factor, seasonality_factor},
    store::MetricsStore,
    types::{cents_from_f64, round_to, Cents, Day},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetric {
    pub date: Day,
    pub sessions: i64,
    pub new_users: i64,
    pub signups: i64,
    pub trials_started: i64,
    pub conversions: i64,
    pub revenue_cents: Cents,
    pub avg_order_value: f64,
}

pub struct DailyMetricsPhase {
    start: Day,
    end: Day,
    annual_growth: f64,
    config: DailyConfig,
}

impl DailyMetricsPhase {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            start: config.start_date,
            end: config.end_date,
            annual_growth: config.annual_growth,
            config: config.daily.clone(),
        }
    }

    /// Draw one day's metrics. Consumes six values from `rng`.
    pub fn build_day(&self, day: Day, rng: &mut SeededRng) -> DailyMetric {
        let c = &self.config;
        let dow = day_of_week_factor(day);
        let season = seasonality_factor(day);
        let growth = growth_factor(day, self.start, self.annual_growth);
        let noise = rng.gauss(1.0, c.session_noise_stdev);

        let sessions = (c.base_sessions * dow * season * growth * noise).max(0.0) as i64;
        let new_users = (sessions as f64 * rng.uniform(c.new_user_fraction.0, c.new_user_fraction.1)) as i64;
        let signups = (sessions as f64 * rng.uniform(c.signup_fraction.0, c.signup_fraction.1)) as i64;
        let trials_started = (signups as f64 * rng.uniform(c.trial_fraction.0, c.trial_fraction.1)) as i64;

        let mut conv_rate = c.base_conversion_rate * rng.uniform(c.conversion_noise.0, c.conversion_noise.1);
        // Slow product-led improvement over the window.
        conv_rate *= 1.0 + c.conversion_improvement_per_day * days_between(self.start, day) as f64;
        let conversions = ((sessions as f64 * conv_rate) as i64).min(sessions);

        let aov = rng.gauss(c.aov_mean, c.aov_stdev);
        DailyMetric {
            date: day,
            sessions,
            new_users,
            signups,
            trials_started,
            conversions,
            revenue_cents: cents_from_f64(conversions as f64 * aov),
            avg_order_value: round_to(aov, 2),
        }
    }
}

impl GenerationPhase for DailyMetricsPhase {
    fn name(&self) -> &'static str {
        "daily_metrics"
    }

    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport> {
        let mut written = 0;
        for day in days_inclusive(self.start, self.end) {
            let metric = self.build_day(day, rng);
            log::debug!(
                "{day} sessions={} conversions={} revenue={:.2}",
                metric.sessions,
                metric.conversions,
                metric.revenue_cents as f64 / 100.0
            );
            store.insert_daily_metric(&metric)?;
            written += 1;
        }
        Ok(PhaseReport {
            phase: self.name(),
            rows_written: written,
        })
    }
}

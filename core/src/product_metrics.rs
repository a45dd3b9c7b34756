//! Product apportioner.
//!
//! Splits each day's conversions and revenue across the product catalog
//! with the same remainder-to-last reconciliation as channels, then
//! simulates refunds per product.

use crate::{
    apportion::Apportioner,
    config::{GeneratorConfig, ProductConfig, UniformRange},
    daily_metrics::DailyMetric,
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    rng::SeededRng,
    store::MetricsStore,
    types::{round_to, Cents, Day},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetric {
    pub date: Day,
    pub product_id: String,
    pub product_name: String,
    pub units_sold: i64,
    pub revenue_cents: Cents,
    pub refunds: i64,
    pub refund_amount: f64,
}

pub struct ProductMetricsPhase {
    products: Vec<ProductConfig>,
    share_noise: UniformRange,
    refund_rate: UniformRange,
    refund_value_factor: f64,
}

impl ProductMetricsPhase {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            products: config.products.clone(),
            share_noise: config.product_share_noise,
            refund_rate: config.refund_rate,
            refund_value_factor: config.refund_value_factor,
        }
    }

    pub fn split_day(&self, daily: &DailyMetric, rng: &mut SeededRng) -> Vec<ProductMetric> {
        let mut pot = Apportioner::new([daily.conversions, daily.revenue_cents]);
        let last = self.products.len().saturating_sub(1);
        let mut rows = Vec::with_capacity(self.products.len());
        for (i, product) in self.products.iter().enumerate() {
            let [units_sold, revenue_cents] = if i == last {
                pot.take_rest()
            } else {
                let share = product.share * rng.uniform(self.share_noise.0, self.share_noise.1);
                pot.take_share(share)
            };

            let refund_rate = rng.uniform(self.refund_rate.0, self.refund_rate.1);
            let refunds = (units_sold as f64 * refund_rate) as i64;
            let refund_amount = refunds as f64 * product.base_price * self.refund_value_factor;

            rows.push(ProductMetric {
                date: daily.date,
                product_id: product.product_id.clone(),
                product_name: product.name.clone(),
                units_sold,
                revenue_cents,
                refunds,
                refund_amount: round_to(refund_amount, 2),
            });
        }
        rows
    }
}

impl GenerationPhase for ProductMetricsPhase {
    fn name(&self) -> &'static str {
        "product_metrics"
    }

    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport> {
        let mut written = 0;
        for daily in store.daily_metrics()? {
            for row in self.split_day(&daily, rng) {
                store.insert_product_metric(&row)?;
                written += 1;
            }
        }
        Ok(PhaseReport {
            phase: self.name(),
            rows_written: written,
        })
    }
}

//! Channel apportioner.
//!
//! Splits each day's sessions, signups, conversions and revenue across
//! the configured acquisition channels. The last channel absorbs the
//! remainder, so per-date channel sums equal the daily aggregate exactly.

use crate::{
    apportion::Apportioner,
    config::{ChannelConfig, GeneratorConfig, UniformRange},
    daily_metrics::DailyMetric,
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    rng::SeededRng,
    store::MetricsStore,
    types::{Cents, Day},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelMetric {
    pub date: Day,
    pub channel_id: String,
    pub channel_name: String,
    pub sessions: i64,
    pub signups: i64,
    pub conversions: i64,
    pub revenue_cents: Cents,
}

pub struct ChannelMetricsPhase {
    channels: Vec<ChannelConfig>,
    share_noise: UniformRange,
}

impl ChannelMetricsPhase {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            channels: config.channels.clone(),
            share_noise: config.channel_share_noise,
        }
    }

    pub fn split_day(&self, daily: &DailyMetric, rng: &mut SeededRng) -> Vec<ChannelMetric> {
        let mut pot = Apportioner::new([
            daily.sessions,
            daily.signups,
            daily.conversions,
            daily.revenue_cents,
        ]);
        let last = self.channels.len().saturating_sub(1);
        let mut rows = Vec::with_capacity(self.channels.len());
        for (i, channel) in self.channels.iter().enumerate() {
            let [sessions, signups, conversions, revenue_cents] = if i == last {
                pot.take_rest()
            } else {
                let share = channel.share * rng.uniform(self.share_noise.0, self.share_noise.1);
                pot.take_share(share)
            };
            rows.push(ChannelMetric {
                date: daily.date,
                channel_id: channel.channel_id.clone(),
                channel_name: channel.name.clone(),
                sessions,
                signups,
                conversions,
                revenue_cents,
            });
        }
        rows
    }
}

impl GenerationPhase for ChannelMetricsPhase {
    fn name(&self) -> &'static str {
        "channel_metrics"
    }

    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport> {
        let mut written = 0;
        for daily in store.daily_metrics()? {
            for row in self.split_day(&daily, rng) {
                store.insert_channel_metric(&row)?;
                written += 1;
            }
        }
        Ok(PhaseReport {
            phase: self.name(),
            rows_written: written,
        })
    }
}

//! Support ticket simulator.
//!
//! Generates discrete ticket records day by day. Volume follows the
//! business growth and weekday curves. Category, subcategory and channel
//! are weighted draws whose category distribution shifts over time:
//!
//!   - After `problem_start` the boosted category (cancellation) gains
//!     share linearly for `ramp_days`, up to `max_boost`, taken from
//!     the offset category (content).
//!   - Billing days raise volume and add a further one-day boost.
//!   - The escalation channel only exists from `escalation_start`;
//!     earlier draws of it fall back to the fallback channel.
//!
//! Ticket ids are assigned from one counter in generation order, so
//! they are unique and strictly increasing across the whole run.

use crate::{
    config::{GeneratorConfig, TicketConfig},
    error::GenResult,
    phase::{GenerationPhase, PhaseReport},
    rng::SeededRng,
    sampler::WeightedTable,
    seasonality::{day_of_week_factor, days_between, days_inclusive, growth_factor, is_billing_day},
    store::MetricsStore,
    types::{round_to, Day, TicketId},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTicket {
    pub ticket_id: TicketId,
    pub created_date: Day,
    pub category: String,
    pub subcategory: String,
    pub channel: String,
    /// In [-1, 0]; every ticket is a complaint.
    pub sentiment_score: f64,
    /// At least `min_resolution_hours`.
    pub resolution_hours: f64,
    pub escalated: bool,
}

struct CategoryTable {
    name: String,
    base_weight: f64,
    subcategories: WeightedTable<String>,
}

pub struct SupportTicketPhase {
    start: Day,
    end: Day,
    annual_growth: f64,
    config: TicketConfig,
    categories: Vec<CategoryTable>,
    boosted_idx: usize,
    offset_idx: usize,
    channels: WeightedTable<String>,
    boosted_channels: WeightedTable<String>,
    next_ticket_id: TicketId,
}

impl SupportTicketPhase {
    pub fn new(config: &GeneratorConfig) -> GenResult<Self> {
        let t = &config.tickets;
        let categories = t
            .categories
            .iter()
            .map(|c| {
                Ok(CategoryTable {
                    name: c.category.clone(),
                    base_weight: c.base_weight,
                    subcategories: WeightedTable::new(&c.category, c.subcategories.clone())?,
                })
            })
            .collect::<GenResult<Vec<_>>>()?;

        let index_of = |name: &str| {
            categories
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| crate::error::GenError::InvalidConfig(format!("unknown ticket category '{name}'")))
        };
        let boosted_idx = index_of(&t.boosted_category)?;
        let offset_idx = index_of(&t.offset_category)?;

        Ok(Self {
            start: config.start_date,
            end: config.end_date,
            annual_growth: config.annual_growth,
            channels: WeightedTable::new("ticket channels", t.channels.clone())?,
            boosted_channels: WeightedTable::new("boosted ticket channels", t.boosted_category_channels.clone())?,
            config: t.clone(),
            categories,
            boosted_idx,
            offset_idx,
            next_ticket_id: 1,
        })
    }

    /// Linear ramp from 0 at `problem_start` to `max_boost` after `ramp_days`.
    pub fn ramp_boost(&self, day: Day) -> f64 {
        if day < self.config.problem_start {
            return 0.0;
        }
        let days_into_problem = days_between(self.config.problem_start, day) as f64;
        (days_into_problem / self.config.ramp_days as f64).min(1.0) * self.config.max_boost
    }

    /// Ramp plus the one-day billing spike.
    pub fn boost_for(&self, day: Day) -> f64 {
        let mut boost = self.ramp_boost(day);
        if is_billing_day(day, &self.config.billing_days) {
            boost += self.config.billing_boost;
        }
        boost
    }

    /// Category distribution after shifting `boost` of weight from the
    /// offset category to the boosted category. Labels are indices into
    /// the configured category list. The offset weight goes negative once
    /// `boost` passes its base weight and is walked as-is.
    pub fn category_table(&self, boost: f64) -> GenResult<WeightedTable<usize>> {
        let weights = self
            .categories
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let w = if i == self.boosted_idx {
                    c.base_weight + boost
                } else if i == self.offset_idx {
                    c.base_weight - boost
                } else {
                    c.base_weight
                };
                (i, w)
            })
            .collect();
        WeightedTable::signed("ticket categories", weights)
    }

    /// Probability that a ticket on `day` lands in the boosted category.
    pub fn boosted_share(&self, day: Day) -> GenResult<f64> {
        Ok(self.category_table(self.boost_for(day))?.probability_of(&self.boosted_idx))
    }

    /// Ticket count for `day`. Consumes one value from `rng`.
    pub fn daily_volume(&self, day: Day, rng: &mut SeededRng) -> usize {
        let c = &self.config;
        let growth = growth_factor(day, self.start, self.annual_growth);
        let dow = day_of_week_factor(day);
        let noise = rng.uniform(c.volume_noise.0, c.volume_noise.1);
        let mut count = (c.base_daily_tickets * growth * dow * noise).max(0.0) as usize;
        if is_billing_day(day, &c.billing_days) {
            count = (count as f64 * c.billing_volume_multiplier) as usize;
        }
        count
    }

    pub fn tickets_for_day(&mut self, day: Day, rng: &mut SeededRng) -> GenResult<Vec<SupportTicket>> {
        let volume = self.daily_volume(day, rng);
        let categories = self.category_table(self.boost_for(day))?;
        let tickets = (0..volume)
            .map(|_| self.build_ticket(day, &categories, rng))
            .collect();
        Ok(tickets)
    }

    fn build_ticket(
        &mut self,
        day: Day,
        categories: &WeightedTable<usize>,
        rng: &mut SeededRng,
    ) -> SupportTicket {
        let c = &self.config;
        let cat_idx = *categories.sample(rng);
        let category = &self.categories[cat_idx];
        let boosted = cat_idx == self.boosted_idx;
        let subcategory = category.subcategories.sample(rng).clone();

        let channel_table = if boosted { &self.boosted_channels } else { &self.channels };
        let mut channel = channel_table.sample(rng).clone();
        if channel == c.escalation_channel && day < c.escalation_start {
            channel = c.escalation_fallback_channel.clone();
        }
        let is_escalation = channel == c.escalation_channel;
        let is_public = c.public_channels.iter().any(|p| *p == channel);

        let mut sentiment = rng.uniform(c.sentiment_range.0, c.sentiment_range.1);
        if boosted {
            sentiment -= c.boosted_sentiment_penalty;
        }
        if is_public {
            sentiment -= c.public_sentiment_penalty;
        }
        let sentiment = sentiment.clamp(-1.0, 0.0);

        let mut resolution = rng.gauss(c.resolution_mean_hours, c.resolution_stdev_hours);
        if boosted {
            resolution *= c.boosted_resolution_multiplier;
        }
        if is_escalation {
            resolution *= c.escalation_resolution_multiplier;
        }
        let resolution = resolution.max(c.min_resolution_hours);

        // Only low-sentiment tickets draw for escalation.
        let escalated = is_escalation
            || (sentiment < c.escalation_sentiment_threshold && rng.chance(c.escalation_probability));

        let ticket = SupportTicket {
            ticket_id: self.next_ticket_id,
            created_date: day,
            category: category.name.clone(),
            subcategory,
            channel,
            sentiment_score: round_to(sentiment, 2),
            resolution_hours: round_to(resolution, 1),
            escalated,
        };
        self.next_ticket_id += 1;
        ticket
    }
}

impl GenerationPhase for SupportTicketPhase {
    fn name(&self) -> &'static str {
        "support_tickets"
    }

    fn run(&mut self, store: &MetricsStore, rng: &mut SeededRng) -> GenResult<PhaseReport> {
        let mut written = 0;
        for day in days_inclusive(self.start, self.end) {
            let tickets = self.tickets_for_day(day, rng)?;
            log::debug!("{day} tickets={} boost={:.3}", tickets.len(), self.boost_for(day));
            for ticket in &tickets {
                store.insert_ticket(ticket)?;
            }
            written += tickets.len();
        }
        Ok(PhaseReport {
            phase: self.name(),
            rows_written: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Day {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn phase() -> SupportTicketPhase {
        SupportTicketPhase::new(&GeneratorConfig::default()).unwrap()
    }

    #[test]
    fn ramp_is_zero_before_problem_start() {
        let p = phase();
        assert_eq!(p.ramp_boost(d(2025, 7, 14)), 0.0);
        assert_eq!(p.ramp_boost(d(2025, 7, 15)), 0.0);
        assert!((p.ramp_boost(d(2025, 10, 13)) - 0.10).abs() < 1e-12); // day 90 of 180
        assert!((p.ramp_boost(d(2026, 1, 11)) - 0.20).abs() < 1e-12);
        assert!((p.ramp_boost(d(2026, 1, 26)) - 0.20).abs() < 1e-12);
    }

    #[test]
    fn billing_day_adds_spike() {
        let p = phase();
        assert!((p.boost_for(d(2024, 3, 1)) - 0.10).abs() < 1e-12);
        assert_eq!(p.boost_for(d(2024, 3, 3)), 0.0);
    }

    #[test]
    fn baseline_category_weights_normalise() {
        let p = phase();
        let table = p.category_table(0.0).unwrap();
        let total: f64 = table.entries().iter().map(|(_, w)| w).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!((table.probability_of(&p.boosted_idx) - 0.15).abs() < 1e-12);
    }

    #[test]
    fn full_boost_keeps_literal_category_share() {
        let p = phase();
        // Full ramp plus billing spike: 0.15 + 0.30.
        let billing = p.boosted_share(d(2026, 1, 15)).unwrap();
        assert!((billing - 0.45).abs() < 1e-9, "billing day share {billing}");
        // Full ramp only: 0.15 + 0.20.
        let plain = p.boosted_share(d(2026, 1, 20)).unwrap();
        assert!((plain - 0.35).abs() < 1e-9, "plain day share {plain}");
    }

    #[test]
    fn negative_offset_weight_shadows_trailing_categories() {
        let p = phase();
        let table = p.category_table(0.30).unwrap();
        assert!(table.probability_of(&p.offset_idx) < 1e-12);
        let account = p.categories.iter().position(|c| c.name == "account").unwrap();
        assert!(table.probability_of(&account) < 1e-12);
        let mut rng = SeededRng::new(21);
        for _ in 0..5_000 {
            let idx = *table.sample(&mut rng);
            assert_ne!(idx, p.offset_idx);
            assert_ne!(idx, account);
        }
    }

    #[test]
    fn ticket_ids_continue_across_days() {
        let mut p = phase();
        let mut rng = SeededRng::new(5);
        let first = p.tickets_for_day(d(2024, 2, 5), &mut rng).unwrap();
        let second = p.tickets_for_day(d(2024, 2, 6), &mut rng).unwrap();
        let ids: Vec<_> = first.iter().chain(second.iter()).map(|t| t.ticket_id).collect();
        assert_eq!(ids[0], 1);
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[test]
    fn billing_day_volume_is_higher_on_average() {
        let p = phase();
        let mut rng = SeededRng::new(9);
        // Same weekday (Monday) a week apart; only the first is a billing day.
        let billing: usize = (0..500).map(|_| p.daily_volume(d(2024, 4, 1), &mut rng)).sum();
        let plain: usize = (0..500).map(|_| p.daily_volume(d(2024, 4, 8), &mut rng)).sum();
        assert!(billing as f64 > plain as f64 * 1.3, "billing={billing} plain={plain}");
    }
}

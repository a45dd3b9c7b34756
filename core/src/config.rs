//! Generator configuration.
//!
//! Every tunable the generator reads lives here. `Default` reproduces the
//! LearnFlow demo window exactly (two years ending 2026-01-26, seed 42);
//! a JSON file may override any subset of fields.

use crate::{
    error::{GenError, GenResult},
    sampler::WeightedTable,
    types::Day,
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Inclusive-lower, exclusive-upper uniform range.
pub type UniformRange = (f64, f64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel_id: String,
    pub name: String,
    /// Nominal share of daily traffic before noise.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub product_id: String,
    pub name: String,
    pub base_price: f64,
    /// Nominal share of daily conversions before noise.
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCategoryConfig {
    pub category: String,
    pub base_weight: f64,
    pub subcategories: Vec<(String, f64)>, // ordered, not HashMap
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyConfig {
    pub base_sessions: f64,
    pub session_noise_stdev: f64,
    pub new_user_fraction: UniformRange,
    pub signup_fraction: UniformRange,
    pub trial_fraction: UniformRange,
    pub base_conversion_rate: f64,
    pub conversion_noise: UniformRange,
    /// Linear conversion-rate improvement per elapsed day.
    pub conversion_improvement_per_day: f64,
    pub aov_mean: f64,
    pub aov_stdev: f64,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            base_sessions: 8000.0,
            session_noise_stdev: 0.08,
            new_user_fraction: (0.55, 0.65),
            signup_fraction: (0.08, 0.12),
            trial_fraction: (0.40, 0.50),
            base_conversion_rate: 0.025,
            conversion_noise: (0.85, 1.15),
            conversion_improvement_per_day: 0.0001,
            aov_mean: 85.0,
            aov_stdev: 15.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub base_daily_tickets: f64,
    pub volume_noise: UniformRange,
    pub categories: Vec<TicketCategoryConfig>,
    /// Category whose share ramps up after `problem_start`.
    pub boosted_category: String,
    /// Category that gives up weight as the boost grows.
    pub offset_category: String,
    pub problem_start: Day,
    pub ramp_days: i64,
    pub max_boost: f64,
    pub billing_days: Vec<u32>,
    pub billing_volume_multiplier: f64,
    pub billing_boost: f64,
    pub channels: Vec<(String, f64)>,
    /// Channel distribution used for the boosted category instead of `channels`.
    pub boosted_category_channels: Vec<(String, f64)>,
    pub public_channels: Vec<String>,
    pub escalation_channel: String,
    pub escalation_fallback_channel: String,
    /// First date on which the escalation channel may appear.
    pub escalation_start: Day,
    pub sentiment_range: UniformRange,
    pub boosted_sentiment_penalty: f64,
    pub public_sentiment_penalty: f64,
    pub resolution_mean_hours: f64,
    pub resolution_stdev_hours: f64,
    pub boosted_resolution_multiplier: f64,
    pub escalation_resolution_multiplier: f64,
    pub min_resolution_hours: f64,
    pub escalation_sentiment_threshold: f64,
    pub escalation_probability: f64,
}

fn weights(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
    pairs.iter().map(|(k, w)| (k.to_string(), *w)).collect()
}

fn category(name: &str, base_weight: f64, subs: &[(&str, f64)]) -> TicketCategoryConfig {
    TicketCategoryConfig {
        category: name.into(),
        base_weight,
        subcategories: weights(subs),
    }
}

fn ymd(y: i32, m: u32, d: u32) -> Day {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            base_daily_tickets: 25.0,
            volume_noise: (0.8, 1.2),
            categories: vec![
                category("cancellation", 0.15, &[
                    ("cancel_process_unclear", 0.35),
                    ("cant_find_cancel_button", 0.30),
                    ("unexpected_charge_after_cancel", 0.20),
                    ("cancel_confirmation_missing", 0.15),
                ]),
                category("billing", 0.25, &[
                    ("unexpected_charge", 0.40),
                    ("refund_request", 0.35),
                    ("payment_failed", 0.25),
                ]),
                category("technical", 0.30, &[
                    ("video_not_loading", 0.30),
                    ("login_issues", 0.25),
                    ("mobile_app_crash", 0.25),
                    ("certificate_not_generated", 0.20),
                ]),
                category("account", 0.15, &[
                    ("password_reset", 0.40),
                    ("email_change", 0.30),
                    ("merge_accounts", 0.30),
                ]),
                category("content", 0.15, &[
                    ("course_quality", 0.50),
                    ("missing_materials", 0.30),
                    ("outdated_content", 0.20),
                ]),
            ],
            boosted_category: "cancellation".into(),
            offset_category: "content".into(),
            problem_start: ymd(2025, 7, 15),
            ramp_days: 180,
            max_boost: 0.20,
            billing_days: vec![1, 2, 15, 16],
            billing_volume_multiplier: 1.4,
            billing_boost: 0.10,
            channels: weights(&[
                ("email", 0.35),
                ("chat", 0.25),
                ("app_review", 0.20),
                ("social", 0.12),
                ("partner_escalation", 0.08),
            ]),
            boosted_category_channels: weights(&[
                ("email", 0.25),
                ("chat", 0.15),
                ("app_review", 0.30),
                ("social", 0.20),
                ("partner_escalation", 0.10),
            ]),
            public_channels: vec!["app_review".into(), "social".into()],
            escalation_channel: "partner_escalation".into(),
            escalation_fallback_channel: "email".into(),
            escalation_start: ymd(2026, 1, 10),
            sentiment_range: (-0.7, -0.3),
            boosted_sentiment_penalty: 0.2,
            public_sentiment_penalty: 0.1,
            resolution_mean_hours: 24.0,
            resolution_stdev_hours: 12.0,
            boosted_resolution_multiplier: 1.5,
            escalation_resolution_multiplier: 0.5,
            min_resolution_hours: 1.0,
            escalation_sentiment_threshold: -0.8,
            escalation_probability: 0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    pub product_view_fraction: UniformRange,
    pub add_to_cart_fraction: UniformRange,
    pub checkout_started_fraction: UniformRange,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            product_view_fraction: (0.35, 0.45),
            add_to_cart_fraction: (0.25, 0.35),
            checkout_started_fraction: (0.55, 0.65),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed: u64,
    pub start_date: Day,
    pub end_date: Day,
    pub annual_growth: f64,
    pub daily: DailyConfig,
    pub channels: Vec<ChannelConfig>,
    pub channel_share_noise: UniformRange,
    pub products: Vec<ProductConfig>,
    pub product_share_noise: UniformRange,
    pub refund_rate: UniformRange,
    /// Fraction of list price returned per refund.
    pub refund_value_factor: f64,
    pub tickets: TicketConfig,
    pub funnel: FunnelConfig,
}

pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SPAN_DAYS: i64 = 730;

impl Default for GeneratorConfig {
    fn default() -> Self {
        let end_date = ymd(2026, 1, 26);
        let channel = |id: &str, name: &str, share: f64| ChannelConfig {
            channel_id: id.into(),
            name: name.into(),
            share,
        };
        let product = |id: &str, name: &str, base_price: f64, share: f64| ProductConfig {
            product_id: id.into(),
            name: name.into(),
            base_price,
            share,
        };
        Self {
            seed: DEFAULT_SEED,
            start_date: end_date - Duration::days(DEFAULT_SPAN_DAYS),
            end_date,
            annual_growth: 0.15,
            daily: DailyConfig::default(),
            channels: vec![
                channel("organic", "Organic Search", 0.32),
                channel("paid_search", "Paid Search", 0.23),
                channel("advisor", "Advisor Referral", 0.20),
                channel("partner", "Partner/Institution", 0.15),
                channel("direct", "Direct", 0.10),
            ],
            channel_share_noise: (0.85, 1.15),
            products: vec![
                product("core_curriculum", "Core Curriculum", 29.99, 0.45),
                product("professional_cert", "Professional Certification", 149.99, 0.25),
                product("pathway_bundle", "Pathway Bundle", 89.99, 0.20),
                product("enterprise", "Enterprise License", 499.99, 0.10),
            ],
            product_share_noise: (0.9, 1.1),
            refund_rate: (0.02, 0.04),
            refund_value_factor: 0.9,
            tickets: TicketConfig::default(),
            funnel: FunnelConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load a JSON config file. Omitted fields keep their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: GeneratorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of days generated, counting both ends.
    pub fn day_count(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn validate(&self) -> GenResult<()> {
        if self.end_date < self.start_date {
            return Err(GenError::InvalidDateRange {
                start: self.start_date.to_string(),
                end: self.end_date.to_string(),
            });
        }
        if self.channels.is_empty() {
            return Err(GenError::InvalidConfig("no channels configured".into()));
        }
        if self.products.is_empty() {
            return Err(GenError::InvalidConfig("no products configured".into()));
        }
        for (name, (lo, hi)) in [
            ("channel_share_noise", self.channel_share_noise),
            ("product_share_noise", self.product_share_noise),
            ("refund_rate", self.refund_rate),
            ("tickets.volume_noise", self.tickets.volume_noise),
            ("tickets.sentiment_range", self.tickets.sentiment_range),
        ] {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(GenError::InvalidConfig(format!("{name}: {lo} > {hi}")));
            }
        }

        for c in &self.channels {
            check_weight(&format!("channel '{}' share", c.channel_id), c.share)?;
        }
        for p in &self.products {
            check_weight(&format!("product '{}' share", p.product_id), p.share)?;
        }

        let t = &self.tickets;
        for c in &t.categories {
            check_weight(&format!("ticket category '{}' base_weight", c.category), c.base_weight)?;
            for (sub, w) in &c.subcategories {
                check_weight(&format!("subcategory '{}/{sub}' weight", c.category), *w)?;
            }
        }
        for (table, entries) in [
            ("tickets.channels", &t.channels),
            ("tickets.boosted_category_channels", &t.boosted_category_channels),
        ] {
            for (channel, w) in entries {
                check_weight(&format!("{table} '{channel}' weight"), *w)?;
            }
        }
        if t.categories.is_empty() {
            return Err(GenError::InvalidConfig("no ticket categories configured".into()));
        }
        let mut seen = HashSet::new();
        for c in &t.categories {
            if !seen.insert(c.category.as_str()) {
                return Err(GenError::InvalidConfig(format!(
                    "duplicate ticket category '{}'",
                    c.category
                )));
            }
            WeightedTable::new(&c.category, c.subcategories.clone())?;
        }
        for name in [&t.boosted_category, &t.offset_category] {
            if !seen.contains(name.as_str()) {
                return Err(GenError::InvalidConfig(format!(
                    "unknown ticket category '{name}'"
                )));
            }
        }
        if t.ramp_days <= 0 {
            return Err(GenError::InvalidConfig("tickets.ramp_days must be positive".into()));
        }
        WeightedTable::new("ticket channels", t.channels.clone())?;
        WeightedTable::new("boosted ticket channels", t.boosted_category_channels.clone())?;
        Ok(())
    }
}

fn check_weight(what: &str, weight: f64) -> GenResult<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(GenError::InvalidConfig(format!(
            "{what} must be finite and non-negative, got {weight}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_is_two_years() {
        let cfg = GeneratorConfig::default();
        assert_eq!(cfg.start_date, ymd(2024, 1, 27));
        assert_eq!(cfg.end_date, ymd(2026, 1, 26));
        assert_eq!(cfg.day_count(), 731);
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: GeneratorConfig =
            serde_json::from_str(r#"{ "seed": 7, "tickets": { "ramp_days": 90 } }"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.tickets.ramp_days, 90);
        assert_eq!(cfg.tickets.base_daily_tickets, 25.0);
        assert_eq!(cfg.channels.len(), 5);
        assert_eq!(cfg.tickets.problem_start, ymd(2025, 7, 15));
    }

    #[test]
    fn reversed_dates_rejected() {
        let cfg = GeneratorConfig {
            start_date: ymd(2025, 1, 2),
            end_date: ymd(2025, 1, 1),
            ..GeneratorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(GenError::InvalidDateRange { .. })));
    }

    #[test]
    fn unknown_boosted_category_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.tickets.boosted_category = "refunds".into();
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn empty_channel_table_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.tickets.channels.clear();
        assert!(matches!(cfg.validate(), Err(GenError::EmptyDistribution { .. })));
    }

    #[test]
    fn negative_channel_share_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.channels[1].share = -0.05;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn non_finite_product_share_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.products[0].share = f64::NAN;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
        cfg.products[0].share = f64::INFINITY;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn negative_category_base_weight_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.tickets.categories[2].base_weight = -0.3;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn single_negative_subcategory_weight_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.tickets.categories[0].subcategories[0].1 = -0.1;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }

    #[test]
    fn single_negative_ticket_channel_weight_rejected() {
        let mut cfg = GeneratorConfig::default();
        cfg.tickets.channels[0].1 = -0.2;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));

        let mut cfg = GeneratorConfig::default();
        cfg.tickets.boosted_category_channels[0].1 = -0.2;
        assert!(matches!(cfg.validate(), Err(GenError::InvalidConfig(_))));
    }
}

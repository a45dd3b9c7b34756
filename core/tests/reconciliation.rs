//! Remainder-to-last apportionment: channel and product rows for a date
//! must sum to that date's daily aggregate exactly.

use demo_data_core::{config::GeneratorConfig, generator::Generator, store::MetricsStore};
use std::collections::BTreeMap;

fn generated_store() -> MetricsStore {
    let store = MetricsStore::in_memory().expect("in-memory store");
    Generator::build(GeneratorConfig::default())
        .expect("build")
        .run(&store)
        .expect("run");
    store
}

#[test]
fn channel_rows_sum_to_daily_totals() {
    let store = generated_store();
    let daily = store.daily_metrics().unwrap();
    let mut sums: BTreeMap<_, [i64; 4]> = BTreeMap::new();
    for c in store.channel_metrics().unwrap() {
        let s = sums.entry(c.date).or_default();
        s[0] += c.sessions;
        s[1] += c.signups;
        s[2] += c.conversions;
        s[3] += c.revenue_cents;
    }

    assert_eq!(sums.len(), daily.len());
    for d in &daily {
        let s = sums[&d.date];
        assert_eq!(s[0], d.sessions, "{}: sessions", d.date);
        assert_eq!(s[1], d.signups, "{}: signups", d.date);
        assert_eq!(s[2], d.conversions, "{}: conversions", d.date);
        assert_eq!(s[3], d.revenue_cents, "{}: revenue cents", d.date);
    }
}

#[test]
fn product_rows_sum_to_daily_totals() {
    let store = generated_store();
    let daily = store.daily_metrics().unwrap();
    let mut sums: BTreeMap<_, [i64; 2]> = BTreeMap::new();
    for p in store.product_metrics().unwrap() {
        let s = sums.entry(p.date).or_default();
        s[0] += p.units_sold;
        s[1] += p.revenue_cents;
    }

    assert_eq!(sums.len(), daily.len());
    for d in &daily {
        let s = sums[&d.date];
        assert_eq!(s[0], d.conversions, "{}: units", d.date);
        assert_eq!(s[1], d.revenue_cents, "{}: revenue cents", d.date);
    }
}

#[test]
fn sql_sums_match_to_the_cent() {
    // Same invariant as seen by an external reader of the REAL columns.
    let store = generated_store();
    let daily = store.daily_metrics().unwrap();
    let channels = store.channel_metrics().unwrap();
    for d in daily.iter().step_by(37) {
        let revenue: f64 = channels
            .iter()
            .filter(|c| c.date == d.date)
            .map(|c| c.revenue_cents as f64 / 100.0)
            .sum();
        assert!((revenue - d.revenue_cents as f64 / 100.0).abs() < 0.005);
    }
}

#[test]
fn breakdown_rows_are_non_negative() {
    let store = generated_store();
    for c in store.channel_metrics().unwrap() {
        assert!(c.sessions >= 0 && c.signups >= 0 && c.conversions >= 0 && c.revenue_cents >= 0);
    }
    for p in store.product_metrics().unwrap() {
        assert!(p.units_sold >= 0 && p.revenue_cents >= 0);
        assert!(p.refunds <= p.units_sold);
        assert!(p.refund_amount >= 0.0);
    }
}

#[test]
fn refunds_track_list_price() {
    let store = generated_store();
    let cfg = GeneratorConfig::default();
    for p in store.product_metrics().unwrap().iter().take(400) {
        let price = cfg
            .products
            .iter()
            .find(|c| c.product_id == p.product_id)
            .map(|c| c.base_price)
            .unwrap();
        let expected = p.refunds as f64 * price * 0.9;
        assert!((p.refund_amount - expected).abs() < 0.006, "{} {}", p.date, p.product_id);
    }
}

#[test]
fn every_channel_and_product_appears_each_day() {
    let store = generated_store();
    let cfg = GeneratorConfig::default();
    let daily_rows = store.daily_metrics().unwrap().len();

    let channels = store.channel_metrics().unwrap();
    for ch in &cfg.channels {
        let n = channels.iter().filter(|c| c.channel_id == ch.channel_id).count();
        assert_eq!(n, daily_rows, "channel {}", ch.channel_id);
        assert!(channels.iter().any(|c| c.channel_name == ch.name));
    }
    let products = store.product_metrics().unwrap();
    for pr in &cfg.products {
        let n = products.iter().filter(|p| p.product_id == pr.product_id).count();
        assert_eq!(n, daily_rows, "product {}", pr.product_id);
    }
}

//! Two runs, same seed, same window.
//! They must produce identical databases, row for row and byte for byte.

use demo_data_core::{config::GeneratorConfig, generator::Generator, store::MetricsStore};
use std::path::Path;

/// Every generated row rendered to text, table by table.
fn dump(store: &MetricsStore) -> Vec<String> {
    let mut out = Vec::new();
    out.extend(store.daily_metrics().unwrap().iter().map(|r| format!("{r:?}")));
    out.extend(store.channel_metrics().unwrap().iter().map(|r| format!("{r:?}")));
    out.extend(store.product_metrics().unwrap().iter().map(|r| format!("{r:?}")));
    out.extend(store.tickets().unwrap().iter().map(|r| format!("{r:?}")));
    out.extend(store.weekly_funnel().unwrap().iter().map(|r| format!("{r:?}")));
    out
}

fn run_in_memory(config: GeneratorConfig) -> Vec<String> {
    let store = MetricsStore::in_memory().expect("in-memory store");
    Generator::build(config).expect("build").run(&store).expect("run");
    dump(&store)
}

fn run_to_file(config: GeneratorConfig, path: &Path) {
    Generator::build(config).expect("build").run_to_path(path).expect("run");
}

#[test]
fn same_seed_produces_identical_rows() {
    let a = run_in_memory(GeneratorConfig::default());
    let b = run_in_memory(GeneratorConfig::default());

    assert_eq!(a.len(), b.len(), "Row counts differ: {} vs {}", a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert_eq!(x, y, "Output diverged at row {i}:\n  A: {x}\n  B: {y}");
    }
}

#[test]
fn same_seed_produces_byte_identical_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path_a = dir.path().join("a.db");
    let path_b = dir.path().join("b.db");
    run_to_file(GeneratorConfig::default(), &path_a);
    run_to_file(GeneratorConfig::default(), &path_b);

    let bytes_a = std::fs::read(&path_a).unwrap();
    let bytes_b = std::fs::read(&path_b).unwrap();
    assert!(!bytes_a.is_empty());
    assert!(bytes_a == bytes_b, "database files differ");
}

#[test]
fn different_seeds_produce_different_rows() {
    let a = run_in_memory(GeneratorConfig { seed: 42, ..GeneratorConfig::default() });
    let b = run_in_memory(GeneratorConfig { seed: 99, ..GeneratorConfig::default() });
    let any_different = a.iter().zip(b.iter()).any(|(x, y)| x != y);
    assert!(any_different, "Different seeds produced identical output; seed is not being used");
}

#[test]
fn regenerating_a_file_discards_previous_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sample_data.db");
    {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE leftover (x INTEGER); INSERT INTO leftover VALUES (1);")
            .unwrap();
    }

    let short = GeneratorConfig {
        start_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        ..GeneratorConfig::default()
    };
    run_to_file(short.clone(), &path);
    run_to_file(short, &path);

    let store = MetricsStore::open(&path).unwrap();
    assert_eq!(store.table_row_count("daily_metrics").unwrap(), 31);
    assert!(store.table_row_count("leftover").is_err(), "old table survived regeneration");
}

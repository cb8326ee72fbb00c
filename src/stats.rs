//! Catalog statistics.
//!
//! A quick summary of what loaded: record count, rejected items, where the
//! records came from, and per-severity and per-model breakdowns. Used by
//! `dtcx stats` to confirm a record source is being read as expected.

use anyhow::Result;
use std::collections::HashMap;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::models::SeverityLevel;
use crate::source;

/// Per-severity and per-model record counts.
#[derive(Debug, Default, PartialEq)]
pub struct CatalogStats {
    /// Count per level 1..=3, most severe first.
    pub by_severity: Vec<(SeverityLevel, usize)>,
    /// Records whose severity is absent or outside the known levels.
    pub unspecified: usize,
    /// Count per model, in facet order.
    pub by_model: Vec<(String, usize)>,
    /// Records without any model code.
    pub no_model: usize,
}

pub fn compute_stats(catalog: &Catalog) -> CatalogStats {
    let mut severity_counts: HashMap<SeverityLevel, usize> = HashMap::new();
    let mut model_counts: HashMap<&str, usize> = HashMap::new();
    let mut stats = CatalogStats::default();

    for record in catalog.records() {
        match record.severity_level() {
            Some(level) => *severity_counts.entry(level).or_default() += 1,
            None => stats.unspecified += 1,
        }
        if record.model_codes.is_empty() {
            stats.no_model += 1;
        }
        for model in &record.model_codes {
            *model_counts.entry(model.as_str()).or_default() += 1;
        }
    }

    stats.by_severity = SeverityLevel::ALL
        .iter()
        .map(|l| (*l, severity_counts.get(l).copied().unwrap_or(0)))
        .collect();
    stats.by_model = catalog
        .facet_models()
        .iter()
        .map(|m| (m.clone(), model_counts.get(m.as_str()).copied().unwrap_or(0)))
        .collect();
    stats
}

/// Run the stats command: load the catalog and print a summary.
pub async fn run_stats(config: &Config) -> Result<()> {
    let catalog = source::load_from_config(config).await;
    let stats = compute_stats(&catalog);

    println!("DTC Explorer — Catalog Stats");
    println!("============================");
    println!();
    println!("  Source:      {}", catalog.origin());
    println!(
        "  Loaded:      {}",
        catalog.loaded_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Records:     {}", catalog.len());
    println!("  Dropped:     {}", catalog.dropped());
    println!("  Models:      {}", catalog.facet_models().len());

    println!();
    println!("  By severity:");
    for (level, count) in &stats.by_severity {
        println!("  {:<24} {:>6}", level.label(), count);
    }
    println!("  {:<24} {:>6}", "unspecified", stats.unspecified);

    if !stats.by_model.is_empty() {
        println!();
        println!("  By model:");
        println!("  {:<24} {:>6}", "MODEL", "DTCS");
        println!("  {}", "-".repeat(31));
        for (model, count) in &stats.by_model {
            println!("  {:<24} {:>6}", model, count);
        }
        if stats.no_model > 0 {
            println!("  {:<24} {:>6}", "(none)", stats.no_model);
        }
    }

    println!();
    Ok(())
}

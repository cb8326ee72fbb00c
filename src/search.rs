//! `dtcx search` and `dtcx facets`.
//!
//! Thin CLI wrappers over [`CatalogStore`]: load the catalog once, apply the
//! criteria from the command line, print the visible view.

use anyhow::Result;
use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::filter::{FilterCriteria, ModelFilter, SeverityFilter};
use crate::models::{DtcRecord, SeverityLevel};
use crate::source;

/// JSON shape of `dtcx search --json`, shared with `GET /records`.
#[derive(Debug, Serialize)]
pub struct SearchResponse<'a> {
    pub criteria: &'a FilterCriteria,
    pub count: usize,
    pub records: Vec<&'a DtcRecord>,
}

impl<'a> SearchResponse<'a> {
    pub fn from_store(store: &'a CatalogStore) -> Self {
        let records = store.visible_records();
        Self {
            criteria: store.criteria(),
            count: records.len(),
            records,
        }
    }
}

/// Build criteria from raw CLI/HTTP inputs.
pub fn build_criteria(
    query: Option<&str>,
    model: Option<&str>,
    severity: SeverityFilter,
) -> FilterCriteria {
    FilterCriteria {
        query: query.unwrap_or_default().to_string(),
        model: ModelFilter::parse(model),
        severity,
    }
}

pub async fn run_search(config: &Config, criteria: FilterCriteria, json: bool) -> Result<()> {
    let catalog = source::load_from_config(config).await;
    let store = CatalogStore::with_criteria(catalog, criteria);

    if json {
        let response = SearchResponse::from_store(&store);
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let visible = store.visible_records();
    if visible.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for record in &visible {
        let models = if record.model_codes.is_empty() {
            String::new()
        } else {
            format!("  [{}]", record.model_codes.join(", "))
        };
        println!(
            "{:<10} {:<4} {}{}",
            record.code,
            record.severity_badge(),
            record.title.as_deref().unwrap_or("—"),
            models
        );
        if let Some(system) = &record.system {
            println!("{:<15} {}", "", system);
        }
    }
    println!();
    println!("{} result(s)", visible.len());

    Ok(())
}

/// JSON shape of `dtcx facets --json`, shared with `GET /facets`.
#[derive(Debug, Serialize)]
pub struct FacetsResponse<'a> {
    pub models: &'a [String],
    pub severities: Vec<SeverityFacet>,
}

#[derive(Debug, Serialize)]
pub struct SeverityFacet {
    pub level: SeverityLevel,
    pub label: &'static str,
}

impl<'a> FacetsResponse<'a> {
    pub fn new(models: &'a [String]) -> Self {
        Self {
            models,
            severities: SeverityLevel::ALL
                .iter()
                .map(|&level| SeverityFacet {
                    level,
                    label: level.label(),
                })
                .collect(),
        }
    }
}

pub async fn run_facets(config: &Config, json: bool) -> Result<()> {
    let catalog = source::load_from_config(config).await;
    let response = FacetsResponse::new(catalog.facet_models());

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    println!("Models:");
    if response.models.is_empty() {
        println!("  (none)");
    }
    for model in response.models {
        println!("  {}", model);
    }
    println!();
    println!("Severities:");
    for facet in &response.severities {
        println!("  {}", facet.label);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogOrigin};
    use crate::normalize::normalize_records;

    #[test]
    fn test_build_criteria_defaults() {
        let k = build_criteria(None, None, SeverityFilter::Any);
        assert_eq!(k, FilterCriteria::default());

        let k = build_criteria(Some("misfire"), Some("9-5"), SeverityFilter::Any);
        assert_eq!(k.query, "misfire");
        assert_eq!(k.model, ModelFilter::Exact("9-5".to_string()));
    }

    #[test]
    fn test_search_response_shape() {
        let catalog = Catalog::new(
            normalize_records(&source::sample_records()),
            CatalogOrigin::Sample {
                reason: "test".to_string(),
            },
        );
        let store = CatalogStore::with_criteria(
            catalog,
            build_criteria(None, Some("9-5"), SeverityFilter::Any),
        );
        let json = serde_json::to_value(SearchResponse::from_store(&store)).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["criteria"]["model"], "9-5");
        assert_eq!(json["records"][0]["code"], "P0300");
    }

    #[test]
    fn test_facets_response_shape() {
        let models = vec!["9-5".to_string()];
        let json = serde_json::to_value(FacetsResponse::new(&models)).unwrap();
        assert_eq!(json["models"][0], "9-5");
        assert_eq!(json["severities"][0]["level"], 1);
        assert_eq!(json["severities"][2]["label"], "3 – Low");
    }
}

//! Catalog and catalog store.
//!
//! A [`Catalog`] is the normalized record set plus its derived model facets.
//! It is built once per load and never patched; a reload replaces it.
//!
//! A [`CatalogStore`] owns the current catalog and the active
//! [`FilterCriteria`] and keeps the visible view in sync: every setter
//! recomputes the sorted, filtered view from scratch, so readers never see
//! a view derived from stale criteria.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::facets::extract_models;
use crate::filter::{filter_sorted, FilterCriteria, ModelFilter, SeverityFilter};
use crate::models::DtcRecord;
use crate::normalize::Normalized;

/// Where a catalog's records came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogOrigin {
    /// Fetched over HTTP.
    Http { url: String },
    /// Read from a local JSON file.
    File { path: String },
    /// Built-in sample records, with the reason they were used.
    Sample { reason: String },
    /// Nothing loaded yet.
    Empty,
}

impl fmt::Display for CatalogOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url } => write!(f, "{}", url),
            Self::File { path } => write!(f, "file:{}", path),
            Self::Sample { reason } => write!(f, "built-in sample ({})", reason),
            Self::Empty => write!(f, "not loaded"),
        }
    }
}

/// The full normalized record set and its facets. Immutable once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    records: Vec<DtcRecord>,
    facet_models: Vec<String>,
    index: HashMap<String, usize>,
    dropped: usize,
    origin: CatalogOrigin,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    pub fn new(normalized: Normalized, origin: CatalogOrigin) -> Self {
        let Normalized { records, dropped } = normalized;
        let facet_models = extract_models(&records);
        let mut index = HashMap::with_capacity(records.len());
        for (i, r) in records.iter().enumerate() {
            index.entry(r.code.clone()).or_insert(i);
        }
        Self {
            records,
            facet_models,
            index,
            dropped,
            origin,
            loaded_at: Utc::now(),
        }
    }

    /// An empty catalog, the state before any load completes.
    pub fn empty() -> Self {
        Self::new(Normalized::default(), CatalogOrigin::Empty)
    }

    /// All records in source order.
    pub fn records(&self) -> &[DtcRecord] {
        &self.records
    }

    /// Distinct model codes across the full catalog, first-seen order.
    pub fn facet_models(&self) -> &[String] {
        &self.facet_models
    }

    /// Exact, case-sensitive lookup against the full catalog.
    pub fn find_by_code(&self, code: &str) -> Option<&DtcRecord> {
        self.index.get(code).map(|&i| &self.records[i])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of raw items the normalizer rejected.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Owns the catalog and the active criteria, and derives the visible view.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    catalog: Arc<Catalog>,
    criteria: FilterCriteria,
    visible: Vec<usize>,
}

impl CatalogStore {
    /// A store with default criteria over `catalog`.
    pub fn new(catalog: impl Into<Arc<Catalog>>) -> Self {
        Self::with_criteria(catalog, FilterCriteria::default())
    }

    pub fn with_criteria(catalog: impl Into<Arc<Catalog>>, criteria: FilterCriteria) -> Self {
        let mut store = Self {
            catalog: catalog.into(),
            criteria,
            visible: Vec::new(),
        };
        store.recompute();
        store
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.recompute();
    }

    pub fn set_model(&mut self, model: ModelFilter) {
        self.criteria.model = model;
        self.recompute();
    }

    pub fn set_severity(&mut self, severity: SeverityFilter) {
        self.criteria.severity = severity;
        self.recompute();
    }

    /// Swap in a freshly loaded catalog. Criteria are kept.
    pub fn replace_catalog(&mut self, catalog: impl Into<Arc<Catalog>>) {
        self.catalog = catalog.into();
        self.recompute();
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn facet_models(&self) -> &[String] {
        self.catalog.facet_models()
    }

    /// Filtered records, ascending by code.
    pub fn visible_records(&self) -> Vec<&DtcRecord> {
        let records = self.catalog.records();
        self.visible.iter().map(|&i| &records[i]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Lookup against the full catalog, ignoring the active criteria.
    pub fn find_by_code(&self, code: &str) -> Option<&DtcRecord> {
        self.catalog.find_by_code(code)
    }

    fn recompute(&mut self) {
        self.visible = filter_sorted(self.catalog.records(), &self.criteria);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::matches;
    use crate::normalize::normalize_records;
    use serde_json::json;

    fn example_catalog() -> Catalog {
        let raw = vec![
            json!({"dtc": "P0300", "title": "Random Misfire", "severity": 1, "model_code": ["9-5"]}),
            json!({"dtc": "C0490-01", "title": "ISM short", "severity": 2, "model_code": ["9-3", "9-5"]}),
        ];
        Catalog::new(
            normalize_records(&raw),
            CatalogOrigin::File {
                path: "test.json".to_string(),
            },
        )
    }

    fn codes(store: &CatalogStore) -> Vec<&str> {
        store.visible_records().iter().map(|r| r.code.as_str()).collect()
    }

    #[test]
    fn test_example_model_filter() {
        let mut store = CatalogStore::new(example_catalog());
        store.set_model(ModelFilter::parse(Some("9-5")));
        assert_eq!(codes(&store), vec!["C0490-01", "P0300"]);
    }

    #[test]
    fn test_example_query_filter() {
        let mut store = CatalogStore::new(example_catalog());
        store.set_query("misfire");
        assert_eq!(codes(&store), vec!["P0300"]);
    }

    #[test]
    fn test_setters_recompute() {
        let mut store = CatalogStore::new(example_catalog());
        assert_eq!(store.visible_count(), 2);

        store.set_severity(SeverityFilter::from_number(2).unwrap());
        assert_eq!(codes(&store), vec!["C0490-01"]);

        store.set_model(ModelFilter::parse(Some("9-3")));
        assert_eq!(codes(&store), vec!["C0490-01"]);

        store.set_severity(SeverityFilter::Any);
        store.set_query("p03");
        assert!(codes(&store).is_empty());

        store.set_model(ModelFilter::Any);
        assert_eq!(codes(&store), vec!["P0300"]);
    }

    #[test]
    fn test_visible_sorted_and_matching() {
        let mut store = CatalogStore::new(example_catalog());
        for q in ["", "i", "s", "zzz"] {
            store.set_query(q);
            let visible = store.visible_records();
            assert!(visible.windows(2).all(|w| w[0].code <= w[1].code));
            assert!(visible.iter().all(|r| matches(r, store.criteria())));
        }
    }

    #[test]
    fn test_find_by_code_ignores_filter() {
        let mut store = CatalogStore::new(example_catalog());
        store.set_query("misfire");
        let r = store.find_by_code("C0490-01").expect("full catalog lookup");
        assert_eq!(r.title.as_deref(), Some("ISM short"));
        assert!(store.find_by_code("c0490-01").is_none());
        assert!(store.find_by_code("P9999").is_none());
    }

    #[test]
    fn test_find_by_code_returns_member() {
        let catalog = example_catalog();
        for r in catalog.records() {
            assert_eq!(catalog.find_by_code(&r.code), Some(r));
        }
    }

    #[test]
    fn test_facets_not_shrunk_by_filter() {
        let mut store = CatalogStore::new(example_catalog());
        store.set_model(ModelFilter::parse(Some("9-3")));
        assert_eq!(store.facet_models(), &["9-5".to_string(), "9-3".to_string()]);
    }

    #[test]
    fn test_replace_catalog_keeps_criteria() {
        let mut store = CatalogStore::new(Catalog::empty());
        store.set_query("misfire");
        assert_eq!(store.visible_count(), 0);

        store.replace_catalog(example_catalog());
        assert_eq!(store.criteria().query, "misfire");
        assert_eq!(codes(&store), vec!["P0300"]);
    }

    #[test]
    fn test_origin_display() {
        let origin = CatalogOrigin::Sample {
            reason: "no source configured".to_string(),
        };
        assert_eq!(origin.to_string(), "built-in sample (no source configured)");
    }

    #[test]
    fn test_empty_catalog_is_not_sample() {
        let catalog = Catalog::empty();
        assert!(catalog.is_empty());
        assert_eq!(catalog.origin(), &CatalogOrigin::Empty);
        assert_eq!(catalog.origin().to_string(), "not loaded");
        assert_eq!(
            serde_json::to_value(catalog.origin()).unwrap(),
            serde_json::json!({"kind": "empty"})
        );
    }
}

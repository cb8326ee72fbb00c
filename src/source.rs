//! Record sources and catalog loading.
//!
//! A [`RecordSource`] supplies the raw JSON array of trouble-code records.
//! Two sources are built in:
//!
//! | Source | Config | Fetches |
//! |--------|--------|---------|
//! | [`HttpSource`] | `[source].url` | `GET <url>`, expects a JSON array |
//! | [`FileSource`] | `[source].path` | a local JSON file holding an array |
//!
//! [`load_catalog`] is the single load step: it runs the source once and
//! either installs the normalized result or, on any failure, the built-in
//! sample set. A failed load is logged, never returned as an error, so the
//! catalog is never left empty by a bad source. There are no retries.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::{Catalog, CatalogOrigin};
use crate::config::Config;
use crate::normalize::normalize_records;

/// Something that can produce the raw record array.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Where the records come from, for logging and stats.
    fn origin(&self) -> CatalogOrigin;

    /// Fetch the raw records. Must fail if the payload is not a JSON array.
    async fn fetch(&self) -> Result<Vec<Value>>;
}

/// Fetches records with a single HTTP GET.
pub struct HttpSource {
    url: String,
    timeout: Duration,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[async_trait]
impl RecordSource for HttpSource {
    fn origin(&self) -> CatalogOrigin {
        CatalogOrigin::Http {
            url: self.url.clone(),
        }
    }

    async fn fetch(&self) -> Result<Vec<Value>> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let response = client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to reach record source: {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Record source returned {}", status);
        }

        let body: Value = response
            .json()
            .await
            .with_context(|| "Record source did not return valid JSON")?;
        into_array(body)
    }
}

/// Reads records from a local JSON file.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RecordSource for FileSource {
    fn origin(&self) -> CatalogOrigin {
        CatalogOrigin::File {
            path: self.path.display().to_string(),
        }
    }

    async fn fetch(&self) -> Result<Vec<Value>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read record file: {}", self.path.display()))?;
        let body: Value = serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in record file: {}", self.path.display()))?;
        into_array(body)
    }
}

fn into_array(body: Value) -> Result<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        other => bail!("Expected a JSON array of records, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build the configured source, if any.
pub fn source_from_config(config: &Config) -> Option<Box<dyn RecordSource>> {
    let src = &config.source;
    if let Some(url) = &src.url {
        return Some(Box::new(HttpSource::new(
            url.clone(),
            Duration::from_secs(src.timeout_secs),
        )));
    }
    src.path
        .as_ref()
        .map(|p| Box::new(FileSource::new(p.clone())) as Box<dyn RecordSource>)
}

/// Run one load and produce the catalog to install.
///
/// Falls back to [`sample_records`] when no source is given or the source
/// fails for any reason.
pub async fn load_catalog(source: Option<&dyn RecordSource>) -> Catalog {
    let Some(source) = source else {
        info!("no record source configured, using built-in sample");
        return sample_catalog("no source configured");
    };

    let origin = source.origin();
    match source.fetch().await {
        Ok(raw) => {
            let normalized = normalize_records(&raw);
            if normalized.dropped > 0 {
                warn!(
                    source = %origin,
                    dropped = normalized.dropped,
                    "skipped records without a usable code"
                );
            }
            let catalog = Catalog::new(normalized, origin);
            info!(
                source = %catalog.origin(),
                records = catalog.len(),
                models = catalog.facet_models().len(),
                "catalog loaded"
            );
            catalog
        }
        Err(e) => {
            let error = format!("{:#}", e);
            warn!(source = %origin, error = %error, "record source failed, using built-in sample");
            sample_catalog(&format!("{} unavailable", origin))
        }
    }
}

/// Load using whatever `[source]` the config names.
pub async fn load_from_config(config: &Config) -> Catalog {
    let source = source_from_config(config);
    load_catalog(source.as_deref()).await
}

fn sample_catalog(reason: &str) -> Catalog {
    Catalog::new(
        normalize_records(&sample_records()),
        CatalogOrigin::Sample {
            reason: reason.to_string(),
        },
    )
}

/// Built-in records shown when no source is available.
pub fn sample_records() -> Vec<Value> {
    vec![
        json!({
            "dtc": "C0490-01",
            "title": "ISM-SCL lead short circuited to B+",
            "system": "CIM Body • Immobilizer/Steering",
            "severity": 2,
            "model_code": ["9400", "9-3 NG"],
            "criteria_activation": "Diagnostics runs when key is removed.",
            "fault_criteria": "ISM-SCL lead short circuited to B+",
            "system_reaction": "None",
            "harness_checks": "Move the wiring harness at several spots and in several directions to reveal intermittent breaks and short-circuits.",
            "diag_help": "Check switches, connectors and crimp connections for oxidation.",
            "oem_procedure_url": "https://z90.pl/saab/dtc/read.php?model=9400&doc=idb10943"
        }),
        json!({
            "dtc": "P0300",
            "title": "Random/Multiple Cylinder Misfire",
            "system": "Engine • Trionic",
            "severity": 1,
            "model_code": ["9000", "9-5"],
            "criteria_activation": "Engine running.",
            "fault_criteria": "Ionization current indicates misfire above threshold.",
            "system_reaction": "MIL on, torque reduction.",
            "harness_checks": "Inspect DI cassette, plugs, grounds, injector connectors.",
            "diag_help": "On Trionic 5/7 check for vacuum leaks, crank sensor, fuel pressure."
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Json, Router};
    use std::io::Write;

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        fn origin(&self) -> CatalogOrigin {
            CatalogOrigin::Http {
                url: "http://unreachable.invalid/dtc-index.json".to_string(),
            }
        }

        async fn fetch(&self) -> Result<Vec<Value>> {
            bail!("connection refused")
        }
    }

    /// Serve `router` on an ephemeral local port; returns the record URL.
    async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/dtc-index.json", addr)
    }

    fn http_source(url: &str) -> HttpSource {
        HttpSource::new(url, Duration::from_secs(5))
    }

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_sample_records_all_valid() {
        let out = normalize_records(&sample_records());
        assert_eq!(out.dropped, 0);
        assert_eq!(out.records.len(), 2);
    }

    #[tokio::test]
    async fn test_no_source_uses_sample() {
        let catalog = load_catalog(None).await;
        assert_eq!(catalog.len(), 2);
        assert!(matches!(catalog.origin(), CatalogOrigin::Sample { .. }));
    }

    #[tokio::test]
    async fn test_failed_source_falls_back() {
        let catalog = load_catalog(Some(&FailingSource)).await;
        assert!(catalog.find_by_code("P0300").is_some());
        match catalog.origin() {
            CatalogOrigin::Sample { reason } => assert!(reason.contains("unreachable.invalid")),
            other => panic!("expected sample origin, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_file_source_loads_and_counts_dropped() {
        let f = write_temp(r#"[{"dtc": "B1000", "model_code": "9-5"}, {"title": "orphan"}]"#);
        let source = FileSource::new(f.path());
        let catalog = load_catalog(Some(&source)).await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.dropped(), 1);
        assert_eq!(catalog.facet_models(), &["9-5".to_string()]);
        assert!(matches!(catalog.origin(), CatalogOrigin::File { .. }));
    }

    #[tokio::test]
    async fn test_file_source_rejects_non_array() {
        let f = write_temp(r#"{"dtc": "B1000"}"#);
        let source = FileSource::new(f.path());
        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("an object"));

        let catalog = load_catalog(Some(&source)).await;
        assert!(matches!(catalog.origin(), CatalogOrigin::Sample { .. }));
    }

    #[tokio::test]
    async fn test_file_source_invalid_json_falls_back() {
        let f = write_temp("not json at all");
        let source = FileSource::new(f.path());
        let catalog = load_catalog(Some(&source)).await;
        assert_eq!(catalog.len(), 2);
    }

    #[tokio::test]
    async fn test_file_source_empty_array_is_not_fallback() {
        let f = write_temp("[]");
        let source = FileSource::new(f.path());
        let catalog = load_catalog(Some(&source)).await;
        assert!(catalog.is_empty());
    }

    #[tokio::test]
    async fn test_http_source_server_error_falls_back() {
        let router = Router::new().route(
            "/dtc-index.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let url = serve(router).await;
        let source = http_source(&url);

        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("500"));

        let catalog = load_catalog(Some(&source)).await;
        assert_eq!(catalog.len(), 2);
        assert!(matches!(catalog.origin(), CatalogOrigin::Sample { .. }));
    }

    #[tokio::test]
    async fn test_http_source_object_body_falls_back() {
        let router = Router::new().route(
            "/dtc-index.json",
            get(|| async { Json(json!({"dtc": "B1000"})) }),
        );
        let url = serve(router).await;
        let source = http_source(&url);

        let err = source.fetch().await.unwrap_err();
        assert!(err.to_string().contains("an object"));

        let catalog = load_catalog(Some(&source)).await;
        assert!(catalog.find_by_code("B1000").is_none());
        assert!(matches!(catalog.origin(), CatalogOrigin::Sample { .. }));
    }

    #[tokio::test]
    async fn test_http_source_invalid_json_falls_back() {
        let router = Router::new().route("/dtc-index.json", get(|| async { "not json" }));
        let url = serve(router).await;

        let catalog = load_catalog(Some(&http_source(&url))).await;
        assert_eq!(catalog.len(), 2);
        assert!(matches!(catalog.origin(), CatalogOrigin::Sample { .. }));
    }

    #[tokio::test]
    async fn test_http_source_loads_array() {
        let router = Router::new().route(
            "/dtc-index.json",
            get(|| async {
                Json(json!([
                    {"dtc": "B1000", "model_code": "9-5", "severity": 2},
                    {"title": "orphan"}
                ]))
            }),
        );
        let url = serve(router).await;

        let catalog = load_catalog(Some(&http_source(&url))).await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.dropped(), 1);
        assert_eq!(catalog.find_by_code("B1000").and_then(|r| r.severity), Some(2));
        assert_eq!(catalog.origin(), &CatalogOrigin::Http { url });
    }

    #[test]
    fn test_source_from_config() {
        let mut cfg = Config::minimal();
        assert!(source_from_config(&cfg).is_none());

        cfg.source.path = Some(PathBuf::from("/data/dtc-index.json"));
        let src = source_from_config(&cfg).unwrap();
        assert_eq!(
            src.origin(),
            CatalogOrigin::File {
                path: "/data/dtc-index.json".to_string()
            }
        );

        cfg.source.path = None;
        cfg.source.url = Some("http://localhost:8080/data/dtc-index.json".to_string());
        let src = source_from_config(&cfg).unwrap();
        assert!(matches!(src.origin(), CatalogOrigin::Http { .. }));
    }
}

//! Single-record retrieval: `dtcx get`, `dtcx link`, `dtcx resolve`.
//!
//! All three look up against the full catalog, never a filtered view, so a
//! shared link resolves no matter what filters the reader has active.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::deeplink::{encode_fragment, share_link, DeepLinkSync};
use crate::models::DtcRecord;
use crate::source;

/// Fragment and full URL for one record, shared with `GET /link/{code}`.
#[derive(Debug, Clone, Serialize)]
pub struct LinkResponse {
    pub code: String,
    pub fragment: String,
    pub url: String,
}

impl LinkResponse {
    pub fn new(base_url: &str, record: &DtcRecord) -> Result<Self> {
        Ok(Self {
            code: record.code.clone(),
            fragment: format!("#{}", encode_fragment(&record.code)),
            url: share_link(base_url, &record.code)?,
        })
    }
}

pub async fn run_get(config: &Config, code: &str, json: bool) -> Result<()> {
    let store = CatalogStore::new(source::load_from_config(config).await);
    let Some(record) = store.find_by_code(code) else {
        bail!("record not found: {}", code);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print_record(record);
    }
    Ok(())
}

pub async fn run_link(config: &Config, code: &str) -> Result<()> {
    let store = CatalogStore::new(source::load_from_config(config).await);
    let Some(record) = store.find_by_code(code) else {
        bail!("record not found: {}", code);
    };

    let link = LinkResponse::new(&config.server.base_url, record)?;
    println!("{}", link.url);
    Ok(())
}

/// Resolve a fragment the way a page load would. An unresolvable fragment
/// is not an error: it prints "No selection." and succeeds.
pub async fn run_resolve(config: &Config, fragment: &str, json: bool) -> Result<()> {
    let store = CatalogStore::new(source::load_from_config(config).await);
    let mut sync = DeepLinkSync::new();
    let selected = sync.navigate(fragment, &store);

    if json {
        let body = serde_json::json!({ "selected": selected });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    match selected {
        Some(record) => print_record(record),
        None => println!("No selection."),
    }
    Ok(())
}

fn print_record(record: &DtcRecord) {
    println!("--- {} ---", record.code);
    println!(
        "title:        {}",
        record.title.as_deref().unwrap_or("—")
    );
    if let Some(system) = &record.system {
        println!("system:       {}", system);
    }
    let severity = match record.severity_level() {
        Some(level) => level.label().to_string(),
        None => record.severity_badge(),
    };
    println!("severity:     {}", severity);
    if !record.model_codes.is_empty() {
        println!("models:       {}", record.model_codes.join(", "));
    }
    if let Some(url) = &record.procedure_url {
        println!("procedure:    {}", url);
    }

    for (label, value) in record.details() {
        println!();
        println!("{}:", label);
        println!("  {}", value);
    }
}

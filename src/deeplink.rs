//! Deep-link synchronization between the selected record and the URL
//! fragment.
//!
//! The fragment is query-string shaped with a single recognized key:
//!
//! ```text
//! #dtc=C0490-01
//! ```
//!
//! [`DeepLinkSync`] is a two-trigger state machine. Selection events write
//! the fragment ([`DeepLinkSync::select`], [`DeepLinkSync::clear`]) and never
//! read it back. Navigation events ([`DeepLinkSync::navigate`]) read the
//! fragment and resolve it against the full catalog; an unknown code, or an
//! empty catalog, degrades to "nothing selected".

use anyhow::{Context, Result};
use tracing::debug;
use url::form_urlencoded;
use url::Url;

use crate::catalog::CatalogStore;
use crate::models::DtcRecord;

/// The only fragment key this crate reads or writes.
pub const FRAGMENT_KEY: &str = "dtc";

/// Serialize a record code as a fragment body (no leading `#`).
pub fn encode_fragment(code: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(code.as_bytes()).collect();
    format!("{}={}", FRAGMENT_KEY, encoded)
}

/// Extract and decode the `dtc` value from a fragment.
///
/// Accepts the fragment with or without a leading `#`. Unrecognized keys are
/// ignored; the first non-empty `dtc` value wins.
pub fn parse_fragment(fragment: &str) -> Option<String> {
    let body = fragment.strip_prefix('#').unwrap_or(fragment);
    form_urlencoded::parse(body.as_bytes())
        .find(|(k, v)| k == FRAGMENT_KEY && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

/// Full shareable URL for `code`: `base_url` with its fragment replaced.
pub fn share_link(base_url: &str, code: &str) -> Result<String> {
    let mut url =
        Url::parse(base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;
    url.set_fragment(Some(&encode_fragment(code)));
    Ok(url.into())
}

/// Keeps the selected record id and the address fragment consistent.
#[derive(Debug, Clone, Default)]
pub struct DeepLinkSync {
    selected: Option<String>,
    fragment: String,
}

impl DeepLinkSync {
    /// Unselected, empty fragment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection event: select `record` and write its fragment.
    pub fn select(&mut self, record: &DtcRecord) -> &str {
        self.selected = Some(record.code.clone());
        self.fragment = encode_fragment(&record.code);
        &self.fragment
    }

    /// Selection event: clear the selection and the fragment.
    pub fn clear(&mut self) {
        self.selected = None;
        self.fragment.clear();
    }

    /// Navigation event: adopt `fragment` and resolve it against the store's
    /// full catalog.
    pub fn navigate<'a>(&mut self, fragment: &str, store: &'a CatalogStore) -> Option<&'a DtcRecord> {
        self.fragment = fragment.strip_prefix('#').unwrap_or(fragment).to_string();

        let resolved = parse_fragment(fragment).and_then(|code| {
            let hit = store.find_by_code(&code);
            if hit.is_none() {
                debug!(code = %code, "deep link does not resolve, clearing selection");
            }
            hit
        });

        self.selected = resolved.map(|r| r.code.clone());
        resolved
    }

    /// Code of the current selection, if any.
    pub fn selected_code(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Current selection resolved against `store`. `None` if the selected
    /// code is no longer in the catalog.
    pub fn selection<'a>(&self, store: &'a CatalogStore) -> Option<&'a DtcRecord> {
        self.selected
            .as_deref()
            .and_then(|code| store.find_by_code(code))
    }

    /// The fragment as last written or navigated to, without `#`.
    pub fn fragment(&self) -> &str {
        &self.fragment
    }
}

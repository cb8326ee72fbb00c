//! # DTC Explorer
//!
//! Search, filter, and deep-link into a catalog of automotive diagnostic
//! trouble codes (DTCs).
//!
//! DTC Explorer loads a loosely-shaped JSON record set, normalizes it into
//! canonical records, and serves a filtered, sorted view driven by a free-text
//! query, a vehicle model, and a severity level. A single record can be
//! addressed with a URL fragment (`#dtc=P0300`) that resolves against the
//! full catalog regardless of the active filters.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────┐   ┌──────────────┐
//! │ RecordSource│──▶│ Normalizer │──▶│   Catalog    │
//! │ HTTP / File │   │ text+record│   │ records+facet│
//! └─────────────┘   └────────────┘   └──────┬───────┘
//!                                           │
//!                    ┌──────────────────────┤
//!                    ▼                      ▼
//!             ┌──────────────┐       ┌──────────────┐
//!             │ CatalogStore │◀──────│ DeepLinkSync │
//!             │ filter+sort  │       │ #dtc=<code>  │
//!             └──────┬───────┘       └──────────────┘
//!                    │
//!          ┌─────────┴─────────┐
//!          ▼                   ▼
//!     ┌──────────┐       ┌──────────┐
//!     │   CLI    │       │   HTTP   │
//!     │  (dtcx)  │       │  (axum)  │
//!     └──────────┘       └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! dtcx search misfire
//! dtcx search --model 9-5 --severity 1
//! dtcx get C0490-01
//! dtcx link P0300
//! dtcx resolve '#dtc=C0490-01'
//! dtcx serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Canonical record and severity types |
//! | [`normalize`] | Record and text normalization |
//! | [`facets`] | Model facet extraction |
//! | [`filter`] | Multi-criteria filter engine |
//! | [`catalog`] | Catalog and catalog store |
//! | [`deeplink`] | URL fragment synchronization |
//! | [`source`] | Record sources and fallback loading |
//! | [`search`] | `search` and `facets` commands |
//! | [`get`] | `get`, `link`, and `resolve` commands |
//! | [`stats`] | `stats` command |
//! | [`server`] | HTTP API |

pub mod catalog;
pub mod config;
pub mod deeplink;
pub mod facets;
pub mod filter;
pub mod get;
pub mod models;
pub mod normalize;
pub mod search;
pub mod server;
pub mod source;
pub mod stats;

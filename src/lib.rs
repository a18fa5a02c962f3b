// NEO Catalog - Core Library
// Near-Earth objects + close approaches: load, link, filter, export.
// Exposes all modules for use in the CLI, API server, and tests

pub mod catalog;
pub mod config;
pub mod entities;
pub mod error;
pub mod export;
pub mod filters;
pub mod parser;
pub mod temporal;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use catalog::{ApproachRecord, Catalog, CatalogStats, Query};
pub use config::Settings;
pub use entities::{ApproachId, CloseApproach, NearEarthObject, NeoId};
pub use error::{ExportError, FilterError, LookupError};
pub use export::{
    limit, read_csv_rows, write_csv, write_json, write_results, write_to_csv, write_to_json,
    ExportedRow, Limit,
};
pub use filters::{create_filters, AttributeFilter, Comparator, FilterConfig, FilterKind};
pub use parser::{load_approaches, load_neos, read_approaches, read_neos};
pub use temporal::{cd_to_datetime, datetime_to_cd, datetime_to_str, parse_date, str_to_datetime};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Lint [STAC](https://stacspec.org) objects against the STAC best practices.
//!
//! Linting is separate from schema validation: a [Linter] reads an already
//! parsed [StacObject] and the [ValidationResult] of validating it, and
//! produces a [Report] of best-practices violations.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use stac_check::{Linter, RuleConfig, StacObject, ValidationResult};
//!
//! let config = RuleConfig::with_override(None).unwrap();
//! let linter = Linter::new(config);
//! let object = StacObject::new(json!({
//!     "type": "Feature",
//!     "id": "an-item",
//!     "geometry": {"type": "Point", "coordinates": [120.0, 40.0]},
//!     "properties": {"datetime": null}
//! }))
//! .unwrap();
//! let report = linter.lint(&object, &ValidationResult::default()).unwrap();
//! assert!(report.violations.contains("datetime_null"));
//! assert_eq!(report.geometry_errors[0], "Geometry Validation Errors [BETA]: ");
//! ```
//!
//! # Configuration
//!
//! Rules are switched on and off, and thresholds set, by a YAML
//! configuration. See [config] for its shape and how overrides are applied.

#![warn(missing_docs, unused_crate_dependencies, unused_qualifications)]

mod asset_type;
pub mod config;
mod error;
pub mod geometry;
pub mod href;
mod linter;
mod object;
mod report;
pub mod rules;
mod validation;

pub use {
    asset_type::AssetType,
    config::{MergePolicy, RuleConfig},
    error::Error,
    href::SelfHref,
    linter::Linter,
    object::{Field, Link, StacObject},
    report::{BEST_PRACTICES_HEADER, GEOMETRY_ERRORS_HEADER, GEOMETRY_KEYS, Report, Violations},
    validation::{LATEST_STAC_VERSION, ValidationResult},
};

/// Custom [Result](std::result::Result) type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
use {assert_json_diff as _, rstest as _, tempfile as _};

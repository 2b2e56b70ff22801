//! Validate STAC objects with [json-schema](https://json-schema.org/).
//!
//! # Examples
//!
//! All fetched schemas are cached, so if you're doing multiple validations,
//! you should re-use the same [Validator]:
//!
//! ```no_run
//! use serde_json::json;
//! use stac_check::StacObject;
//! use stac_check_validate::Validator;
//!
//! let mut validator = Validator::new().unwrap();
//! for i in 0..10 {
//!     let item = StacObject::new(json!({
//!         "type": "Feature",
//!         "stac_version": "1.1.0",
//!         "id": format!("item-{i}"),
//!     }))
//!     .unwrap();
//!     let result = validator.validate(&item);
//!     println!("{}: {}", i, result.valid_stac);
//! }
//! ```
//!
//! Validation never fails outright. Errors are classified into the
//! [ValidationResult](stac_check::ValidationResult) instead:
//!
//! | error                       | `error_type`                |
//! |-----------------------------|-----------------------------|
//! | missing `type` or version   | `KeyError`                  |
//! | json-schema violation       | `JSONSchemaValidationError` |
//! | a schema can't be fetched   | `HTTPError`                 |
//! | anything else               | `ValueError`                |

#![warn(missing_docs, unused_crate_dependencies)]

mod error;
mod validator;

pub use {
    error::{Error, Validation},
    validator::Validator,
};

/// Public result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

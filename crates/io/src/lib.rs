//! Read STAC objects for linting.
//!
//! Objects can be read from local paths or urls, one at a time, by walking a
//! catalog tree, or by paging through a STAC API endpoint.
//!
//! # Examples
//!
//! ```
//! let object = stac_check_io::read("../core/data/core-item.json").unwrap();
//! assert_eq!(object.id(), Some("core-item"));
//! ```
//!
//! Requests can carry extra headers, e.g. for authentication:
//!
//! ```no_run
//! use stac_check_io::Reader;
//!
//! let reader = Reader::new(vec![("x-api-key".to_string(), "a-key".to_string())]).unwrap();
//! let object = reader.read("https://stac.test/catalog.json").unwrap();
//! ```

#![warn(missing_docs, unused_crate_dependencies)]

mod error;
mod pages;
mod read;
mod realized_href;
mod walk;

pub use {
    error::Error,
    pages::{ObjectList, Pages},
    read::{Reader, read},
    realized_href::RealizedHref,
    walk::Walk,
};

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Returns a string suitable for use as a HTTP user agent.
pub fn user_agent() -> &'static str {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
use {mockito as _, rstest as _, tempfile as _};

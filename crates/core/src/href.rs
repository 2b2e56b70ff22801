//! Utilities for working with the hrefs that STAC objects are read from.

use crate::Result;
use std::borrow::Cow;
use url::Url;

/// Allows getting and setting the href an object was read from.
///
/// The self href isn't part of the data structure, but several lint rules
/// depend on it (e.g. item ids should match their file names). Objects that
/// were handed to the linter already parsed don't have an href.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_check::{SelfHref, StacObject};
///
/// let mut object = StacObject::new(json!({"type": "Feature", "id": "an-id"})).unwrap();
/// assert!(object.self_href().is_none());
/// object.set_self_href("items/an-id.json");
/// assert_eq!(object.self_href(), Some("items/an-id.json"));
/// ```
pub trait SelfHref {
    /// Gets this object's href.
    fn self_href(&self) -> Option<&str>;

    /// Returns a mutable reference to this object's self href.
    fn self_href_mut(&mut self) -> &mut Option<String>;

    /// Sets this object's self href.
    fn set_self_href(&mut self, href: impl ToString) {
        *self.self_href_mut() = Some(href.to_string())
    }

    /// Clear's this object's self href.
    fn clear_self_href(&mut self) {
        *self.self_href_mut() = None
    }
}

/// Returns `true` if the href is absolute.
///
/// An href is absolute if it can be parsed to a url or starts with a `/`.
pub fn is_absolute(href: &str) -> bool {
    Url::parse(href).is_ok() || href.starts_with('/')
}

/// Returns `true` if the href is an http(s) url.
pub fn is_url(href: &str) -> bool {
    Url::parse(href)
        .map(|url| matches!(url.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Makes an href absolute relative to a base.
///
/// # Examples
///
/// ```
/// assert_eq!(stac_check::href::make_absolute("./item.json", "/a/b").unwrap(), "/a/item.json");
/// assert_eq!(stac_check::href::make_absolute("./item.json", "/a/b/").unwrap(), "/a/b/item.json");
/// assert_eq!(stac_check::href::make_absolute("http://stac.test/item.json", "/a/b/").unwrap(), "http://stac.test/item.json");
/// ```
pub fn make_absolute<'a>(href: &'a str, base: &str) -> Result<Cow<'a, str>> {
    if is_absolute(href) {
        Ok(href.into())
    } else if let Ok(url) = Url::parse(base) {
        let url = url.join(href)?;
        Ok(url.to_string().into())
    } else {
        let (base, _) = base.split_at(base.rfind('/').unwrap_or(0));
        if base.is_empty() {
            Ok(normalize_path(href).into())
        } else {
            Ok(normalize_path(&format!("{}/{}", base, href)).into())
        }
    }
}

/// Returns the file name of an href without its directory or final extension.
///
/// Query strings and fragments of urls are ignored.
///
/// # Examples
///
/// ```
/// assert_eq!(stac_check::href::file_stem("/a/b/core-item.json"), "core-item");
/// assert_eq!(stac_check::href::file_stem("https://stac.test/items/an-item.json?x=y"), "an-item");
/// ```
pub fn file_stem(href: &str) -> &str {
    let path = match href.find(['?', '#']) {
        Some(index) if is_url(href) => &href[..index],
        _ => href,
    };
    let file_name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(index) => &file_name[..index],
    }
}

fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "." => {}
            ".." => match parts.last() {
                // Can't go above the root.
                Some(&"") => {}
                Some(&"..") | None => parts.push(".."),
                Some(_) => {
                    let _ = parts.pop();
                }
            },
            s => parts.push(s),
        }
    }
    parts.join("/")
}

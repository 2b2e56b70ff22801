//! A loosely-typed STAC object and the accessors the lint rules read it through.

use crate::{AssetType, Error, Result, SelfHref, href};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A parsed STAC document: any JSON object, plus the href it was read from.
///
/// The linter has to cope with drafts and almost-valid documents, so this
/// isn't a strongly-typed Item/Collection/Catalog. Fields are read through
/// accessors that treat a missing or mistyped field as absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StacObject {
    object: Map<String, Value>,

    #[serde(skip)]
    self_href: Option<String>,
}

/// The state of an optional JSON field.
///
/// STAC distinguishes between a field that isn't there and one that is
/// explicitly `null` (e.g. an unlocated item has `"geometry": null`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    /// The key isn't in the object.
    Absent,

    /// The key is present and its value is `null`.
    Null,

    /// The key is present with a non-null value.
    Present(&'a Value),
}

/// A link, as far as the linter cares about it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link<'a> {
    /// The `rel` field, if it is a string.
    pub rel: Option<&'a str>,

    /// The `href` field, if it is a string.
    pub href: Option<&'a str>,

    /// Whether the link has a `title` key.
    pub has_title: bool,
}

impl StacObject {
    /// Creates a new object from a JSON value.
    ///
    /// Fails with [Error::NotAnObject] if the value isn't a JSON object.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_check::StacObject;
    ///
    /// let object = StacObject::new(json!({"type": "Feature", "id": "an-id"})).unwrap();
    /// assert_eq!(object.id(), Some("an-id"));
    /// assert!(StacObject::new(json!([1, 2])).is_err());
    /// ```
    pub fn new(value: Value) -> Result<StacObject> {
        match value {
            Value::Object(object) => Ok(StacObject {
                object,
                self_href: None,
            }),
            _ => Err(Error::NotAnObject(value)),
        }
    }

    /// Creates a new object from JSON bytes, recording where they came from.
    pub fn from_slice(slice: &[u8], href: impl ToString) -> Result<StacObject> {
        let value: Value = serde_json::from_slice(slice)?;
        let mut object = StacObject::new(value)?;
        object.set_self_href(href);
        Ok(object)
    }

    /// Returns the underlying JSON object.
    pub fn as_object(&self) -> &Map<String, Value> {
        &self.object
    }

    /// Consumes this object and returns the underlying JSON object.
    pub fn into_object(self) -> Map<String, Value> {
        self.object
    }

    /// Returns the state of a top-level field.
    pub fn field(&self, key: &str) -> Field<'_> {
        Field::from(self.object.get(key))
    }

    /// Returns the asset type derived from the document's structure.
    pub fn asset_type(&self) -> Option<AssetType> {
        AssetType::from_object(&self.object)
    }

    /// Returns the `id`, if it is a string.
    pub fn id(&self) -> Option<&str> {
        self.object.get("id").and_then(Value::as_str)
    }

    /// Returns the `stac_version`, if it is a string.
    pub fn stac_version(&self) -> Option<&str> {
        self.object.get("stac_version").and_then(Value::as_str)
    }

    /// Returns the name this object is expected to have on disk.
    ///
    /// This is the file name of the self href without its directory and
    /// extension, or the object's own id if it wasn't read from an href.
    pub fn asset_name(&self) -> &str {
        match self.self_href.as_deref() {
            Some(href) => href::file_stem(href),
            None => self.id().unwrap_or_default(),
        }
    }

    /// Returns the `links` array, or `None` if there isn't one.
    pub fn links(&self) -> Option<&Vec<Value>> {
        self.object.get("links").and_then(Value::as_array)
    }

    /// Iterates over the link objects, skipping anything that isn't an object.
    pub fn iter_links(&self) -> impl Iterator<Item = Link<'_>> {
        self.links()
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .map(|link| Link {
                rel: link.get("rel").and_then(Value::as_str),
                href: link.get("href").and_then(Value::as_str),
                has_title: link.contains_key("title"),
            })
    }

    /// Returns the `assets` object.
    pub fn assets(&self) -> Option<&Map<String, Value>> {
        self.object.get("assets").and_then(Value::as_object)
    }

    /// Returns a single asset by key.
    pub fn asset(&self, key: &str) -> Option<&Map<String, Value>> {
        self.assets()
            .and_then(|assets| assets.get(key))
            .and_then(Value::as_object)
    }

    /// Returns the `properties` object.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.object.get("properties").and_then(Value::as_object)
    }

    /// Returns the state of a field inside `properties`.
    pub fn property(&self, key: &str) -> Field<'_> {
        Field::from(self.properties().and_then(|properties| properties.get(key)))
    }

    /// Returns the state of the `geometry` field.
    pub fn geometry(&self) -> Field<'_> {
        self.field("geometry")
    }

    /// Returns the `bbox` as numbers.
    ///
    /// Returns `None` if there's no bbox or if any element isn't a number.
    pub fn bbox(&self) -> Option<Vec<f64>> {
        self.object
            .get("bbox")
            .and_then(Value::as_array)
            .and_then(|bbox| bbox.iter().map(Value::as_f64).collect())
    }

    /// Returns the raw `bbox` numbers, keeping their JSON representation for display.
    pub fn bbox_numbers(&self) -> Option<Vec<&serde_json::Number>> {
        self.object
            .get("bbox")
            .and_then(Value::as_array)
            .and_then(|bbox| {
                bbox.iter()
                    .map(|value| match value {
                        Value::Number(number) => Some(number),
                        _ => None,
                    })
                    .collect()
            })
    }

    /// Returns the state of the `summaries` field.
    pub fn summaries(&self) -> Field<'_> {
        self.field("summaries")
    }
}

impl SelfHref for StacObject {
    fn self_href(&self) -> Option<&str> {
        self.self_href.as_deref()
    }

    fn self_href_mut(&mut self) -> &mut Option<String> {
        &mut self.self_href
    }
}

impl TryFrom<Value> for StacObject {
    type Error = Error;

    fn try_from(value: Value) -> Result<StacObject> {
        StacObject::new(value)
    }
}

impl From<Map<String, Value>> for StacObject {
    fn from(object: Map<String, Value>) -> StacObject {
        StacObject {
            object,
            self_href: None,
        }
    }
}

impl From<StacObject> for Value {
    fn from(object: StacObject) -> Value {
        Value::Object(object.object)
    }
}

impl<'a> From<Option<&'a Value>> for Field<'a> {
    fn from(value: Option<&'a Value>) -> Field<'a> {
        match value {
            None => Field::Absent,
            Some(Value::Null) => Field::Null,
            Some(value) => Field::Present(value),
        }
    }
}

impl<'a> Field<'a> {
    /// Returns true if the key is present with a `null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns the value, if present and non-null.
    pub fn value(&self) -> Option<&'a Value> {
        match self {
            Field::Present(value) => Some(value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, StacObject};
    use crate::SelfHref;
    use serde_json::json;

    #[test]
    fn not_an_object() {
        assert!(matches!(
            StacObject::new(json!("an-id")).unwrap_err(),
            crate::Error::NotAnObject(_)
        ));
    }

    #[test]
    fn fields() {
        let object = StacObject::new(json!({
            "geometry": null,
            "properties": {"datetime": null, "title": "a title"}
        }))
        .unwrap();
        assert_eq!(object.geometry(), Field::Null);
        assert_eq!(object.field("bbox"), Field::Absent);
        assert!(object.property("datetime").is_null());
        assert_eq!(object.property("title").value(), Some(&json!("a title")));
        assert_eq!(object.property("missing"), Field::Absent);
    }

    #[test]
    fn mistyped_fields_are_absent() {
        let object = StacObject::new(json!({
            "id": 42,
            "links": "not-an-array",
            "bbox": [1, "two", 3, 4],
            "properties": []
        }))
        .unwrap();
        assert!(object.id().is_none());
        assert_eq!(object.iter_links().count(), 0);
        assert!(object.bbox().is_none());
        assert!(object.properties().is_none());
    }

    #[test]
    fn links() {
        let object = StacObject::new(json!({
            "links": [
                {"rel": "self", "href": "./catalog.json"},
                {"rel": "child", "href": "./child/catalog.json", "title": "Child"},
                "garbage"
            ]
        }))
        .unwrap();
        let links: Vec<_> = object.iter_links().collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].rel, Some("self"));
        assert!(!links[0].has_title);
        assert!(links[1].has_title);
    }

    #[test]
    fn asset_name() {
        let mut object = StacObject::new(json!({"id": "an-id"})).unwrap();
        assert_eq!(object.asset_name(), "an-id");
        object.set_self_href("/data/items/core-item.json");
        assert_eq!(object.asset_name(), "core-item");
    }
}

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

/// The kind of STAC object being linted.
///
/// Displays (and serializes) in upper case, e.g. `ITEM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssetType {
    /// A STAC Item, which is a GeoJSON Feature.
    Item,

    /// A STAC Collection.
    Collection,

    /// A STAC Catalog.
    Catalog,

    /// A GeoJSON FeatureCollection, e.g. a page of items from a STAC API.
    FeatureCollection,
}

impl AssetType {
    /// Determines the asset type from a JSON object.
    ///
    /// Objects without an explicit `type` are still recognized as catalogs or
    /// collections when they carry `stac_version` and `id`, which is how
    /// pre-1.0 catalogs were written.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_check::AssetType;
    ///
    /// let value = json!({"type": "Feature"});
    /// assert_eq!(
    ///     AssetType::from_object(value.as_object().unwrap()),
    ///     Some(AssetType::Item)
    /// );
    /// ```
    pub fn from_object(object: &Map<String, Value>) -> Option<AssetType> {
        match object.get("type").and_then(Value::as_str) {
            Some("Feature") => return Some(AssetType::Item),
            Some("FeatureCollection") => return Some(AssetType::FeatureCollection),
            Some("Collection") => return Some(AssetType::Collection),
            _ => {}
        }
        if object.contains_key("stac_version") && object.contains_key("id") {
            if object.get("type").and_then(Value::as_str) == Some("Catalog") {
                Some(AssetType::Catalog)
            } else if object.contains_key("extent") && object.contains_key("links") {
                Some(AssetType::Collection)
            } else {
                Some(AssetType::Catalog)
            }
        } else {
            None
        }
    }

    /// Returns the lower-case name, as used for catalog and collection file names.
    pub fn file_stem(&self) -> &'static str {
        match self {
            AssetType::Item => "item",
            AssetType::Collection => "collection",
            AssetType::Catalog => "catalog",
            AssetType::FeatureCollection => "featurecollection",
        }
    }

    /// Returns true for catalogs and collections.
    pub fn is_catalog_like(&self) -> bool {
        matches!(self, AssetType::Catalog | AssetType::Collection)
    }
}

impl Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Item => f.write_str("ITEM"),
            AssetType::Collection => f.write_str("COLLECTION"),
            AssetType::Catalog => f.write_str("CATALOG"),
            AssetType::FeatureCollection => f.write_str("FEATURECOLLECTION"),
        }
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<AssetType> {
        match s.to_ascii_uppercase().as_str() {
            "ITEM" | "FEATURE" => Ok(AssetType::Item),
            "COLLECTION" => Ok(AssetType::Collection),
            "CATALOG" => Ok(AssetType::Catalog),
            "FEATURECOLLECTION" => Ok(AssetType::FeatureCollection),
            _ => Err(Error::UnknownAssetType(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AssetType;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"type": "Feature"}), Some(AssetType::Item))]
    #[case(json!({"type": "FeatureCollection"}), Some(AssetType::FeatureCollection))]
    #[case(json!({"type": "Collection"}), Some(AssetType::Collection))]
    #[case(json!({"type": "Catalog", "stac_version": "1.0.0", "id": "a"}), Some(AssetType::Catalog))]
    #[case(json!({"stac_version": "0.9.0", "id": "a", "extent": {}, "links": []}), Some(AssetType::Collection))]
    #[case(json!({"stac_version": "0.9.0", "id": "a"}), Some(AssetType::Catalog))]
    #[case(json!({"id": "a"}), None)]
    fn from_object(#[case] value: Value, #[case] expected: Option<AssetType>) {
        assert_eq!(AssetType::from_object(value.as_object().unwrap()), expected);
    }

    #[test]
    fn display_and_parse() {
        assert_eq!(AssetType::FeatureCollection.to_string(), "FEATURECOLLECTION");
        assert_eq!("collection".parse::<AssetType>().unwrap(), AssetType::Collection);
        assert!("nope".parse::<AssetType>().is_err());
    }

    #[test]
    fn serialize_upper_case() {
        assert_eq!(serde_json::to_value(AssetType::Item).unwrap(), json!("ITEM"));
    }
}

use crate::AssetType;
use serde::{Deserialize, Serialize};

/// The latest STAC version, which users are nudged towards.
pub const LATEST_STAC_VERSION: &str = "1.1.0";

/// The outcome of schema validation for one object.
///
/// Produced by a schema validator and only read by the linter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// The href of the object, if it was read from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Whether the object is valid against every schema it was checked against.
    pub valid_stac: bool,

    /// The schema uris that were checked, in order.
    pub schema: Vec<String>,

    /// The asset type the validator determined.
    pub asset_type: Option<AssetType>,

    /// The object's `stac_version`.
    pub version: Option<String>,

    /// A classification of the failure, e.g. `JSONSchemaValidationError`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// A human-readable description of the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// The schema that failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_schema: Option<String>,

    /// A hint for fixing the failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
}

impl ValidationResult {
    /// Returns a message about the object's STAC version.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_check::ValidationResult;
    ///
    /// let mut result = ValidationResult::default();
    /// result.version = Some("1.0.0".to_string());
    /// assert_eq!(result.update_message(), "Please upgrade from version 1.0.0 to version 1.1.0!");
    /// ```
    pub fn update_message(&self) -> String {
        match self.version.as_deref() {
            Some(LATEST_STAC_VERSION) => format!("Thanks for using STAC version {LATEST_STAC_VERSION}!"),
            version => format!(
                "Please upgrade from version {} to version {LATEST_STAC_VERSION}!",
                version.unwrap_or("None")
            ),
        }
    }

    /// Returns a failed result with the given error classification.
    pub fn error(error_type: impl ToString, error_message: impl ToString) -> ValidationResult {
        ValidationResult {
            error_type: Some(error_type.to_string()),
            error_message: Some(error_message.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ValidationResult;
    use crate::AssetType;
    use serde_json::json;

    #[test]
    fn thanks() {
        let result = ValidationResult {
            version: Some("1.1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(result.update_message(), "Thanks for using STAC version 1.1.0!");
    }

    #[test]
    fn serialize() {
        let result = ValidationResult {
            valid_stac: true,
            schema: vec!["https://schemas.stacspec.org/v1.1.0/item-spec/json-schema/item.json".to_string()],
            asset_type: Some(AssetType::Item),
            version: Some("1.1.0".to_string()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(result).unwrap(),
            json!({
                "valid_stac": true,
                "schema": ["https://schemas.stacspec.org/v1.1.0/item-spec/json-schema/item.json"],
                "asset_type": "ITEM",
                "version": "1.1.0",
            })
        );
    }
}

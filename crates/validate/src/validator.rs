use crate::{Error, Result, Validation};
use fluent_uri::Uri;
use jsonschema::{Retrieve, Validator as JsonschemaValidator};
use reqwest::blocking::Client;
use serde_json::{Map, Value};
use stac_check::{AssetType, SelfHref, StacObject, ValidationResult};
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

const SCHEMA_BASE: &str = "https://schemas.stacspec.org";

/// A structure for validating STAC.
///
/// Compiled schemas are cached by uri, so re-use one validator for many objects.
pub struct Validator {
    validators: HashMap<Uri<String>, JsonschemaValidator>,
    schemas: Arc<HashMap<String, Value>>,
    client: Client,
}

#[derive(Debug, Clone)]
struct Retriever {
    client: Client,
    schemas: Arc<HashMap<String, Value>>,
}

impl Validator {
    /// Creates a new validator.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_check_validate::Validator;
    ///
    /// let validator = Validator::new().unwrap();
    /// ```
    pub fn new() -> Result<Validator> {
        let client = Client::builder().user_agent(crate::user_agent()).build()?;
        Ok(Validator {
            validators: HashMap::new(),
            schemas: Arc::new(HashMap::new()),
            client,
        })
    }

    /// Registers a schema so it is never fetched.
    ///
    /// The schema is used both when an object points at `uri` directly and
    /// when another schema references it.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use stac_check::StacObject;
    /// use stac_check_validate::Validator;
    ///
    /// let mut validator = Validator::new().unwrap().with_schema(
    ///     "https://schemas.stacspec.org/v1.1.0/item-spec/json-schema/item.json",
    ///     json!({"type": "object", "required": ["id"]}),
    /// );
    /// let object = StacObject::new(json!({"type": "Feature", "stac_version": "1.1.0", "id": "an-id"})).unwrap();
    /// assert!(validator.validate(&object).valid_stac);
    /// ```
    pub fn with_schema(mut self, uri: impl ToString, schema: Value) -> Validator {
        let _ = Arc::make_mut(&mut self.schemas).insert(uri.to_string(), schema);
        self
    }

    /// Validates a STAC object.
    ///
    /// This never fails: any problem (a missing field, an unreachable
    /// schema, a schema violation) is described in the returned result.
    pub fn validate(&mut self, object: &StacObject) -> ValidationResult {
        let mut schema = Vec::new();
        let outcome = self.validate_object(object.as_object(), &mut schema);
        let mut result = ValidationResult {
            path: object.self_href().map(String::from),
            valid_stac: outcome.is_ok(),
            schema,
            asset_type: object.asset_type(),
            version: object.stac_version().map(String::from),
            ..Default::default()
        };
        if let Err(error) = outcome {
            tracing::debug!("validation failed: {error}");
            result.error_type = Some(error.error_type().to_string());
            match error {
                Error::Validation(validations) => {
                    if let Some(first) = validations.first() {
                        result.error_message = Some(first.to_string());
                        result.failed_schema = Some(first.schema.clone());
                    }
                    if validations.len() > 1 {
                        result.recommendation = Some(format!(
                            "{} more validation error(s) were found, fix the first one and run again",
                            validations.len() - 1
                        ));
                    }
                }
                error => result.error_message = Some(error.to_string()),
            }
        }
        result
    }

    fn validate_object(&mut self, object: &Map<String, Value>, checked: &mut Vec<String>) -> Result<()> {
        let asset_type = match AssetType::from_object(object) {
            Some(asset_type) => asset_type,
            None => {
                return Err(match object.get("type").and_then(Value::as_str) {
                    Some(r#type) => Error::UnknownType(r#type.to_string()),
                    None => Error::MissingField("type"),
                });
            }
        };
        if asset_type == AssetType::FeatureCollection {
            return self.validate_features(object, checked);
        }
        let version = object
            .get("stac_version")
            .and_then(Value::as_str)
            .ok_or(Error::MissingField("stac_version"))?;

        let mut uris = vec![build_uri(asset_type, version)?];
        for extension in object
            .get("stac_extensions")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
        {
            uris.push(Uri::parse(extension.to_string())?);
        }

        let value = Value::Object(object.clone());
        let mut errors = Vec::new();
        for uri in uris {
            if !checked.iter().any(|s| s == uri.as_str()) {
                checked.push(uri.to_string());
            }
            let validator = self.validator(&uri)?;
            errors.extend(
                validator
                    .iter_errors(&value)
                    .map(|error| Validation::new(uri.as_str(), error, &value)),
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    fn validate_features(&mut self, object: &Map<String, Value>, checked: &mut Vec<String>) -> Result<()> {
        let mut errors = Vec::new();
        for feature in object
            .get("features")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let feature = feature
                .as_object()
                .ok_or_else(|| Error::NotAnObject(feature.clone()))?;
            match self.validate_object(feature, checked) {
                Ok(()) => {}
                Err(Error::Validation(e)) => errors.extend(e),
                Err(error) => return Err(error),
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    fn validator(&mut self, uri: &Uri<String>) -> Result<&JsonschemaValidator> {
        match self.validators.entry(uri.clone()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let retriever = Retriever {
                    client: self.client.clone(),
                    schemas: self.schemas.clone(),
                };
                let schema = retriever.get(uri)?;
                let validator = jsonschema::options()
                    .with_retriever(retriever)
                    .build(&schema)
                    .map_err(Box::new)?;
                Ok(entry.insert(validator))
            }
        }
    }
}

impl Retriever {
    fn get(&self, uri: &Uri<String>) -> Result<Value> {
        if let Some(schema) = self.schemas.get(uri.as_str()) {
            Ok(schema.clone())
        } else {
            tracing::debug!("fetching schema {uri}");
            let response = self.client.get(uri.as_str()).send()?.error_for_status()?;
            response.json().map_err(Error::from)
        }
    }
}

impl Retrieve for Retriever {
    fn retrieve(
        &self,
        uri: &Uri<String>,
    ) -> std::result::Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        self.get(uri).map_err(|error| Box::new(error) as _)
    }
}

fn build_uri(asset_type: AssetType, version: &str) -> Result<Uri<String>> {
    let path = match asset_type {
        AssetType::Item => "item-spec/json-schema/item.json",
        AssetType::Catalog => "catalog-spec/json-schema/catalog.json",
        AssetType::Collection => "collection-spec/json-schema/collection.json",
        AssetType::FeatureCollection => return Err(Error::UnknownType(asset_type.to_string())),
    };
    let version = version.strip_prefix('v').unwrap_or(version);
    Uri::parse(format!("{SCHEMA_BASE}/v{version}/{path}")).map_err(Error::from)
}

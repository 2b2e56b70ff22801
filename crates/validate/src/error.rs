use thiserror::Error;

/// Error enum for crate-specific errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// [fluent_uri::error::ParseError]
    #[error(transparent)]
    FluentUriParse(#[from] fluent_uri::error::ParseError<String>),

    /// [jsonschema::ValidationError], returned when a schema can't be compiled.
    #[error(transparent)]
    JsonschemaValidation(#[from] Box<jsonschema::ValidationError<'static>>),

    /// A field required to pick a schema is missing.
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// A value that should be a JSON object isn't.
    #[error("json value is not an object: {0}")]
    NotAnObject(serde_json::Value),

    #[error(transparent)]
    /// [reqwest::Error]
    Reqwest(#[from] reqwest::Error),

    /// The `type` field isn't one of the STAC types.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// A list of validation errors.
    #[error("{} validation error(s)", .0.len())]
    Validation(Vec<Validation>),
}

/// A validation error
#[derive(Debug, Clone)]
pub struct Validation {
    /// The uri of the schema that failed.
    pub schema: String,

    /// The ID of the object that failed to validate.
    pub id: Option<String>,

    /// Where in the object the error is, as a JSON pointer.
    pub instance_path: String,

    /// The validation error message.
    pub message: String,
}

impl Validation {
    pub(crate) fn new(
        schema: &str,
        error: jsonschema::ValidationError<'_>,
        value: &serde_json::Value,
    ) -> Validation {
        Validation {
            schema: schema.to_string(),
            id: value.get("id").and_then(|v| v.as_str()).map(String::from),
            instance_path: error.instance_path.as_str().to_string(),
            message: error.to_string(),
        }
    }
}

impl Error {
    /// Returns the name of this kind of error, as reported in a validation result.
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::MissingField(_) => "KeyError",
            Error::Validation(_) => "JSONSchemaValidationError",
            Error::Reqwest(_) => "HTTPError",
            _ => "ValueError",
        }
    }
}

impl std::fmt::Display for Validation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(id) = self.id.as_ref() {
            write!(f, "[id={id}]: {}", self.message)?;
        } else {
            write!(f, "{}", self.message)?;
        }
        if !self.instance_path.is_empty() {
            write!(f, ". Error is in {}", self.instance_path)?;
        }
        Ok(())
    }
}

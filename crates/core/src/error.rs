use thiserror::Error;

/// Error enum for crate-specific errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The configuration is not shaped like a stac-check configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// [std::io::Error]
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Returned when a key that a rule needs is not in the resolved configuration.
    #[error("missing configuration key: {0}")]
    MissingConfigKey(String),

    /// This is not a JSON object.
    #[error("json value is not an object")]
    NotAnObject(serde_json::Value),

    /// [serde_json::Error]
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    /// [serde_yaml::Error]
    #[error(transparent)]
    SerdeYaml(#[from] serde_yaml::Error),

    /// Returned when the `type` field can't be mapped to a STAC object type.
    #[error("unknown asset type: {0}")]
    UnknownAssetType(String),

    /// [url::ParseError]
    #[error(transparent)]
    UrlParse(#[from] url::ParseError),
}

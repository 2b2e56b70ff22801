use crate::{
    Report, Result, RuleConfig, StacObject, ValidationResult,
    rules::{self, Subject},
};

/// Lints STAC objects against the best practices.
///
/// A linter holds a resolved [RuleConfig] and nothing else, so one linter can
/// be shared (e.g. behind a reference) by every object in a run.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use stac_check::{Linter, StacObject, ValidationResult};
///
/// let linter = Linter::default();
/// let object = StacObject::new(json!({"type": "Feature", "id": "Bad:ID/here"})).unwrap();
/// let report = linter.lint(&object, &ValidationResult::default()).unwrap();
/// assert!(report.violations.contains("searchable_identifiers"));
/// assert!(report.violations.contains("percent_encoded"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Linter {
    config: RuleConfig,
}

impl Linter {
    /// Creates a new linter with the given configuration.
    pub fn new(config: RuleConfig) -> Linter {
        Linter { config }
    }

    /// Returns this linter's configuration.
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Lints one object.
    ///
    /// The asset type is taken from the validation result, if the validator
    /// determined one, and otherwise from the object itself.
    ///
    /// Fails only if the configuration is missing a toggle for a rule that
    /// the object violates.
    pub fn lint(&self, object: &StacObject, validation: &ValidationResult) -> Result<Report> {
        let subject = Subject {
            object,
            asset_type: validation.asset_type.or_else(|| object.asset_type()),
        };
        let violations = rules::evaluate(&subject, &self.config)?;
        tracing::debug!(
            "{} best practices violation(s) for {}",
            violations.len(),
            object.id().unwrap_or("<no id>")
        );
        Ok(Report::new(violations))
    }
}

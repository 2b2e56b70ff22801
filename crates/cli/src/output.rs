//! Rendering lint outcomes as plain text or json.

use serde::Serialize;
use stac_check::{Report, ValidationResult};
use std::io::{Result, Write};

const SEPARATOR: &str = "-------------------------";

const DISCLAIMER: &str = "Disclaimer: Schema-based STAC validation may be incomplete and should only be considered as a first indicator of validity.\nSee: https://github.com/radiantearth/stac-spec/discussions/1242";

/// The validation result and lint report for one object.
#[derive(Debug, Clone, Serialize)]
pub struct Outcome {
    /// Schema validation.
    #[serde(flatten)]
    pub validation: ValidationResult,

    /// Best practices.
    #[serde(flatten)]
    pub report: Report,

    /// The number of links, if the object has a `links` array.
    #[serde(skip)]
    pub links: Option<usize>,
}

/// A title and settings shown above a multi-object run.
#[derive(Debug, Clone)]
pub struct Heading {
    pub title: &'static str,
    pub setting: (&'static str, String),
}

/// Writes one outcome.
pub fn write_outcome(w: &mut impl Write, outcome: &Outcome) -> Result<()> {
    let validation = &outcome.validation;
    writeln!(w, "{}", validation.update_message())?;
    writeln!(w)?;
    let asset_type = validation
        .asset_type
        .map(|asset_type| asset_type.to_string())
        .unwrap_or_else(|| "UNKNOWN".to_string());
    writeln!(w, "{asset_type} Passed: {}", validation.valid_stac)?;
    writeln!(w)?;
    if !validation.schema.is_empty() {
        writeln!(w, "Schemas checked: ")?;
        for schema in &validation.schema {
            writeln!(w, "    {schema}")?;
        }
        writeln!(w)?;
    }
    section(w, "Failed Schema: ", validation.failed_schema.as_deref())?;
    section(w, "Recommendation: ", validation.recommendation.as_deref())?;
    section(w, "Validation error type: ", validation.error_type.as_deref())?;
    section(w, "Validation error message: ", validation.error_message.as_deref())?;

    for lines in [&outcome.report.best_practices, &outcome.report.geometry_errors] {
        if let Some((header, lines)) = lines.split_first() {
            writeln!(w, " {header}")?;
            writeln!(w)?;
            for line in lines {
                writeln!(w, "{line}")?;
            }
        }
    }

    match outcome.links {
        Some(links) => writeln!(w, "This object has {links} links")?,
        None => writeln!(w, "No links found in the STAC object")?,
    }
    writeln!(w)?;
    writeln!(w, "{DISCLAIMER}")
}

/// Writes many outcomes, each under its own asset header, then a summary.
pub fn write_outcomes(w: &mut impl Write, heading: &Heading, outcomes: &[Outcome]) -> Result<()> {
    writeln!(w, "{}", heading.title)?;
    writeln!(w, "{} = {}", heading.setting.0, heading.setting.1)?;
    writeln!(w, "{SEPARATOR}")?;
    for (i, outcome) in outcomes.iter().enumerate() {
        let path = outcome
            .validation
            .path
            .clone()
            .unwrap_or_else(|| format!("(unknown-{})", i + 1));
        writeln!(w)?;
        writeln!(w, " Asset {}: {path}", i + 1)?;
        writeln!(w)?;
        write_outcome(w, outcome)?;
        writeln!(w, "{SEPARATOR}")?;
    }
    write_summary(w, outcomes)
}

fn write_summary(w: &mut impl Write, outcomes: &[Outcome]) -> Result<()> {
    let path = |outcome: &Outcome| outcome.validation.path.clone().unwrap_or_default();
    let failed: Vec<_> = outcomes
        .iter()
        .filter(|outcome| !outcome.validation.valid_stac)
        .collect();
    let warned: Vec<_> = outcomes
        .iter()
        .filter(|outcome| !outcome.report.violations.is_empty())
        .collect();

    writeln!(w)?;
    writeln!(w, " Validation Summary")?;
    writeln!(w)?;
    writeln!(w, "Passed: {}/{}", outcomes.len() - failed.len(), outcomes.len())?;
    if !failed.is_empty() {
        writeln!(w, "Failed: {}/{}", failed.len(), outcomes.len())?;
        writeln!(w)?;
        writeln!(w, "Failed Assets:")?;
        for outcome in failed {
            writeln!(w, "  - {}", path(outcome))?;
        }
    }
    if !warned.is_empty() {
        writeln!(w)?;
        writeln!(w, "Best Practice Warnings ({} assets)", warned.len())?;
        for outcome in warned {
            writeln!(w, "  {}: {}", path(outcome), outcome.report.violations.keys().collect::<Vec<_>>().join(", "))?;
        }
    }
    writeln!(w)?;
    writeln!(w, "All {} Assets Checked", outcomes.len())
}

fn section(w: &mut impl Write, header: &str, value: Option<&str>) -> Result<()> {
    if let Some(value) = value {
        writeln!(w, "{header}")?;
        writeln!(w, "    {value}")?;
        writeln!(w)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Heading, Outcome};
    use stac_check::{AssetType, Report, ValidationResult, Violations};

    fn outcome(path: &str, valid_stac: bool, violations: Violations) -> Outcome {
        Outcome {
            validation: ValidationResult {
                path: Some(path.to_string()),
                valid_stac,
                schema: vec!["https://schemas.stacspec.org/v1.1.0/item-spec/json-schema/item.json".to_string()],
                asset_type: Some(AssetType::Item),
                version: Some("1.1.0".to_string()),
                ..Default::default()
            },
            report: Report::new(violations),
            links: Some(2),
        }
    }

    fn render(outcome: &Outcome) -> String {
        let mut buf = Vec::new();
        super::write_outcome(&mut buf, outcome).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn clean_outcome() {
        let text = render(&outcome("item.json", true, Violations::default()));
        assert!(text.starts_with("Thanks for using STAC version 1.1.0!\n\nITEM Passed: true\n"));
        assert!(text.contains("Schemas checked: \n    https://schemas.stacspec.org"));
        assert!(text.contains(" STAC Best Practices: \n"));
        assert!(!text.contains("Geometry Validation Errors"));
        assert!(text.contains("This object has 2 links"));
        assert!(!text.contains("Validation error type"));
    }

    #[test]
    fn failed_outcome() {
        let mut outcome = outcome("item.json", false, Violations::default());
        outcome.validation.error_type = Some("JSONSchemaValidationError".to_string());
        outcome.validation.error_message = Some("'id' is a required property".to_string());
        outcome.links = None;
        let text = render(&outcome);
        assert!(text.contains("ITEM Passed: false"));
        assert!(text.contains("Validation error type: \n    JSONSchemaValidationError\n"));
        assert!(text.contains("No links found in the STAC object"));
    }

    #[test]
    fn geometry_section() {
        let mut violations = Violations::default();
        violations.insert(
            "check_bbox_antimeridian",
            vec!["BBox crossing the antimeridian should have west longitude > east longitude (found west=-170.0, east=170.0)".to_string()],
        );
        let text = render(&outcome("item.json", true, violations));
        assert!(text.contains(" Geometry Validation Errors [BETA]: \n\n    BBox crossing"));
    }

    #[test]
    fn summary() {
        let mut violations = Violations::default();
        violations.insert("searchable_identifiers", vec!["Item name 'Bad' should only contain Searchable identifiers".to_string()]);
        let outcomes = vec![
            outcome("a.json", true, Violations::default()),
            outcome("b.json", false, violations),
        ];
        let heading = Heading {
            title: "Recursive: Validate all assets in a collection or catalog",
            setting: ("Max-depth", "None".to_string()),
        };
        let mut buf = Vec::new();
        super::write_outcomes(&mut buf, &heading, &outcomes).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("Recursive: Validate all assets in a collection or catalog\nMax-depth = None\n"));
        assert!(text.contains(" Asset 2: b.json"));
        assert!(text.contains("Passed: 1/2\nFailed: 1/2"));
        assert!(text.contains("  - b.json"));
        assert!(text.contains("  b.json: searchable_identifiers"));
        assert!(text.ends_with("All 2 Assets Checked\n"));
    }
}

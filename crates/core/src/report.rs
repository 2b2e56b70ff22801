//! Turning violations into report lines.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The header of the best practices section.
pub const BEST_PRACTICES_HEADER: &str = "STAC Best Practices: ";

/// The header of the geometry errors section.
pub const GEOMETRY_ERRORS_HEADER: &str = "Geometry Validation Errors [BETA]: ";

/// Violations with these keys are reported as geometry errors.
pub const GEOMETRY_KEYS: [&str; 5] = [
    "geometry_coordinates_order",
    "geometry_coordinates_definite_errors",
    "check_bbox_antimeridian",
    "check_bbox_geometry_match",
    "bbox_geometry_mismatch",
];

const INDENT: &str = "    ";

/// Violated rules, in the order they were evaluated, with their messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Violations(IndexMap<String, Vec<String>>);

/// The outcome of linting one object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Best practices lines, starting with [BEST_PRACTICES_HEADER].
    pub best_practices: Vec<String>,

    /// Geometry error lines, starting with [GEOMETRY_ERRORS_HEADER], or empty.
    pub geometry_errors: Vec<String>,

    /// The violations the lines were built from.
    pub violations: Violations,
}

impl Violations {
    /// Records a violated rule.
    pub fn insert(&mut self, key: impl ToString, messages: Vec<String>) {
        let _ = self.0.insert(key.to_string(), messages);
    }

    /// Returns the messages for a rule, if it was violated.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// Returns true if the rule was violated.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Returns true if no rules were violated.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of violated rules.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the violated rule keys, in evaluation order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over the violated rules and their messages, in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(key, messages)| (key.as_str(), messages.as_slice()))
    }
}

impl Report {
    /// Assembles the report lines for some violations.
    ///
    /// The best practices section always has its header. The geometry section
    /// is empty unless there are geometry violations.
    ///
    /// # Examples
    ///
    /// ```
    /// use stac_check::{Report, Violations};
    ///
    /// let mut violations = Violations::default();
    /// violations.insert("check_summaries", vec!["A STAC collection should contain a summaries field".to_string()]);
    /// let report = Report::new(violations);
    /// assert_eq!(
    ///     report.best_practices,
    ///     vec![
    ///         "STAC Best Practices: ",
    ///         "    A STAC collection should contain a summaries field",
    ///         "",
    ///     ]
    /// );
    /// assert!(report.geometry_errors.is_empty());
    /// ```
    pub fn new(violations: Violations) -> Report {
        let (geometry, best_practices): (Vec<_>, Vec<_>) = violations
            .iter()
            .partition(|(key, _)| GEOMETRY_KEYS.contains(key));
        let geometry_errors = if geometry.is_empty() {
            Vec::new()
        } else {
            section(GEOMETRY_ERRORS_HEADER, &geometry)
        };
        let best_practices = section(BEST_PRACTICES_HEADER, &best_practices);
        Report {
            best_practices,
            geometry_errors,
            violations,
        }
    }

    /// Returns true if nothing was violated.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

fn section(header: &str, violations: &[(&str, &[String])]) -> Vec<String> {
    let mut lines = vec![header.to_string()];
    for (_, messages) in violations {
        lines.extend(messages.iter().map(|message| format!("{INDENT}{message}")));
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{Report, Violations};
    use assert_json_diff::assert_json_eq;
    use serde_json::json;

    fn violations() -> Violations {
        let mut violations = Violations::default();
        violations.insert("geometry_coordinates_order", vec!["order".to_string()]);
        violations.insert("bloated_links", vec!["links".to_string()]);
        violations.insert(
            "check_bbox_antimeridian",
            vec!["first".to_string(), "second".to_string()],
        );
        violations.insert("null_geometry", vec!["geometry".to_string()]);
        violations
    }

    #[test]
    fn partitions_in_order() {
        let report = Report::new(violations());
        assert_eq!(
            report.best_practices,
            vec!["STAC Best Practices: ", "    links", "", "    geometry", ""]
        );
        assert_eq!(
            report.geometry_errors,
            vec![
                "Geometry Validation Errors [BETA]: ",
                "    order",
                "",
                "    first",
                "    second",
                ""
            ]
        );
    }

    #[test]
    fn empty() {
        let report = Report::new(Violations::default());
        assert_eq!(report.best_practices, vec!["STAC Best Practices: "]);
        assert!(report.geometry_errors.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn serialize() {
        let report = Report::new(violations());
        let value = serde_json::to_value(&report).unwrap();
        assert_json_eq!(
            value["violations"],
            json!({
                "geometry_coordinates_order": ["order"],
                "bloated_links": ["links"],
                "check_bbox_antimeridian": ["first", "second"],
                "null_geometry": ["geometry"],
            })
        );
        let keys: Vec<_> = value["violations"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(
            keys,
            vec![
                "geometry_coordinates_order",
                "bloated_links",
                "check_bbox_antimeridian",
                "null_geometry"
            ]
        );
    }
}

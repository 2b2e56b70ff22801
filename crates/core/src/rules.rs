//! The best-practices rules.
//!
//! Each [Rule] is an independent predicate over a document. Rules run in the
//! order of [Rule::ALL], and a rule only shows up in the [Violations] if it
//! fired and is enabled in the [RuleConfig].

use crate::{AssetType, Field, Result, RuleConfig, SelfHref, StacObject, Violations, geometry};
use serde_json::Value;

/// Thumbnails should be one of these (substring match on the media type).
const THUMBNAIL_FORMATS: [&str; 4] = ["png", "jpeg", "jpg", "webp"];

/// A best-practices rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Item ids should only contain lowercase letters, numbers, `_` and `-`.
    SearchableIdentifiers,

    /// Item ids should not contain `:` or `/`.
    PercentEncoded,

    /// Item ids should match their file names.
    CheckItemId,

    /// Catalogs and collections should be called `catalog.json` and `collection.json`.
    CheckCatalogId,

    /// Collections should have summaries.
    CheckSummaries,

    /// `properties.datetime` shouldn't be null.
    DatetimeNull,

    /// Unlocated items shouldn't have a bbox.
    CheckUnlocated,

    /// Items should have a geometry.
    NullGeometry,

    /// The bbox should be the bounds of the geometry.
    BboxGeometryMismatch,

    /// There shouldn't be too many links.
    BloatedLinks,

    /// There shouldn't be too many properties.
    BloatedMetadata,

    /// Thumbnails should be small image formats.
    CheckThumbnail,

    /// Catalog and collection links should have titles.
    LinksTitle,

    /// Catalogs and collections should have a self link.
    LinksSelf,

    /// Coordinates should be longitude, latitude.
    GeometryCoordinatesOrder,

    /// Coordinates should be inside the valid ranges.
    GeometryCoordinatesDefiniteErrors,

    /// Bboxes crossing the antimeridian should have west > east.
    CheckBboxAntimeridian,
}

/// A document being linted.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    /// The document.
    pub object: &'a StacObject,

    /// The document's asset type.
    pub asset_type: Option<AssetType>,
}

enum Toggle {
    Linting(&'static str),
    Geometry(&'static str),
    GeometryOr(&'static str, bool),
    GeometryFallback(&'static str, &'static str),
}

impl Rule {
    /// Every rule, in evaluation order.
    pub const ALL: [Rule; 17] = [
        Rule::SearchableIdentifiers,
        Rule::PercentEncoded,
        Rule::CheckItemId,
        Rule::CheckCatalogId,
        Rule::CheckSummaries,
        Rule::DatetimeNull,
        Rule::CheckUnlocated,
        Rule::NullGeometry,
        Rule::BboxGeometryMismatch,
        Rule::BloatedLinks,
        Rule::BloatedMetadata,
        Rule::CheckThumbnail,
        Rule::LinksTitle,
        Rule::LinksSelf,
        Rule::GeometryCoordinatesOrder,
        Rule::GeometryCoordinatesDefiniteErrors,
        Rule::CheckBboxAntimeridian,
    ];

    /// The key this rule's messages are stored under.
    pub fn key(&self) -> &'static str {
        match self {
            Rule::SearchableIdentifiers => "searchable_identifiers",
            Rule::PercentEncoded => "percent_encoded",
            Rule::CheckItemId => "check_item_id",
            Rule::CheckCatalogId => "check_catalog_id",
            Rule::CheckSummaries => "check_summaries",
            Rule::DatetimeNull => "datetime_null",
            Rule::CheckUnlocated => "check_unlocated",
            Rule::NullGeometry => "null_geometry",
            Rule::BboxGeometryMismatch => "bbox_geometry_mismatch",
            Rule::BloatedLinks => "bloated_links",
            Rule::BloatedMetadata => "bloated_metadata",
            Rule::CheckThumbnail => "check_thumbnail",
            Rule::LinksTitle => "links_title",
            Rule::LinksSelf => "links_self",
            Rule::GeometryCoordinatesOrder => "geometry_coordinates_order",
            Rule::GeometryCoordinatesDefiniteErrors => "geometry_coordinates_definite_errors",
            Rule::CheckBboxAntimeridian => "check_bbox_antimeridian",
        }
    }

    /// Returns true for rules that are reported as geometry errors.
    ///
    /// These are all switched off by `geometry_validation.enabled: false`.
    pub fn is_geometry(&self) -> bool {
        matches!(
            self,
            Rule::BboxGeometryMismatch
                | Rule::GeometryCoordinatesOrder
                | Rule::GeometryCoordinatesDefiniteErrors
                | Rule::CheckBboxAntimeridian
        )
    }

    fn toggle(&self) -> Toggle {
        match self {
            Rule::SearchableIdentifiers => Toggle::Linting("searchable_identifiers"),
            Rule::PercentEncoded => Toggle::Linting("percent_encoded"),
            Rule::CheckItemId => Toggle::Linting("item_id_file_name"),
            Rule::CheckCatalogId => Toggle::Linting("catalog_id_file_name"),
            Rule::CheckSummaries => Toggle::Linting("check_summaries"),
            Rule::DatetimeNull => Toggle::Linting("null_datetime"),
            Rule::CheckUnlocated => Toggle::Linting("check_unlocated"),
            Rule::NullGeometry => Toggle::Linting("check_geometry"),
            Rule::BboxGeometryMismatch => Toggle::GeometryOr("check_bbox_geometry_match", true),
            Rule::BloatedLinks => Toggle::Linting("bloated_links"),
            Rule::BloatedMetadata => Toggle::Linting("bloated_metadata"),
            Rule::CheckThumbnail => Toggle::Linting("check_thumbnail"),
            Rule::LinksTitle => Toggle::Linting("links_title"),
            Rule::LinksSelf => Toggle::Linting("links_self"),
            Rule::GeometryCoordinatesOrder => Toggle::Geometry("geometry_coordinates_order"),
            Rule::GeometryCoordinatesDefiniteErrors => Toggle::GeometryFallback(
                "geometry_coordinates_definite_errors",
                "geometry_coordinates_order",
            ),
            Rule::CheckBboxAntimeridian => Toggle::GeometryOr("check_bbox_antimeridian", true),
        }
    }

    /// Returns whether this rule is enabled.
    ///
    /// Fails if a required toggle is missing from the configuration.
    pub fn is_enabled(&self, config: &RuleConfig) -> Result<bool> {
        if self.is_geometry() && !config.geometry_enabled() {
            return Ok(false);
        }
        match self.toggle() {
            Toggle::Linting(key) => config.linting(key),
            Toggle::Geometry(key) => config.geometry_validation(key),
            Toggle::GeometryOr(key, default) => Ok(config.geometry_validation_or(key, default)),
            Toggle::GeometryFallback(key, fallback) => match config.geometry_validation(key) {
                Ok(enabled) => Ok(enabled),
                Err(_) => config.geometry_validation(fallback),
            },
        }
    }

    /// Checks a document against this rule, returning the messages if it is violated.
    ///
    /// This doesn't look at the configuration, except for the `max_links` and
    /// `max_properties` thresholds.
    pub fn check(&self, subject: &Subject<'_>, config: &RuleConfig) -> Option<Vec<String>> {
        let object = subject.object;
        let is_item = subject.asset_type == Some(AssetType::Item);
        let is_catalog_like = subject.asset_type.is_some_and(|t| t.is_catalog_like());
        match self {
            Rule::SearchableIdentifiers => {
                let id = object.id().filter(|_| is_item)?;
                (!is_searchable(id)).then(|| {
                    vec![
                        format!("Item name '{id}' should only contain Searchable identifiers"),
                        "Identifiers should consist of only lowercase characters, numbers, '_', and '-'".to_string(),
                    ]
                })
            }
            Rule::PercentEncoded => {
                let id = object.id().filter(|_| is_item)?;
                id.contains(['/', ':']).then(|| {
                    vec![
                        format!("Item name '{id}' should not contain ':' or '/'"),
                        "https://github.com/radiantearth/stac-spec/blob/master/best-practices.md#item-ids".to_string(),
                    ]
                })
            }
            Rule::CheckItemId => {
                let id = object.id().filter(|_| is_item)?;
                let name = object.asset_name();
                (id != name).then(|| {
                    vec![format!(
                        "Item file names should match their ids: '{name}' not equal to '{id}"
                    )]
                })
            }
            Rule::CheckCatalogId => {
                let asset_type = subject.asset_type.filter(AssetType::is_catalog_like)?;
                let href = object.self_href().filter(|href| href.ends_with(".json"))?;
                let expected = format!("{}.json", asset_type.file_stem());
                (!href.contains(&expected)).then(|| {
                    vec![format!(
                        "Object should be called '{expected}' not '{}.json'",
                        object.asset_name()
                    )]
                })
            }
            Rule::CheckSummaries => (subject.asset_type == Some(AssetType::Collection)
                && object.summaries() == Field::Absent)
            .then(|| {
                vec![
                    "A STAC collection should contain a summaries field".to_string(),
                    "It is recommended to store information like eo:bands in summaries".to_string(),
                ]
            }),
            Rule::DatetimeNull => object.property("datetime").is_null().then(|| {
                vec!["Please avoid setting the datetime field to null, many clients search on this field".to_string()]
            }),
            Rule::CheckUnlocated => (object.geometry().is_null()
                && object.field("bbox").value().is_some())
            .then(|| {
                vec!["Unlocated item. Please avoid setting the bbox field when geometry is set to null".to_string()]
            }),
            Rule::NullGeometry => object.geometry().is_null().then(|| {
                vec!["All items should have a geometry field. STAC is not meant for non-spatial data".to_string()]
            }),
            Rule::BboxGeometryMismatch => geometry::bbox_mismatch(object).map(|m| m.messages()),
            Rule::BloatedLinks => {
                let count = object.links()?.len();
                (count > config.max_links()).then(|| {
                    vec![format!(
                        "You have {count} links. Please consider using sub-collections or sub-catalogs"
                    )]
                })
            }
            Rule::BloatedMetadata => {
                let count = object.properties()?.len();
                (count > config.max_properties()).then(|| {
                    vec![format!(
                        "You have {count} properties. Please consider using links to avoid bloated metadata"
                    )]
                })
            }
            Rule::CheckThumbnail => {
                let media_type = object
                    .asset("thumbnail")
                    .filter(|_| is_item)?
                    .get("type")
                    .and_then(Value::as_str)?;
                (!THUMBNAIL_FORMATS
                    .iter()
                    .any(|format| media_type.contains(format)))
                .then(|| {
                    vec!["A thumbnail should have a small file size ie. png, jpeg, jpg, webp".to_string()]
                })
            }
            Rule::LinksTitle => {
                if !is_catalog_like {
                    return None;
                }
                object
                    .iter_links()
                    .any(|link| !link.has_title && link.rel != Some("self"))
                    .then(|| {
                        vec!["Links in catalogs and collections should always have a 'title' field".to_string()]
                    })
            }
            Rule::LinksSelf => {
                if !is_catalog_like || object.links().is_none() {
                    return None;
                }
                (!object
                    .iter_links()
                    .any(|link| link.rel.is_some_and(|rel| rel.contains("self"))))
                .then(|| vec!["A link to 'self' in links is strongly recommended".to_string()])
            }
            Rule::GeometryCoordinatesOrder => geometry::coordinates_maybe_swapped(object).then(|| {
                vec!["Geometry coordinates may be in the wrong order (required order: longitude, latitude)".to_string()]
            }),
            Rule::GeometryCoordinatesDefiniteErrors => {
                let invalid_coordinates = geometry::definite_errors(object);
                (!invalid_coordinates.is_empty())
                    .then(|| geometry::InvalidCoordinate::messages(&invalid_coordinates))
            }
            Rule::CheckBboxAntimeridian => {
                geometry::antimeridian_violation(object).map(|violation| violation.messages())
            }
        }
    }
}

/// Runs every rule against a document.
///
/// Fails only if the configuration is missing a toggle for a rule that fired.
pub fn evaluate(subject: &Subject<'_>, config: &RuleConfig) -> Result<Violations> {
    let mut violations = Violations::default();
    for rule in Rule::ALL {
        if let Some(messages) = rule.check(subject, config) {
            if rule.is_enabled(config)? {
                tracing::debug!("{} violated", rule.key());
                violations.insert(rule.key(), messages);
            }
        }
    }
    Ok(violations)
}

fn is_searchable(id: &str) -> bool {
    id.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

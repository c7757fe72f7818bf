#[cfg(any(feature = "web", all(target_arch = "wasm32", feature = "browser")))]
mod cookies;
mod data;

pub mod controller;
pub mod page;
pub mod ports;
pub mod query;
pub mod render;
pub mod search;
pub mod theme;

#[cfg(feature = "web")]
pub mod web;

#[cfg(all(target_arch = "wasm32", feature = "browser"))]
mod browser;

pub use controller::{CatalogPage, Mode, PageController, ViewState};
pub use data::{CatalogError, Course};
pub use theme::Theme;

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::warn;

static BUILTIN_COURSES_JSON: &str = include_str!("../data/courses.json");

static BUILTIN_CATALOG: Lazy<Catalog> = Lazy::new(|| {
    Catalog::from_json_str(BUILTIN_COURSES_JSON).unwrap_or_else(|err| {
        warn!(%err, "built-in catalog failed to load");
        Catalog::unavailable()
    })
});

/// Immutable, ordered course list shared by every view of the page.
///
/// A catalog that could not be loaded is still a value: it is *unavailable*,
/// and renders as the "no courses" message instead of failing.
#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Option<Arc<[Course]>>,
}

impl Catalog {
    /// The eight courses compiled into the binary.
    pub fn builtin() -> Self {
        BUILTIN_CATALOG.clone()
    }

    /// Builds a catalog after checking ids, titles and urls.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(courses.len());
        for (index, course) in courses.iter().enumerate() {
            course
                .check()
                .map_err(|reason| CatalogError::InvalidRecord { index, reason })?;
            if !seen.insert(course.id) {
                return Err(CatalogError::DuplicateId(course.id));
            }
        }
        Ok(Self {
            courses: Some(courses.into()),
        })
    }

    pub fn unavailable() -> Self {
        Self { courses: None }
    }

    pub fn from_json_str(input: &str) -> Result<Self, CatalogError> {
        let value: Value = serde_json::from_str(input)?;
        let Value::Array(items) = value else {
            return Err(CatalogError::NotASequence);
        };
        let courses = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<Course>(item).map_err(|err| {
                    CatalogError::InvalidRecord {
                        index,
                        reason: err.to_string(),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(courses)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Loads `path` when given, otherwise the built-in catalog. Load failures
    /// are logged and produce an unavailable catalog.
    pub fn load_or_unavailable(path: Option<&Path>) -> Self {
        match path {
            None => Self::builtin(),
            Some(path) => Self::from_path(path).unwrap_or_else(|err| {
                warn!(path = %path.display(), %err, "catalog unavailable");
                Self::unavailable()
            }),
        }
    }

    /// The courses in source order, or `None` when the catalog is unavailable.
    pub fn courses(&self) -> Option<&[Course]> {
        self.courses.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.courses.is_some()
    }

    pub fn len(&self) -> usize {
        self.courses().map_or(0, <[Course]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First course whose id equals `id`.
    pub fn get(&self, id: u32) -> Option<&Course> {
        self.courses()?.iter().find(|course| course.id == id)
    }

    /// Courses whose title contains `filter` (trimmed, case-insensitive), in
    /// catalog order. `None` when the catalog is unavailable.
    pub fn filter(&self, filter: &str) -> Option<Vec<&Course>> {
        let needle = normalize_filter(filter);
        self.courses().map(|courses| {
            courses
                .iter()
                .filter(|course| course.title_contains(&needle))
                .collect()
        })
    }
}

/// Lowercased, trimmed form of the search text.
pub fn normalize_filter(filter: &str) -> String {
    filter.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles<'a>(courses: &[&'a Course]) -> Vec<&'a str> {
        courses.iter().map(|course| course.title.as_str()).collect()
    }

    #[test]
    fn builtin_catalog_has_eight_courses_in_order() {
        let catalog = Catalog::builtin();
        assert!(catalog.is_available());
        let ids: Vec<u32> = catalog
            .courses()
            .unwrap()
            .iter()
            .map(|course| course.id)
            .collect();
        assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn filter_is_case_insensitive_and_keeps_order() {
        let catalog = Catalog::builtin();
        let hits = catalog.filter("DE").unwrap();
        assert_eq!(
            titles(&hits),
            vec![
                "Estructuras de Datos",
                "Desarrollo Web",
                "Bases de Datos",
                "Redes de Computadoras",
            ]
        );
        assert!(hits.windows(2).all(|pair| pair[0].id < pair[1].id));
    }

    #[test]
    fn empty_or_blank_filter_returns_everything() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.filter("").unwrap().len(), 8);
        assert_eq!(catalog.filter("   ").unwrap().len(), 8);
    }

    #[test]
    fn filter_matches_accented_titles() {
        let catalog = Catalog::builtin();
        let hits = catalog.filter("INTRODUCCIÓN").unwrap();
        assert_eq!(titles(&hits), vec!["Introducción a la Programación"]);
    }

    #[test]
    fn non_array_json_is_not_a_sequence() {
        let err = Catalog::from_json_str(r#"{"id": 1}"#).unwrap_err();
        assert!(matches!(err, CatalogError::NotASequence));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let input = r#"[
            {"id": 1, "title": "A", "description": "", "url": "https://a.example"},
            {"id": 1, "title": "B", "description": "", "url": "https://b.example"}
        ]"#;
        let err = Catalog::from_json_str(input).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId(1)));
    }

    #[test]
    fn invalid_record_reports_position() {
        let input = r#"[
            {"id": 1, "title": "A", "url": "https://a.example"},
            {"id": 2, "title": "", "url": "https://b.example"}
        ]"#;
        match Catalog::from_json_str(input).unwrap_err() {
            CatalogError::InvalidRecord { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unavailable_catalog_has_no_courses() {
        let catalog = Catalog::unavailable();
        assert!(catalog.courses().is_none());
        assert!(catalog.filter("web").is_none());
        assert!(catalog.get(1).is_none());
    }

    #[test]
    fn missing_file_loads_as_unavailable() {
        let catalog = Catalog::load_or_unavailable(Some(Path::new("/nonexistent/courses.json")));
        assert!(!catalog.is_available());
    }
}

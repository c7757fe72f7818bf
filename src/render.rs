//! Projection of the catalog into list and detail view models.
//!
//! Renderers are pure: they take the catalog plus the filter text or selected
//! id and return plain values. Ports decide how those values reach the page.

use crate::query::detail_href;
use crate::{Catalog, Course};
use serde::Serialize;

pub const NO_COURSES_MESSAGE: &str = "No hay cursos disponibles.";
pub const NO_RESULTS_MESSAGE: &str = "No se encontraron cursos que coincidan con tu búsqueda.";
pub const NOT_FOUND_MESSAGE: &str = "Curso no encontrado.";
pub const VIEW_DETAILS_LABEL: &str = "Ver detalles";
pub const OPEN_COURSE_LABEL: &str = "Abrir curso";
pub const OPEN_EXTERNAL_LABEL: &str = "Abrir curso externo";

/// Cards are exposed to assistive technology as buttons.
pub const CARD_ROLE: &str = "button";
pub const CARD_TAB_INDEX: i32 = 0;

/// Browsing context for outbound links.
pub const EXTERNAL_TARGET: &str = "_blank";
/// Keeps the opened page from reaching back to this one.
pub const EXTERNAL_REL: &str = "noopener noreferrer";

/// Link to a course's own page, always opened in an isolated new context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalLink {
    pub href: String,
    pub label: &'static str,
    pub target: &'static str,
    pub rel: &'static str,
}

impl ExternalLink {
    fn new(href: &str, label: &'static str) -> Self {
        Self {
            href: href.to_string(),
            label,
            target: EXTERNAL_TARGET,
            rel: EXTERNAL_REL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseCard {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub detail_href: String,
    pub details_label: &'static str,
    pub external: ExternalLink,
}

impl CourseCard {
    fn from_course(course: &Course) -> Self {
        Self {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            detail_href: detail_href(course.id),
            details_label: VIEW_DETAILS_LABEL,
            external: ExternalLink::new(&course.url, OPEN_COURSE_LABEL),
        }
    }

    /// Where a key press on the focused card navigates, if anywhere.
    pub fn activation_href(&self, key: &str) -> Option<&str> {
        is_activation_key(key).then_some(self.detail_href.as_str())
    }
}

/// `Enter` and Space activate a focused card.
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuickLink {
    pub href: String,
    pub title: String,
}

/// What the list container shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListContent {
    Unavailable,
    NoResults,
    Cards(Vec<CourseCard>),
}

impl ListContent {
    /// Fallback text, for the two cases that render a single message.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            ListContent::Unavailable => Some(NO_COURSES_MESSAGE),
            ListContent::NoResults => Some(NO_RESULTS_MESSAGE),
            ListContent::Cards(_) => None,
        }
    }

    pub fn cards(&self) -> &[CourseCard] {
        match self {
            ListContent::Cards(cards) => cards,
            _ => &[],
        }
    }
}

/// Counter and quick links that accompany a successful list render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSummary {
    pub count: usize,
    pub quick_links: Vec<QuickLink>,
}

impl ResultSummary {
    pub fn label(&self) -> String {
        results_label(self.count)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub content: ListContent,
    /// `None` when the catalog is unavailable; counter and links are then
    /// left untouched.
    pub summary: Option<ResultSummary>,
}

/// `"1 curso encontrado"`, `"3 cursos encontrados"`.
pub fn results_label(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} curso{plural} encontrado{plural}")
}

pub fn render_list(catalog: &Catalog, filter: &str) -> ListView {
    let Some(matches) = catalog.filter(filter) else {
        return ListView {
            content: ListContent::Unavailable,
            summary: None,
        };
    };
    let quick_links = matches
        .iter()
        .map(|course| QuickLink {
            href: detail_href(course.id),
            title: course.title.clone(),
        })
        .collect();
    let content = if matches.is_empty() {
        ListContent::NoResults
    } else {
        ListContent::Cards(
            matches
                .iter()
                .map(|course| CourseCard::from_course(course))
                .collect(),
        )
    };
    ListView {
        content,
        summary: Some(ResultSummary {
            count: matches.len(),
            quick_links,
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseDetail {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub external: ExternalLink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailContent {
    NotFound,
    Course(CourseDetail),
}

impl DetailContent {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DetailContent::NotFound => Some(NOT_FOUND_MESSAGE),
            DetailContent::Course(_) => None,
        }
    }

    pub fn course(&self) -> Option<&CourseDetail> {
        match self {
            DetailContent::Course(detail) => Some(detail),
            DetailContent::NotFound => None,
        }
    }
}

pub fn render_detail(catalog: &Catalog, id: i64) -> DetailContent {
    let course = u32::try_from(id).ok().and_then(|id| catalog.get(id));
    match course {
        Some(course) => DetailContent::Course(CourseDetail {
            id: course.id,
            title: course.title.clone(),
            description: course.description.clone(),
            external: ExternalLink::new(&course.url, OPEN_EXTERNAL_LABEL),
        }),
        None => DetailContent::NotFound,
    }
}

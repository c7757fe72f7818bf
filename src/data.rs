use serde::{Deserialize, Serialize};
use std::fmt;

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub url: String,
}

impl Course {
    /// Case-insensitive substring match against the title. `needle` must
    /// already be lowercased.
    pub fn title_contains(&self, needle: &str) -> bool {
        needle.is_empty() || self.title.to_lowercase().contains(needle)
    }

    pub(crate) fn check(&self) -> Result<(), String> {
        if self.id == 0 {
            return Err("id must be a positive integer".to_string());
        }
        if self.title.trim().is_empty() {
            return Err(format!("course {} has an empty title", self.id));
        }
        if !is_absolute_url(&self.url) {
            return Err(format!(
                "course {} has a non-absolute url {:?}",
                self.id, self.url
            ));
        }
        Ok(())
    }
}

fn is_absolute_url(url: &str) -> bool {
    let Some((scheme, rest)) = url.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let host_ok = rest
        .split(['/', '?', '#'])
        .next()
        .is_some_and(|host| !host.is_empty());
    scheme_ok && host_ok
}

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotASequence,
    InvalidRecord { index: usize, reason: String },
    DuplicateId(u32),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "io error: {err}"),
            CatalogError::Json(err) => write!(f, "invalid json: {err}"),
            CatalogError::NotASequence => write!(f, "catalog is not an ordered sequence"),
            CatalogError::InvalidRecord { index, reason } => {
                write!(f, "invalid course at position {index}: {reason}")
            }
            CatalogError::DuplicateId(id) => write!(f, "duplicate course id {id}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        CatalogError::Io(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        CatalogError::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(url: &str) -> Course {
        Course {
            id: 1,
            title: "Bases de Datos".to_string(),
            description: String::new(),
            url: url.to_string(),
        }
    }

    #[test]
    fn absolute_urls_need_scheme_and_host() {
        assert!(course("https://example.com/curso/1").check().is_ok());
        assert!(course("ftp://files.example.com").check().is_ok());
        assert!(course("/curso/1").check().is_err());
        assert!(course("https:///curso").check().is_err());
        assert!(course("1http://example.com").check().is_err());
    }

    #[test]
    fn title_match_ignores_case() {
        let entry = course("https://example.com");
        assert!(entry.title_contains("datos"));
        assert!(entry.title_contains(""));
        assert!(!entry.title_contains("redes"));
    }
}

//! Reading the page's query string.

use percent_encoding::percent_decode_str;

/// Selects detail mode when present.
pub const ID_PARAM: &str = "id";
/// Seeds the search field on server-rendered pages.
pub const SEARCH_PARAM: &str = "q";
/// Page every internal link points back to.
pub const PAGE_PATH: &str = "index.html";

/// Returns the decoded value of the first `name` parameter in `query`.
///
/// `query` may carry its leading `?`. Keys and values are percent-decoded and
/// `+` stands for a space.
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == name)
        .map(|(_, value)| decode_component(value))
}

/// Identifier requested by the URL, if any.
///
/// Missing, non-numeric and zero values are all treated as absent. Negative
/// values are kept: they select detail mode and simply match nothing.
pub fn selected_id(query: &str) -> Option<i64> {
    query_param(query, ID_PARAM)
        .as_deref()
        .and_then(parse_leading_int)
        .filter(|id| *id != 0)
}

/// Parses the integer at the start of `value`, ignoring whatever follows.
///
/// Leading whitespace and a single sign are allowed; at least one digit must
/// follow. Out-of-range values saturate.
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let rest = value.trim_start();
    let (negative, rest) = match rest.as_bytes().first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit);
    let mut magnitude: i64 = 0;
    let mut seen = false;
    for digit in digits {
        seen = true;
        magnitude = magnitude
            .saturating_mul(10)
            .saturating_add(i64::from(digit - b'0'));
    }
    seen.then(|| if negative { -magnitude } else { magnitude })
}

/// Same-page link that opens the detail view for `id`.
pub fn detail_href(id: u32) -> String {
    format!("{PAGE_PATH}?{ID_PARAM}={id}")
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_matching_param() {
        assert_eq!(query_param("?id=3&id=4", "id").as_deref(), Some("3"));
        assert_eq!(query_param("q=redes", "q").as_deref(), Some("redes"));
        assert_eq!(query_param("?q=", "q").as_deref(), Some(""));
        assert_eq!(query_param("?flag", "flag").as_deref(), Some(""));
        assert_eq!(query_param("?q=web", "id"), None);
        assert_eq!(query_param("", "id"), None);
    }

    #[test]
    fn decodes_percent_and_plus() {
        assert_eq!(
            query_param("?q=bases+de%20datos", "q").as_deref(),
            Some("bases de datos")
        );
        assert_eq!(
            query_param("?q=introducci%C3%B3n", "q").as_deref(),
            Some("introducción")
        );
    }

    #[test]
    fn leading_int_follows_prefix_semantics() {
        assert_eq!(parse_leading_int("3"), Some(3));
        assert_eq!(parse_leading_int("  42abc"), Some(42));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("99999999999999999999999"), Some(i64::MAX));
    }

    #[test]
    fn selected_id_treats_zero_and_garbage_as_absent() {
        assert_eq!(selected_id("?id=5"), Some(5));
        assert_eq!(selected_id("?id=-1"), Some(-1));
        assert_eq!(selected_id("?id=0"), None);
        assert_eq!(selected_id("?id=uno"), None);
        assert_eq!(selected_id("?id="), None);
        assert_eq!(selected_id("?q=web"), None);
    }

    #[test]
    fn detail_href_points_back_to_the_page() {
        assert_eq!(detail_href(4), "index.html?id=4");
    }
}

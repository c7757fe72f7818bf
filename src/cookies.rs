//! Preference cookie format shared by the server and browser hosts.

use cookie::time::Duration;
use cookie::{Cookie, SameSite};

/// Twenty years, the lifetime `cookie` uses for permanent cookies.
const PREFERENCE_MAX_AGE: Duration = Duration::days(365 * 20);

/// `(name, value)` pairs of a `Cookie` header or `document.cookie` string.
/// Malformed pairs are skipped.
pub(crate) fn cookie_pairs(raw: &str) -> impl Iterator<Item = (String, String)> + '_ {
    Cookie::split_parse(raw)
        .flatten()
        .map(|cookie| (cookie.name().to_string(), cookie.value().to_string()))
}

/// Value of the first cookie called `name`.
pub(crate) fn cookie_value(raw: &str, name: &str) -> Option<String> {
    cookie_pairs(raw)
        .find(|(candidate, _)| candidate == name)
        .map(|(_, value)| value)
}

/// Site-wide, long-lived cookie holding one preference. Only `Max-Age` is
/// set, so building it never reads the clock.
pub(crate) fn preference_cookie(name: &str, value: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), value.to_string()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(PREFERENCE_MAX_AGE)
        .build()
}

//! Proxy prefix stripping

use std::borrow::Cow;

/// Remove a proxy-domain wrapper from `url`, returning the wrapped target.
///
/// Patterns are tried in order and the first one found wins; the result is
/// the text after its first occurrence, up to any repeat of the same pattern. With no proxy domain configured,
/// or no pattern present, the input comes back untouched.
pub fn strip_proxy<'a>(url: &'a str, proxy_domain: &str) -> Cow<'a, str> {
    if proxy_domain.is_empty() {
        return Cow::Borrowed(url);
    }

    for pattern in proxy_patterns(proxy_domain) {
        if let Some((_, rest)) = url.split_once(pattern.as_str()) {
            let target = rest
                .split_once(pattern.as_str())
                .map_or(rest, |(target, _)| target);
            tracing::debug!(
                original_url = %url,
                stripped_url = %target,
                pattern_matched = %pattern,
                "Stripped proxy URL"
            );
            return Cow::Owned(target.to_string());
        }
    }

    Cow::Borrowed(url)
}

/// Known proxy prefixes, highest priority first
fn proxy_patterns(domain: &str) -> [String; 5] {
    [
        format!("{domain}/login?url="),
        format!("{domain}?url="),
        format!("{domain}/"),
        format!("http://{domain}/"),
        format!("https://{domain}/"),
    ]
}

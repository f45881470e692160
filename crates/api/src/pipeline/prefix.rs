//! Broker prefix resolution and redirect construction

use brokerlink_shared::RedirectResult;

/// Pick the broker prefix for a referrer.
///
/// Entries are scanned in configuration order and the first key contained in
/// the referrer wins, so overlapping keys resolve to whichever comes first.
pub fn resolve_prefix<'a>(
    referrer: Option<&str>,
    prefixes: &'a [(String, String)],
    default_prefix: &'a str,
) -> &'a str {
    let Some(referrer) = referrer.filter(|r| !r.is_empty()) else {
        tracing::info!("No referrer provided - using default prefix");
        return default_prefix;
    };

    if let Some((ref_domain, prefix)) = prefixes
        .iter()
        .find(|(ref_domain, _)| referrer.contains(ref_domain.as_str()))
    {
        tracing::info!(
            referrer = %referrer,
            prefix = %prefix,
            ref_domain = %ref_domain,
            "Found matching OpenAthens prefix"
        );
        return prefix;
    }

    let available_domains: Vec<&str> = prefixes.iter().map(|(d, _)| d.as_str()).collect();
    tracing::info!(
        referrer = %referrer,
        default_prefix = %default_prefix,
        available_domains = ?available_domains,
        "No matching prefix found for referrer - using default"
    );
    default_prefix
}

/// Percent-encode the whole target as one opaque value. Only `A-Z a-z 0-9
/// - _ . ~` survive; `/`, `:`, `?` and `&` are all escaped.
pub fn encode_target(url: &str) -> String {
    urlencoding::encode(url).into_owned()
}

/// `{prefix}?url={encoded_target}` as a 302 redirect. The target must
/// already be encoded with [`encode_target`].
pub fn build_redirect(prefix: &str, encoded_target: &str) -> RedirectResult {
    RedirectResult::found(format!("{prefix}?url={encoded_target}"))
}

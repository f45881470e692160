//! Host and referrer allow-list checks

use brokerlink_shared::{RejectReason, VerificationResult};
use std::collections::BTreeSet;

/// Check a target URL and optional referrer against the allow-lists.
///
/// Hosts must match exactly as written in the URL (no case folding, port or
/// userinfo normalisation). Referrers pass if any allowed entry is a
/// substring; an empty referrer allow-list disables the check.
pub fn verify_request(
    url: &str,
    referrer: Option<&str>,
    valid_hosts: &BTreeSet<String>,
    valid_referrers: &BTreeSet<String>,
) -> VerificationResult {
    if url.is_empty() {
        tracing::warn!("Empty URL provided");
        return VerificationResult::Invalid(RejectReason::EmptyUrl);
    }

    if let Err(e) = url::Url::parse(url) {
        tracing::error!(
            error_type = "ParseError",
            error_message = %e,
            url = %url,
            referrer = referrer,
            "Request verification error"
        );
        return VerificationResult::Invalid(RejectReason::Unparseable);
    }

    let host = authority(url);
    if !valid_hosts.contains(host) {
        tracing::warn!(
            target_url = %host,
            valid_hosts = ?valid_hosts,
            "Invalid host detected"
        );
        return VerificationResult::Invalid(RejectReason::InvalidHost);
    }

    if let Some(referrer) = referrer.filter(|r| !r.is_empty()) {
        if !valid_referrers.is_empty()
            && !valid_referrers.iter().any(|allowed| referrer.contains(allowed.as_str()))
        {
            tracing::warn!(
                referrer = %referrer,
                valid_referrers = ?valid_referrers,
                "Invalid referrer"
            );
            return VerificationResult::Invalid(RejectReason::InvalidReferrer);
        }
    }

    VerificationResult::Valid
}

/// Authority component exactly as written: after `scheme://`, up to the
/// first `/`, `?` or `#`. Empty when the URL has no `//` part.
fn authority(url: &str) -> &str {
    let rest = match url.split_once(':') {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => url,
    };

    match rest.strip_prefix("//") {
        Some(rest) => rest
            .find(['/', '?', '#'])
            .map_or(rest, |end| &rest[..end]),
        None => "",
    }
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

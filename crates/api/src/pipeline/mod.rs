//! URL normalization and redirect pipeline
//!
//! Each `/encode` request runs four stages in order:
//! - extract: pull `url=` from the query and decode it (at most 5 passes)
//! - unwrap: strip a known proxy-domain prefix
//! - verify: check host and referrer allow-lists
//! - prefix: pick the broker prefix and build the 302 target

mod extract;
mod prefix;
mod unwrap;
mod verify;

pub use extract::{extract_target, safe_decode};
pub use prefix::{build_redirect, encode_target, resolve_prefix};
pub use unwrap::strip_proxy;
pub use verify::verify_request;

use brokerlink_shared::{IncomingRequest, PipelineError, PipelineResult, RedirectResult};
use std::time::Instant;

use crate::config::Config;

/// Run a request through every stage and produce the broker redirect
pub fn process(request: &IncomingRequest, config: &Config) -> PipelineResult<RedirectResult> {
    let started = Instant::now();
    let referrer = request.referrer();

    let decoded = extract_target(&request.url)?;
    let target = strip_proxy(&decoded.value, &config.proxy_domain);
    tracing::info!(original_url = %target, "URL extracted");

    let verdict = verify_request(
        &target,
        referrer,
        &config.valid_hosts,
        &config.valid_referrers,
    );
    if let Some(reason) = verdict.reason() {
        tracing::error!(
            original_url = %target,
            referrer = referrer,
            reason = %reason,
            "URL validation failed"
        );
        return Err(PipelineError::VerificationFailure(reason));
    }

    let prefix = resolve_prefix(
        referrer,
        &config.broker_prefixes,
        &config.default_broker_prefix,
    );
    let encoded_url = encode_target(&target);
    let redirect = build_redirect(prefix, &encoded_url);

    tracing::info!(
        processing_time_ms = started.elapsed().as_millis() as u64,
        original_url = %target,
        encoded_url = %encoded_url,
        openathens_prefix = %prefix,
        final_url = %redirect.location,
        referrer = referrer,
        "URL processing complete"
    );

    Ok(redirect)
}

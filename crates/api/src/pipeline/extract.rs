//! Target extraction and bounded percent-decoding
//!
//! The `url=` parameter is located as a literal substring of the raw query,
//! so anything after it (including further `&` pairs) belongs to the target.

use brokerlink_shared::{DecodedTarget, PipelineError, PipelineResult, MAX_DECODE_PASSES};

const URL_PARAM: &str = "url=";

/// Pull the `url=` value out of a request URL and decode it
pub fn extract_target(request_url: &str) -> PipelineResult<DecodedTarget> {
    tracing::debug!(raw_url = %request_url, "Processing raw request URL");

    let param = raw_query(request_url)
        .and_then(|query| query.find(URL_PARAM).map(|start| &query[start + URL_PARAM.len()..]));

    let encoded = match param {
        Some(encoded) => encoded,
        None => {
            tracing::error!(
                error_type = "MissingParameter",
                request_url = %request_url,
                "URL extraction error"
            );
            return Err(PipelineError::MissingParameter);
        }
    };

    let decoded = safe_decode(encoded)?;
    tracing::debug!(
        raw_url = %request_url,
        encoded_url = %encoded,
        decoded_url = %decoded.value,
        decode_passes = decoded.passes,
        "URL extracted successfully"
    );
    Ok(decoded)
}

/// Query component of a URL: after the first `?`, before any `#`
fn raw_query(request_url: &str) -> Option<&str> {
    let (_, rest) = request_url.split_once('?')?;
    Some(rest.split_once('#').map_or(rest, |(query, _)| query))
}

/// Percent-decode until the value stops changing or the pass limit is hit.
///
/// Decoded bytes that are not valid UTF-8 become U+FFFD, so a pass never
/// fails and a stray Latin-1 escape such as `%E9` cannot stall decoding.
pub fn safe_decode(input: &str) -> PipelineResult<DecodedTarget> {
    if input.is_empty() {
        return Err(PipelineError::MalformedInput("Empty URL provided".to_string()));
    }

    let mut current = input.to_string();
    let mut passes = 0;

    while passes < MAX_DECODE_PASSES {
        let bytes = urlencoding::decode_binary(current.as_bytes());
        let next = String::from_utf8_lossy(&bytes).into_owned();
        passes += 1;

        if next == current {
            break;
        }
        if next.contains(char::REPLACEMENT_CHARACTER)
            && !current.contains(char::REPLACEMENT_CHARACTER)
        {
            tracing::warn!(
                url = %input,
                decode_count = passes,
                "Replaced invalid UTF-8 while decoding URL"
            );
        }
        current = next;
    }

    Ok(DecodedTarget::new(current, passes))
}

//! One ranged GET with response validation and retries.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::control::CancelToken;
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::segmenter::ByteRange;
use crate::transport::{RangeClient, RangeResponse};

/// Accept a response only if it carries exactly the requested bytes.
///
/// 206 is required, except that a 200 is fine when the range is the whole
/// resource (some servers answer a full-range request that way).
pub(crate) fn check_response(
    range: ByteRange,
    total_size: u64,
    resp: RangeResponse,
) -> Result<Vec<u8>, FetchError> {
    let whole = range.start == 0 && range.end == total_size;
    match resp.status {
        206 => {}
        200 if whole => {}
        code => return Err(FetchError::Http(code)),
    }
    let received = resp.body.len() as u64;
    if received != range.len() {
        return Err(FetchError::BodyLength {
            expected: range.len(),
            received,
        });
    }
    Ok(resp.body)
}

/// GET `range` until a valid body arrives or the policy gives up.
/// Each retry bumps `retries`.
pub(crate) fn fetch_chunk<C: RangeClient + ?Sized>(
    client: &C,
    url: &str,
    range: ByteRange,
    total_size: u64,
    policy: &RetryPolicy,
    cancel: &CancelToken,
    retries: &AtomicU64,
) -> Result<Vec<u8>, FetchError> {
    run_with_retry(policy, cancel, |attempt| {
        if attempt > 1 {
            retries.fetch_add(1, Ordering::Relaxed);
        }
        tracing::trace!(range = %range, attempt, "GET");
        let resp = client.get_range(url, range)?;
        check_response(range, total_size, resp)
    })
}

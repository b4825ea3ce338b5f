//! Parse HTTP response header lines into HeadResult.

use super::HeadResult;

/// Parse collected header lines into HeadResult.
///
/// When redirects are followed, curl reports one header block per hop; a
/// status line starts a new block and discards what the previous hop said.
pub(crate) fn parse_headers(lines: &[String]) -> HeadResult {
    let mut result = HeadResult::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            let status = line
                .split_whitespace()
                .nth(1)
                .and_then(|code| code.parse::<u32>().ok())
                .unwrap_or(0);
            result = HeadResult {
                status,
                ..HeadResult::default()
            };
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-length") {
                result.content_length = value.parse::<u64>().ok();
            } else if name.eq_ignore_ascii_case("accept-ranges") {
                result.accept_ranges = value
                    .split(',')
                    .any(|unit| unit.trim().eq_ignore_ascii_case("bytes"));
            } else if name.eq_ignore_ascii_case("etag") {
                result.etag = Some(value.trim_matches('"').to_string());
            } else if name.eq_ignore_ascii_case("last-modified") {
                result.last_modified = Some(value.to_string());
            }
        }
    }

    result
}

//! Classify HTTP status, curl and IO errors into retry policy error kinds.

use super::error::FetchError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Http5xx(code as u16),
        _ => ErrorKind::Other,
    }
}

/// Classify a curl error for retry decisions.
pub fn classify_curl_error(e: &curl::Error) -> ErrorKind {
    if e.is_operation_timedout() {
        return ErrorKind::Timeout;
    }
    if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_read_error()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        return ErrorKind::Connection;
    }
    ErrorKind::Other
}

/// Classify an IO error for retry decisions.
pub fn classify_io_error(e: &std::io::Error) -> ErrorKind {
    use std::io::ErrorKind as Io;
    match e.kind() {
        Io::TimedOut | Io::WouldBlock => ErrorKind::Timeout,
        Io::ConnectionReset
        | Io::ConnectionAborted
        | Io::ConnectionRefused
        | Io::BrokenPipe
        | Io::UnexpectedEof
        | Io::Interrupted => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

/// Classify a fetch error into an ErrorKind.
///
/// A short or oversized body counts as a connection failure: the next attempt
/// usually gets the full range.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::Curl(ce) => classify_curl_error(ce),
        FetchError::Io(ioe) => classify_io_error(ioe),
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::BodyLength { .. } => ErrorKind::Connection,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn http_429_and_503_throttled() {
        assert_eq!(classify_http_status(429), ErrorKind::Throttled);
        assert_eq!(classify_http_status(503), ErrorKind::Throttled);
    }

    #[test]
    fn http_5xx_retryable() {
        assert!(matches!(classify_http_status(500), ErrorKind::Http5xx(500)));
        assert!(matches!(classify_http_status(502), ErrorKind::Http5xx(502)));
    }

    #[test]
    fn http_4xx_and_unexpected_2xx_other() {
        assert_eq!(classify_http_status(404), ErrorKind::Other);
        assert_eq!(classify_http_status(416), ErrorKind::Other);
        assert_eq!(classify_http_status(200), ErrorKind::Other);
    }

    #[test]
    fn io_errors() {
        let reset = FetchError::Io(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert_eq!(classify(&reset), ErrorKind::Connection);
        let timeout = FetchError::Io(io::Error::new(io::ErrorKind::TimedOut, "slow"));
        assert_eq!(classify(&timeout), ErrorKind::Timeout);
        let denied = FetchError::Io(io::Error::new(io::ErrorKind::PermissionDenied, "no"));
        assert_eq!(classify(&denied), ErrorKind::Other);
    }

    #[test]
    fn body_length_is_retryable() {
        let e = FetchError::BodyLength { expected: 10, received: 4 };
        assert_eq!(classify(&e), ErrorKind::Connection);
    }
}

//! Blocking page fetch over libcurl.
//!
//! Runs in the current thread; call from `spawn_blocking` when used from
//! async code.

use std::time::Duration;

/// Connect timeout applied to every fetch.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Curl(#[from] curl::Error),
    #[error("HTTP {0}")]
    Http(u32),
}

impl FetchError {
    /// Short reason suitable for a failed fetch outcome.
    pub fn reason(&self) -> String {
        match self {
            FetchError::Curl(e) => e.description().to_string(),
            FetchError::Http(code) => format!("HTTP {}", code),
        }
    }
}

/// GET `url` and return the body. Redirects are followed; anything outside
/// 2xx is an error.
pub fn fetch_bytes(url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.connect_timeout(CONNECT_TIMEOUT.min(timeout))?;
    easy.timeout(timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    tracing::trace!(%url, bytes = body.len(), "fetched");
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_reason() {
        assert_eq!(FetchError::Http(404).reason(), "HTTP 404");
        assert_eq!(FetchError::Http(503).to_string(), "HTTP 503");
    }

    #[test]
    fn unsupported_scheme_is_transport_error() {
        let err = fetch_bytes("notaproto://example.invalid/x", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, FetchError::Curl(_)));
    }
}

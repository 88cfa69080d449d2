use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use thiserror::Error;

/// Longest slice of a response body kept in an error message.
const BODY_PREVIEW_CHARS: usize = 512;

#[derive(Error, Debug)]
pub enum GistError {
    #[error("gist request timed out: {url}")]
    Timeout { url: String },

    #[error("gist request failed: {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 401, or a 403 that is not rate limiting: the token is wrong, expired
    /// or lacks the `gist` scope.
    #[error("access token rejected (status {status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// The document addressed by a cached id no longer exists.
    #[error("gist not found: {url}")]
    NotFound { url: String },

    #[error("rate limited by GitHub{}", reset_hint(.reset_at))]
    RateLimited { reset_at: Option<i64> },

    #[error("unexpected status {status} from {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },

    #[error("invalid response from {url}: {source} | body={preview}")]
    Decode {
        url: String,
        preview: String,
        #[source]
        source: serde_json::Error,
    },
}

fn reset_hint(reset_at: &Option<i64>) -> String {
    reset_at
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|at| format!(", retry after {}", at.to_rfc3339()))
        .unwrap_or_default()
}

impl GistError {
    pub(crate) fn transport(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }

    /// Classify a non-success response.
    pub(crate) fn from_response(
        status: StatusCode,
        headers: &HeaderMap,
        url: String,
        body: &str,
    ) -> Self {
        let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
            || (status == StatusCode::FORBIDDEN
                && header_value(headers, "x-ratelimit-remaining") == Some("0"));
        if rate_limited {
            let reset_at = header_value(headers, "x-ratelimit-reset").and_then(|v| v.parse().ok());
            return Self::RateLimited { reset_at };
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Unauthorized {
                status: status.as_u16(),
                message: api_message(body),
            },
            StatusCode::NOT_FOUND => Self::NotFound { url },
            _ => Self::Status {
                status: status.as_u16(),
                url,
                message: api_message(body),
            },
        }
    }

    pub(crate) fn decode(url: String, body: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            url,
            preview: preview_body(body),
            source,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Transport { source, .. } => source.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

/// GitHub error bodies are `{"message": ..}`; anything else is previewed.
fn api_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| preview_body(body))
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    match trimmed.char_indices().nth(BODY_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

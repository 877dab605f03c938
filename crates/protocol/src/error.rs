//! Error taxonomy shared by the leaf upload clients.

/// Broad classification of an upload failure.
///
/// Kinds are never translated on the way up: an error raised by a leaf
/// client keeps its kind all the way to the caller of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required setting is missing. Raised before any network call.
    Configuration,
    /// The file is outside the accepted type/size policy.
    Validation,
    /// The request was sent but no response was received.
    Network,
    /// The service answered with a non-success response.
    Service,
}

/// Errors raised by the object storage and device testing clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            // The request could not be built, so nothing was sent.
            Self::Configuration(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl ClientError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Network(_) | Self::Io(_) => ErrorKind::Network,
            Self::Service { .. } | Self::InvalidResponse(_) => ErrorKind::Service,
        }
    }

    /// Builds a `Configuration` error for a missing setting.
    pub fn missing_setting(name: &str) -> Self {
        Self::Configuration(format!("{name} is not set"))
    }

    /// Parses an endpoint URL, reporting a malformed one as a
    /// configuration error naming `setting`.
    pub fn parse_endpoint(setting: &str, url: &str) -> Result<reqwest::Url, Self> {
        let parsed = reqwest::Url::parse(url).map_err(|e| {
            Self::Configuration(format!("{setting} {url:?} is not a valid URL: {e}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Self::Configuration(format!(
                "{setting} {url:?} must be an http(s) URL"
            )));
        }
        Ok(parsed)
    }

    /// Returns the HTTP status for `Service` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Service { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Builds a `Service` error from a failed response body.
    ///
    /// Looks for a provider message under `error` (string or
    /// `{"message": ..}`) or `message`, and falls back to the status
    /// line when the body carries none.
    pub fn from_response(status: u16, reason: Option<&str>, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| match reason {
            Some(reason) if !reason.is_empty() => reason.to_string(),
            _ => "request failed".to_string(),
        });
        Self::Service { status, message }
    }
}

fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let candidate = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(serde_json::Value::Object(obj)) => obj
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string),
        _ => None,
    };
    candidate
        .or_else(|| {
            value
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.trim().is_empty())
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Transport failure, non-success status or timeout.
    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response from {provider}: {details}")]
    MalformedResponse { provider: String, details: String },

    #[error("invalid geocode request: {0}")]
    InvalidRequest(String),
}

impl GeocodeError {
    pub fn malformed(provider: &str, details: impl Into<String>) -> Self {
        Self::MalformedResponse {
            provider: provider.to_string(),
            details: details.into(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::malformed("http", error.to_string())
        } else {
            Self::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GeocodeError {
    fn from(error: serde_json::Error) -> Self {
        Self::malformed("json", error.to_string())
    }
}

impl From<url::ParseError> for GeocodeError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidRequest(error.to_string())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PositionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_are_malformed_responses() {
        let error = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let mapped = GeocodeError::from(error);
        assert!(matches!(mapped, GeocodeError::MalformedResponse { .. }));
        assert!(!mapped.is_network());
    }

    #[test]
    fn url_errors_are_invalid_requests() {
        let error = url::Url::parse("not a url").unwrap_err();
        assert!(matches!(
            GeocodeError::from(error),
            GeocodeError::InvalidRequest(_)
        ));
    }
}

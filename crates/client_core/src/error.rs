use thiserror::Error;

/// Local input problems caught before any request is sent.
///
/// The display text is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose an image to upload.")]
    MissingFile,
    #[error("Please select an image to process.")]
    MissingSelection,
    #[error("Choose at least one operation.")]
    EmptyOperationSet,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("image service returned HTTP {status}")]
    Http { status: u16, detail: Option<String> },

    #[error("{context}: {source}")]
    Network {
        context: String,
        source: reqwest::Error,
    },

    #[error("{context}: {source}")]
    MalformedResponse {
        context: String,
        source: reqwest::Error,
    },

    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Status text for the user: the service's own detail when it sent one,
    /// otherwise "<action> failed (<status>)" or "<action> failed: <reason>".
    pub fn user_message(&self, action: &str) -> String {
        match self {
            Self::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::Http {
                status,
                detail: None,
            } => format!("{action} failed ({status})"),
            Self::Network { source, .. } if source.is_timeout() => {
                format!("{action} failed: request timed out")
            }
            Self::Network { .. } => format!("{action} failed: service unreachable"),
            Self::MalformedResponse { .. } => {
                format!("{action} failed: unexpected response from service")
            }
            Self::InvalidUrl(err) => format!("{action} failed: {err}"),
        }
    }
}

pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_user_facing() {
        assert_eq!(
            ValidationError::MissingFile.to_string(),
            "Please choose an image to upload."
        );
        assert_eq!(
            ValidationError::MissingSelection.to_string(),
            "Please select an image to process."
        );
        assert_eq!(
            ValidationError::EmptyOperationSet.to_string(),
            "Choose at least one operation."
        );
    }

    #[test]
    fn http_error_prefers_service_detail() {
        let err = GatewayError::Http {
            status: 415,
            detail: Some("Unsupported image type".into()),
        };
        assert_eq!(err.user_message("Upload"), "Unsupported image type");
        assert_eq!(err.status(), Some(415));
    }

    #[test]
    fn http_error_without_detail_falls_back_to_status() {
        let err = GatewayError::Http {
            status: 502,
            detail: None,
        };
        assert_eq!(err.user_message("Upload"), "Upload failed (502)");
        assert_eq!(err.user_message("Processing"), "Processing failed (502)");
    }
}

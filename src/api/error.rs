/// A failed backend call.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// The backend could not be reached, or the connection failed mid-call.
    #[error("could not reach the backend: {0}")]
    Transport(String),

    /// The backend answered with a non-2xx status.
    ///
    /// `from_body` records whether `detail` came from the response body or
    /// was synthesised from the status code.
    #[error("{detail}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The human-readable failure detail.
        detail: String,
        /// Whether the backend supplied the detail itself.
        from_body: bool,
    },

    /// The backend answered 2xx but reported `success: false`.
    #[error("{detail}")]
    Rejected {
        /// The backend's explanation.
        detail: String,
    },

    /// The backend answered 2xx with a body that could not be decoded.
    #[error("malformed response from the backend: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Whether the backend itself refused the operation and explained why.
    ///
    /// Rejections carry a detail worth showing to the user verbatim.
    /// Everything else is an infrastructure failure.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::Rejected { .. }
                | Self::Status {
                    from_body: true,
                    ..
                }
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::Malformed(error.to_string())
        } else if error.is_timeout() {
            Self::Transport("the request timed out".to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

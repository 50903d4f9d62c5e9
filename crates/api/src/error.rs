use thiserror::Error;

/// The one retryable line shown for any network-shaped failure. Users never
/// see transport internals.
pub const CONNECTION_FAILED: &str = "connection failed. check your network and try again.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// A 409 from registration means the ID was taken after all, whatever
    /// the duplicate probe said earlier.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Status { status: 409, .. })
    }

    /// Screen-ready failure line. Transport and decode problems collapse
    /// into [`CONNECTION_FAILED`]; server-provided messages pass through.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Decode(_) => CONNECTION_FAILED.to_string(),
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            Self::Status { status, .. } => format!("request failed ({status})."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn server_messages_pass_through() {
        let err = ApiError::Status {
            status: 409,
            message: "this id is already in use.".into(),
        };
        assert!(err.is_conflict());
        assert_eq!(err.user_message(), "this id is already in use.");
    }

    #[test]
    fn silent_statuses_get_a_generic_line() {
        let err = ApiError::Status {
            status: 500,
            message: String::new(),
        };
        assert!(!err.is_conflict());
        assert_eq!(err.user_message(), "request failed (500).");
    }

    #[test]
    fn malformed_bodies_read_as_connection_trouble() {
        let decode = serde_json::from_str::<crate::types::ErrorBody>("garbage").unwrap_err();
        let err = ApiError::from(decode);
        assert_eq!(err.user_message(), CONNECTION_FAILED);
    }
}

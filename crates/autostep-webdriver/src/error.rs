use autostep_core::driver::DriverError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A W3C error response, e.g. `no such element`.
    #[error("{error}: {message}")]
    Command { error: String, message: String },

    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl WebDriverError {
    pub fn is_no_such_element(&self) -> bool {
        matches!(self, Self::Command { error, .. } if error == "no such element")
    }

    pub fn is_session_gone(&self) -> bool {
        matches!(
            self,
            Self::Command { error, .. } if error == "invalid session id" || error == "no such window"
        )
    }
}

impl From<WebDriverError> for DriverError {
    fn from(e: WebDriverError) -> Self {
        if e.is_session_gone() {
            DriverError::Closed
        } else {
            DriverError::Protocol(e.to_string())
        }
    }
}

use autostep_core::error::AutostepError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// An error that already knows its HTTP status.
#[derive(Debug)]
struct StatusError {
    status: StatusCode,
    message: String,
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for StatusError {}

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    pub fn with_status(status: StatusCode, msg: impl Into<String>) -> Self {
        Self(
            StatusError {
                status,
                message: msg.into(),
            }
            .into(),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, msg)
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, msg)
    }

    fn status(&self) -> StatusCode {
        if let Some(e) = self.0.downcast_ref::<StatusError>() {
            return e.status;
        }
        match self.0.downcast_ref::<AutostepError>() {
            Some(AutostepError::SiteNotFound(_) | AutostepError::ScriptNotFound { .. }) => {
                StatusCode::NOT_FOUND
            }
            Some(
                AutostepError::MissingArgument(_)
                | AutostepError::InvalidAssetPath(_)
                | AutostepError::Yaml(_)
                | AutostepError::Json(_),
            ) => StatusCode::BAD_REQUEST,
            Some(AutostepError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_statuses() {
        let cases = [
            (AutostepError::SiteNotFound("demo".into()), StatusCode::NOT_FOUND),
            (
                AutostepError::ScriptNotFound {
                    site: "demo".into(),
                    script: "login".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (AutostepError::MissingArgument("user".into()), StatusCode::BAD_REQUEST),
            (
                AutostepError::NotConfigured("asset origin".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AutostepError::Io(std::io::Error::other("disk full")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn explicit_statuses_win() {
        assert_eq!(
            AppError::conflict("nothing to acknowledge").into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::bad_request("empty key").into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn foreign_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

pub const BASIC_AUTH_CHALLENGE: &str = r#"Basic realm="invoicer""#;

/// Every failure a handler can report. Bodies are plain text.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("please authenticate")]
    Unauthorized,

    #[error("Invalid CSRF Token")]
    CsrfRejected,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::CsrfRejected => StatusCode::NOT_ACCEPTABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Internal(err) => {
                error!("{:#}", err);
                (status, format!("{:#}", err)).into_response()
            }
            Self::Unauthorized => (
                status,
                [(header::WWW_AUTHENTICATE, BASIC_AUTH_CHALLENGE)],
                "please authenticate",
            )
                .into_response(),
            other => {
                warn!("{}: {}", status, other);
                (status, other.to_string()).into_response()
            }
        }
    }
}

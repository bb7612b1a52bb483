//! Error handling

use axum::response::IntoResponse;
use tracing::info;

/// Web layer errors. Generation failures aren't here, they're rendered as page content.
#[derive(Debug)]
pub enum AppError {
    /// When you didn't do the right thing
    BadRequest(String),
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match self {
            AppError::BadRequest(message) => {
                info!("Bad request received: {}", message);
                let mut response = axum::response::Response::new(axum::body::Body::from(format!(
                    "Bad Request: {message}"
                )));
                *response.status_mut() = axum::http::StatusCode::BAD_REQUEST;
                response
            }
        }
    }
}

use crate::router::DispatchError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Dispatch(DispatchError::UnknownModule { .. }) => StatusCode::NOT_FOUND,
            Self::Dispatch(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Dispatch(err) => err.code(),
            Self::BadRequest(_) => "bad_request",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Client-facing body. Only the first line of the error text is kept.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code().to_string(),
            message: first_line(&self.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

pub fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().trim_end().to_string()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "request rejected");
        }
        (status, Json(self.body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolkit::{ToolKind, ToolkitError};

    #[test]
    fn multi_line_tool_errors_are_cut_to_first_line() {
        let err = ApiError::Dispatch(DispatchError::ConversionTool {
            module: "module_2".to_string(),
            source: ToolkitError::NonZeroExit {
                tool: ToolKind::Ghostscript,
                exit_code: 1,
                stderr: "Error: /undefinedfilename\nOperand stack:\n  --nostringval--".to_string(),
                command_form: "gs ...".to_string(),
            },
        });
        let body = err.body();
        assert_eq!(body.code, "conversion_tool_error");
        assert_eq!(
            body.message,
            "module `module_2` conversion failed: ghostscript failed with exit code 1: Error: /undefinedfilename"
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unknown_module_maps_to_not_found() {
        let err = ApiError::from(DispatchError::UnknownModule {
            name: "nope".to_string(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.body().message, "unknown module `nope`");
    }

    #[test]
    fn empty_text_has_empty_first_line() {
        assert_eq!(first_line(""), "");
        assert_eq!(first_line("one\r\ntwo"), "one");
    }
}

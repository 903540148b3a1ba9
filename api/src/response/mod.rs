use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use services::{ErrorKind, ServiceError};
use validator::ValidationErrors;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// Errors carry `success: false`, an empty `data` object and the reason in
/// `message`.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Error responses carry `T::default()` as data.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Placeholder payload for responses without data.
#[derive(Debug, Serialize, Default)]
pub struct Empty {}

/// A failed request: HTTP status plus the message shown to the caller.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::StateConflict | ErrorKind::Capacity => StatusCode::CONFLICT,
        ErrorKind::QrCode => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let kind = err.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %err, "Request failed");
            return ApiError::internal();
        }
        ApiError::new(status_for(kind), err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::from(ServiceError::from(errors))
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(err: sea_orm::DbErr) -> Self {
        ApiError::from(ServiceError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<Empty>::error(self.message))).into_response()
    }
}

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

pub fn ok<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data, message))))
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data, message))))
}

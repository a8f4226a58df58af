use application::ApplicationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                code,
                message: message.into(),
                errors: None,
            },
        }
    }

    fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.body.errors = Some(errors);
        self
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        use application::ApplicationError as AppErr;
        use domain::DomainError;

        match error {
            AppErr::Domain(DomainError::Validation { errors }) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION",
                errors.join("; "),
            )
            .with_errors(errors),
            AppErr::Domain(DomainError::DuplicateName { name }) => ApiError::new(
                StatusCode::CONFLICT,
                "NAME_TAKEN",
                format!("participant name already taken: {name}"),
            ),
            AppErr::Domain(DomainError::UnknownSender { name }) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNKNOWN_SENDER",
                format!("sender is not an active participant: {name}"),
            ),
            AppErr::Domain(DomainError::ParticipantNotFound { name }) => ApiError::new(
                StatusCode::NOT_FOUND,
                "PARTICIPANT_NOT_FOUND",
                format!("participant not found: {name}"),
            ),
            AppErr::Domain(DomainError::MessageNotFound) => ApiError::new(
                StatusCode::NOT_FOUND,
                "MESSAGE_NOT_FOUND",
                "message not found",
            ),
            AppErr::Domain(DomainError::Forbidden) => ApiError::new(
                StatusCode::UNAUTHORIZED,
                "NOT_MESSAGE_AUTHOR",
                "caller is not the message author",
            ),
            AppErr::Domain(DomainError::InvalidLimit { value }) => ApiError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_LIMIT",
                format!("limit must be a positive integer: {value}"),
            ),
            AppErr::Repository(repo_err) => ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                format!("storage error: {repo_err}"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

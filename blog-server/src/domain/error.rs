use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::form::FieldErrors;

pub const LOGIN_URL: &str = "/auth/login/";

/// Login page address, carrying the page to return to when known.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(path) => format!("{LOGIN_URL}?next={path}"),
        None => LOGIN_URL.to_string(),
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(Uuid),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("comment not found: {0}")]
    CommentNotFound(Uuid),
    #[error("tag not found: {0}")]
    TagNotFound(String),
    #[error("forbidden")]
    Forbidden,
    /// Raised by services, which do not know the request path. Handlers
    /// check login themselves and redirect with `next` set.
    #[error("login required")]
    Unauthenticated,
    #[error("unauthorized")]
    Unauthorized,
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {}", err))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::CommentNotFound(_)
            | DomainError::TagNotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthenticated => StatusCode::SEE_OTHER,
            DomainError::Unauthorized => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden => StatusCode::FORBIDDEN,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let DomainError::Unauthenticated = self {
            return HttpResponse::SeeOther()
                .insert_header((LOCATION, login_url(None)))
                .finish();
        }

        let message = self.to_string();
        let details = match self {
            DomainError::PostNotFound(resource)
            | DomainError::CommentNotFound(resource)
            | DomainError::UserNotFound(resource) => Some(json!({ "resource": resource })),
            DomainError::TagNotFound(slug) => Some(json!({ "slug": slug })),
            DomainError::Forbidden => {
                Some(json!({ "message": "only the author may change this entry" }))
            }
            DomainError::Validation(errors) => Some(json!({ "errors": errors })),
            DomainError::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                None
            }
            _ => None,
        };
        let message = match self {
            DomainError::Internal(_) => "internal error",
            _ => message.as_str(),
        };
        let body = ErrorBody {
            error: message,
            details,
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

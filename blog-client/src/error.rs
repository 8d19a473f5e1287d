use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlogClientError {
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Token storage error: {0}")]
    TokenStorage(#[from] std::io::Error),
    #[error("Not found")]
    NotFound,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: only the author may do that")]
    Forbidden,
    #[error("Login required")]
    LoginRequired,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl BlogClientError {
    pub async fn from_http_response(resp: Response) -> Self {
        let status = resp.status();
        match status {
            StatusCode::NOT_FOUND => BlogClientError::NotFound,
            StatusCode::UNAUTHORIZED => BlogClientError::Unauthorized,
            StatusCode::FORBIDDEN => BlogClientError::Forbidden,
            StatusCode::SEE_OTHER => BlogClientError::LoginRequired,
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                let body = resp.text().await.unwrap_or_default();
                BlogClientError::InvalidRequest(body)
            }
            other => BlogClientError::UnexpectedResponse(other.to_string()),
        }
    }
}

use actix_web::dev::Payload;
use actix_web::http::header::LOCATION;
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest, HttpResponse};
use futures_util::future::{Ready, ready};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::domain::authorization::Actor;
use crate::domain::error::{DomainError, login_url};
use crate::presentation::middleware::RequestId;

/// The identity middleware stores the resolved actor in the request
/// extensions; requests that never went through it are anonymous.
impl FromRequest for Actor {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(req.extensions().get::<Actor>().cloned().unwrap_or_default()))
    }
}

pub async fn actor_from_token(token: &str, auth_service: &AuthService) -> Result<Actor, Error> {
    let claims = auth_service
        .keys()
        .verify_token(token)
        .map_err(|_| DomainError::Unauthorized)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| DomainError::Unauthorized)?;

    let user = auth_service
        .get_user(user_id)
        .await
        .map_err(|err| match err {
            DomainError::UserNotFound(_) => DomainError::Unauthorized,
            other => other,
        })?;

    Ok(Actor::User(user.as_author()))
}

pub fn see_other(location: impl Into<String>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location.into()))
        .finish()
}

/// Sends an anonymous actor to the login page, remembering where they were.
pub fn login_redirect(req: &HttpRequest) -> HttpResponse {
    see_other(login_url(Some(req.path())))
}

pub fn post_url(id: Uuid) -> String {
    format!("/post/{}/", id)
}

pub fn request_id(req: &HttpRequest) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|rid| rid.0.clone())
        .unwrap_or_else(|| "unknown".into())
}

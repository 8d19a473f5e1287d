use crate::application::auth_service::AuthService;
use crate::domain::error::{DomainError, LOGIN_URL};
use crate::infrastructure::security::TOKEN_TTL_SECONDS;
use crate::presentation::dto::{AuthResponse, LoginPage, LoginPageQuery, LoginRequest, RegisterRequest};
use actix_web::{HttpResponse, Responder, Scope, get, post, web};
use tracing::info;

pub fn scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login_page)
        .service(login)
}

#[post("/register/")]
async fn register(
    service: web::Data<AuthService>,
    payload: web::Json<RegisterRequest>,
) -> Result<impl Responder, DomainError> {
    let RegisterRequest {
        username,
        email,
        password,
    } = payload.into_inner();

    let user = service.register(username, email, password).await?;
    let token = service.issue_token(user.id)?;

    info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_SECONDS,
        token_type: "Bearer".to_string(),
    }))
}

/// Where anonymous mutation attempts are sent.
#[get("/login/")]
async fn login_page(query: web::Query<LoginPageQuery>) -> impl Responder {
    HttpResponse::Ok().json(LoginPage {
        login_url: LOGIN_URL,
        method: "POST",
        fields: ["username", "password"],
        next: query.into_inner().next,
    })
}

#[post("/login/")]
async fn login(
    service: web::Data<AuthService>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, DomainError> {
    let token = service.login(&payload.username, &payload.password).await?;

    info!(username = %payload.username, "user logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token: token,
        expires_in: TOKEN_TTL_SECONDS,
        token_type: "Bearer".to_string(),
    }))
}

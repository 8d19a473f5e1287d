use std::future::{Ready, ready};
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Instant;

use actix_service::{Service, Transform};
use actix_web::body::EitherBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header::{AUTHORIZATION, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, web};
use futures_util::future::LocalBoxFuture;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::auth_service::AuthService;
use crate::domain::authorization::Actor;
use crate::domain::error::DomainError;
use crate::presentation::utils::actor_from_token;

const REQUEST_ID_HEADER: &str = "x-request-id";
const TIMING_HEADER: &str = "server-timing";

#[derive(Clone)]
pub struct RequestId(pub String);

/// Tags every request with an id (reusing the caller's `x-request-id`),
/// logs its outcome and reports the handling time in `server-timing`.
pub struct RequestTracing;

impl<S, B> Transform<S, ServiceRequest> for RequestTracing
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestTracingService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestTracingService { service }))
    }
}

pub struct RequestTracingService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestTracingService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let method = req.method().clone();
        let path = req.path().to_owned();

        req.extensions_mut().insert(RequestId(request_id.clone()));

        let fut = self.service.call(req);

        Box::pin(async move {
            let mut res = fut.await?;
            let duration = start.elapsed();

            info!(
                request_id = %request_id,
                method = %method,
                path = %path,
                status = res.status().as_u16(),
                duration_ms = duration.as_millis() as u64,
                "request completed"
            );

            let headers = res.response_mut().headers_mut();
            if let Ok(value) = HeaderValue::from_str(&request_id) {
                headers.insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            if let Ok(value) = HeaderValue::from_str(&format!("app;dur={}", duration.as_millis()))
            {
                headers.insert(HeaderName::from_static(TIMING_HEADER), value);
            }

            Ok(res)
        })
    }
}

/// Resolves the bearer token, if any, into the request's [`Actor`].
/// Requests without a token proceed anonymously; a bad token is rejected.
pub struct IdentityMiddleware;

impl<S, B> Transform<S, ServiceRequest> for IdentityMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = IdentityService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(IdentityService {
            service: Rc::new(service),
        }))
    }
}

pub struct IdentityService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for IdentityService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        let auth_service = req.app_data::<web::Data<AuthService>>().cloned();
        let auth_header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        Box::pin(async move {
            // Rejections are answered here, never returned as service errors.
            let actor = match resolve_actor(auth_header, auth_service).await {
                Ok(actor) => actor,
                Err(err) => {
                    let res = req.into_response(err.error_response());
                    return Ok(res.map_into_right_body());
                }
            };

            req.extensions_mut().insert(actor);
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}

async fn resolve_actor(
    auth_header: Option<String>,
    auth_service: Option<web::Data<AuthService>>,
) -> Result<Actor, Error> {
    let Some(header) = auth_header else {
        return Ok(Actor::Anonymous);
    };
    let auth_service = auth_service
        .ok_or_else(|| DomainError::Internal("AuthService missing".to_string()))?;
    let token = header.strip_prefix("Bearer ").ok_or_else(|| {
        warn!("malformed authorization header");
        DomainError::Unauthorized
    })?;
    actor_from_token(token.trim(), auth_service.get_ref()).await
}

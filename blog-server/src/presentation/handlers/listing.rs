use actix_web::{HttpRequest, HttpResponse, get, web};
use tracing::debug;

use crate::application::query_service::QueryService;
use crate::domain::error::DomainError;
use crate::presentation::dto::SearchQuery;
use crate::presentation::utils::request_id;

#[get("/")]
async fn list_posts(
    req: HttpRequest,
    queries: web::Data<QueryService>,
) -> Result<HttpResponse, DomainError> {
    let listing = queries.list_posts().await?;

    debug!(
        request_id = %request_id(&req),
        count = listing.posts.len(),
        "posts listed"
    );

    Ok(HttpResponse::Ok().json(listing))
}

#[get("/tag/{slug}/")]
async fn tagged_posts(
    req: HttpRequest,
    queries: web::Data<QueryService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let slug = path.into_inner();
    let listing = queries.tagged_posts(&slug).await?;

    debug!(
        request_id = %request_id(&req),
        tag = %slug,
        count = listing.posts.len(),
        "tagged posts listed"
    );

    Ok(HttpResponse::Ok().json(listing))
}

#[get("/search/")]
async fn search(
    req: HttpRequest,
    queries: web::Data<QueryService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, DomainError> {
    let listing = queries.search(query.q.as_deref()).await?;

    debug!(
        request_id = %request_id(&req),
        count = listing.posts.len(),
        "search completed"
    );

    Ok(HttpResponse::Ok().json(listing))
}

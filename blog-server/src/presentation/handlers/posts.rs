use actix_web::{Error, HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::application::post_service::PostService;
use crate::domain::authorization::{Actor, require_login};
use crate::domain::error::DomainError;
use crate::domain::form::FieldErrors;
use crate::domain::post::PostDraft;
use crate::presentation::dto::{CommentForm, PostDeleteView, PostDetailView, PostForm, PostFormView};
use crate::presentation::utils::{login_redirect, post_url, request_id, see_other};

#[get("/post/new/")]
async fn new_post_form(req: HttpRequest, actor: Actor) -> Result<HttpResponse, DomainError> {
    if require_login(&actor).is_err() {
        return Ok(login_redirect(&req));
    }

    Ok(HttpResponse::Ok().json(PostFormView {
        post: None,
        form: PostForm::default(),
        errors: FieldErrors::new(),
    }))
}

#[post("/post/new/")]
async fn create_post(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    form: Result<web::Form<PostForm>, Error>,
) -> Result<HttpResponse, Error> {
    if require_login(&actor).is_err() {
        return Ok(login_redirect(&req));
    }

    let form = form?.into_inner();
    let draft = match PostDraft::parse(&form.title, &form.content, &form.tags) {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(HttpResponse::UnprocessableEntity().json(PostFormView {
                post: None,
                form,
                errors,
            }));
        }
    };

    let post = posts.create_post(&actor, draft).await?;

    info!(
        request_id = %request_id(&req),
        author = %post.author,
        post_id = %post.id,
        "post created"
    );

    Ok(see_other(post_url(post.id)))
}

#[get("/post/{id}/")]
async fn post_detail(
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let detail = posts.post_detail(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostDetailView::new(
        detail,
        CommentForm::default(),
        FieldErrors::new(),
    )))
}

#[get("/post/{id}/update/")]
async fn edit_post_form(
    actor: Actor,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.owned_post(&actor, path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(PostFormView {
        form: PostForm::from(&post),
        post: Some(post),
        errors: FieldErrors::new(),
    }))
}

#[post("/post/{id}/update/")]
async fn update_post(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
    form: Result<web::Form<PostForm>, Error>,
) -> Result<HttpResponse, Error> {
    let post_id = path.into_inner();
    let current = posts.owned_post(&actor, post_id).await?;

    let form = form?.into_inner();
    let draft = match PostDraft::parse(&form.title, &form.content, &form.tags) {
        Ok(draft) => draft,
        Err(errors) => {
            return Ok(HttpResponse::UnprocessableEntity().json(PostFormView {
                post: Some(current),
                form,
                errors,
            }));
        }
    };

    let post = posts.update_post(&actor, post_id, draft).await?;

    info!(
        request_id = %request_id(&req),
        author = %post.author,
        post_id = %post.id,
        "post updated"
    );

    Ok(see_other(post_url(post.id)))
}

#[get("/post/{id}/delete/")]
async fn confirm_delete_post(
    actor: Actor,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post = posts.owned_post(&actor, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostDeleteView { post }))
}

#[post("/post/{id}/delete/")]
async fn delete_post(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let post_id = path.into_inner();
    posts.delete_post(&actor, post_id).await?;

    info!(
        request_id = %request_id(&req),
        post_id = %post_id,
        "post deleted"
    );

    Ok(see_other("/"))
}

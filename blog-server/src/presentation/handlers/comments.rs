use actix_web::{Error, HttpRequest, HttpResponse, get, post, web};
use tracing::info;
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::domain::authorization::{Actor, require_login};
use crate::domain::comment::CommentDraft;
use crate::domain::error::DomainError;
use crate::presentation::dto::{CommentDeleteView, CommentForm, CommentView, PostDetailView};
use crate::presentation::utils::{login_redirect, post_url, request_id, see_other};

/// Comment submission from the post page. Invalid input re-renders the page
/// with the submitted form and its errors; an unreadable body is reported
/// only once the post exists and the actor is logged in.
#[post("/post/{id}/")]
async fn create_comment(
    req: HttpRequest,
    actor: Actor,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<Uuid>,
    form: Result<web::Form<CommentForm>, Error>,
) -> Result<HttpResponse, Error> {
    let post = posts.get_post(path.into_inner()).await?;
    if require_login(&actor).is_err() {
        return Ok(login_redirect(&req));
    }

    let form = form?.into_inner();
    let draft = match CommentDraft::parse(&form.content) {
        Ok(draft) => draft,
        Err(errors) => {
            let detail = posts.post_detail(post.id).await?;
            return Ok(
                HttpResponse::UnprocessableEntity().json(PostDetailView::new(detail, form, errors))
            );
        }
    };

    let comment = comments.add_comment(&actor, post.id, draft).await?;

    info!(
        request_id = %request_id(&req),
        author = %comment.author,
        comment_id = %comment.id,
        post_id = %post.id,
        "comment created"
    );

    Ok(see_other(post_url(post.id)))
}

#[get("/comment/{id}/delete/")]
async fn confirm_delete_comment(
    actor: Actor,
    posts: web::Data<PostService>,
    comments: web::Data<CommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comment = comments.owned_comment(&actor, path.into_inner()).await?;
    let post = posts.get_post(comment.post_id).await?;

    Ok(HttpResponse::Ok().json(CommentDeleteView {
        comment: CommentView::new(comment, &post),
    }))
}

#[post("/comment/{id}/delete/")]
async fn delete_comment(
    req: HttpRequest,
    actor: Actor,
    comments: web::Data<CommentService>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, DomainError> {
    let comment = comments.delete_comment(&actor, path.into_inner()).await?;

    info!(
        request_id = %request_id(&req),
        comment_id = %comment.id,
        post_id = %comment.post_id,
        "comment deleted"
    );

    Ok(see_other(post_url(comment.post_id)))
}

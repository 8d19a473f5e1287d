pub mod auth;
pub mod comments;
pub mod listing;
pub mod posts;

use actix_web::web;

/// Blog routes. `/post/new/` is registered before `/post/{id}/` so it is
/// never read as an id.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(auth::scope())
        .service(listing::list_posts)
        .service(listing::tagged_posts)
        .service(listing::search)
        .service(posts::new_post_form)
        .service(posts::create_post)
        .service(posts::post_detail)
        .service(comments::create_comment)
        .service(posts::edit_post_form)
        .service(posts::update_post)
        .service(posts::confirm_delete_post)
        .service(posts::delete_post)
        .service(comments::confirm_delete_comment)
        .service(comments::delete_comment);
}

#[cfg(test)]
mod tests;

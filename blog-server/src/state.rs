//! Application services shared across all handlers.

use std::sync::Arc;

use actix_web::web;
use sqlx::PgPool;

use crate::application::auth_service::AuthService;
use crate::application::comment_service::CommentService;
use crate::application::post_service::PostService;
use crate::application::query_service::QueryService;
use crate::data::comment_repository::{CommentRepository, PostgresCommentRepository};
use crate::data::memory::InMemoryStore;
use crate::data::post_repository::{PostRepository, PostgresPostRepository};
use crate::data::tag_repository::{PostgresTagRepository, TagRepository};
use crate::data::user_repository::{PostgresUserRepository, UserRepository};
use crate::infrastructure::security::JwtKeys;

#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub posts: PostService,
    pub comments: CommentService,
    pub queries: QueryService,
}

impl AppServices {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        tags: Arc<dyn TagRepository>,
        keys: JwtKeys,
    ) -> Self {
        Self {
            auth: AuthService::new(users, keys),
            posts: PostService::new(posts.clone(), comments.clone(), tags.clone()),
            comments: CommentService::new(posts.clone(), comments),
            queries: QueryService::new(posts, tags),
        }
    }

    pub fn postgres(pool: PgPool, keys: JwtKeys) -> Self {
        Self::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresPostRepository::new(pool.clone())),
            Arc::new(PostgresCommentRepository::new(pool.clone())),
            Arc::new(PostgresTagRepository::new(pool)),
            keys,
        )
    }

    /// Note: data is lost on process restart.
    pub fn in_memory(keys: JwtKeys) -> Self {
        Self::with_store(Arc::new(InMemoryStore::new()), keys)
    }

    pub fn with_store(store: Arc<InMemoryStore>, keys: JwtKeys) -> Self {
        Self::new(store.clone(), store.clone(), store.clone(), store, keys)
    }

    /// Registers every service as app data for the handlers' extractors.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.posts.clone()))
            .app_data(web::Data::new(self.comments.clone()))
            .app_data(web::Data::new(self.queries.clone()));
    }
}

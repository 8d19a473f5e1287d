use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::domain::authorization::{Actor, ensure_can_mutate, require_login};
use crate::domain::comment::{Comment, CommentDraft};
use crate::domain::error::DomainError;

#[derive(Clone)]
pub struct CommentService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
}

impl CommentService {
    pub fn new(posts: Arc<dyn PostRepository>, comments: Arc<dyn CommentRepository>) -> Self {
        Self { posts, comments }
    }

    pub async fn get_comment(&self, id: Uuid) -> Result<Comment, DomainError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or(DomainError::CommentNotFound(id))
    }

    /// Loads a comment the actor is allowed to delete.
    pub async fn owned_comment(&self, actor: &Actor, id: Uuid) -> Result<Comment, DomainError> {
        let comment = self.get_comment(id).await?;
        ensure_can_mutate(actor, &comment)?;
        Ok(comment)
    }

    #[instrument(skip(self, draft))]
    pub async fn add_comment(
        &self,
        actor: &Actor,
        post_id: Uuid,
        draft: CommentDraft,
    ) -> Result<Comment, DomainError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))?;
        let author = require_login(actor)?;
        self.comments
            .create(Comment::new(post.id, author.clone(), draft))
            .await
    }

    /// Deletes the comment and hands it back so callers can return to its post.
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, actor: &Actor, id: Uuid) -> Result<Comment, DomainError> {
        let comment = self.owned_comment(actor, id).await?;
        if self.comments.delete_comment(id).await? {
            Ok(comment)
        } else {
            Err(DomainError::CommentNotFound(id))
        }
    }
}

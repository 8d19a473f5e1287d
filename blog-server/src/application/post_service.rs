use std::sync::Arc;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::domain::authorization::{Actor, ensure_can_mutate, require_login};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::domain::tag::Tag;
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    comments: Arc<dyn CommentRepository>,
    tags: Arc<dyn TagRepository>,
}

/// Everything the post page shows.
#[derive(Debug)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
    pub tags: Vec<Tag>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        comments: Arc<dyn CommentRepository>,
        tags: Arc<dyn TagRepository>,
    ) -> Self {
        Self {
            posts,
            comments,
            tags,
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn post_detail(&self, id: Uuid) -> Result<PostDetail, DomainError> {
        let post = self.get_post(id).await?;
        Ok(PostDetail {
            comments: self.comments.list_for_post(post.id).await?,
            tags: self.tags.all_tags().await?,
            post,
        })
    }

    /// Loads a post the actor is allowed to edit or delete.
    pub async fn owned_post(&self, actor: &Actor, id: Uuid) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        ensure_can_mutate(actor, &post)?;
        Ok(post)
    }

    #[instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create_post(&self, actor: &Actor, draft: PostDraft) -> Result<Post, DomainError> {
        let author = require_login(actor)?;
        self.posts.create(Post::new(author.clone(), draft)).await
    }

    #[instrument(skip(self, draft))]
    pub async fn update_post(
        &self,
        actor: &Actor,
        post_id: Uuid,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        self.owned_post(actor, post_id).await?;
        self.posts
            .update_post(post_id, draft)
            .await?
            .ok_or(DomainError::PostNotFound(post_id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, actor: &Actor, post_id: Uuid) -> Result<(), DomainError> {
        self.owned_post(actor, post_id).await?;
        if self.posts.delete_post(post_id).await? {
            Ok(())
        } else {
            Err(DomainError::PostNotFound(post_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::memory::InMemoryStore;
    use crate::domain::comment::CommentDraft;
    use crate::domain::query::PostQuery;
    use crate::domain::user::Author;

    fn service() -> (Arc<InMemoryStore>, PostService) {
        let store = Arc::new(InMemoryStore::new());
        let service = PostService::new(store.clone(), store.clone(), store.clone());
        (store, service)
    }

    fn user(name: &str) -> Actor {
        Actor::User(Author {
            id: Uuid::new_v4(),
            username: name.into(),
        })
    }

    fn draft(title: &str) -> PostDraft {
        PostDraft::parse(title, "content", "rust").unwrap()
    }

    #[tokio::test]
    async fn create_binds_the_current_actor_as_author() {
        let (_, service) = service();
        let alice = user("alice");

        let post = service.create_post(&alice, draft("hello")).await.unwrap();
        assert_eq!(Some(post.author.id), alice.user_id());
    }

    #[tokio::test]
    async fn anonymous_create_needs_login() {
        let (store, service) = service();
        let err = service
            .create_post(&Actor::Anonymous, draft("hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Unauthenticated));
        let posts = store.query_posts(&PostQuery::All).await.unwrap();
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn update_never_reassigns_the_author() {
        let (_, service) = service();
        let alice = user("alice");
        let post = service.create_post(&alice, draft("v1")).await.unwrap();

        let updated = service.update_post(&alice, post.id, draft("v2")).await.unwrap();
        assert_eq!(updated.title, "v2");
        assert_eq!(updated.author, post.author);
        assert_eq!(updated.published_date, post.published_date);
    }

    #[tokio::test]
    async fn strangers_are_forbidden_from_update_and_delete() {
        let (_, service) = service();
        let alice = user("alice");
        let post = service.create_post(&alice, draft("mine")).await.unwrap();

        for actor in [user("mallory"), Actor::Anonymous] {
            let err = service
                .update_post(&actor, post.id, draft("stolen"))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::Forbidden));

            let err = service.delete_post(&actor, post.id).await.unwrap_err();
            assert!(matches!(err, DomainError::Forbidden));
        }

        assert_eq!(service.get_post(post.id).await.unwrap().title, "mine");
    }

    #[tokio::test]
    async fn missing_posts_are_not_found() {
        let (_, service) = service();
        let alice = user("alice");
        let id = Uuid::new_v4();

        assert!(matches!(
            service.update_post(&alice, id, draft("x")).await,
            Err(DomainError::PostNotFound(missing)) if missing == id
        ));
        assert!(matches!(
            service.post_detail(id).await,
            Err(DomainError::PostNotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_removes_the_post_and_its_comments() {
        let (store, service) = service();
        let alice = user("alice");
        let Actor::User(author) = alice.clone() else {
            unreachable!()
        };
        let post = service.create_post(&alice, draft("bye")).await.unwrap();
        let comment = Comment::new(post.id, author, CommentDraft::parse("first").unwrap());
        CommentRepository::create(store.as_ref(), comment).await.unwrap();

        service.delete_post(&alice, post.id).await.unwrap();

        assert!(matches!(
            service.get_post(post.id).await,
            Err(DomainError::PostNotFound(_))
        ));
        assert!(store.list_for_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn detail_includes_comments_and_tags() {
        let (store, service) = service();
        let alice = user("alice");
        let Actor::User(author) = alice.clone() else {
            unreachable!()
        };
        let post = service.create_post(&alice, draft("detail")).await.unwrap();
        let comment = Comment::new(post.id, author, CommentDraft::parse("hi").unwrap());
        CommentRepository::create(store.as_ref(), comment).await.unwrap();

        let detail = service.post_detail(post.id).await.unwrap();
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.tags.len(), 1);
    }
}

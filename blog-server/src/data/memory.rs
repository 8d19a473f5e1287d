//! In-memory entity store - used when no `DATABASE_URL` is configured and in tests.
//!
//! Mirrors the PostgreSQL semantics: newest-first ordering, tag resolution
//! by slug and comment cascade on post deletion. Data is lost on restart.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostDraft};
use crate::domain::query::PostQuery;
use crate::domain::tag::{Tag, slugify};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    /// Keyed by slug.
    tags: BTreeMap<String, Tag>,
}

impl State {
    /// Registers unknown labels and returns the canonical tag names.
    fn resolve_tags(&mut self, labels: &BTreeSet<String>) -> BTreeSet<String> {
        labels
            .iter()
            .map(|label| {
                self.tags
                    .entry(slugify(label))
                    .or_insert_with(|| Tag::new(label.clone()))
                    .name
                    .clone()
            })
            .collect()
    }
}

#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::UserAlreadyExists(
                "username already taken".to_string(),
            ));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(DomainError::UserAlreadyExists(
                "email already registered".to_string(),
            ));
        }
        state.users.insert(user.id, user.clone());
        info!(user_id = %user.id, username = %user.username, "user created");
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn create(&self, mut post: Post) -> Result<Post, DomainError> {
        let mut state = self.state.write().await;
        post.tags = state.resolve_tags(&post.tags);
        state.posts.insert(post.id, post.clone());
        info!(post_id = %post.id, author_id = %post.author.id, "post created");
        Ok(post)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, DomainError> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn update_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, DomainError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&id) {
            return Ok(None);
        }
        let tags = state.resolve_tags(&draft.tags);
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = draft.title;
        post.content = draft.content;
        post.tags = tags;
        info!(post_id = %id, "post updated");
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if state.posts.remove(&id).is_none() {
            return Ok(false);
        }
        state.comments.retain(|_, comment| comment.post_id != id);
        info!(post_id = %id, "post deleted");
        Ok(true)
    }

    async fn query_posts(&self, query: &PostQuery) -> Result<Vec<Post>, DomainError> {
        let state = self.state.read().await;
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| query.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.published_date.cmp(&a.published_date));
        Ok(posts)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn create(&self, comment: Comment) -> Result<Comment, DomainError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&comment.post_id) {
            return Err(DomainError::PostNotFound(comment.post_id));
        }
        state.comments.insert(comment.id, comment.clone());
        info!(comment_id = %comment.id, post_id = %comment.post_id, "comment created");
        Ok(comment)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, DomainError> {
        Ok(self.state.read().await.comments.get(&id).cloned())
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, DomainError> {
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn delete_comment(&self, id: Uuid) -> Result<bool, DomainError> {
        let removed = self.state.write().await.comments.remove(&id).is_some();
        if removed {
            info!(comment_id = %id, "comment deleted");
        }
        Ok(removed)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        let state = self.state.read().await;
        let mut tags: Vec<Tag> = state.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        Ok(self.state.read().await.tags.get(slug).cloned())
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::form::FieldErrors;
use crate::domain::post::Post;
use crate::domain::user::Author;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author: Author,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: Uuid, author: Author, draft: CommentDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            author,
            content: draft.content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn label(&self, post: &Post) -> String {
        format!("Comment by {} on {}", self.author, post)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentDraft {
    pub content: String,
}

impl CommentDraft {
    pub fn parse(content: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.required("content", content);
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            content: content.to_string(),
        })
    }
}

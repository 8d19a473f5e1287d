use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::form::FieldErrors;
use crate::domain::tag::parse_tag_input;
use crate::domain::user::Author;

pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author: Author,
    pub title: String,
    pub content: String,
    pub published_date: DateTime<Utc>,
    pub tags: BTreeSet<String>,
}

impl Post {
    pub fn new(author: Author, draft: PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            author,
            title: draft.title,
            content: draft.content,
            published_date: Utc::now(),
            tags: draft.tags,
        }
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

/// Validated title, content and tags submitted through the post form.
/// Used both to create a post and to replace the editable fields of one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub tags: BTreeSet<String>,
}

impl PostDraft {
    pub fn parse(title: &str, content: &str, tags: &str) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = title.trim();
        errors.required("title", title);
        let length = title.chars().count();
        if length > TITLE_MAX_CHARS {
            errors.add(
                "title",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    TITLE_MAX_CHARS, length
                ),
            );
        }

        errors.required("content", content);

        let tags = match parse_tag_input(tags) {
            Ok(tags) => tags,
            Err(rejected) => {
                for label in rejected {
                    errors.add("tags", format!("Tag \"{}\" needs a letter or digit.", label));
                }
                BTreeSet::new()
            }
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            tags,
        })
    }
}

use std::sync::Arc;

use serde::Serialize;

use crate::data::post_repository::PostRepository;
use crate::data::tag_repository::TagRepository;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::query::PostQuery;
use crate::domain::tag::Tag;

/// Read side for post listings. Every listing carries the full tag list
/// for navigation.
#[derive(Clone)]
pub struct QueryService {
    posts: Arc<dyn PostRepository>,
    tags: Arc<dyn TagRepository>,
}

#[derive(Debug, Serialize)]
pub struct PostListing {
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct TaggedListing {
    pub tag: Tag,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct SearchListing {
    pub query: Option<String>,
    pub posts: Vec<Post>,
    pub tags: Vec<Tag>,
}

impl QueryService {
    pub fn new(posts: Arc<dyn PostRepository>, tags: Arc<dyn TagRepository>) -> Self {
        Self { posts, tags }
    }

    pub async fn all_tags(&self) -> Result<Vec<Tag>, DomainError> {
        self.tags.all_tags().await
    }

    pub async fn list_posts(&self) -> Result<PostListing, DomainError> {
        Ok(PostListing {
            posts: self.posts.query_posts(&PostQuery::All).await?,
            tags: self.all_tags().await?,
        })
    }

    pub async fn tagged_posts(&self, slug: &str) -> Result<TaggedListing, DomainError> {
        let tag = self
            .tags
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::TagNotFound(slug.to_string()))?;

        Ok(TaggedListing {
            posts: self.posts.query_posts(&PostQuery::Tagged(tag.clone())).await?,
            tag,
            tags: self.all_tags().await?,
        })
    }

    pub async fn search(&self, q: Option<&str>) -> Result<SearchListing, DomainError> {
        let posts = match PostQuery::search(q) {
            Some(query) => self.posts.query_posts(&query).await?,
            None => Vec::new(),
        };

        Ok(SearchListing {
            query: q.map(str::to_string),
            posts,
            tags: self.all_tags().await?,
        })
    }
}

use crate::application::post_service::PostDetail;
use crate::domain::comment::Comment;
use crate::domain::form::FieldErrors;
use crate::domain::post::Post;
use crate::domain::tag::{Tag, edit_string};
use serde::{Deserialize, Serialize};

// ======================= AUTH =======================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(rename = "token_type")]
    pub token_type: String, // "Bearer"
}

#[derive(Debug, Deserialize)]
pub struct LoginPageQuery {
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginPage {
    pub login_url: &'static str,
    pub method: &'static str,
    pub fields: [&'static str; 2],
    pub next: Option<String>,
}

// ======================= POSTS =======================

/// Submitted post form. Missing fields deserialize empty so they surface as
/// field errors instead of a rejected request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub content: String,
    pub tags: String,
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            tags: edit_string(&post.tags),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostFormView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
    pub form: PostForm,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize)]
pub struct PostDeleteView {
    pub post: Post,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

// ======================= COMMENTS =======================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub label: String,
}

impl CommentView {
    pub fn new(comment: Comment, post: &Post) -> Self {
        Self {
            label: comment.label(post),
            comment,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentFormView {
    pub form: CommentForm,
    pub errors: FieldErrors,
}

#[derive(Debug, Serialize)]
pub struct PostDetailView {
    pub post: Post,
    pub comments: Vec<CommentView>,
    pub tags: Vec<Tag>,
    pub comment_form: CommentFormView,
}

impl PostDetailView {
    pub fn new(detail: PostDetail, form: CommentForm, errors: FieldErrors) -> Self {
        let PostDetail {
            post,
            comments,
            tags,
        } = detail;
        Self {
            comments: comments
                .into_iter()
                .map(|comment| CommentView::new(comment, &post))
                .collect(),
            post,
            tags,
            comment_form: CommentFormView { form, errors },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentDeleteView {
    pub comment: CommentView,
}

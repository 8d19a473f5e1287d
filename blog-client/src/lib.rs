mod error;
mod http_client;
mod models;

pub use error::BlogClientError;
pub use http_client::BlogClient;
pub use models::{Author, Comment, Post, PostDetail, PostListing, SearchListing, Tag, TaggedListing};

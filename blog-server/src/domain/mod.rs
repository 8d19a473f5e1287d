pub mod authorization;
pub mod comment;
pub mod error;
pub mod form;
pub mod post;
pub mod query;
pub mod tag;
pub mod user;

use uuid::Uuid;

use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::Author;

/// Whoever issued the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(Author),
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Anonymous => None,
            Actor::User(author) => Some(author.id),
        }
    }
}

/// Anything with exactly one owning author.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Post {
    fn owner_id(&self) -> Uuid {
        self.author.id
    }
}

impl Owned for Comment {
    fn owner_id(&self) -> Uuid {
        self.author.id
    }
}

pub fn can_mutate<E: Owned>(actor: &Actor, entity: &E) -> bool {
    actor.user_id() == Some(entity.owner_id())
}

/// Gate for create operations. Anonymous actors are sent to the login flow.
pub fn require_login(actor: &Actor) -> Result<&Author, DomainError> {
    match actor {
        Actor::User(author) => Ok(author),
        Actor::Anonymous => Err(DomainError::Unauthenticated),
    }
}

/// Gate for update/delete operations.
pub fn ensure_can_mutate<E: Owned>(actor: &Actor, entity: &E) -> Result<(), DomainError> {
    if can_mutate(actor, entity) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

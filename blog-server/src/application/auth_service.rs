use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::form::FieldErrors;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password, verify_password};

const PASSWORD_MIN_CHARS: usize = 8;

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<User, DomainError> {
        let username = username.trim().to_string();
        let email = email.trim().to_lowercase();

        let mut errors = FieldErrors::new();
        errors.required("username", &username);
        if !email.contains('@') {
            errors.add("email", "Enter a valid email address.");
        }
        if password.chars().count() < PASSWORD_MIN_CHARS {
            errors.add(
                "password",
                format!("Password must be at least {} characters.", PASSWORD_MIN_CHARS),
            );
        }
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }

        let hash =
            hash_password(&password).map_err(|err| DomainError::Internal(err.to_string()))?;
        self.repo.create(User::new(username, email, hash)).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_username(username.trim())
            .await?
            .ok_or(DomainError::Unauthorized)?;

        let valid = verify_password(password, &user.password_hash)
            .map_err(|_| DomainError::Unauthorized)?;
        if !valid {
            return Err(DomainError::Unauthorized);
        }

        self.issue_token(user.id)
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, DomainError> {
        self.keys
            .generate_token(user_id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }
}

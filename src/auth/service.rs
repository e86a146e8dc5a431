use std::sync::Arc;

use tracing::{debug, info};

use crate::auth::password;
use crate::auth::token::TokenIssuer;
use crate::auth::validation::SignUpForm;
use crate::db::{User, UserStore};
use crate::error::{AppError, AuthError};

/// A verified login: the stored user and the token minted for it.
#[derive(Debug, Clone)]
pub struct LoginSuccess {
    pub user: User,
    pub token: String,
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Hashes the password and persists a new user. Expects a validated form.
    pub async fn register(&self, form: &SignUpForm) -> Result<User, AppError> {
        let password_hash = password::hash(&form.password).await?;

        let user = User::new(
            form.name.clone(),
            form.surname.clone(),
            form.username.clone(),
            form.email.clone(),
            password_hash,
        );
        self.users.save(&user).await?;

        info!("Registered user {} ({})", user.username, user.id);
        Ok(user)
    }

    /// Looks up `username` and checks `password` against its stored hash.
    ///
    /// Unknown users and wrong passwords are reported separately as
    /// `AuthError::UnknownUser` and `AuthError::InvalidPassword`.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::UnknownUser)?;

        if !password::verify(password, &user.password).await? {
            debug!("Password mismatch for {}", username);
            return Err(AuthError::InvalidPassword.into());
        }

        Ok(user)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginSuccess, AppError> {
        let user = self.authenticate(username, password).await?;
        let token = self.tokens.issue(&user)?;
        Ok(LoginSuccess { user, token })
    }
}

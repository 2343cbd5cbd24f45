//! Registration and token service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Serialize;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, TokenType, User, UserClaims},
    repository::Repository,
};

/// Access / refresh token pair
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Register a new user
    pub async fn register(&self, request: RegisterUser) -> AppResult<User> {
        request.validate()?;

        if self.repository.users.get_by_username(&request.username).await?.is_some() {
            return Err(AppError::field(
                "username",
                "A user with that username already exists.",
            ));
        }

        let hash = hash_password(&request.password)?;
        let user = self
            .repository
            .users
            .create(&request.username, &request.email, &hash)
            .await?;

        tracing::info!(user_id = user.id, username = %user.username, "User registered");
        Ok(user)
    }

    /// Check credentials and issue an access/refresh pair
    pub async fn obtain_tokens(&self, username: &str, password: &str) -> AppResult<TokenPair> {
        let user = self
            .repository
            .users
            .get_by_username(username)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&user, password)? {
            return Err(invalid_credentials());
        }

        Ok(TokenPair {
            access: self.issue(&user, TokenType::Access)?,
            refresh: self.issue(&user, TokenType::Refresh)?,
        })
    }

    /// Exchange a refresh token for a new access token
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self.decode(refresh_token, TokenType::Refresh)?;
        // The account must still exist
        let user = self.repository.users.get_by_id(claims.user_id).await.map_err(|e| match e {
            AppError::NotFound(_) => AppError::Authentication("User no longer exists".to_string()),
            other => other,
        })?;
        self.issue(&user, TokenType::Access)
    }

    /// Validate a token of any type
    pub fn verify(&self, token: &str) -> AppResult<UserClaims> {
        UserClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(format!("Token is invalid or expired: {}", e)))
    }

    /// Validate a token and require the given type
    pub fn decode(&self, token: &str, expected: TokenType) -> AppResult<UserClaims> {
        let claims = self.verify(token)?;
        if claims.token_type != expected {
            return Err(AppError::Authentication(format!(
                "Token has wrong type, expected {:?}",
                expected
            )));
        }
        Ok(claims)
    }

    fn issue(&self, user: &User, token_type: TokenType) -> AppResult<String> {
        let lifetime = match token_type {
            TokenType::Access => chrono::Duration::minutes(self.config.access_token_minutes),
            TokenType::Refresh => chrono::Duration::hours(self.config.refresh_token_hours),
        };
        UserClaims::new(user, token_type, lifetime)
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication("No active account found with the given credentials".to_string())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

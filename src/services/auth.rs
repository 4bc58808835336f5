//! Token issuance for API clients.
//!
//! In-memory user store with salted SHA-256 password digests. Tokens are
//! opaque UUIDs; nothing in the core interprets them.

use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

struct UserRecord {
    salt: String,
    digest: String,
}

pub struct AuthService {
    users: Mutex<HashMap<String, UserRecord>>,
}

impl AuthService {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let mut users = self.users.lock().expect("auth mutex poisoned");
        if users.contains_key(&request.email) {
            return Err(ApiError::bad_request("User already exists"));
        }

        let salt = Uuid::new_v4().to_string();
        users.insert(
            request.email.clone(),
            UserRecord {
                digest: digest(&salt, &request.password),
                salt,
            },
        );
        tracing::debug!(email = %request.email, name = %request.name, "user registered");
        Ok(issue_token())
    }

    pub fn login(&self, request: &LoginRequest) -> Result<String, ApiError> {
        let users = self.users.lock().expect("auth mutex poisoned");
        let record = users
            .get(&request.email)
            .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

        if digest(&record.salt, &request.password) != record.digest {
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
        Ok(issue_token())
    }
}

impl Default for AuthService {
    fn default() -> Self {
        Self::new()
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let bytes = hasher.finalize();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn issue_token() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn register_request() -> RegisterRequest {
        RegisterRequest {
            email: "ops@example.com".into(),
            password: "hunter2".into(),
            name: "Ops".into(),
        }
    }

    #[test]
    fn register_then_login_round_trip() {
        let auth = AuthService::new();
        let token = auth.register(&register_request()).unwrap();
        assert!(!token.is_empty());

        let login = auth
            .login(&LoginRequest {
                email: "ops@example.com".into(),
                password: "hunter2".into(),
            })
            .unwrap();
        // Fresh opaque token per login
        assert_ne!(token, login);
    }

    #[test]
    fn duplicate_registration_rejected() {
        let auth = AuthService::new();
        auth.register(&register_request()).unwrap();
        let err = auth.register(&register_request()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        let auth = AuthService::new();
        auth.register(&register_request()).unwrap();
        let err = auth
            .login(&LoginRequest {
                email: "ops@example.com".into(),
                password: "wrong".into(),
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }
}

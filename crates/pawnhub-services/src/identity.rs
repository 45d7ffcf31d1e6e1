use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use tracing::{info, warn};
use uuid::Uuid;

use pawnhub_db::UserDirectory;
use pawnhub_types::api::{LoginRequest, RegisterRequest};
use pawnhub_types::models::{AuthUser, UserRole};

use crate::error::{Result, ServiceError};

const MIN_PASSWORD_LEN: usize = 8;

/// Resolves credentials to a user. Token issuing stays with the caller.
pub trait IdentityProvider: Send + Sync {
    fn register(&self, req: &RegisterRequest) -> Result<AuthUser>;
    fn login(&self, req: &LoginRequest) -> Result<AuthUser>;
}

/// Email and password accounts stored in the user directory, hashed with
/// Argon2id.
pub struct LocalIdentity {
    users: Arc<dyn UserDirectory>,
}

impl LocalIdentity {
    pub fn new(users: Arc<dyn UserDirectory>) -> Self {
        Self { users }
    }
}

impl IdentityProvider for LocalIdentity {
    fn register(&self, req: &RegisterRequest) -> Result<AuthUser> {
        let email = normalize_email(&req.email)?;
        let name = req.name.trim();
        if name.is_empty() {
            return Err(ServiceError::Validation("name is required".into()));
        }
        if req.password.len() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if req.role == UserRole::Admin {
            return Err(ServiceError::Forbidden);
        }

        if self.users.get_user_by_email(&email)?.is_some() {
            return Err(ServiceError::Conflict(format!("email {} is already registered", email)));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow!("password hashing failed: {}", e))?
            .to_string();

        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
            email,
            name: name.to_string(),
            role: req.role,
            store_id: None,
            avatar: None,
            phone: None,
            favorites: vec![],
        };
        self.users.insert_user(&user, &password_hash)?;

        info!(user_id = %user.id, role = user.role.as_str(), "User registered");
        Ok(user)
    }

    fn login(&self, req: &LoginRequest) -> Result<AuthUser> {
        let email = req.email.trim();
        let Some(user) = self.users.get_user_by_email(email)? else {
            warn!("Login for unknown email");
            return Err(ServiceError::Unauthenticated);
        };

        let stored = self
            .users
            .get_password_hash(&user.id)?
            .ok_or(ServiceError::Unauthenticated)?;
        let parsed = PasswordHash::new(&stored).map_err(|e| anyhow!("bad stored hash: {}", e))?;

        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            warn!(user_id = %user.id, "Login with wrong password");
            return Err(ServiceError::Unauthenticated);
        }

        Ok(user)
    }
}

/// Trimmed, lowercased and shaped like `local@domain`.
pub(crate) fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ServiceError::Validation(format!("invalid email {:?}", raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawnhub_db::Database;

    fn identity() -> LocalIdentity {
        LocalIdentity::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn register_req(email: &str, password: &str, role: UserRole) -> RegisterRequest {
        RegisterRequest {
            name: "Jane Doe".into(),
            email: email.into(),
            password: password.into(),
            role,
        }
    }

    #[test]
    fn register_then_login() {
        let id = identity();
        let user = id
            .register(&register_req(" Jane@Example.com ", "hunter2hunter2", UserRole::StoreOwner))
            .unwrap();
        assert_eq!(user.email, "jane@example.com");
        assert_eq!(user.role, UserRole::StoreOwner);
        assert!(user.favorites.is_empty());

        let logged_in = id
            .login(&LoginRequest {
                email: "JANE@example.com".into(),
                password: "hunter2hunter2".into(),
            })
            .unwrap();
        assert_eq!(logged_in, user);

        let err = id
            .login(&LoginRequest {
                email: "jane@example.com".into(),
                password: "wrong-password".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));
    }

    #[test]
    fn duplicate_email_conflicts() {
        let id = identity();
        id.register(&register_req("jane@example.com", "password1", UserRole::Customer))
            .unwrap();
        let err = id
            .register(&register_req("JANE@example.com", "password2", UserRole::Customer))
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn rejects_bad_input() {
        let id = identity();
        for (email, password, role) in [
            ("not-an-email", "password1", UserRole::Customer),
            ("a@b.c", "short", UserRole::Customer),
        ] {
            assert!(matches!(
                id.register(&register_req(email, password, role)),
                Err(ServiceError::Validation(_))
            ));
        }
        assert!(matches!(
            id.register(&register_req("root@example.com", "password1", UserRole::Admin)),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn unknown_email_is_unauthenticated() {
        let err = identity()
            .login(&LoginRequest {
                email: "nobody@example.com".into(),
                password: "whatever1".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthenticated));
    }
}

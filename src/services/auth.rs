//! Access decisions and token plumbing. The decision functions are kept free
//! of I/O so the bootstrap, registry, and self-removal rules are testable
//! without a database.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::models::auth::{Claims, EntryMethod, IdentityClaims};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("This account is not a registered admin")]
    NotRegistered,
    #[error("No admin password has been configured")]
    PasswordNotConfigured,
    #[error("Incorrect admin password")]
    InvalidPassword,
    #[error("Admins cannot remove themselves")]
    SelfRemoval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailAccess {
    /// Registry was empty; the principal becomes the first admin.
    Bootstrap,
    Registered,
}

/// Identity path: first authenticated principal bootstraps an empty registry;
/// after that, only registered emails get in.
pub fn decide_email_access(admin_count: i64, is_registered: bool) -> Result<EmailAccess, AccessError> {
    if admin_count == 0 {
        Ok(EmailAccess::Bootstrap)
    } else if is_registered {
        Ok(EmailAccess::Registered)
    } else {
        Err(AccessError::NotRegistered)
    }
}

/// Shared-password path: always denied until a password has been configured.
pub fn decide_password_access(stored_hash: Option<&str>, candidate: &str) -> Result<(), AccessError> {
    let hash = stored_hash.ok_or(AccessError::PasswordNotConfigured)?;
    if bcrypt::verify(candidate, hash).unwrap_or(false) {
        Ok(())
    } else {
        Err(AccessError::InvalidPassword)
    }
}

/// A removal request targeting the acting principal's own email is rejected
/// before it reaches the registry.
pub fn check_removal(actor_email: Option<&str>, target_email: &str) -> Result<(), AccessError> {
    if actor_email == Some(target_email) {
        Err(AccessError::SelfRemoval)
    } else {
        Ok(())
    }
}

/// Principal asserted by the external identity provider.
#[derive(Debug, Clone)]
pub struct Principal {
    pub email: String,
    pub name: String,
}

pub fn verify_identity_token(token: &str, secret: &str) -> anyhow::Result<Principal> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<IdentityClaims>(token, &key, &validation)?;
    let claims = data.claims;
    if claims.email.trim().is_empty() {
        anyhow::bail!("Identity token carries no email");
    }
    let name = claims
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| claims.email.clone());
    Ok(Principal {
        email: claims.email,
        name,
    })
}

pub fn issue_access_token(
    email: Option<&str>,
    name: &str,
    entry: EntryMethod,
    secret: &str,
    ttl_seconds: u64,
) -> anyhow::Result<String> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: email.unwrap_or("shared").to_string(),
        name: name.to_string(),
        entry,
        iat: now,
        exp: now + ttl_seconds as usize,
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn hash_admin_password(password: &str) -> anyhow::Result<String> {
    Ok(bcrypt::hash(password, 12)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_registry_bootstraps_any_principal() {
        assert_eq!(decide_email_access(0, false), Ok(EmailAccess::Bootstrap));
        // Registration state is irrelevant when the registry is empty.
        assert_eq!(decide_email_access(0, true), Ok(EmailAccess::Bootstrap));
    }

    #[test]
    fn populated_registry_requires_membership() {
        assert_eq!(decide_email_access(1, true), Ok(EmailAccess::Registered));
        assert_eq!(decide_email_access(1, false), Err(AccessError::NotRegistered));
        assert_eq!(decide_email_access(5, false), Err(AccessError::NotRegistered));
    }

    #[test]
    fn password_path_denied_until_configured() {
        assert_eq!(
            decide_password_access(None, "anything"),
            Err(AccessError::PasswordNotConfigured)
        );
        assert_eq!(decide_password_access(None, ""), Err(AccessError::PasswordNotConfigured));
    }

    #[test]
    fn password_path_verifies_against_hash() {
        let hash = hash_admin_password("open sesame").unwrap();
        assert_eq!(decide_password_access(Some(&hash), "open sesame"), Ok(()));
        assert_eq!(
            decide_password_access(Some(&hash), "Open Sesame"),
            Err(AccessError::InvalidPassword)
        );
        assert_eq!(
            decide_password_access(Some("not-a-bcrypt-hash"), "open sesame"),
            Err(AccessError::InvalidPassword)
        );
    }

    #[test]
    fn self_removal_is_rejected() {
        assert_eq!(
            check_removal(Some("a@example.com"), "a@example.com"),
            Err(AccessError::SelfRemoval)
        );
        assert_eq!(check_removal(Some("a@example.com"), "b@example.com"), Ok(()));
        // Password-entry sessions have no identity to collide with.
        assert_eq!(check_removal(None, "a@example.com"), Ok(()));
    }

    #[test]
    fn identity_token_round_trip() {
        let secret = "identity-secret";
        let claims = IdentityClaims {
            sub: "uid-1".into(),
            email: "teacher@example.com".into(),
            name: Some("Teacher".into()),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let principal = verify_identity_token(&token, secret).unwrap();
        assert_eq!(principal.email, "teacher@example.com");
        assert_eq!(principal.name, "Teacher");

        assert!(verify_identity_token(&token, "wrong-secret").is_err());
    }

    #[test]
    fn identity_name_falls_back_to_email() {
        let secret = "identity-secret";
        let claims = IdentityClaims {
            sub: "uid-1".into(),
            email: "teacher@example.com".into(),
            name: None,
            exp: (Utc::now().timestamp() + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let principal = verify_identity_token(&token, secret).unwrap();
        assert_eq!(principal.name, "teacher@example.com");
    }
}

use serde::{Deserialize, Serialize};

/// How the acting admin got in: through the identity provider or the shared
/// admin password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryMethod {
    Identity,
    Password,
}

/// Claims embedded in the access token issued by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin email, or "shared" for password entry
    pub name: String,
    pub entry: EntryMethod,
    pub exp: usize,
    pub iat: usize,
}

/// Claims expected in the external identity provider's token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
}

/// Extracted from the validated access token — available via Axum extractors.
#[derive(Debug, Clone)]
pub struct AuthenticatedAdmin {
    /// Absent for password-entry sessions, which act without an identity.
    pub email: Option<String>,
    pub name: String,
    pub entry: EntryMethod,
}

// Request/Response DTOs
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct PasswordLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub email: Option<String>,
    pub name: String,
    pub entry: EntryMethod,
    /// True when this login registered the first admin.
    pub bootstrapped: bool,
}

#[derive(Debug, Deserialize)]
pub struct SetAdminPasswordRequest {
    pub password: String,
}

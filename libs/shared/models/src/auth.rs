use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub exp: Option<u64>,
    pub iat: Option<u64>,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// The identity resolved from a validated bearer token. Session issuance
/// and refresh live in the external auth collaborator; the core only ever
/// sees the resolved user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }

    pub fn is_doctor(&self) -> bool {
        self.role.as_deref() == Some("doctor")
    }

    pub fn is_patient(&self) -> bool {
        self.role.as_deref() == Some("patient")
    }
}

//! Helpers for minting HS256 tokens in tests. Production tokens come from
//! the external auth collaborator; nothing here is wired into the server.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;
use uuid::Uuid;

use shared_models::auth::User;

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, "patient")
    }

    pub fn doctor(email: &str) -> Self {
        Self::new(email, "doctor")
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
        }
    }
}

pub fn mint_token(user: &TestUser, secret: &str, exp_hours: i64) -> String {
    let now = Utc::now();
    let exp = now + Duration::hours(exp_hours);

    let header = json!({ "alg": "HS256", "typ": "JWT" });
    let payload = json!({
        "sub": user.id,
        "email": user.email,
        "role": user.role,
        "iat": now.timestamp(),
        "exp": exp.timestamp(),
    });

    let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
    let signing_input = format!("{}.{}", header_encoded, payload_encoded);

    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(signing_input.as_bytes());
    let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    format!("{}.{}", signing_input, signature)
}

pub fn expired_token(user: &TestUser, secret: &str) -> String {
    mint_token(user, secret, -1)
}

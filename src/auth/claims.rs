use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claim set embedded in every issued token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // service-configured token subject
    pub jti: Uuid,   // unique token id
    pub iat: usize,  // issued at
    pub exp: usize,  // expiration time
    pub iss: String, // issuer
    pub aud: String, // audience
    pub sid: i64,    // user id
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<i32>, // numeric role rank; absent fails authorization closed
}

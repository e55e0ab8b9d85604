use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row of `users`. Credentials live with the identity provider, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// JWT claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// subject / user id
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
}

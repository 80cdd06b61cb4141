//! Session tokens: HS256 JWTs whose subject is the row owner id.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error, ErrorKind};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::types::{AuthConfig, Claims};

const ALGORITHM: Algorithm = Algorithm::HS256;

pub fn create_token(config: &AuthConfig, user_id: &str) -> Result<String, Error> {
    issue(config, user_id, Utc::now())
}

fn issue(config: &AuthConfig, user_id: &str, issued_at: DateTime<Utc>) -> Result<String, Error> {
    let expires_at = Duration::try_days(config.token_duration_days)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .unwrap_or(issued_at);
    let claims = Claims {
        sub: user_id.to_string(),
        iat: issued_at.timestamp(),
        exp: expires_at.timestamp(),
    };

    encode(
        &Header::new(ALGORITHM),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
}

/// Check signature, algorithm and expiry, and that the token names an owner.
pub fn validate_token(config: &AuthConfig, token: &str) -> Result<Claims, Error> {
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )?
    .claims;

    if claims.sub.trim().is_empty() {
        return Err(ErrorKind::InvalidSubject.into());
    }
    Ok(claims)
}

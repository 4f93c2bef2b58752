//! JWT token handling
//!
//! Tokens are issued by the platform's identity provider; this service
//! only verifies them and extracts the principal. `create_token` exists
//! for tests and local tooling.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Principal, Role};

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider
    pub secret: String,
    /// Token expiration in hours (used by `create_token` only)
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secret-key-change-in-production".to_string()),
            expiration_hours: 24,
            issuer: "rentfleet".to_string(),
        }
    }
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Caller role: user, agency_admin, super_admin
    pub role: String,
    /// Agency the caller administers (agency_admin only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(principal: &Principal, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: principal.id.clone(),
            role: principal.role.as_str().to_string(),
            agency_id: principal.agency_id.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Build the verified principal; fails on an unknown role claim.
    pub fn to_principal(&self) -> Result<Principal, AuthError> {
        let role = Role::parse(&self.role).ok_or(AuthError::InvalidToken)?;
        Ok(Principal {
            id: self.sub.clone(),
            role,
            agency_id: self.agency_id.clone(),
        })
    }
}

/// Create a JWT token for a principal
pub fn create_token(
    principal: &Principal,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(principal, config);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a JWT token
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Errors that can occur during authentication
#[derive(Debug, Clone)]
pub enum AuthError {
    /// Token is missing
    MissingToken,
    /// Token is invalid
    InvalidToken,
    /// Token has expired
    ExpiredToken,
    /// Insufficient permissions
    InsufficientPermissions,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingToken => write!(f, "Missing authentication token"),
            Self::InvalidToken => write!(f, "Invalid authentication token"),
            Self::ExpiredToken => write!(f, "Token has expired"),
            Self::InsufficientPermissions => write!(f, "Insufficient permissions"),
        }
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let config = JwtConfig::default();
        let principal = Principal::agency_admin("admin-1", "agency-1");
        let token = create_token(&principal, &config).unwrap();

        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "admin-1");
        assert_eq!(claims.role, "agency_admin");
        assert_eq!(claims.agency_id.as_deref(), Some("agency-1"));
        assert!(!claims.is_expired());
        assert_eq!(claims.to_principal().unwrap(), principal);
    }

    #[test]
    fn invalid_token_fails() {
        let config = JwtConfig::default();
        assert!(verify_token("invalid-token", &config).is_err());
    }

    #[test]
    fn unknown_role_claim_is_rejected() {
        let claims = Claims {
            sub: "u".into(),
            role: "root".into(),
            agency_id: None,
            exp: 0,
            iat: 0,
            iss: "rentfleet".into(),
        };
        assert!(claims.to_principal().is_err());
    }
}

//! Identity-provider port.
//!
//! Sign-in happens at an external provider. The API only checks the bearer
//! token it issued and learns the external subject id from it.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use petmatch_types::api::IdentityClaims;
use tracing::debug;

use crate::error::ApiError;

/// Caller identity as asserted by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub external_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Identity, ApiError>;
}

/// Verifies HS256 tokens signed with a secret shared with the provider.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(iss) = issuer {
            validation.set_issuer(&[iss]);
        }
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl IdentityVerifier for JwtVerifier {
    fn verify(&self, token: &str) -> Result<Identity, ApiError> {
        let data = decode::<IdentityClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!("Rejected identity token: {}", e);
            ApiError::Unauthorized
        })?;

        let claims = data.claims;
        if claims.sub.trim().is_empty() {
            return Err(ApiError::Unauthorized);
        }
        Ok(Identity {
            external_id: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

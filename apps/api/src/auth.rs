//! JWT authentication module.
//!
//! Turns a `Bearer` token into the [`RequestContext`] every sale operation
//! takes. Credential checks happen elsewhere; this module only issues and
//! verifies tokens.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;
use niaga_core::{RequestContext, Role};

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// "admin" or anything else
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

impl Claims {
    /// Request context for these claims. Unknown roles are treated as customers.
    pub fn context(&self) -> ApiResult<RequestContext> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| ApiError::unauthenticated("Token subject is not a user id"))?;
        let role: Role = self.role.parse().unwrap_or(Role::Customer);
        Ok(RequestContext::new(user_id, role))
    }
}

/// JWT token manager.
pub struct JwtManager {
    secret: String,
    lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: String, lifetime_secs: i64) -> Self {
        JwtManager {
            secret,
            lifetime_secs,
        }
    }

    /// Generate a token for a user.
    pub fn issue_token(&self, user_id: i64, role: Role) -> ApiResult<String> {
        let now = Utc::now();
        let exp = Duration::try_seconds(self.lifetime_secs)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                ApiError::internal(format!(
                    "Token lifetime out of range: {}s",
                    self.lifetime_secs
                ))
            })?;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> ApiResult<Claims> {
        let validation = Validation::default();

        let token_data: TokenData<Claims> = decode(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| ApiError::unauthenticated(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

// =============================================================================
// Extractor
// =============================================================================

/// The authenticated caller of a request.
///
/// Carries the configured write timeout so the service can bound the
/// transaction.
#[derive(Debug, Clone)]
pub struct Authenticated(pub RequestContext);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthenticated("Missing Authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthenticated("Expected a Bearer token"))?;

        let claims = state.jwt.validate_token(token)?;
        let ctx = claims.context()?.with_timeout(state.config.write_timeout());

        debug!(user_id = ctx.user_id, role = %ctx.role, "Authenticated request");
        Ok(Authenticated(ctx))
    }
}

use crate::logging;
use crate::routing_utils::ApiErrorResponse;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// The authenticated caller of a protected route, taken from a verified access token
#[derive(Debug, Clone, PartialEq)]
pub struct CallerIdentity {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

/// Claims this service reads from provider-issued access tokens
#[derive(Deserialize)]
#[cfg_attr(test, derive(serde::Serialize))]
pub struct AccessClaims {
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

/// Checks HS256 access tokens against the shared secret
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, audience: Option<&str>) -> TokenVerifier {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        TokenVerifier {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<CallerIdentity, ApiErrorResponse> {
        let token_data =
            decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|err| {
                debug!("rejected access token: {err}");
                match err.kind() {
                    ErrorKind::ExpiredSignature => {
                        ApiErrorResponse::Unauthorized("Token expired".to_owned())
                    }
                    _ => ApiErrorResponse::Unauthorized("Invalid token".to_owned()),
                }
            })?;

        let claims = token_data.claims;
        Ok(CallerIdentity {
            id: claims.sub,
            email: claims.email.unwrap_or_default(),
            role: claims.role.unwrap_or_default(),
        })
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiErrorResponse> {
    let no_token = || ApiErrorResponse::Unauthorized("No token provided".to_owned());

    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(no_token)?;
    let token = value.strip_prefix("Bearer ").ok_or_else(no_token)?.trim();
    if token.is_empty() {
        return Err(no_token());
    }

    Ok(token)
}

/// Middleware for protected routers. Rejects the request with 401 unless it carries a valid
/// bearer token, otherwise makes a [CallerIdentity] available as a request extension.
pub async fn require_caller(
    State(verifier): State<Arc<TokenVerifier>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiErrorResponse> {
    let caller = verifier.verify(bearer_token(request.headers())?)?;
    logging::record_caller(caller.id);
    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

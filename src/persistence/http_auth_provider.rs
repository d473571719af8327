use crate::domain::user::driven_ports::{AuthProvider, AuthProviderError};
use crate::domain::user::{Credentials, Session, User};
use crate::external_connections::ExternalConnectivity;
use anyhow::{Context, anyhow};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

/// Talks to a GoTrue-compatible identity service over HTTP
#[derive(Clone)]
pub struct HttpAuthProvider {
    base_url: String,
    api_key: String,
}

impl HttpAuthProvider {
    pub fn new(base_url: &str, api_key: &str) -> HttpAuthProvider {
        HttpAuthProvider {
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        credentials: &Credentials,
        ext_cxn: &impl ExternalConnectivity,
    ) -> Result<T, AuthProviderError> {
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
        });
        let response = ext_cxn
            .http_client()
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await
            .context("calling the auth provider")?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .context("reading the auth provider's response")?;

        if !status.is_success() {
            return Err(classify_failure(status, &bytes));
        }

        Ok(serde_json::from_slice(&bytes).context("decoding the auth provider's response")?)
    }
}

#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
}

/// Signup answers with a bare user when confirmation is required, or with a session
/// wrapping the user when it is not
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpBody {
    Session { user: ProviderUser },
    User(ProviderUser),
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
    user: ProviderUser,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
}

fn rejection_reason(body: &[u8], status: StatusCode) -> String {
    let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();
    parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .unwrap_or_else(|| format!("auth provider rejected the request ({status})"))
}

/// Only 400 and 422 are answers about the submitted credentials. Anything else, including
/// a refused API key (401/403) or rate limiting (429), means the provider is unusable.
fn classify_failure(status: StatusCode, body: &[u8]) -> AuthProviderError {
    if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
        let reason = rejection_reason(body, status);
        debug!(%status, "auth provider refused the request: {reason}");
        return AuthProviderError::Rejected(reason);
    }

    AuthProviderError::Unavailable(anyhow!(
        "auth provider responded with {status}: {}",
        rejection_reason(body, status)
    ))
}

fn into_user(provider_user: ProviderUser, credentials: &Credentials) -> User {
    User {
        id: provider_user.id,
        email: provider_user
            .email
            .unwrap_or_else(|| credentials.email.clone()),
    }
}

impl AuthProvider for HttpAuthProvider {
    async fn sign_up(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<User, AuthProviderError> {
        let body: SignUpBody = self.post("/auth/v1/signup", credentials, &*ext_cxn).await?;
        let provider_user = match body {
            SignUpBody::Session { user } | SignUpBody::User(user) => user,
        };

        Ok(into_user(provider_user, credentials))
    }

    async fn sign_in(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
    ) -> Result<Session, AuthProviderError> {
        let body: TokenBody = self
            .post("/auth/v1/token?grant_type=password", credentials, &*ext_cxn)
            .await?;

        Ok(Session {
            user: into_user(body.user, credentials),
            access_token: body.access_token,
        })
    }
}

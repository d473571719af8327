use crate::domain::user::driven_ports::{AuthProvider, AuthProviderError, UserWriter};
use crate::domain::user::driving_ports::AuthError;
use crate::external_connections::ExternalConnectivity;
use anyhow::Context;
use derive_more::Display;
use tracing::info;
use uuid::Uuid;

/// Local mirror of an identity held by the auth provider
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Email and password pair. Only the email is ever displayed.
#[derive(Display)]
#[display("{email}")]
#[cfg_attr(test, derive(Clone, Debug, PartialEq))]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A successful password sign-in
#[derive(PartialEq, Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
}

pub mod driven_ports {
    use super::*;
    use thiserror::Error;

    pub trait UserReader {
        async fn all_users(
            &self,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Vec<User>, anyhow::Error>;
    }

    pub trait UserWriter {
        /// Inserts the user unless a record with the same ID already exists. Returns true if a
        /// new record was written.
        async fn mirror_user(
            &self,
            user: &User,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<bool, anyhow::Error>;
    }

    #[derive(Debug, Error)]
    pub enum AuthProviderError {
        /// The provider understood the request and refused it
        #[error("{0}")]
        Rejected(String),
        #[error(transparent)]
        Unavailable(#[from] anyhow::Error),
    }

    /// The hosted identity service which owns credentials and issues access tokens
    pub trait AuthProvider {
        async fn sign_up(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<User, AuthProviderError>;
        async fn sign_in(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
        ) -> Result<Session, AuthProviderError>;
    }
}

pub mod driving_ports {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum AuthError {
        #[error("{0}")]
        SignUpRejected(String),
        #[error("Invalid login credentials")]
        InvalidCredentials,
        #[error(transparent)]
        PortError(#[from] anyhow::Error),
    }


    pub trait UserPort {
        async fn sign_up(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
            auth_provider: &impl driven_ports::AuthProvider,
            user_write: &impl driven_ports::UserWriter,
        ) -> Result<User, AuthError>;
        /// Returns the access token issued by the provider
        async fn log_in(
            &self,
            credentials: &Credentials,
            ext_cxn: &mut impl ExternalConnectivity,
            auth_provider: &impl driven_ports::AuthProvider,
            user_write: &impl driven_ports::UserWriter,
        ) -> Result<String, AuthError>;
    }
}

pub struct UserService {}

impl driving_ports::UserPort for UserService {
    async fn sign_up(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
        auth_provider: &impl AuthProvider,
        user_write: &impl UserWriter,
    ) -> Result<User, AuthError> {
        let user = match auth_provider.sign_up(credentials, &mut *ext_cxn).await {
            Ok(user) => user,
            Err(AuthProviderError::Rejected(reason)) => {
                return Err(AuthError::SignUpRejected(reason));
            }
            Err(AuthProviderError::Unavailable(err)) => {
                return Err(AuthError::PortError(
                    err.context("signing up with the auth provider"),
                ));
            }
        };

        user_write
            .mirror_user(&user, &mut *ext_cxn)
            .await
            .context("mirroring a newly signed up user")?;
        info!(user_id = %user.id, "user signed up");

        Ok(user)
    }

    async fn log_in(
        &self,
        credentials: &Credentials,
        ext_cxn: &mut impl ExternalConnectivity,
        auth_provider: &impl AuthProvider,
        user_write: &impl UserWriter,
    ) -> Result<String, AuthError> {
        let session = match auth_provider.sign_in(credentials, &mut *ext_cxn).await {
            Ok(session) => session,
            Err(AuthProviderError::Rejected(_)) => return Err(AuthError::InvalidCredentials),
            Err(AuthProviderError::Unavailable(err)) => {
                return Err(AuthError::PortError(
                    err.context("signing in with the auth provider"),
                ));
            }
        };

        let first_sight = user_write
            .mirror_user(&session.user, &mut *ext_cxn)
            .await
            .context("mirroring a user on login")?;
        if first_sight {
            info!(user_id = %session.user.id, "mirrored user on first login");
        }

        Ok(session.access_token)
    }
}

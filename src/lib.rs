use crate::auth_gate::TokenVerifier;
use crate::persistence::http_auth_provider::HttpAuthProvider;
use axum::extract::State;
use std::sync::Arc;

pub mod api;
pub mod app_env;
pub mod auth_gate;
pub mod db;
pub mod domain;
pub mod dto;
pub mod external_connections;
pub mod logging;
pub mod persistence;
pub mod routes;
pub mod routing_utils;
pub mod validators;

/// Data shared by every request handler
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
    pub token_verifier: Arc<TokenVerifier>,
    pub auth_provider: HttpAuthProvider,
}

/// Extractor for the application state, used by every router closure
pub type AppState = State<Arc<SharedData>>;

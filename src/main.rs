use anyhow::Context;
use dotenv::dotenv;
use std::sync::Arc;
use task_digest_api::app_env::AppConfig;
use task_digest_api::auth_gate::TokenVerifier;
use task_digest_api::domain::digest::{self, DailyTrigger, DigestService, LogDigestSink};
use task_digest_api::persistence::db_analytics_driven_ports::{DbDigestReader, DbTaskStatsReader};
use task_digest_api::persistence::db_user_driven_ports::DbUserReader;
use task_digest_api::persistence::http_auth_provider::HttpAuthProvider;
use task_digest_api::{SharedData, db, logging, persistence, routes};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenv().is_err() {
        println!("Running without a .env file.");
    }

    let config = AppConfig::from_env()?;
    logging::init_telemetry(&config)?;

    let db_pool = db::connect_sqlx(&config.database_url, config.database_max_connections).await?;
    db::run_migrations(&db_pool).await?;
    let ext_cxn = persistence::ExternalConnectivity::new(db_pool)?;

    let mut digest_cxn = ext_cxn.clone();
    let digest_time = config.digest_time;
    tokio::spawn(async move {
        digest::run_digest_schedule(
            &mut DailyTrigger::new(digest_time),
            &DigestService {},
            &mut digest_cxn,
            &DbUserReader {},
            &DbDigestReader {},
            &DbTaskStatsReader {},
            &LogDigestSink,
        )
        .await;
    });
    info!(at = %digest_time, "Digest scheduler started");

    let shared_data = Arc::new(SharedData {
        ext_cxn,
        token_verifier: Arc::new(TokenVerifier::new(
            &config.jwt_secret,
            config.jwt_audience.as_deref(),
        )),
        auth_provider: HttpAuthProvider::new(&config.auth_provider_url, &config.auth_provider_key),
    });
    let router = routes::build_router(shared_data);

    let listener = TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("binding to {}", config.bind_address))?;
    info!("Listening on {}", config.bind_address);

    axum::serve(listener, router)
        .await
        .context("serving HTTP traffic")?;

    Ok(())
}

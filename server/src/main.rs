mod config;
mod routes;
mod services;
mod sessions;
mod state;
mod views;

use std::sync::Arc;

use firebase::{FirestoreClient, IdentityToolkitClient};
use tracing_subscriber::EnvFilter;

use crate::services::store::FirestoreStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config::AppConfig::from_env().expect("firebase config required");
    let port = config.port;

    let identity = IdentityToolkitClient::new(config.firebase.clone()).expect("identity client init failed");
    let firestore = FirestoreClient::new(&config.firebase).expect("firestore client init failed");
    if config.google_client_id.is_none() {
        tracing::warn!("GOOGLE_CLIENT_ID not set; Google sign-in hidden");
    }

    let sweep_interval = config.session_sweep_interval;
    let state = state::AppState::new(Arc::new(FirestoreStore::new(firestore)), Arc::new(identity), config);

    // Drop idle client sessions in the background.
    let _sweeper = state.sessions.spawn_sweeper(sweep_interval);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await.expect("failed to bind");

    tracing::info!(%port, "jobverse listening");
    axum::serve(listener, app).await.expect("server failed");
}

use axum::http::HeaderValue;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod contracts;
mod error;
mod models;
mod services;
mod session;
mod utils;

use config::Config;
use constants::API_VERSION;
use session::WalletSession;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "five_elements_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Five Elements Battle gateway");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);
    tracing::info!("Required chain id: {}", config.required_chain_id);
    if config.is_testnet() {
        tracing::info!("Running against a testnet deployment");
    }

    let session = Arc::new(WalletSession::new(config.clone()));

    // Silent reconnect: bring the session up at boot when a signer is
    // configured, without failing startup if the chain is unreachable.
    if config.wallet_private_key.is_some() {
        match session.connect().await {
            Ok(status) => {
                tracing::info!(account = ?status.account, "Session restored at startup");
            }
            Err(e) => {
                tracing::warn!("Startup session connect failed: {}", e);
            }
        }
    } else {
        tracing::info!("No WALLET_PRIVATE_KEY set; starting disconnected");
    }

    let app_state = api::AppState {
        session: session.clone(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start background services
    tokio::spawn(services::start_background_services(session));

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid address");

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Session lifecycle
        .route("/api/v1/session/connect", post(api::session::connect))
        .route("/api/v1/session/disconnect", post(api::session::disconnect))
        .route("/api/v1/session/status", get(api::session::status))
        .route("/api/v1/balance", get(api::session::balance))
        // Warriors
        .route("/api/v1/warriors", get(api::warriors::list))
        .route("/api/v1/warriors/mint", post(api::warriors::mint))
        // Weapons
        .route("/api/v1/weapons", get(api::weapons::list))
        .route("/api/v1/weapons/dust", get(api::weapons::dust))
        .route("/api/v1/weapons/mint", post(api::weapons::mint))
        .route("/api/v1/weapons/equip", post(api::weapons::equip))
        .route("/api/v1/weapons/unequip", post(api::weapons::unequip))
        .route("/api/v1/weapons/repair", post(api::weapons::repair))
        .route("/api/v1/weapons/burn", post(api::weapons::burn))
        .route("/api/v1/weapons/reforge", post(api::weapons::reforge))
        .route(
            "/api/v1/weapons/reforge-dust",
            post(api::weapons::reforge_dust),
        )
        // Battle
        .route(
            "/api/v1/battle/enemies/{warrior_id}",
            get(api::battle::enemies),
        )
        .route("/api/v1/battle/preview", post(api::battle::preview))
        .route("/api/v1/battle/execute", post(api::battle::execute))
        .route("/api/v1/battle/stats", get(api::battle::stats))
        .route("/api/v1/battle/history", get(api::battle::history))
        // Marketplace
        .route("/api/v1/market/listings", get(api::market::listings))
        .route("/api/v1/market/mine", get(api::market::my_listings))
        .route("/api/v1/market/stats", get(api::market::stats))
        .route("/api/v1/market/list", post(api::market::list))
        .route("/api/v1/market/buy", post(api::market::buy))
        .route("/api/v1/market/cancel", post(api::market::cancel))
        .route("/api/v1/market/price", post(api::market::change_price))
        // Admin console
        .route("/api/v1/admin/status", get(api::admin::status))
        .route("/api/v1/admin/overview", get(api::admin::overview))
        .route("/api/v1/admin/params", get(api::admin::params))
        .route(
            "/api/v1/admin/features",
            get(api::admin::features).post(api::admin::set_features),
        )
        .route("/api/v1/admin/prices", post(api::admin::set_prices))
        .route("/api/v1/admin/stamina", post(api::admin::set_stamina))
        .route(
            "/api/v1/admin/battle-params",
            post(api::admin::set_battle_params),
        )
        .route("/api/v1/admin/fee", post(api::admin::set_fee))
        .route("/api/v1/admin/pause", post(api::admin::set_pause))
        .route(
            "/api/v1/admin/treasury/deposit",
            post(api::admin::treasury_deposit),
        )
        .route(
            "/api/v1/admin/treasury/withdraw",
            post(api::admin::treasury_withdraw),
        )
        .route(
            "/api/v1/admin/treasury/emergency-withdraw",
            post(api::admin::treasury_emergency_withdraw),
        )
        .route("/api/v1/admin/roles/grant", post(api::admin::grant_role))
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

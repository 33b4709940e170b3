//! Signet Authentication Server
//!
//! Production server for the authentication REST API:
//! - POST /signup, /login, /federated-signin
//! - Health probes under /health
//! - Swagger UI under /swagger-ui
//!
//! Configuration comes from a TOML file (`config.toml`, `signet.toml` or
//! `SIGNET_CONFIG`) with environment variable overrides on top.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SIGNET_CONFIG` | - | Path to a TOML config file |
//! | `SIGNET_HTTP_PORT` / `PORT` | `3000` | HTTP port |
//! | `SIGNET_MONGODB_URI` | `mongodb://localhost:27017` | MongoDB connection URI |
//! | `SIGNET_MONGODB_DATABASE` | `signet` | MongoDB database name |
//! | `SIGNET_IDP_PROJECT_ID` | - | Identity provider project id |
//! | `SIGNET_IDP_CLIENT_EMAIL` | - | Service account client email |
//! | `SIGNET_IDP_PRIVATE_KEY` | - | Service account private key PEM |
//! | `SIGNET_IDP_JWKS_URL` | provider default | JWKS endpoint |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::{routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use sg_auth::{
    auth_router, health_router, initialize_indexes, AccountReconciler, AccountRepository,
    AccountStore, AuthApiState, HealthState, IdTokenVerifier, PasswordService, ServiceCredential,
};
use sg_config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    sg_common::logging::init_logging("sg-auth-server");

    info!("Starting Signet Authentication Server");

    let config = AppConfig::load()?;
    config.validate()?;

    // Fail fast on a bad credential; token verification cannot work without it
    let credential = ServiceCredential::new(
        &config.identity_provider.project_id,
        &config.identity_provider.client_email,
        &config.identity_provider.private_key,
    )?;
    info!(project_id = %credential.project_id, "Identity provider credential loaded");

    info!(database = %config.mongodb.database, "Connecting to MongoDB");
    let mongo_client = mongodb::Client::with_uri_str(&config.mongodb.uri).await?;
    let db = mongo_client.database(&config.mongodb.database);

    initialize_indexes(&db).await?;

    // Wire up services
    let accounts: Arc<dyn AccountStore> = Arc::new(AccountRepository::new(&db));
    let reconciler = Arc::new(
        AccountReconciler::new(accounts.clone())
            .with_upgrade_on_federated_signin(config.auth.upgrade_on_federated_signin),
    );
    let password_service = Arc::new(PasswordService::default());
    let token_verifier = Arc::new(IdTokenVerifier::new(
        &credential,
        &config.identity_provider.jwks_url,
        config.identity_provider.issuer_or_default(),
    ));

    let auth_state = AuthApiState {
        accounts,
        reconciler,
        password_service,
        token_verifier,
    };

    let health_state = HealthState::new(Some(db), Some(env!("CARGO_PKG_VERSION").to_string()));

    // Auth API router with auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .merge(auth_router(auth_state))
        .split_for_parts();

    openapi.info.title = "Signet Authentication API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description = Some("Signup, login and federated sign-in".to_string());

    let app = Router::new()
        .merge(router)
        .route("/", get(|| async { "Backend is running! 🚀" }))
        .nest("/health", health_router(health_state.clone()))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.http.cors_origins));

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    health_state.set_ready();
    info!(addr = %addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Signet Authentication Server stopped");
    Ok(())
}

/// A `*` entry (or no entries) opens CORS up entirely; anything else is an
/// explicit allow-list.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

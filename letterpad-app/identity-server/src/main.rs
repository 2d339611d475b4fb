use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing::{error, info};

use identity_api::{build_router, AppState};
use identity_core::services::GatewayService;
use identity_infrastructure::database::connection;
use identity_infrastructure::PgSessionRepository;
use identity_security::IdentityTokenService;
use identity_shared::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Initialize telemetry
    identity_shared::telemetry::init_telemetry();

    info!("Identity gateway starting...");

    // Load configuration
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Connect to Database
    info!("Connecting to database...");
    let pool =
        connection::create_pool(&config.database.url, config.database.max_connections).await?;
    connection::run_migrations(&pool).await?;
    info!("Database connection established.");

    // Create App State
    let sessions = Arc::new(PgSessionRepository::new(pool));
    let state = AppState {
        gateway: Arc::new(GatewayService::new(sessions)),
        tokens: Arc::new(IdentityTokenService::new(config.auth.secret.clone())),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state).layer(TraceLayer::new_for_http());

    // Bind address
    let host: std::net::IpAddr = config.app.host.parse()?;
    let addr = SocketAddr::from((host, config.app.port));
    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

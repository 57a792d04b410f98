use quota_gate::{config, database::DatabaseManager, server};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SECRET_KEY, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting Quota Gate API in {:?} mode", config.environment);

    // No signing secret means no way to issue or verify tokens: refuse to start
    if config.security.jwt_secret.is_empty() {
        tracing::error!("SECRET_KEY is not set; refusing to start");
        std::process::exit(1);
    }

    if let Err(e) = DatabaseManager::sync_schema().await {
        // The pool is lazy; a database that comes up later still works,
        // as long as the schema already exists
        tracing::warn!("Could not sync database schema at startup: {}", e);
    }

    let app = server::app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Server started; listening on {}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

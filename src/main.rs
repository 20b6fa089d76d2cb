use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{
    header::{AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method, StatusCode,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use menuvote_backend::{
    config::{Config, LogFormat},
    db::{
        self, postgres_restaurant_repository::PostgresRestaurantRepository,
        postgres_user_repository::PostgresUserRepository,
        postgres_vote_repository::PostgresVoteLedger,
        restaurant_repository::RestaurantRepository, user_repository::UserRepository,
    },
    engine::VoteEngine,
    routes,
    services::authenticator::DefaultAuthenticator,
    utils::jwt::JwtKeys,
    AppState,
};

fn init_tracing(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Ok(match &config.frontend_origin {
        Some(origin) => cors.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("FRONTEND_ORIGIN is not a valid origin: {origin}"))?,
        ),
        None => cors.allow_origin(Any),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    init_tracing(&config.log_format);

    let jwt_keys = Arc::new(JwtKeys::from_secret(&config.jwt_secret).context("invalid JWT_SECRET")?);

    let pg_pool = db::connect(&config.database_url, config.db_max_connections)
        .await
        .context("failed to connect to the database")?;
    info!("connected to the database");

    let user_repo = Arc::new(PostgresUserRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn UserRepository>;
    let restaurant_repo = Arc::new(PostgresRestaurantRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn RestaurantRepository>;
    let votes = Arc::new(VoteEngine::new(Arc::new(PostgresVoteLedger {
        pool: pg_pool.clone(),
    })));
    let authenticator = Arc::new(DefaultAuthenticator::new(
        user_repo.clone(),
        jwt_keys.clone(),
        config.token_ttl,
    ));

    let cors = cors_layer(&config)?;
    let addr = config.bind_addr;
    let request_timeout = config.request_timeout;

    let state = AppState {
        db: user_repo,
        restaurant_repo,
        votes,
        authenticator,
        jwt_keys,
        config: Arc::new(config),
    };

    let app = routes::app(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(?err, "failed to listen for shutdown signal");
    }
    info!("shutting down");
}

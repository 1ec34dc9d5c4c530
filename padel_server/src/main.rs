//! Padel tournament server.
//!
//! Serves the JSON API over axum with PostgreSQL-backed managers for
//! accounts, tournaments and the ranking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use chrono::Duration;
use padel::{
    auth::AuthManager,
    db::{Database, PgUserRepository},
    ranking::RankingManager,
    seed::seed_demo_data,
    tournament::TournamentManager,
    users::UserManager,
};
use padel_server::{api, config::ServerConfig, logging, metrics};
use pico_args::Arguments;
use tracing::info;

const HELP: &str = "\
Run the padel tournament server

USAGE:
  padel_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8001]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/padel]

FLAGS:
  --seed                   Replace all data with the demo set before serving
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8001)
  DATABASE_URL             PostgreSQL connection string
  JWT_SECRET               JWT signing secret (at least 32 characters)
  PASSWORD_PEPPER          Password hashing pepper (at least 16 characters)
  JWT_EXPIRATION_HOURS     Access token and session lifetime [default: 168]
  CORS_ORIGINS             '*' or a comma separated list of origins [default: *]
  METRICS_BIND             Prometheus exporter address (disabled when unset)
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    seed: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(());
    }

    let args = Args {
        bind: pargs
            .opt_value_from_str("--bind")
            .context("Invalid --bind address")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        seed: pargs.contains("--seed"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    info!("Starting padel tournament server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(anyhow::Error::msg)?;
        info!("Prometheus metrics exported on {}", metrics_bind);
    }

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await.context("Failed to run migrations")?;
    info!("Database connected and migrated");

    let pool = Arc::new(db.pool().clone());
    let auth = Arc::new(
        AuthManager::new(
            pool.clone(),
            config.security.password_pepper.clone(),
            config.security.jwt_secret.clone(),
        )
        .with_token_duration(Duration::hours(config.security.token_ttl_hours)),
    );

    if args.seed {
        let summary = seed_demo_data(&pool, &auth)
            .await
            .context("Failed to load demo data")?;
        info!(
            "Demo data loaded: {} users, {} tournaments, {} registrations (admin: {})",
            summary.users, summary.tournaments, summary.registrations, summary.admin_email
        );
    }

    let state = api::AppState {
        auth,
        users: Arc::new(UserManager::new(Arc::new(PgUserRepository::new(
            pool.clone(),
        )))),
        tournaments: Arc::new(TournamentManager::new(pool.clone())),
        ranking: Arc::new(RankingManager::new(pool)),
        db: Arc::new(db),
    };

    let app = api::create_router(state.clone(), &config.cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    state.db.pool().close().await;

    Ok(())
}

/// Resolves on Ctrl+C; if the handler cannot be installed the server keeps running
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", e);
        std::future::pending::<()>().await;
    }
}

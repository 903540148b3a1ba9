use api::auth::middleware::log_request;
use api::routes::routes;
use api::state::AppState;
use axum::{Router, middleware::from_fn};
use migration::Migrator;
use sea_orm_migration::MigratorTrait;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tracing_appender::rolling;
use util::config;

#[tokio::main]
async fn main() {
    let _log_guard = init_logging(&config::log_file());

    let db = db::connect().await;
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let app_state = AppState::new(db);

    let app = Router::new()
        .nest("/api", routes(app_state))
        .layer(from_fn(log_request))
        .layer(CorsLayer::very_permissive());

    let addr: SocketAddr = format!("{}:{}", config::host(), config::port())
        .parse()
        .expect("Invalid address");

    tracing::info!(
        project = %config::project_name(),
        env = %config::env(),
        %addr,
        "Starting server"
    );

    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server crashed");
}

fn init_logging(log_file: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    let stdout_layer = config::log_to_stdout().then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(true)
            .with_target(true)
    });

    // LOG_LEVEL takes a full filter directive, e.g. `api=debug,services=info`.
    let env_filter = EnvFilter::try_new(config::log_level())
        .unwrap_or_else(|_| EnvFilter::new("api=info,services=info,db=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    guard
}

mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod models;
mod sequence;
mod state;
mod utils;

use axum::{
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use log::{error, info};
use std::{env, error::Error, sync::Arc};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::{Config, ConfigError};
use database::{create_database_pool, run_migrations};
use sequence::{PgCounterStore, SequenceAllocator};
use state::AppState;

type BoxError = Box<dyn Error + Send + Sync>;

const USAGE: &str = "usage: stockroom [serve | check-db | issue-token <subject> <perm,perm,...> [hours]]";

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        None | Some("serve") => serve().await,
        Some("check-db") => check_db().await,
        Some("issue-token") => issue_token(&args[1..]),
        Some(other) => Err(format!("unknown command {:?}\n{}", other, USAGE).into()),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn serve() -> Result<(), BoxError> {
    let config = Config::from_env()?;

    let db = create_database_pool(&config).await?;
    run_migrations(&db).await?;

    let sequences = SequenceAllocator::new(
        PgCounterStore::new(db.clone(), config.sequence_statement_timeout),
        config.sequence_kinds.clone(),
        config.sequence_retry,
    );
    info!(
        "Code sequences configured for {} entity kind(s)",
        sequences.registry().len()
    );

    let state = AppState {
        db,
        sequences: Arc::new(sequences),
        jwt_secret: Arc::from(config.jwt_secret.as_str()),
    };

    let app = create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    info!("Stockroom server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

// Connectivity smoke test for deployments.
async fn check_db() -> Result<(), BoxError> {
    let config = Config::from_env()?;
    let db = create_database_pool(&config).await?;

    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sequence_counters")
        .fetch_one(&db)
        .await;
    db.close().await;

    let count = count?;
    println!("Database reachable, {} sequence counter(s) present", count);
    Ok(())
}

fn issue_token(args: &[String]) -> Result<(), BoxError> {
    let (subject, permissions) = match args {
        [subject, permissions, ..] => (subject, permissions),
        _ => return Err(USAGE.into()),
    };
    let hours: i64 = match args.get(2) {
        Some(hours) => hours.parse().map_err(|_| format!("invalid hours {:?}", hours))?,
        None => 24,
    };
    let secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;

    let permissions = permissions
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();
    let token = utils::create_token(
        subject.clone(),
        permissions,
        chrono::Duration::hours(hours),
        &secret,
    )?;

    println!("{}", token);
    Ok(())
}

fn create_router(state: AppState) -> Router {
    use handlers::{brands, colors, products, purchase_requests, sequences, series};

    Router::new()
        .route("/health", get(sequences::health))

        // Catalog
        .route("/api/brands", get(brands::list_brands).post(brands::create_brand))
        .route(
            "/api/brands/:id",
            get(brands::get_brand).put(brands::update_brand).delete(brands::delete_brand),
        )
        .route("/api/colors", get(colors::list_colors).post(colors::create_color))
        .route(
            "/api/colors/:id",
            get(colors::get_color).put(colors::update_color).delete(colors::delete_color),
        )
        .route("/api/series", get(series::list_series).post(series::create_series))
        .route(
            "/api/series/:id",
            get(series::get_series).put(series::update_series).delete(series::delete_series),
        )
        .route("/api/products", get(products::list_products).post(products::create_product))
        .route(
            "/api/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )

        // Purchasing
        .route(
            "/api/purchase-requests",
            get(purchase_requests::list_purchase_requests)
                .post(purchase_requests::create_purchase_request),
        )
        .route(
            "/api/purchase-requests/status",
            post(purchase_requests::migrate_purchase_request_status),
        )
        .route(
            "/api/purchase-requests/:id",
            get(purchase_requests::get_purchase_request)
                .delete(purchase_requests::delete_purchase_request),
        )
        .route(
            "/api/purchase-requests/:id/status",
            post(purchase_requests::update_purchase_request_status),
        )

        // Sequences
        .route("/api/sequences", get(sequences::list_sequences))

        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

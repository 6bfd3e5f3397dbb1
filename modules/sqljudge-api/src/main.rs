use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::State,
    response::Html,
    routing::get,
    Router,
};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqljudge_common::{ApiError, Config};

mod db;
mod graphql;

use db::Store;
use graphql::{build_schema, ApiSchema};

#[derive(Parser)]
#[command(name = "sqljudge-api", about = "GraphQL API for the SQL judge")]
struct Cli {
    /// Path to the JSON or YAML configuration file
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,
}

pub struct AppState {
    pub schema: ApiSchema,
}

async fn graphql_handler(
    State(state): State<Arc<AppState>>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    state.schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(async_graphql::http::GraphiQLSource::build().endpoint("/graphql").finish())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;

    // The configured level is the default; RUST_LOG still wins when set.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logger.level)),
        )
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(16)
        .connect_with(config.database.connect_options())
        .await
        .map_err(|e| ApiError::Connection(e.to_string()))?;
    info!(database = %config.database.database, "Connected to database");

    let store = Arc::new(Store::new(pool));
    let schema = build_schema(store);
    let state = Arc::new(AppState { schema });

    let app = Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        // Health check
        .route("/", get(|| async { "ok" }))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = config.server.address();
    info!("sqljudge API starting on {addr}");
    info!("GraphiQL IDE available at http://{addr}/graphql");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

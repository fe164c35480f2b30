use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use socialmeter_common::{gate, Config};
use socialmeter_fetch::{FetchRequest, FetchResponse, FollowerFetcher};

mod store;

use store::{FollowerStore, PgFollowerStore};

pub struct AppState {
    pub fetcher: FollowerFetcher,
    pub store: Option<Arc<dyn FollowerStore>>,
}

async fn fetch_followers(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FetchRequest>,
) -> Json<FetchResponse> {
    let mut response = state.fetcher.fetch(&request).await;

    // Persistence only happens for requests that name an item, and only
    // through the gate: abbreviated or non-numeric values never overwrite
    // a stored exact count.
    if response.success {
        if let (Some(item_id), Some(count)) = (&request.item_id, response.followers_count.clone())
        {
            match gate::validate(&count) {
                Ok(()) => {
                    if let Some(store) = &state.store {
                        if let Err(e) = store.update_followers(item_id, &count).await {
                            warn!(item_id = %item_id, error = %e, "Persistence failed, returning value anyway");
                        }
                    } else {
                        warn!(item_id = %item_id, "No store configured, skipping persistence");
                    }
                }
                Err(rejection) => {
                    // The caller asked for persistence; a skipped write must
                    // not look like a stored one.
                    warn!(item_id = %item_id, value = %count, "Gate rejected value");
                    response.success = false;
                    response.error = Some(rejection.to_string());
                }
            }
        }
    }

    Json(response)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("socialmeter=info".parse()?),
        )
        .init();

    let config = Config::from_env();

    let store: Option<Arc<dyn FollowerStore>> = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url).await?;
            Some(Arc::new(PgFollowerStore::new(pool)))
        }
        None => {
            info!("DATABASE_URL not set, follower updates disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        fetcher: FollowerFetcher::from_config(&config),
        store,
    });

    let app = Router::new()
        .route("/", get(|| async { "ok" }))
        .route("/api/fetch-followers", post(fetch_followers))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
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

    let addr = format!("{}:{}", config.api_host, config.api_port);
    info!("socialmeter API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

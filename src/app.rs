use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{AppConfig, StoreBackend};
use crate::database::DatabaseManager;
use crate::doc::ApiDoc;
use crate::handlers::{pokemons, system};
use crate::middleware::{cache_middleware, rate_limit_middleware, RateLimiter, ResponseCache};
use crate::store::{MemoryStore, PokemonStore, PostgresStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PokemonStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn PokemonStore>) -> Self {
        Self { store }
    }
}

/// Pick and initialise the configured store backend
pub async fn build_store(config: &AppConfig) -> anyhow::Result<Arc<dyn PokemonStore>> {
    let store: Arc<dyn PokemonStore> = match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to postgres")?;
            let store = PostgresStore::new(pool, config.store.table.clone())?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare pokemon table")?;
            Arc::new(store)
        }
    };

    info!("Using {} pokemon store", store.backend());
    Ok(store)
}

pub fn app(state: AppState, config: &AppConfig) -> Router {
    let mut pokemon_routes: Router<AppState> = Router::new().route(
        "/pokemons",
        get(pokemons::get)
            .post(pokemons::post)
            .put(pokemons::put)
            .delete(pokemons::delete),
    );

    // Layers added later run first: rate limiting gates the cache
    if config.api.enable_response_cache {
        let cache = ResponseCache::new(Duration::from_secs(config.api.cache_ttl_secs))
            .with_max_body(config.api.cache_max_body_bytes);
        pokemon_routes = pokemon_routes.route_layer(from_fn_with_state(cache, cache_middleware));
    }
    if config.api.enable_rate_limiting {
        let limiter = RateLimiter::from_config(&config.api);
        pokemon_routes = pokemon_routes.route_layer(from_fn_with_state(limiter, rate_limit_middleware));
    }

    let mut base: Router<AppState> = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .merge(pokemon_routes);
    if config.api.enable_api_docs {
        base = base.merge(SwaggerUi::new("/v1").url("/openapi.json", ApiDoc::openapi()));
    }

    let mut router = base
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .with_state(state);

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

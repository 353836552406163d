pub mod app;
pub mod cli;
pub mod config;
pub mod database;
pub mod doc;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod testing;

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber, honouring RUST_LOG when set
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pokedex_api=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

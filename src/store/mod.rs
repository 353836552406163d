//! Record storage for the pokemons resource.
//!
//! [`PokemonStore`] is the seam between the HTTP handlers and the backing
//! medium. Two implementations exist with the same contract:
//!
//! - [`MemoryStore`]: process-local map behind an async `RwLock`
//! - [`PostgresStore`]: a single table accessed through a sqlx pool, every
//!   value bound as a query parameter
//!
//! Conflicting writes on the same key are linearizable in both backends.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::database::models::{Pokemon, PokemonProperties};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors raised by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Pokemon '{0}' was not found")]
    NotFound(String),

    #[error("Pokemon '{0}' was already created")]
    Conflict(String),

    #[error("Invalid table name: {0}")]
    InvalidTable(String),

    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Key-indexed pokemon storage
#[async_trait]
pub trait PokemonStore: Send + Sync {
    /// Short backend label for logs and the health endpoint
    fn backend(&self) -> &'static str;

    /// Every stored record, ordered by name
    async fn list(&self) -> Result<Vec<Pokemon>, StoreError>;

    async fn find(&self, name: &str) -> Result<Option<Pokemon>, StoreError>;

    /// Insert a new record. Fails with [`StoreError::Conflict`] if the name is taken.
    async fn create(&self, pokemon: Pokemon) -> Result<Pokemon, StoreError>;

    /// Replace the properties of an existing record.
    /// Fails with [`StoreError::NotFound`] if the name is absent.
    async fn update(&self, name: &str, properties: PokemonProperties) -> Result<Pokemon, StoreError>;

    /// Remove a record. Fails with [`StoreError::NotFound`] if the name is absent.
    async fn delete(&self, name: &str) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;

    /// All records when `name` is `None`, otherwise exactly the named one
    async fn get(&self, name: Option<&str>) -> Result<Vec<Pokemon>, StoreError> {
        match name {
            None => self.list().await,
            Some(name) => match self.find(name).await? {
                Some(pokemon) => Ok(vec![pokemon]),
                None => Err(StoreError::NotFound(name.to_string())),
            },
        }
    }
}

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use super::{PokemonStore, StoreError};
use crate::database::manager::DatabaseManager;
use crate::database::models::{Pokemon, PokemonProperties, PokemonRow};

/// Store backed by a single Postgres table.
///
/// The table name is the only token formatted into SQL; it is validated in
/// [`PostgresStore::new`] and always emitted quoted. Values are bound.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    table: String,
}

impl PostgresStore {
    pub fn new(pool: PgPool, table: impl Into<String>) -> Result<Self, StoreError> {
        let table = table.into();
        if !Self::is_valid_table_name(&table) {
            return Err(StoreError::InvalidTable(table));
        }
        Ok(Self { pool, table })
    }

    /// Create the table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} (
                name TEXT PRIMARY KEY,
                types TEXT[] NOT NULL,
                region TEXT NOT NULL DEFAULT '',
                height DOUBLE PRECISION NOT NULL
            )",
            self.quoted_table()
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        info!("Ensured pokemon table {}", self.quoted_table());
        Ok(())
    }

    fn quoted_table(&self) -> String {
        format!("\"{}\"", self.table.replace('"', "\"\""))
    }

    /// Accepts `[a-zA-Z_][a-zA-Z0-9_]*`, at most 63 bytes (Postgres NAMEDATALEN)
    fn is_valid_table_name(name: &str) -> bool {
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return false,
        }
        name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[async_trait]
impl PokemonStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self) -> Result<Vec<Pokemon>, StoreError> {
        let sql = format!(
            "SELECT name, types, region, height FROM {} ORDER BY name",
            self.quoted_table()
        );
        let rows = sqlx::query_as::<_, PokemonRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Pokemon::from).collect())
    }

    async fn find(&self, name: &str) -> Result<Option<Pokemon>, StoreError> {
        let sql = format!(
            "SELECT name, types, region, height FROM {} WHERE name = $1",
            self.quoted_table()
        );
        let row = sqlx::query_as::<_, PokemonRow>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Pokemon::from))
    }

    async fn create(&self, pokemon: Pokemon) -> Result<Pokemon, StoreError> {
        // ON CONFLICT DO NOTHING keeps check-and-insert in one statement
        let sql = format!(
            "INSERT INTO {} (name, types, region, height) VALUES ($1, $2, $3, $4)
             ON CONFLICT (name) DO NOTHING
             RETURNING name, types, region, height",
            self.quoted_table()
        );
        let row = sqlx::query_as::<_, PokemonRow>(&sql)
            .bind(&pokemon.name)
            .bind(&pokemon.properties.types)
            .bind(&pokemon.properties.region)
            .bind(pokemon.properties.height)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                info!("Created pokemon '{}' in {}", row.name, self.table);
                Ok(row.into())
            }
            None => Err(StoreError::Conflict(pokemon.name)),
        }
    }

    async fn update(&self, name: &str, properties: PokemonProperties) -> Result<Pokemon, StoreError> {
        let sql = format!(
            "UPDATE {} SET types = $2, region = $3, height = $4 WHERE name = $1
             RETURNING name, types, region, height",
            self.quoted_table()
        );
        let row = sqlx::query_as::<_, PokemonRow>(&sql)
            .bind(name)
            .bind(&properties.types)
            .bind(&properties.region)
            .bind(properties.height)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                info!("Updated pokemon '{}' in {}", name, self.table);
                Ok(row.into())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE name = $1", self.quoted_table());
        let result = sqlx::query(&sql).bind(name).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(name.to_string()));
        }
        info!("Deleted pokemon '{}' from {}", name, self.table);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::{PokemonStore, StoreError};
use crate::database::models::{Pokemon, PokemonProperties};

/// Process-local store. Lives from startup until shutdown.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<String, PokemonProperties>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PokemonStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> Result<Vec<Pokemon>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .map(|(name, properties)| Pokemon::new(name.clone(), properties.clone()))
            .collect())
    }

    async fn find(&self, name: &str) -> Result<Option<Pokemon>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(name)
            .map(|properties| Pokemon::new(name, properties.clone())))
    }

    async fn create(&self, pokemon: Pokemon) -> Result<Pokemon, StoreError> {
        // Check and insert under one write guard
        let mut records = self.records.write().await;
        if records.contains_key(&pokemon.name) {
            return Err(StoreError::Conflict(pokemon.name));
        }
        records.insert(pokemon.name.clone(), pokemon.properties.clone());
        info!("Created pokemon '{}' in memory store", pokemon.name);
        Ok(pokemon)
    }

    async fn update(&self, name: &str, properties: PokemonProperties) -> Result<Pokemon, StoreError> {
        let mut records = self.records.write().await;
        match records.get_mut(name) {
            Some(stored) => {
                *stored = properties.clone();
                info!("Updated pokemon '{}' in memory store", name);
                Ok(Pokemon::new(name, properties))
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        match records.remove(name) {
            Some(_) => {
                info!("Deleted pokemon '{}' from memory store", name);
                Ok(())
            }
            None => Err(StoreError::NotFound(name.to_string())),
        }
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pokemon(name: &str, types: &[&str]) -> Pokemon {
        Pokemon::new(
            name,
            PokemonProperties {
                types: types.iter().map(|t| t.to_string()).collect(),
                region: "kanto".to_string(),
                height: 0.4,
            },
        )
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let store = MemoryStore::new();
        let created = store.create(pokemon("pikachu", &["electric"])).await.unwrap();

        let found = store.get(Some("pikachu")).await.unwrap();
        assert_eq!(found, vec![created]);
    }

    #[tokio::test]
    async fn duplicate_create_conflicts() {
        let store = MemoryStore::new();
        store.create(pokemon("pikachu", &["electric"])).await.unwrap();

        let err = store.create(pokemon("pikachu", &["fire"])).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(name) if name == "pikachu"));

        // The first write is kept
        let stored = store.find("pikachu").await.unwrap().unwrap();
        assert_eq!(stored.properties.types, vec!["electric"]);
    }

    #[tokio::test]
    async fn update_replaces_properties() {
        let store = MemoryStore::new();
        store.create(pokemon("eevee", &["normal"])).await.unwrap();

        let props = PokemonProperties {
            types: vec!["water".to_string()],
            region: "johto".to_string(),
            height: 1.0,
        };
        store.update("eevee", props.clone()).await.unwrap();

        let stored = store.find("eevee").await.unwrap().unwrap();
        assert_eq!(stored.properties, props);
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("missingno", pokemon("missingno", &["bird"]).properties)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = MemoryStore::new();
        store.create(pokemon("pikachu", &["electric"])).await.unwrap();
        store.delete("pikachu").await.unwrap();

        assert!(matches!(store.get(Some("pikachu")).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete("pikachu").await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn list_returns_exactly_stored_records_in_name_order() {
        let store = MemoryStore::new();
        assert!(store.get(None).await.unwrap().is_empty());

        for name in ["squirtle", "bulbasaur", "charmander"] {
            store.create(pokemon(name, &["normal"])).await.unwrap();
        }
        store.delete("charmander").await.unwrap();

        let names: Vec<String> = store.get(None).await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["bulbasaur", "squirtle"]);
    }

    #[tokio::test]
    async fn concurrent_creates_have_one_winner() {
        let store = MemoryStore::new();

        let attempts = (0..16).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let types = if i % 2 == 0 { ["electric"] } else { ["fire"] };
                store.create(pokemon("pikachu", &types)).await
            })
        });

        let results = futures::future::join_all(attempts).await;
        let successes = results.iter().filter(|r| matches!(r, Ok(Ok(_)))).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Ok(Err(StoreError::Conflict(_)))))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 15);
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// A single catalog entry, keyed by `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pokemon {
    #[schema(example = "pikachu")]
    pub name: String,
    #[serde(flatten)]
    pub properties: PokemonProperties,
}

/// Everything about a pokemon except its key. Replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PokemonProperties {
    /// One or two distinct type tags
    #[schema(example = json!(["electric"]), min_items = 1, max_items = 2)]
    pub types: Vec<String>,
    #[serde(default)]
    #[schema(example = "kanto")]
    pub region: String,
    #[schema(example = 0.4, minimum = 0.0)]
    pub height: f64,
}

impl Pokemon {
    pub fn new(name: impl Into<String>, properties: PokemonProperties) -> Self {
        Self {
            name: name.into(),
            properties,
        }
    }
}

/// Row shape of the pokemons table
#[derive(Debug, Clone, FromRow)]
pub struct PokemonRow {
    pub name: String,
    pub types: Vec<String>,
    pub region: String,
    pub height: f64,
}

impl From<PokemonRow> for Pokemon {
    fn from(row: PokemonRow) -> Self {
        Pokemon {
            name: row.name,
            properties: PokemonProperties {
                types: row.types,
                region: row.region,
                height: row.height,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_flat() {
        let pikachu = Pokemon::new(
            "pikachu",
            PokemonProperties {
                types: vec!["electric".to_string()],
                region: "kanto".to_string(),
                height: 0.4,
            },
        );

        let value = serde_json::to_value(&pikachu).unwrap();
        assert_eq!(
            value,
            json!({ "name": "pikachu", "types": ["electric"], "region": "kanto", "height": 0.4 })
        );
    }
}

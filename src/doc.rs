//! OpenAPI document for the Pokedex API.
//!
//! Served as JSON at `/openapi.json` with Swagger UI at `/v1` when
//! `api.enable_api_docs` is set. The schemas below describe the JSON the
//! handlers emit; they are not used on the request path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{OpenApi, ToSchema};

use crate::database::models::{Pokemon, PokemonProperties};

/// Error envelope returned by every failing request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = 404)]
    pub status_code: u16,
    #[schema(example = "Pokemon 'pikachu' was not found")]
    pub message: String,
    /// Present on validation failures, one entry per offending field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, String>>,
}

/// Acknowledgement returned by a successful delete
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    #[schema(example = 200)]
    pub status_code: u16,
    #[schema(example = "Pokemon 'pikachu' deleted")]
    pub message: String,
}

/// Delete body, an alternative to the `name` query parameter
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteBody {
    #[schema(example = "pikachu")]
    pub name: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Pokedex API",
        description = "Pokemon catalog with list, lookup, create, update and delete."
    ),
    paths(
        crate::handlers::pokemons::get,
        crate::handlers::pokemons::post,
        crate::handlers::pokemons::put,
        crate::handlers::pokemons::delete,
        crate::handlers::system::root,
        crate::handlers::system::health,
    ),
    components(schemas(Pokemon, PokemonProperties, ErrorBody, MessageBody, DeleteBody)),
    tags(
        (name = "pokemons", description = "The pokemon catalog"),
        (name = "system", description = "Service description and health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::middleware::ApiResponse;
    use crate::validation::ValidationError;
    use axum::response::IntoResponse;
    use utoipa::openapi::PathItem;

    fn path<'a>(doc: &'a utoipa::openapi::OpenApi, route: &str) -> &'a PathItem {
        doc.paths.paths.get(route).unwrap_or_else(|| panic!("{} is documented", route))
    }

    #[test]
    fn documents_every_pokemons_verb() {
        let doc = ApiDoc::openapi();
        let pokemons = path(&doc, "/pokemons");
        assert!(pokemons.get.is_some());
        assert!(pokemons.post.is_some());
        assert!(pokemons.put.is_some());
        assert!(pokemons.delete.is_some());

        assert!(path(&doc, "/health").get.is_some());
        assert!(path(&doc, "/").get.is_some());
    }

    #[test]
    fn registers_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        for name in ["Pokemon", "PokemonProperties", "ErrorBody", "MessageBody", "DeleteBody"] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }

    #[tokio::test]
    async fn error_schema_matches_the_envelope() {
        let err: ApiError = ValidationError::field("types", "more than two types").into();
        let parsed: ErrorBody = serde_json::from_value(err.to_json()).unwrap();
        assert_eq!(parsed.status_code, 400);
        assert_eq!(parsed.field_errors.unwrap()["types"], "more than two types");

        let response = ApiResponse::<serde_json::Value>::message("Pokemon 'mew' deleted").into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: MessageBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.status_code, 200);
        assert_eq!(parsed.message, "Pokemon 'mew' deleted");
    }
}

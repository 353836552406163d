use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::app::AppState;
use crate::database::models::Pokemon;
use crate::doc::{DeleteBody, ErrorBody, MessageBody};
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{name_from_body, validate_name, validate_pokemon};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    /// Pokemon to look up. Omit to list the whole catalog.
    pub name: Option<String>,
}

/// GET /pokemons[?name=] - one pokemon by name, or all of them
#[utoipa::path(
    get,
    path = "/pokemons",
    params(NameQuery),
    responses(
        (status = 200, description = "The named pokemon, or the whole catalog ordered by name", body = [Pokemon]),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 404, description = "No pokemon with that name", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody)
    ),
    tag = "pokemons"
)]
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> ApiResult<Vec<Pokemon>> {
    let Query(query) = query?;
    let name = match query.name {
        Some(name) => Some(validate_name(Some(&name))?),
        None => None,
    };

    let pokemons = state.store.get(name.as_deref()).await?;
    Ok(ApiResponse::success(pokemons))
}

/// POST /pokemons - create a pokemon
#[utoipa::path(
    post,
    path = "/pokemons",
    request_body = Pokemon,
    responses(
        (status = 201, description = "Created", body = Pokemon),
        (status = 400, description = "Invalid arguments or the name is taken", body = ErrorBody),
        (status = 413, description = "Body too large", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody)
    ),
    tag = "pokemons"
)]
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Pokemon> {
    let Json(payload) = payload?;
    let pokemon = validate_pokemon(&payload)?;

    let created = state.store.create(pokemon).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /pokemons - replace the properties of an existing pokemon
#[utoipa::path(
    put,
    path = "/pokemons",
    request_body = Pokemon,
    responses(
        (status = 200, description = "Updated", body = Pokemon),
        (status = 400, description = "Invalid arguments", body = ErrorBody),
        (status = 404, description = "No pokemon with that name", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody)
    ),
    tag = "pokemons"
)]
pub async fn put(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Pokemon> {
    let Json(payload) = payload?;
    let pokemon = validate_pokemon(&payload)?;

    let updated = state.store.update(&pokemon.name, pokemon.properties).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /pokemons - delete by `name`, taken from the query string or a JSON body
#[utoipa::path(
    delete,
    path = "/pokemons",
    params(NameQuery),
    request_body(content = DeleteBody, description = "Used when the query has no name"),
    responses(
        (status = 200, description = "Deleted", body = MessageBody),
        (status = 400, description = "Missing or invalid name", body = ErrorBody),
        (status = 404, description = "No pokemon with that name", body = ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = ErrorBody)
    ),
    tag = "pokemons"
)]
pub async fn delete(
    State(state): State<AppState>,
    query: Result<Query<NameQuery>, QueryRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Query(query) = query?;

    let name = match (query.name, body) {
        (Some(name), _) => validate_name(Some(&name))?,
        (None, Ok(Json(body))) => name_from_body(&body)?,
        // No body at all: report the missing name rather than the content type
        (None, Err(JsonRejection::MissingJsonContentType(_))) => validate_name(None)?,
        (None, Err(rejection)) => return Err(rejection.into()),
    };

    state.store.delete(&name).await?;
    Ok(ApiResponse::message(format!("Pokemon '{}' deleted", name)))
}

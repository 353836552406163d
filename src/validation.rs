// Request argument validation for the pokemons resource.
//
// Payloads are inspected as raw JSON so every offending field can be reported
// at once, instead of failing on the first serde error.

use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::database::models::{Pokemon, PokemonProperties};

pub const MAX_TYPES: usize = 2;

/// Rejected request arguments, with one entry per offending field
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub message: String,
    pub field_errors: HashMap<String, String>,
}

impl ValidationError {
    fn new(field_errors: HashMap<String, String>) -> Self {
        let message = if field_errors.len() == 1 {
            // A lone problem becomes the headline message
            field_errors.values().next().cloned().unwrap_or_default()
        } else {
            "The provided arguments are not correct".to_string()
        };
        Self {
            message,
            field_errors,
        }
    }

    pub fn field(field: &str, problem: impl Into<String>) -> Self {
        let mut field_errors = HashMap::new();
        field_errors.insert(field.to_string(), problem.into());
        Self::new(field_errors)
    }
}

/// Validate a full pokemon body (`{name, types, region, height}`)
pub fn validate_pokemon(payload: &Value) -> Result<Pokemon, ValidationError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ValidationError::field("body", "request body must be a JSON object"))?;

    let mut errors = HashMap::new();

    let name = check_name(object.get("name")).map_err(|e| errors.insert("name".to_string(), e)).ok();
    let types = check_types(object.get("types")).map_err(|e| errors.insert("types".to_string(), e)).ok();
    let region = check_region(object.get("region")).map_err(|e| errors.insert("region".to_string(), e)).ok();
    let height = check_height(object.get("height")).map_err(|e| errors.insert("height".to_string(), e)).ok();

    match (name, types, region, height) {
        (Some(name), Some(types), Some(region), Some(height)) => Ok(Pokemon::new(
            name,
            PokemonProperties {
                types,
                region,
                height,
            },
        )),
        _ => Err(ValidationError::new(errors)),
    }
}

/// Validate the `name` argument of a lookup or delete
pub fn validate_name(name: Option<&str>) -> Result<String, ValidationError> {
    let value = name.map(|n| Value::String(n.to_string()));
    check_name(value.as_ref()).map_err(|e| ValidationError::field("name", e))
}

/// Pull the `name` out of a delete body
pub fn name_from_body(payload: &Value) -> Result<String, ValidationError> {
    let object: Option<&Map<String, Value>> = payload.as_object();
    check_name(object.and_then(|o| o.get("name"))).map_err(|e| ValidationError::field("name", e))
}

fn check_name(value: Option<&Value>) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Err("name is required".to_string()),
        Some(Value::String(s)) if s.trim().is_empty() => Err("name must not be empty".to_string()),
        Some(Value::String(s)) if has_control(s) => Err("name must not contain control characters".to_string()),
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err("name must be a string".to_string()),
    }
}

fn check_types(value: Option<&Value>) -> Result<Vec<String>, String> {
    let items = match value {
        None | Some(Value::Null) => return Err("types is required".to_string()),
        Some(Value::Array(items)) => items,
        Some(_) => return Err("types must be a list of strings".to_string()),
    };

    if items.is_empty() {
        return Err("at least one type is required".to_string());
    }
    if items.len() > MAX_TYPES {
        return Err("more than two types".to_string());
    }

    let mut types: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        let tag = match item {
            Value::String(s) if s.trim().is_empty() => return Err("type tags must not be empty".to_string()),
            Value::String(s) if has_control(s) => {
                return Err("type tags must not contain control characters".to_string())
            }
            Value::String(s) => s.trim().to_string(),
            _ => return Err("types must be a list of strings".to_string()),
        };
        if types.contains(&tag) {
            return Err(format!("duplicate type '{}'", tag));
        }
        types.push(tag);
    }
    Ok(types)
}

fn check_region(value: Option<&Value>) -> Result<String, String> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) if has_control(s) => Err("region must not contain control characters".to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err("region must be a string".to_string()),
    }
}

/// Postgres TEXT rejects NUL, so both stores refuse every control character
fn has_control(s: &str) -> bool {
    s.chars().any(char::is_control)
}

fn check_height(value: Option<&Value>) -> Result<f64, String> {
    match value {
        None | Some(Value::Null) => Err("height is required".to_string()),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(h) if h.is_finite() && h >= 0.0 => Ok(h),
            _ => Err("height must be a non-negative number".to_string()),
        },
        Some(_) => Err("height must be a number".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_complete_body() {
        let pokemon = validate_pokemon(&json!({
            "name": "pikachu",
            "types": ["electric"],
            "region": "kanto",
            "height": 0.4
        }))
        .unwrap();

        assert_eq!(pokemon.name, "pikachu");
        assert_eq!(pokemon.properties.types, vec!["electric"]);
        assert_eq!(pokemon.properties.region, "kanto");
        assert_eq!(pokemon.properties.height, 0.4);
    }

    #[test]
    fn region_defaults_to_empty() {
        let pokemon = validate_pokemon(&json!({
            "name": "mew",
            "types": ["psychic"],
            "height": 1
        }))
        .unwrap();
        assert_eq!(pokemon.properties.region, "");
        assert_eq!(pokemon.properties.height, 1.0);
    }

    #[test]
    fn rejects_three_types() {
        let err = validate_pokemon(&json!({
            "name": "oddish",
            "types": ["grass", "poison", "fairy"],
            "height": 0.5
        }))
        .unwrap_err();

        assert_eq!(err.message, "more than two types");
        assert!(err.field_errors.contains_key("types"));
    }

    #[test]
    fn rejects_empty_and_duplicate_types() {
        let empty = validate_pokemon(&json!({ "name": "a", "types": [], "height": 1 })).unwrap_err();
        assert_eq!(empty.message, "at least one type is required");

        let dup = validate_pokemon(&json!({ "name": "a", "types": ["fire", "fire"], "height": 1 })).unwrap_err();
        assert_eq!(dup.message, "duplicate type 'fire'");
    }

    #[test]
    fn reports_every_bad_field() {
        let err = validate_pokemon(&json!({
            "name": "",
            "types": "fire",
            "region": 7,
            "height": -1
        }))
        .unwrap_err();

        assert_eq!(err.message, "The provided arguments are not correct");
        assert_eq!(err.field_errors.len(), 4);
        assert_eq!(err.field_errors["name"], "name must not be empty");
        assert_eq!(err.field_errors["height"], "height must be a non-negative number");
    }

    #[test]
    fn rejects_control_characters() {
        let err = validate_name(Some("pika\u{0}chu")).unwrap_err();
        assert_eq!(err.message, "name must not contain control characters");

        let err = validate_pokemon(&json!({
            "name": "mew",
            "types": ["psy\nchic"],
            "region": "kan\u{7}to",
            "height": 0.4
        }))
        .unwrap_err();
        assert_eq!(err.field_errors["types"], "type tags must not contain control characters");
        assert_eq!(err.field_errors["region"], "region must not contain control characters");
    }

    #[test]
    fn rejects_non_object_body() {
        let err = validate_pokemon(&json!(["pikachu"])).unwrap_err();
        assert!(err.field_errors.contains_key("body"));
    }

    #[test]
    fn validates_lookup_names() {
        assert_eq!(validate_name(Some(" pikachu ")).unwrap(), "pikachu");
        assert!(validate_name(Some("  ")).is_err());
        assert!(validate_name(None).is_err());

        assert_eq!(name_from_body(&json!({ "name": "eevee" })).unwrap(), "eevee");
        assert!(name_from_body(&json!({ "name": 3 })).is_err());
    }
}

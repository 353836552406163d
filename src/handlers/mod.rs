// handlers/mod.rs - HTTP handlers
//
// pokemons: the catalog resource, one handler per verb over any PokemonStore
// system:   root description and health check

pub mod pokemons;
pub mod system;

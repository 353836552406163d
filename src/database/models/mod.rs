pub mod pokemon;

pub use pokemon::{Pokemon, PokemonProperties, PokemonRow};

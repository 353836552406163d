pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pokedex")]
#[command(about = "Pokedex CLI - command-line client for the Pokedex API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "POKEDEX_SERVER",
        default_value = "http://127.0.0.1:3000",
        help = "Base URL of the Pokedex API"
    )]
    pub server: String,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "List every pokemon in the catalog")]
    List,

    #[command(about = "Show a single pokemon")]
    Get {
        #[arg(help = "Pokemon name")]
        name: String,
    },

    #[command(about = "Create a pokemon")]
    Create(commands::pokemon::PokemonArgs),

    #[command(about = "Replace the properties of an existing pokemon")]
    Update(commands::pokemon::PokemonArgs),

    #[command(about = "Delete a pokemon")]
    Delete {
        #[arg(help = "Pokemon name")]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = client::PokedexClient::new(&cli.server)?;

    commands::pokemon::handle(cli.command, &client, output_format).await
}

use clap::Args;
use serde_json::{json, Value};

use crate::cli::client::PokedexClient;
use crate::cli::utils::{output_records, output_success};
use crate::cli::{Commands, OutputFormat};

#[derive(Args, Debug)]
pub struct PokemonArgs {
    #[arg(help = "Pokemon name")]
    pub name: String,

    #[arg(long = "type", required = true, help = "Type tag (repeat for a second type)")]
    pub types: Vec<String>,

    #[arg(long, default_value = "", help = "Home region")]
    pub region: String,

    #[arg(long, help = "Height in metres")]
    pub height: f64,
}

impl PokemonArgs {
    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "types": self.types,
            "region": self.region,
            "height": self.height,
        })
    }
}

pub async fn handle(cmd: Commands, client: &PokedexClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        Commands::List => {
            let records = client.list().await?;
            output_records(&output_format, &records)
        }
        Commands::Get { name } => {
            let records = client.get(&name).await?;
            output_records(&output_format, &records)
        }
        Commands::Create(args) => {
            let created = client.create(args.to_json()).await?;
            output_success(&output_format, &format!("Created pokemon '{}'", args.name), Some(created))
        }
        Commands::Update(args) => {
            let updated = client.update(args.to_json()).await?;
            output_success(&output_format, &format!("Updated pokemon '{}'", args.name), Some(updated))
        }
        Commands::Delete { name } => {
            let response = client.delete(&name).await?;
            output_success(&output_format, &format!("Deleted pokemon '{}'", name), Some(response))
        }
    }
}

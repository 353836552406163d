use serde_json::Value;
use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&data.unwrap_or(Value::Null))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a list of pokemon records in the appropriate format
pub fn output_records(output_format: &OutputFormat, records: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(records)?);
        }
        OutputFormat::Text => {
            let rows = records.as_array().map(Vec::as_slice).unwrap_or_default();
            if rows.is_empty() {
                println!("No pokemons found");
                return Ok(());
            }
            println!("{:<16} {:<20} {:<12} {:>6}", "NAME", "TYPES", "REGION", "HEIGHT");
            for row in rows {
                println!("{}", format_row(row));
            }
        }
    }
    Ok(())
}

fn format_row(record: &Value) -> String {
    let name = record.get("name").and_then(Value::as_str).unwrap_or("-");
    let types = record
        .get("types")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default();
    let region = record.get("region").and_then(Value::as_str).unwrap_or("");
    let height = record.get("height").and_then(Value::as_f64).unwrap_or(0.0);

    format!("{:<16} {:<20} {:<12} {:>6.2}", name, types, region, height)
}

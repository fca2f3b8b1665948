use std::path::Path;

use serde::Serialize;
use tabula::{OutputFormat, TabulaConfig};

#[derive(Debug, Serialize)]
struct ConfigInfo<'a> {
    config_file: String,
    #[serde(flatten)]
    settings: &'a TabulaConfig,
    database_path: String,
    database_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    database_size_bytes: Option<u64>,
}

pub fn run(config: &TabulaConfig, output_format: OutputFormat) {
    let database_path = config.database_path();
    let metadata = std::fs::metadata(&database_path).ok();

    let info = ConfigInfo {
        config_file: TabulaConfig::config_file_path(),
        settings: config,
        database_exists: Path::new(&database_path).exists(),
        database_size_bytes: metadata.map(|m| m.len()),
        database_path,
    };

    match output_format {
        OutputFormat::Json | OutputFormat::JsonLine => match serde_json::to_string(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        OutputFormat::JsonPretty => match serde_json::to_string_pretty(&info) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("ERROR: Failed to serialize to JSON: {}", e),
        },
        _ => {
            println!("{}", config.summary());
            println!(
                "Database Status:    {}",
                if info.database_exists {
                    "exists"
                } else {
                    "not created"
                }
            );
            if let Some(size) = info.database_size_bytes {
                println!("Database Size:      {} bytes", size);
            }
        }
    }
}

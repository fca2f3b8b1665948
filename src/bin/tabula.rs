use std::path::Path;

use clap::{Parser, Subcommand};
use tabula::*;
use tracing::Level;

mod commands;

use commands::record::{FilterArgs, KeyArgs, RecordArgs, UpdateArgs};
use commands::schema::{AddColumnArgs, CreateTableArgs, InitArgs};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.tabula/tabula.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Database file to operate on, by default the configured database
    #[clap(long, global = true)]
    db: Option<String>,

    /// Output format: table, markdown, json, json-pretty, json-line, psv
    #[clap(short, long, global = true, default_value = "table")]
    format: OutputFormat,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database file
    Init(InitArgs),

    /// List all tables
    Tables,

    /// Show the columns and types of a table
    Columns {
        /// Table name
        table: String,
    },

    /// Create a table from column definitions
    CreateTable(CreateTableArgs),

    /// Add a column to an existing table
    AddColumn(AddColumnArgs),

    /// Drop a table
    DropTable {
        /// Table name
        table: String,
    },

    /// Insert a record given as a JSON object
    Insert(RecordArgs),

    /// Fetch a record by primary key
    Get(KeyArgs),

    /// Update fields of a record by primary key
    Update(UpdateArgs),

    /// Delete a record by primary key
    Delete(KeyArgs),

    /// List records matching a JSON predicate, e.g. '{"mark": "<= 100"}'
    Filter(FilterArgs),

    /// List every record of a table
    Dump {
        /// Table name
        table: String,
    },

    /// Show the current configuration
    Config,
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match TabulaConfig::new(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.database_path());
    let mut manager = TableManager::with_options(config.connection_options());
    let output_format = cli.format;

    match cli.command {
        Commands::Init(args) => commands::schema::run_init(&mut manager, &db_path, args),
        Commands::Config => commands::config::run(&config, output_format),
        command => {
            if !Path::new(&db_path).exists() {
                eprintln!(
                    "ERROR: database '{}' does not exist, run `tabula init` first",
                    db_path
                );
                std::process::exit(1);
            }
            if let Err(e) = manager.open(&db_path) {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }

            let result = match command {
                Commands::Tables => commands::schema::run_tables(&manager, output_format),
                Commands::Columns { table } => {
                    commands::schema::run_columns(&manager, &table, output_format)
                }
                Commands::CreateTable(args) => {
                    commands::schema::run_create_table(&mut manager, args)
                }
                Commands::AddColumn(args) => commands::schema::run_add_column(&manager, args),
                Commands::DropTable { table } => commands::schema::run_drop_table(&manager, &table),
                Commands::Insert(args) => commands::record::run_insert(&manager, args),
                Commands::Get(args) => commands::record::run_get(&manager, args, output_format),
                Commands::Update(args) => commands::record::run_update(&manager, args),
                Commands::Delete(args) => commands::record::run_delete(&manager, args),
                Commands::Filter(args) => {
                    commands::record::run_filter(&manager, args, output_format)
                }
                Commands::Dump { table } => {
                    commands::record::run_dump(&manager, &table, output_format)
                }
                Commands::Init(_) | Commands::Config => Ok(()),
            };

            if let Err(e) = result {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }

            if let Err(e) = manager.close() {
                eprintln!("ERROR: {}", e);
                std::process::exit(1);
            }
        }
    }
}
